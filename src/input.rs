//! Move input: merges edits from both input modes into one staged move.
//!
//! The structured mode edits one field at a time and patches the current
//! move. The command mode re-derives the whole move from the text on every
//! edit. Both produce a [`Move`] from the current one, so the session keeps a
//! single staged move no matter which mode the player is using.

use crate::moves::{decode, Move, SlotIndex, Tile, PLACEHOLDER};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Capability shared by every input mode: derive the next move from the current one.
pub trait ProduceMove {
    /// Returns the move that results from applying this edit to `current`.
    fn produce_move(&self, current: &Move) -> Move;
}

/// An edit to a single field from the structured input mode.
///
/// `None` means the field was set back to "no selection".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldEdit {
    /// The source selector changed.
    Source(Option<SlotIndex>),
    /// The tile selector changed.
    Tile(Option<Tile>),
    /// The destination selector changed.
    Dest(Option<SlotIndex>),
}

impl FieldEdit {
    /// Builds an edit from a field name and a selector value.
    ///
    /// The value `-` clears the field. Returns `None` for an unknown field
    /// name or a value outside the field's domain.
    #[instrument]
    pub fn from_labels(field: &str, value: &str) -> Option<Self> {
        let value = value.trim();
        let cleared = value == PLACEHOLDER;
        match field.trim().to_ascii_lowercase().as_str() {
            "source" => {
                if cleared {
                    Some(Self::Source(None))
                } else {
                    SlotIndex::parse(value).map(|s| Self::Source(Some(s)))
                }
            }
            "tile" => {
                if cleared {
                    Some(Self::Tile(None))
                } else {
                    Tile::from_label_or_code(value).map(|t| Self::Tile(Some(t)))
                }
            }
            "dest" | "destination" => {
                if cleared {
                    Some(Self::Dest(None))
                } else {
                    SlotIndex::parse(value).map(|s| Self::Dest(Some(s)))
                }
            }
            _ => None,
        }
    }
}

impl ProduceMove for FieldEdit {
    fn produce_move(&self, current: &Move) -> Move {
        match *self {
            FieldEdit::Source(source) => current.with_source(source),
            FieldEdit::Tile(tile) => current.with_tile(tile),
            FieldEdit::Dest(dest) => current.with_dest(dest),
        }
    }
}

/// The full contents of the command field after an edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandEdit {
    /// Command text as typed.
    pub text: String,
}

impl CommandEdit {
    /// Wraps the new command text.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl ProduceMove for CommandEdit {
    fn produce_move(&self, _current: &Move) -> Move {
        decode(&self.text)
    }
}

/// An edit from either input mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputEvent {
    /// A structured field edit.
    Field(FieldEdit),
    /// A command text edit.
    Command(CommandEdit),
}

impl From<FieldEdit> for InputEvent {
    fn from(edit: FieldEdit) -> Self {
        Self::Field(edit)
    }
}

impl From<CommandEdit> for InputEvent {
    fn from(edit: CommandEdit) -> Self {
        Self::Command(edit)
    }
}

impl ProduceMove for InputEvent {
    fn produce_move(&self, current: &Move) -> Move {
        match self {
            InputEvent::Field(edit) => edit.produce_move(current),
            InputEvent::Command(edit) => edit.produce_move(current),
        }
    }
}

/// Stateless controller combining both input modes.
#[derive(Debug, Clone, Copy, Default)]
pub struct MoveInput;

impl MoveInput {
    /// Applies one edit and returns the next staged move.
    #[instrument(skip(current, event))]
    pub fn apply(current: &Move, event: &InputEvent) -> Move {
        let next = event.produce_move(current);
        debug!(?event, before = %current, after = %next, "Applied move edit");
        next
    }

    /// True when the move is complete and input is enabled.
    pub fn can_submit(mv: &Move, input_disabled: bool) -> bool {
        mv.is_complete() && !input_disabled
    }
}
