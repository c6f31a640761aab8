//! Move and player identity types.

use super::{SlotIndex, Tile};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Identifies the acting player.
///
/// Player ids are small integers starting at 0. Nothing here limits how
/// many players a game may have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u32);

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Player {}", self.0)
    }
}

/// A move being composed: take `tile` from `source` and place it on `dest`.
///
/// Every field is optional while the player is still editing. Only a
/// complete move may be submitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    /// Where the tiles are drafted from.
    pub source: Option<SlotIndex>,
    /// Which colour is drafted.
    pub tile: Option<Tile>,
    /// Where the tiles are placed.
    pub dest: Option<SlotIndex>,
}

impl Move {
    /// Creates a move with every field set.
    #[instrument]
    pub fn new(source: SlotIndex, tile: Tile, dest: SlotIndex) -> Self {
        Self {
            source: Some(source),
            tile: Some(tile),
            dest: Some(dest),
        }
    }

    /// Creates a move with no fields set.
    pub fn empty() -> Self {
        Self::default()
    }

    /// True when source, tile and destination are all set.
    pub fn is_complete(&self) -> bool {
        self.source.is_some() && self.tile.is_some() && self.dest.is_some()
    }

    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        self.source.is_none() && self.tile.is_none() && self.dest.is_none()
    }

    /// Returns a copy with the source replaced.
    pub fn with_source(self, source: Option<SlotIndex>) -> Self {
        Self { source, ..self }
    }

    /// Returns a copy with the tile replaced.
    pub fn with_tile(self, tile: Option<Tile>) -> Self {
        Self { tile, ..self }
    }

    /// Returns a copy with the destination replaced.
    pub fn with_dest(self, dest: Option<SlotIndex>) -> Self {
        Self { dest, ..self }
    }

    /// Human-readable summary, e.g. `Azul from Batch 2 to Stage 4`.
    ///
    /// Unset fields read as `?`.
    pub fn describe(&self) -> String {
        let tile = self.tile.map_or("?", Tile::label);
        let source = self.source.map_or_else(|| "?".to_string(), SlotIndex::source_label);
        let dest = self.dest.map_or_else(|| "?".to_string(), SlotIndex::dest_label);
        format!("{} from {} to {}", tile, source, dest)
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.describe())
    }
}

/// A move tagged with the player submitting it.
///
/// This is the body of a submit request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerMove {
    /// The acting player, if one is selected.
    pub player: Option<PlayerId>,
    /// The move itself.
    #[serde(flatten)]
    pub mv: Move,
}

impl PlayerMove {
    /// Tags a move with its player.
    pub fn new(player: Option<PlayerId>, mv: Move) -> Self {
        Self { player, mv }
    }
}
