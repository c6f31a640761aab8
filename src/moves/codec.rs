//! Compact text commands for moves.
//!
//! A command is three positional tokens: source digit, tile code, destination
//! digit, e.g. `2 B 4`. Encoding writes a `-` placeholder for an unset field
//! that precedes a set one. Decoding is best-effort: it never fails and keeps
//! whatever fields it could read.
//!
//! Decoding follows a strict positional model. Whitespace is removed and each
//! remaining character is one token. Every positional test consumes exactly
//! one token, pass or fail, and a rejected token is never retried against a
//! later position. The tile position is only tested once a source has been
//! read, so `B4` decodes to a destination of 4 and nothing else.

use super::{Move, SlotIndex, Tile};
use tracing::{instrument, trace};

/// Token written for an unset field that precedes a set one.
pub const PLACEHOLDER: &str = "-";

/// Separator between encoded tokens.
pub const TOKEN_SEPARATOR: &str = " ";

/// Encodes a move as a command string.
///
/// No trailing placeholders are emitted, so an empty move encodes to `""`.
#[instrument(level = "trace")]
pub fn encode(mv: &Move) -> String {
    let mut tokens: Vec<String> = Vec::with_capacity(3);

    match mv.source {
        Some(source) => tokens.push(source.digit().to_string()),
        None if mv.tile.is_some() || mv.dest.is_some() => tokens.push(PLACEHOLDER.to_string()),
        None => {}
    }

    match mv.tile {
        Some(tile) => tokens.push(tile.code().to_string()),
        None if mv.dest.is_some() => tokens.push(PLACEHOLDER.to_string()),
        None => {}
    }

    if let Some(dest) = mv.dest {
        tokens.push(dest.digit().to_string());
    }

    tokens.join(TOKEN_SEPARATOR)
}

/// Decodes a command string into a (possibly partial) move.
#[instrument(level = "trace")]
pub fn decode(text: &str) -> Move {
    let mut tokens = text.chars().filter(|c| !c.is_whitespace());
    let mut mv = Move::empty();

    let Some(first) = tokens.next() else {
        return mv;
    };
    mv.source = SlotIndex::from_digit(first);

    if mv.source.is_some() {
        let Some(second) = tokens.next() else {
            return mv;
        };
        mv.tile = Tile::from_code(second);
    }

    if let Some(third) = tokens.next() {
        mv.dest = SlotIndex::from_digit(third);
    }

    trace!(?mv, "Decoded command");
    mv
}
