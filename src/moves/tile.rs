//! Tile colours drafted during play.

use serde::{Deserialize, Serialize};
use tracing::instrument;

/// One of the five tile colours.
///
/// Tiles carry identity only. Each has a one-letter code used by the
/// command codec and on the wire, and a full colour name for display.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::EnumIter,
)]
pub enum Tile {
    /// Azul (`A`).
    #[serde(rename = "A")]
    Azul,
    /// Blaze (`B`).
    #[serde(rename = "B")]
    Blaze,
    /// Crimson (`C`).
    #[serde(rename = "C")]
    Crimson,
    /// Dusk (`D`).
    #[serde(rename = "D")]
    Dusk,
    /// Ether (`E`).
    #[serde(rename = "E")]
    Ether,
}

impl Tile {
    /// Returns the one-letter code for this tile.
    pub fn code(self) -> char {
        match self {
            Tile::Azul => 'A',
            Tile::Blaze => 'B',
            Tile::Crimson => 'C',
            Tile::Dusk => 'D',
            Tile::Ether => 'E',
        }
    }

    /// Returns the colour name for display.
    pub fn label(self) -> &'static str {
        match self {
            Tile::Azul => "Azul",
            Tile::Blaze => "Blaze",
            Tile::Crimson => "Crimson",
            Tile::Dusk => "Dusk",
            Tile::Ether => "Ether",
        }
    }

    /// Looks up a tile by its code, ignoring case.
    pub fn from_code(c: char) -> Option<Tile> {
        match c.to_ascii_uppercase() {
            'A' => Some(Tile::Azul),
            'B' => Some(Tile::Blaze),
            'C' => Some(Tile::Crimson),
            'D' => Some(Tile::Dusk),
            'E' => Some(Tile::Ether),
            _ => None,
        }
    }

    /// Parses from a one-letter code or a full colour name (case-insensitive).
    #[instrument]
    pub fn from_label_or_code(s: &str) -> Option<Tile> {
        let s = s.trim();
        let mut chars = s.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return Self::from_code(c);
        }

        <Tile as strum::IntoEnumIterator>::iter()
            .find(|tile| tile.label().eq_ignore_ascii_case(s))
    }
}

impl std::fmt::Display for Tile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}
