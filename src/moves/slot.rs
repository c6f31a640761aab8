//! Board locations a move draws from or places into.

use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Index of a source or destination location (0-5).
///
/// As a source, 0 is the bench and 1-5 are the batches.
/// As a destination, 0 is the floor and 1-5 are the staging rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct SlotIndex(u8);

impl SlotIndex {
    /// Highest valid slot index.
    pub const MAX: u8 = 5;

    /// Creates a slot index, rejecting values outside 0-5.
    #[track_caller]
    pub fn new(index: u8) -> Result<Self, SlotError> {
        if index <= Self::MAX {
            Ok(Self(index))
        } else {
            Err(SlotError::new(index))
        }
    }

    /// Interprets a single character as a slot digit.
    pub fn from_digit(c: char) -> Option<Self> {
        c.to_digit(10)
            .and_then(|d| u8::try_from(d).ok())
            .and_then(|d| Self::new(d).ok())
    }

    /// Parses a slot from text such as `"3"`.
    #[instrument]
    pub fn parse(s: &str) -> Option<Self> {
        s.trim().parse::<u8>().ok().and_then(|d| Self::new(d).ok())
    }

    /// Returns the raw index.
    pub fn get(self) -> u8 {
        self.0
    }

    /// Returns the single-digit token for this slot.
    pub fn digit(self) -> char {
        char::from(b'0' + self.0)
    }

    /// Describes this slot in the source role.
    pub fn source_label(self) -> String {
        match self.0 {
            0 => "Bench".to_string(),
            n => format!("Batch {}", n),
        }
    }

    /// Describes this slot in the destination role.
    pub fn dest_label(self) -> String {
        match self.0 {
            0 => "Floor".to_string(),
            n => format!("Stage {}", n),
        }
    }
}

impl TryFrom<u8> for SlotIndex {
    type Error = SlotError;

    #[track_caller]
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SlotIndex> for u8 {
    fn from(slot: SlotIndex) -> Self {
        slot.0
    }
}

impl std::fmt::Display for SlotIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A slot index outside 0-5.
#[derive(Debug, Clone, Display, Error)]
#[display("Slot index {} out of range 0-{} at {}:{}", index, SlotIndex::MAX, file, line)]
pub struct SlotError {
    /// The rejected index.
    pub index: u8,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl SlotError {
    /// Creates a new slot error with caller location tracking.
    #[track_caller]
    pub fn new(index: u8) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            index,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
