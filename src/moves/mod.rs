//! Move representation: tiles, slots, moves and the text command codec.

mod codec;
mod slot;
mod tile;
mod types;

pub use codec::{decode, encode, PLACEHOLDER, TOKEN_SEPARATOR};
pub use slot::{SlotError, SlotIndex};
pub use tile::Tile;
pub use types::{Move, PlayerId, PlayerMove};
