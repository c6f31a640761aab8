//! Tiledraft library - client core for a tile-drafting board game
//!
//! Players compose a move (take a tile colour from a source and place it on a
//! destination) through either of two input modes and submit it to an
//! authoritative game server, which is polled for opponent activity.
//!
//! # Architecture
//!
//! - **Moves**: tiles, slots, moves and the compact text command codec
//! - **Input**: merges structured field edits and command text into one staged move
//! - **Session**: state machine plus the driver task owning the poll timer
//! - **Gateway**: request/response boundary to the server (HTTP implementation included)
//!
//! # Example
//!
//! ```no_run
//! use tiledraft::{ClientConfig, CommandEdit, HttpGateway, PlayerId, SessionController};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::default();
//! let gateway = HttpGateway::new(config.server_url(), config.endpoint());
//! let session = SessionController::spawn(gateway, config.session_config());
//!
//! session.select_player(PlayerId(0)).await?;
//! session.edit_move(CommandEdit::new("2B4")).await?;
//! session.submit_move().await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod config;
mod console;
mod gateway;
mod input;
mod moves;
mod session;

// Crate-level exports - Configuration
pub use config::{ClientConfig, ConfigError};

// Crate-level exports - Console front end
pub use console::{render, run_console, ConsoleCommand, ConsoleError, HELP};

// Crate-level exports - Server gateway
pub use gateway::{
    FetchStateRequest, GatewayError, GatewayErrorKind, HttpGateway, RequestType, ServerGateway,
    Severity, StateResponse, Status, SubmitResponse,
};

// Crate-level exports - Move input
pub use input::{CommandEdit, FieldEdit, InputEvent, MoveInput, ProduceMove};

// Crate-level exports - Move types and codec
pub use moves::{
    decode, encode, Move, PlayerId, PlayerMove, SlotError, SlotIndex, Tile, PLACEHOLDER,
    TOKEN_SEPARATOR,
};

// Crate-level exports - Session
pub use session::{
    EditRejected, FetchTicket, PollTimer, SessionConfig, SessionController, SessionError,
    SessionHandle, SessionPhase, SessionSnapshot, SessionState, SubmitRejected, TimerChange,
    CONTACTING_STATE_TEXT, INITIAL_STATE_TEXT, SELECT_PLAYER_PROMPT,
};
