//! Boundary to the authoritative game server.

mod http;
mod protocol;

pub use http::HttpGateway;
pub use protocol::{
    FetchStateRequest, RequestType, Severity, StateResponse, Status, SubmitResponse,
};

use crate::moves::PlayerMove;
use derive_more::{Display, Error};
use std::time::Duration;

/// Request/response access to the game server.
///
/// Implementations only move messages. Timeouts are applied by the session.
#[async_trait::async_trait]
pub trait ServerGateway: Send + Sync + 'static {
    /// Fetches the game state as seen by the requested player.
    async fn fetch_state(&self, request: FetchStateRequest) -> Result<StateResponse, GatewayError>;

    /// Submits a move.
    async fn submit_move(&self, request: PlayerMove) -> Result<SubmitResponse, GatewayError>;
}

/// Why a gateway call failed.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum GatewayErrorKind {
    /// The request could not be sent or the response not read.
    #[display("transport failure: {}", _0)]
    Transport(String),
    /// The server answered with a non-success HTTP status.
    #[display("server returned HTTP {}", _0)]
    Status(u16),
    /// The response body was not the expected shape.
    #[display("invalid response: {}", _0)]
    Decode(String),
    /// No response within the allowed time.
    #[display("no response within {:?}", _0)]
    Timeout(Duration),
}

/// Gateway error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Gateway error: {} at {}:{}", kind, file, line)]
pub struct GatewayError {
    /// What went wrong.
    pub kind: GatewayErrorKind,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl GatewayError {
    /// Creates a new gateway error with caller location tracking.
    #[track_caller]
    pub fn new(kind: GatewayErrorKind) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            line: loc.line(),
            file: loc.file(),
        }
    }

    /// True if the request timed out.
    pub fn is_timeout(&self) -> bool {
        matches!(self.kind, GatewayErrorKind::Timeout(_))
    }
}

impl From<reqwest::Error> for GatewayError {
    #[track_caller]
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::new(GatewayErrorKind::Decode(err.to_string()))
        } else {
            Self::new(GatewayErrorKind::Transport(err.to_string()))
        }
    }
}
