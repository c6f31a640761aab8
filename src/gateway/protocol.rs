//! Request and response bodies exchanged with the game server.

use crate::moves::PlayerId;
use serde::{Deserialize, Serialize};

/// How a status message should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Severity {
    /// Informational.
    #[default]
    Note,
    /// Something went wrong.
    Error,
    /// The player is expected to act.
    Prompt,
}

/// A status line with its severity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    /// Text shown to the player.
    pub message: String,
    /// Presentation hint.
    pub severity: Severity,
}

impl Status {
    /// Creates a status line.
    pub fn new(message: impl Into<String>, severity: Severity) -> Self {
        Self {
            message: message.into(),
            severity,
        }
    }

    /// Shorthand for an informational status.
    pub fn note(message: impl Into<String>) -> Self {
        Self::new(message, Severity::Note)
    }

    /// Shorthand for an error status.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message, Severity::Error)
    }

    /// Shorthand for a prompt.
    pub fn prompt(message: impl Into<String>) -> Self {
        Self::new(message, Severity::Prompt)
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.severity, self.message)
    }
}

/// Discriminator for read-only requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestType {
    /// Ask for the rendered game state.
    #[serde(rename = "stateText")]
    StateText,
}

/// Request for the current game state as seen by `player`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchStateRequest {
    /// Always [`RequestType::StateText`].
    pub request_type: RequestType,
    /// The viewing player.
    pub player: Option<PlayerId>,
}

impl FetchStateRequest {
    /// Creates a state request for `player`.
    pub fn new(player: Option<PlayerId>) -> Self {
        Self {
            request_type: RequestType::StateText,
            player,
        }
    }
}

/// Game state as rendered by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateResponse {
    /// Preformatted board text.
    pub state_text: String,
    /// Status message.
    pub status: String,
    /// Status severity.
    pub status_type: Severity,
}

impl StateResponse {
    /// The status carried by this response.
    pub fn status_line(&self) -> Status {
        Status::new(self.status.clone(), self.status_type)
    }
}

/// Acknowledgment of a submitted move.
///
/// Servers may attach a status line; it is applied when present.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    /// Whether the server accepted the move.
    pub success: bool,
    /// Optional status message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Severity of `status`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_type: Option<Severity>,
}

impl SubmitResponse {
    /// A bare acknowledgment with no status.
    pub fn new(success: bool) -> Self {
        Self {
            success,
            ..Self::default()
        }
    }

    /// The status carried by this response, if any.
    pub fn status_line(&self) -> Option<Status> {
        self.status
            .as_ref()
            .map(|message| Status::new(message.clone(), self.status_type.unwrap_or_default()))
    }
}
