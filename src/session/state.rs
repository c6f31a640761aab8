//! Session state machine.
//!
//! Pure and synchronous: every transition returns what the driver should do
//! next (start a timer, send a request) instead of doing it.

use crate::gateway::{FetchStateRequest, GatewayError, StateResponse, Status, SubmitResponse};
use crate::input::{InputEvent, MoveInput};
use crate::moves::{Move, PlayerId, PlayerMove};
use derive_more::{Display, Error};
use tracing::{debug, info, instrument, warn};

/// State text shown before the first successful fetch.
pub const INITIAL_STATE_TEXT: &str = "Not yet updated…";

/// State text shown while a manual refresh is outstanding.
pub const CONTACTING_STATE_TEXT: &str = "Contacting server…";

/// Prompt shown while no player is selected.
pub const SELECT_PLAYER_PROMPT: &str = "Please select your Player ID above";

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum SessionPhase {
    /// No player chosen; nothing is polled.
    NoPlayerSelected,
    /// A player is chosen and no submission is pending.
    Idle,
    /// A submitted move has not been acknowledged yet.
    AwaitingSubmitResponse,
}

/// What the driver must do with the poll timer after a player selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerChange {
    /// No timer was running; start one.
    Start,
    /// A timer for another player was running; replace it.
    Restart,
    /// The running timer already belongs to this player.
    Keep,
}

/// Identifies one outbound fetch.
///
/// Sequence numbers increase monotonically across the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    /// Sequence number.
    pub seq: u64,
    /// Player the fetch was issued for.
    pub player: PlayerId,
}

impl FetchTicket {
    /// The wire request for this fetch.
    pub fn request(&self) -> FetchStateRequest {
        FetchStateRequest::new(Some(self.player))
    }
}

/// Why a submission was not sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
pub enum SubmitRejected {
    /// No player is selected.
    #[display("no player selected")]
    NoPlayer,
    /// The staged move is missing a field.
    #[display("staged move is incomplete")]
    Incomplete,
    /// Another submission is still awaiting its response.
    #[display("a submission is already pending")]
    AlreadyPending,
}

/// An edit arrived while input is disabled; the staged move is unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
#[display("input is disabled in phase {}", phase)]
pub struct EditRejected {
    /// Phase the session was in.
    pub phase: SessionPhase,
}

/// Read-only view of the session for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// Current phase.
    pub phase: SessionPhase,
    /// Selected player, if any.
    pub selected_player: Option<PlayerId>,
    /// Move being composed.
    pub staged_move: Move,
    /// Whether the driver holds a running poll timer.
    pub polling_active: bool,
    /// Last state text received from the server.
    pub last_state_text: String,
    /// Current status line.
    pub status: Status,
}

impl SessionSnapshot {
    /// Whether input controls should be disabled. Edits are accepted only when idle.
    pub fn input_disabled(&self) -> bool {
        self.phase != SessionPhase::Idle
    }

    /// Whether the submit control should be enabled.
    pub fn can_submit(&self) -> bool {
        MoveInput::can_submit(&self.staged_move, self.input_disabled())
    }
}

/// Per-session client state.
#[derive(Debug, Clone)]
pub struct SessionState {
    staged_move: Move,
    selected_player: Option<PlayerId>,
    submit_pending: bool,
    last_state_text: String,
    status: Status,
    next_fetch_seq: u64,
    last_applied_seq: Option<u64>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    /// Creates a fresh session with no player and an empty staged move.
    pub fn new() -> Self {
        Self {
            staged_move: Move::empty(),
            selected_player: None,
            submit_pending: false,
            last_state_text: INITIAL_STATE_TEXT.to_string(),
            status: Status::prompt(SELECT_PLAYER_PROMPT),
            next_fetch_seq: 0,
            last_applied_seq: None,
        }
    }

    /// Current phase, derived from player selection and the pending submission.
    pub fn phase(&self) -> SessionPhase {
        match (self.selected_player, self.submit_pending) {
            (None, _) => SessionPhase::NoPlayerSelected,
            (Some(_), false) => SessionPhase::Idle,
            (Some(_), true) => SessionPhase::AwaitingSubmitResponse,
        }
    }

    /// The move being composed.
    pub fn staged_move(&self) -> &Move {
        &self.staged_move
    }

    /// The selected player.
    pub fn selected_player(&self) -> Option<PlayerId> {
        self.selected_player
    }

    /// Last state text received.
    pub fn last_state_text(&self) -> &str {
        &self.last_state_text
    }

    /// Current status line.
    pub fn status(&self) -> &Status {
        &self.status
    }

    /// Whether a submission may be sent now.
    pub fn can_submit(&self) -> bool {
        self.phase() == SessionPhase::Idle && self.staged_move.is_complete()
    }

    /// Copies the renderable state. Timer ownership lives with the driver,
    /// which reports it as `polling_active`.
    pub fn snapshot(&self, polling_active: bool) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase(),
            selected_player: self.selected_player,
            staged_move: self.staged_move,
            polling_active,
            last_state_text: self.last_state_text.clone(),
            status: self.status.clone(),
        }
    }

    fn next_ticket(&mut self, player: PlayerId) -> FetchTicket {
        let seq = self.next_fetch_seq;
        self.next_fetch_seq += 1;
        FetchTicket { seq, player }
    }

    /// Selects `player` and returns the timer change plus the immediate fetch.
    #[instrument(skip(self), fields(previous = ?self.selected_player))]
    pub fn select_player(&mut self, player: PlayerId) -> (TimerChange, FetchTicket) {
        let change = match self.selected_player {
            None => TimerChange::Start,
            Some(current) if current == player => TimerChange::Keep,
            Some(_) => TimerChange::Restart,
        };
        self.selected_player = Some(player);
        info!(player = %player, ?change, "Player selected");
        (change, self.next_ticket(player))
    }

    /// Clears the selected player. Returns whether a player was selected,
    /// i.e. whether the driver has a timer to cancel.
    ///
    /// The staged move is kept.
    #[instrument(skip(self), fields(previous = ?self.selected_player))]
    pub fn deselect_player(&mut self) -> bool {
        let was_selected = self.selected_player.take().is_some();
        if was_selected {
            info!("Player deselected");
            self.status = Status::prompt(SELECT_PLAYER_PROMPT);
        }
        was_selected
    }

    /// Issues a fetch for the selected player, if any.
    pub fn issue_fetch(&mut self) -> Option<FetchTicket> {
        let player = self.selected_player?;
        Some(self.next_ticket(player))
    }

    /// Issues a manual refresh, showing a placeholder until the reply lands.
    #[instrument(skip(self))]
    pub fn begin_refresh(&mut self) -> Option<FetchTicket> {
        let ticket = self.issue_fetch()?;
        self.last_state_text = CONTACTING_STATE_TEXT.to_string();
        Some(ticket)
    }

    /// Applies a fetch result unless it is stale. Returns whether it was applied.
    ///
    /// A result is stale when its player is no longer selected or a newer
    /// fetch has already been applied.
    #[instrument(skip(self, result), fields(seq = ticket.seq, player = %ticket.player))]
    pub fn apply_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<StateResponse, GatewayError>,
    ) -> bool {
        if self.selected_player != Some(ticket.player) {
            debug!(selected = ?self.selected_player, "Discarding fetch for unselected player");
            return false;
        }
        if self.last_applied_seq.is_some_and(|last| ticket.seq <= last) {
            debug!(last_applied = ?self.last_applied_seq, "Discarding out-of-order fetch");
            return false;
        }
        self.last_applied_seq = Some(ticket.seq);

        match result {
            Ok(response) => {
                self.status = response.status_line();
                self.last_state_text = response.state_text;
            }
            Err(e) => {
                warn!(error = %e, "Fetch failed");
                self.status = if e.is_timeout() {
                    Status::error("Server did not respond; game state may be out of date")
                } else {
                    Status::error("Could not refresh game state")
                };
            }
        }
        true
    }

    /// Applies an edit from either input mode to the staged move.
    ///
    /// Refused unless idle: with no player input is disabled, and while a
    /// submission is pending its acknowledgment would discard the edit.
    #[instrument(skip(self, event), fields(phase = %self.phase()))]
    pub fn edit_move(&mut self, event: &InputEvent) -> Result<Move, EditRejected> {
        let phase = self.phase();
        if phase != SessionPhase::Idle {
            warn!(?event, "Edit refused while input is disabled");
            return Err(EditRejected { phase });
        }
        self.staged_move = MoveInput::apply(&self.staged_move, event);
        Ok(self.staged_move)
    }

    /// Starts a submission and returns the request to send.
    #[instrument(skip(self), fields(phase = %self.phase(), mv = %self.staged_move))]
    pub fn begin_submit(&mut self) -> Result<PlayerMove, SubmitRejected> {
        let player = self.selected_player.ok_or(SubmitRejected::NoPlayer)?;
        if self.submit_pending {
            return Err(SubmitRejected::AlreadyPending);
        }
        if !self.staged_move.is_complete() {
            return Err(SubmitRejected::Incomplete);
        }
        self.submit_pending = true;
        info!(player = %player, "Submitting move");
        Ok(PlayerMove::new(Some(player), self.staged_move))
    }

    /// Applies a submission result. The pending submission always ends here.
    ///
    /// The staged move is cleared only on an acknowledged success.
    #[instrument(skip(self, result))]
    pub fn apply_submit(&mut self, result: Result<SubmitResponse, GatewayError>) {
        if !self.submit_pending {
            warn!("Submit response with no pending submission");
            return;
        }
        self.submit_pending = false;

        match result {
            Ok(response) => {
                if response.success {
                    info!(mv = %self.staged_move, "Move accepted");
                    self.staged_move = Move::empty();
                } else {
                    warn!(mv = %self.staged_move, "Move rejected");
                }
                if let Some(status) = response.status_line() {
                    self.status = status;
                }
            }
            Err(e) => {
                warn!(error = %e, "Submission failed");
                self.status = if e.is_timeout() {
                    Status::error("Server did not acknowledge the move; try again")
                } else {
                    Status::error("Could not submit move; try again")
                };
            }
        }
    }
}
