//! Session driver task and the handle used to control it.
//!
//! One task owns the [`SessionState`], the poll timer and every in-flight
//! request. Handlers run to completion one at a time; network calls run as
//! child tasks whose results come back through the same loop.

use super::state::{
    EditRejected, FetchTicket, SessionSnapshot, SessionState, SubmitRejected, TimerChange,
};
use super::timer::{next_tick, PollTimer};
use crate::gateway::{
    GatewayError, GatewayErrorKind, ServerGateway, StateResponse, SubmitResponse,
};
use crate::input::InputEvent;
use crate::moves::{Move, PlayerId};
use derive_more::{Display, Error};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, error, info, instrument, warn};

/// Timing settings for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Time between polls while a player is selected.
    pub poll_interval: Duration,
    /// How long a fetch or submit may take before it counts as failed.
    pub request_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(1000),
            request_timeout: Duration::from_millis(5000),
        }
    }
}

/// Error returned by [`SessionHandle`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
pub enum SessionError {
    /// The session task has stopped.
    #[display("session has shut down")]
    Closed,
    /// The submission was refused locally and nothing was sent.
    #[display("submission not sent: {}", _0)]
    Rejected(SubmitRejected),
    /// The edit was refused and the staged move is unchanged.
    #[display("edit not applied: {}", _0)]
    EditRejected(EditRejected),
}

impl From<SubmitRejected> for SessionError {
    fn from(reason: SubmitRejected) -> Self {
        Self::Rejected(reason)
    }
}

impl From<EditRejected> for SessionError {
    fn from(reason: EditRejected) -> Self {
        Self::EditRejected(reason)
    }
}

enum Command {
    SelectPlayer {
        player: PlayerId,
        ack: oneshot::Sender<()>,
    },
    DeselectPlayer {
        ack: oneshot::Sender<()>,
    },
    EditMove {
        event: InputEvent,
        ack: oneshot::Sender<Result<Move, EditRejected>>,
    },
    SubmitMove {
        ack: oneshot::Sender<Result<(), SubmitRejected>>,
    },
    Refresh {
        ack: oneshot::Sender<()>,
    },
    Shutdown {
        ack: oneshot::Sender<()>,
    },
}

enum Completion {
    Fetch {
        ticket: FetchTicket,
        result: Result<StateResponse, GatewayError>,
    },
    Submit {
        result: Result<SubmitResponse, GatewayError>,
    },
}

/// Cloneable handle to a running session.
///
/// The session stops when [`SessionHandle::shutdown`] is called or every
/// handle has been dropped.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    commands: mpsc::UnboundedSender<Command>,
    snapshots: watch::Receiver<SessionSnapshot>,
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::SelectPlayer { player, .. } => write!(f, "SelectPlayer({})", player),
            Command::DeselectPlayer { .. } => write!(f, "DeselectPlayer"),
            Command::EditMove { event, .. } => write!(f, "EditMove({:?})", event),
            Command::SubmitMove { .. } => write!(f, "SubmitMove"),
            Command::Refresh { .. } => write!(f, "Refresh"),
            Command::Shutdown { .. } => write!(f, "Shutdown"),
        }
    }
}

impl SessionHandle {
    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, SessionError> {
        let (ack, reply) = oneshot::channel();
        self.commands
            .send(make(ack))
            .map_err(|_| SessionError::Closed)?;
        reply.await.map_err(|_| SessionError::Closed)
    }

    /// Selects the acting player, starting (or retargeting) polling.
    pub async fn select_player(&self, player: PlayerId) -> Result<(), SessionError> {
        self.request(|ack| Command::SelectPlayer { player, ack }).await
    }

    /// Deselects the player and stops polling.
    pub async fn deselect_player(&self) -> Result<(), SessionError> {
        self.request(|ack| Command::DeselectPlayer { ack }).await
    }

    /// Applies an edit from either input mode; returns the new staged move.
    ///
    /// Fails with [`SessionError::EditRejected`] unless the session is idle.
    pub async fn edit_move(&self, event: impl Into<InputEvent>) -> Result<Move, SessionError> {
        let event = event.into();
        let mv = self.request(|ack| Command::EditMove { event, ack }).await??;
        Ok(mv)
    }

    /// Submits the staged move.
    ///
    /// Returns once the request is sent, not when it is acknowledged; watch
    /// the snapshot for the outcome.
    pub async fn submit_move(&self) -> Result<(), SessionError> {
        self.request(|ack| Command::SubmitMove { ack }).await??;
        Ok(())
    }

    /// Fetches the game state now, outside the poll cadence.
    pub async fn refresh(&self) -> Result<(), SessionError> {
        self.request(|ack| Command::Refresh { ack }).await
    }

    /// Stops the session, cancelling the poll timer and in-flight requests.
    pub async fn shutdown(&self) -> Result<(), SessionError> {
        self.request(|ack| Command::Shutdown { ack }).await
    }

    /// Current session state.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Receiver that is notified whenever the session state changes.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.clone()
    }
}

/// Owns a session and drives it from a single task.
pub struct SessionController<G: ServerGateway> {
    gateway: Arc<G>,
    config: SessionConfig,
    state: SessionState,
    timer: Option<PollTimer>,
    in_flight: JoinSet<Completion>,
    /// Task carrying the pending submission, so a failed join can end it.
    submit_task: Option<tokio::task::Id>,
    snapshots: watch::Sender<SessionSnapshot>,
}

impl<G: ServerGateway> SessionController<G> {
    /// Spawns the session task and returns its handle.
    ///
    /// Must be called from within a tokio runtime.
    #[instrument(skip(gateway))]
    pub fn spawn(gateway: G, config: SessionConfig) -> SessionHandle {
        let state = SessionState::new();
        let (snapshots, snapshot_rx) = watch::channel(state.snapshot(false));
        let (command_tx, command_rx) = mpsc::unbounded_channel();

        let controller = Self {
            gateway: Arc::new(gateway),
            config,
            state,
            timer: None,
            in_flight: JoinSet::new(),
            submit_task: None,
            snapshots,
        };
        tokio::spawn(controller.run(command_rx));

        SessionHandle {
            commands: command_tx,
            snapshots: snapshot_rx,
        }
    }

    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>) {
        info!("Session started");

        loop {
            tokio::select! {
                command = commands.recv() => {
                    let Some(command) = command else {
                        debug!("All session handles dropped");
                        break;
                    };
                    if !self.handle_command(command) {
                        break;
                    }
                }
                Some(joined) = self.in_flight.join_next_with_id() => match joined {
                    Ok((id, completion)) => {
                        if self.submit_task == Some(id) {
                            self.submit_task = None;
                        }
                        self.handle_completion(completion);
                    }
                    Err(e) => self.on_task_failed(e),
                },
                player = next_tick(&mut self.timer) => self.on_poll_tick(player),
            }
            self.publish();
        }

        self.timer = None;
        self.in_flight.abort_all();
        info!("Session stopped");
    }

    /// Handles one command. Returns `false` when the session should stop.
    fn handle_command(&mut self, command: Command) -> bool {
        debug!(?command, "Handling command");
        match command {
            Command::SelectPlayer { player, ack } => {
                self.select_player(player);
                self.reply(ack, ());
            }
            Command::DeselectPlayer { ack } => {
                self.deselect_player();
                self.reply(ack, ());
            }
            Command::EditMove { event, ack } => {
                let mv = self.state.edit_move(&event);
                self.reply(ack, mv);
            }
            Command::SubmitMove { ack } => {
                let sent = self.submit_move();
                self.reply(ack, sent);
            }
            Command::Refresh { ack } => {
                if let Some(ticket) = self.state.begin_refresh() {
                    self.spawn_fetch(ticket);
                }
                self.reply(ack, ());
            }
            Command::Shutdown { ack } => {
                self.reply(ack, ());
                return false;
            }
        }
        true
    }

    /// Publishes the new state before acknowledging, so callers observe it.
    fn reply<T>(&self, ack: oneshot::Sender<T>, value: T) {
        self.publish();
        if ack.send(value).is_err() {
            debug!("Caller dropped before acknowledgment");
        }
    }

    fn select_player(&mut self, player: PlayerId) {
        let (change, ticket) = self.state.select_player(player);
        match change {
            TimerChange::Start | TimerChange::Restart => {
                // Assigning drops any previous timer first.
                self.timer = Some(PollTimer::start(player, self.config.poll_interval));
            }
            TimerChange::Keep => {}
        }
        self.spawn_fetch(ticket);
    }

    fn deselect_player(&mut self) {
        if self.state.deselect_player() {
            self.timer = None;
        }
    }

    fn submit_move(&mut self) -> Result<(), SubmitRejected> {
        let request = self.state.begin_submit().inspect_err(|reason| {
            warn!(%reason, "Submission refused");
        })?;

        let gateway = Arc::clone(&self.gateway);
        let limit = self.config.request_timeout;
        let task = self.in_flight.spawn(async move {
            let result = with_timeout(limit, gateway.submit_move(request)).await;
            Completion::Submit { result }
        });
        self.submit_task = Some(task.id());
        Ok(())
    }

    /// A request task panicked or was cancelled. A lost submission still ends
    /// the pending state; a lost fetch is replaced by the next poll.
    fn on_task_failed(&mut self, e: JoinError) {
        error!(error = %e, "Request task failed");
        if self.submit_task == Some(e.id()) {
            self.submit_task = None;
            self.state
                .apply_submit(Err(GatewayError::new(GatewayErrorKind::Transport(e.to_string()))));
        }
    }

    fn on_poll_tick(&mut self, player: PlayerId) {
        debug!(player = %player, "Poll tick");
        if let Some(ticket) = self.state.issue_fetch() {
            self.spawn_fetch(ticket);
        }
    }

    fn spawn_fetch(&mut self, ticket: FetchTicket) {
        debug!(seq = ticket.seq, player = %ticket.player, "Issuing fetch");
        let gateway = Arc::clone(&self.gateway);
        let limit = self.config.request_timeout;
        self.in_flight.spawn(async move {
            let result = with_timeout(limit, gateway.fetch_state(ticket.request())).await;
            Completion::Fetch { ticket, result }
        });
    }

    fn handle_completion(&mut self, completion: Completion) {
        match completion {
            Completion::Fetch { ticket, result } => {
                if !self.state.apply_fetch(ticket, result) {
                    debug!(seq = ticket.seq, "Stale fetch discarded");
                }
            }
            Completion::Submit { result } => self.state.apply_submit(result),
        }
    }

    fn publish(&self) {
        let snapshot = self.state.snapshot(self.timer.is_some());
        self.snapshots.send_if_modified(|current| {
            if *current == snapshot {
                false
            } else {
                *current = snapshot;
                true
            }
        });
    }
}

/// Runs `request`, turning an overrun of `limit` into a timeout error.
async fn with_timeout<T>(
    limit: Duration,
    request: impl Future<Output = Result<T, GatewayError>>,
) -> Result<T, GatewayError> {
    tokio::time::timeout(limit, request)
        .await
        .unwrap_or_else(|_| Err(GatewayError::new(GatewayErrorKind::Timeout(limit))))
}
