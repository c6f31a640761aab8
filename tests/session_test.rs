//! Tests for the session driver: polling cadence, staleness and submission.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tiledraft::{
    CommandEdit, EditRejected, FetchStateRequest, FieldEdit, GatewayError, PlayerId, PlayerMove,
    ServerGateway, SessionConfig, SessionController, SessionError, SessionHandle, SessionPhase,
    SessionSnapshot, Severity, SlotIndex, StateResponse, SubmitRejected, SubmitResponse, Tile,
    INITIAL_STATE_TEXT, SELECT_PLAYER_PROMPT,
};

/// How the scripted server answers a submission.
#[derive(Debug, Clone)]
enum SubmitScript {
    Reply(SubmitResponse),
    /// Answer after a delay.
    Delayed(u64, SubmitResponse),
    Hang,
    Panic,
}

#[derive(Debug, Default)]
struct Recorded {
    fetches: Vec<FetchStateRequest>,
    submits: Vec<PlayerMove>,
    fetch_delays: VecDeque<Duration>,
    submit_scripts: VecDeque<SubmitScript>,
}

/// In-memory gateway that records requests and replays scripted answers.
#[derive(Debug, Clone, Default)]
struct ScriptedGateway {
    recorded: Arc<Mutex<Recorded>>,
}

impl ScriptedGateway {
    fn delay_fetches(&self, delays: &[u64]) {
        let mut recorded = self.recorded.lock().unwrap();
        recorded
            .fetch_delays
            .extend(delays.iter().map(|ms| Duration::from_millis(*ms)));
    }

    fn script_submit(&self, script: SubmitScript) {
        self.recorded.lock().unwrap().submit_scripts.push_back(script);
    }

    fn fetches(&self) -> Vec<FetchStateRequest> {
        self.recorded.lock().unwrap().fetches.clone()
    }

    fn submits(&self) -> Vec<PlayerMove> {
        self.recorded.lock().unwrap().submits.clone()
    }
}

#[async_trait::async_trait]
impl ServerGateway for ScriptedGateway {
    async fn fetch_state(&self, request: FetchStateRequest) -> Result<StateResponse, GatewayError> {
        let (index, delay) = {
            let mut recorded = self.recorded.lock().unwrap();
            recorded.fetches.push(request);
            let delay = recorded.fetch_delays.pop_front().unwrap_or_default();
            (recorded.fetches.len() - 1, delay)
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let player = request.player.map_or(-1, |p| i64::from(p.0));
        Ok(StateResponse {
            state_text: format!("state {} for player {}", index, player),
            status: "Waiting for opponent".to_string(),
            status_type: Severity::Note,
        })
    }

    async fn submit_move(&self, request: PlayerMove) -> Result<SubmitResponse, GatewayError> {
        let script = {
            let mut recorded = self.recorded.lock().unwrap();
            recorded.submits.push(request);
            recorded
                .submit_scripts
                .pop_front()
                .unwrap_or(SubmitScript::Reply(SubmitResponse::new(true)))
        };
        match script {
            SubmitScript::Reply(response) => Ok(response),
            SubmitScript::Delayed(ms, response) => {
                tokio::time::sleep(Duration::from_millis(ms)).await;
                Ok(response)
            }
            SubmitScript::Hang => std::future::pending().await,
            SubmitScript::Panic => panic!("gateway crashed while submitting"),
        }
    }
}

fn config() -> SessionConfig {
    SessionConfig {
        poll_interval: Duration::from_millis(1000),
        request_timeout: Duration::from_millis(5000),
    }
}

fn start() -> (ScriptedGateway, SessionHandle) {
    let gateway = ScriptedGateway::default();
    let handle = SessionController::spawn(gateway.clone(), config());
    (gateway, handle)
}

async fn wait_for(
    handle: &SessionHandle,
    predicate: impl FnMut(&SessionSnapshot) -> bool,
) -> SessionSnapshot {
    let mut updates = handle.subscribe();
    tokio::time::timeout(Duration::from_secs(60), updates.wait_for(predicate))
        .await
        .expect("Timed out waiting for session state")
        .expect("Session closed")
        .clone()
}

async fn sleep_ms(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

#[tokio::test(start_paused = true)]
async fn test_initial_snapshot() {
    let (_gateway, handle) = start();
    let snapshot = handle.snapshot();

    assert_eq!(snapshot.phase, SessionPhase::NoPlayerSelected);
    assert_eq!(snapshot.last_state_text, INITIAL_STATE_TEXT);
    assert_eq!(snapshot.status.message, SELECT_PLAYER_PROMPT);
    assert_eq!(snapshot.status.severity, Severity::Prompt);
    assert!(!snapshot.polling_active);
    assert!(snapshot.input_disabled());
}

#[tokio::test(start_paused = true)]
async fn test_select_fetches_immediately_and_polls() {
    let (gateway, handle) = start();
    handle.select_player(PlayerId(0)).await.unwrap();

    let snapshot = wait_for(&handle, |s| s.last_state_text.starts_with("state 0")).await;
    assert_eq!(snapshot.phase, SessionPhase::Idle);
    assert!(snapshot.polling_active);
    assert_eq!(snapshot.status.message, "Waiting for opponent");

    sleep_ms(3500).await;
    let fetches = gateway.fetches();
    assert_eq!(fetches.len(), 4);
    assert!(fetches.iter().all(|f| f.player == Some(PlayerId(0))));
}

#[tokio::test(start_paused = true)]
async fn test_deselect_stops_polling() {
    let (gateway, handle) = start();
    gateway.delay_fetches(&[500]);
    handle.select_player(PlayerId(0)).await.unwrap();
    handle.deselect_player().await.unwrap();

    sleep_ms(3500).await;
    assert_eq!(gateway.fetches().len(), 1);

    let snapshot = handle.snapshot();
    assert_eq!(snapshot.phase, SessionPhase::NoPlayerSelected);
    assert!(!snapshot.polling_active);
    // The only response arrived after deselection and was dropped.
    assert_eq!(snapshot.last_state_text, INITIAL_STATE_TEXT);
    assert_eq!(snapshot.status.severity, Severity::Prompt);
}

#[tokio::test(start_paused = true)]
async fn test_switching_players_keeps_one_timer() {
    let (gateway, handle) = start();
    handle.select_player(PlayerId(0)).await.unwrap();
    handle.select_player(PlayerId(1)).await.unwrap();

    sleep_ms(2500).await;
    let players: Vec<_> = gateway.fetches().iter().map(|f| f.player).collect();
    assert_eq!(
        players,
        vec![
            Some(PlayerId(0)),
            Some(PlayerId(1)),
            Some(PlayerId(1)),
            Some(PlayerId(1)),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_reselecting_same_player_does_not_restart_timer() {
    let (gateway, handle) = start();
    handle.select_player(PlayerId(2)).await.unwrap();
    sleep_ms(600).await;
    handle.select_player(PlayerId(2)).await.unwrap();

    // Original cadence: ticks at 1000 and 2000, plus two selection fetches.
    sleep_ms(1500).await;
    assert_eq!(gateway.fetches().len(), 4);
}

#[tokio::test(start_paused = true)]
async fn test_out_of_order_poll_response_is_discarded() {
    let (gateway, handle) = start();
    // Selection fetch is slow; the first tick's fetch overtakes it.
    gateway.delay_fetches(&[1500, 100]);
    handle.select_player(PlayerId(0)).await.unwrap();

    sleep_ms(1700).await;
    assert_eq!(gateway.fetches().len(), 2);
    assert_eq!(handle.snapshot().last_state_text, "state 1 for player 0");
}

#[tokio::test(start_paused = true)]
async fn test_response_for_previous_player_is_discarded() {
    let (gateway, handle) = start();
    gateway.delay_fetches(&[800]);
    handle.select_player(PlayerId(0)).await.unwrap();
    handle.select_player(PlayerId(1)).await.unwrap();

    sleep_ms(900).await;
    assert_eq!(handle.snapshot().last_state_text, "state 1 for player 1");
}

#[tokio::test(start_paused = true)]
async fn test_refresh_fetches_out_of_band() {
    let (gateway, handle) = start();
    handle.refresh().await.unwrap();
    assert!(gateway.fetches().is_empty());

    handle.select_player(PlayerId(0)).await.unwrap();
    sleep_ms(100).await;
    handle.refresh().await.unwrap();
    sleep_ms(100).await;

    assert_eq!(gateway.fetches().len(), 2);
    assert_eq!(handle.snapshot().last_state_text, "state 1 for player 0");
}

#[tokio::test(start_paused = true)]
async fn test_edits_from_both_modes_share_staged_move() {
    let (_gateway, handle) = start();
    handle.select_player(PlayerId(0)).await.unwrap();

    handle.edit_move(CommandEdit::new("2B")).await.unwrap();
    let mv = handle
        .edit_move(FieldEdit::Dest(SlotIndex::new(4).ok()))
        .await
        .unwrap();

    assert_eq!(mv, tiledraft::decode("2B4"));
    assert!(wait_for(&handle, |s| s.staged_move == mv).await.can_submit());
}

#[tokio::test(start_paused = true)]
async fn test_incomplete_move_is_not_submitted() {
    let (gateway, handle) = start();
    handle.select_player(PlayerId(0)).await.unwrap();
    handle.edit_move(CommandEdit::new("2B")).await.unwrap();

    let result = handle.submit_move().await;
    assert_eq!(result, Err(SessionError::Rejected(SubmitRejected::Incomplete)));

    sleep_ms(100).await;
    assert!(gateway.submits().is_empty());
    assert_eq!(handle.snapshot().phase, SessionPhase::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_submit_without_player_is_rejected() {
    let (gateway, handle) = start();
    handle.select_player(PlayerId(0)).await.unwrap();
    handle.edit_move(CommandEdit::new("2B4")).await.unwrap();
    handle.deselect_player().await.unwrap();

    let result = handle.submit_move().await;
    assert_eq!(result, Err(SessionError::Rejected(SubmitRejected::NoPlayer)));
    assert!(gateway.submits().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_successful_submit_clears_staged_move() {
    let (gateway, handle) = start();
    gateway.script_submit(SubmitScript::Reply(SubmitResponse {
        success: true,
        status: Some("Move played".to_string()),
        status_type: Some(Severity::Note),
    }));
    handle.select_player(PlayerId(1)).await.unwrap();
    handle.edit_move(CommandEdit::new("0e0")).await.unwrap();
    handle.submit_move().await.unwrap();

    let snapshot = wait_for(&handle, |s| s.staged_move.is_empty()).await;
    assert_eq!(snapshot.phase, SessionPhase::Idle);
    assert_eq!(snapshot.status.message, "Move played");

    let submits = gateway.submits();
    assert_eq!(submits.len(), 1);
    assert_eq!(submits[0].player, Some(PlayerId(1)));
    assert_eq!(submits[0].mv.source, SlotIndex::new(0).ok());
    assert_eq!(submits[0].mv.tile, Some(Tile::Ether));
    assert_eq!(submits[0].mv.dest, SlotIndex::new(0).ok());
}

#[tokio::test(start_paused = true)]
async fn test_rejected_submit_retains_staged_move() {
    let (gateway, handle) = start();
    gateway.script_submit(SubmitScript::Reply(SubmitResponse {
        success: false,
        status: Some("Not your turn".to_string()),
        status_type: Some(Severity::Error),
    }));
    handle.select_player(PlayerId(0)).await.unwrap();
    let staged = handle.edit_move(CommandEdit::new("1A3")).await.unwrap();
    handle.submit_move().await.unwrap();

    let snapshot = wait_for(&handle, |s| s.status.message == "Not your turn").await;
    assert_eq!(snapshot.phase, SessionPhase::Idle);
    assert_eq!(snapshot.status.severity, Severity::Error);
    assert_eq!(snapshot.staged_move, staged);
}

#[tokio::test(start_paused = true)]
async fn test_hanging_submit_times_out() {
    let (gateway, handle) = start();
    gateway.script_submit(SubmitScript::Hang);
    handle.select_player(PlayerId(0)).await.unwrap();
    let staged = handle.edit_move(CommandEdit::new("5C2")).await.unwrap();
    handle.submit_move().await.unwrap();

    sleep_ms(100).await;
    assert_eq!(handle.snapshot().phase, SessionPhase::AwaitingSubmitResponse);
    assert_eq!(
        handle.submit_move().await,
        Err(SessionError::Rejected(SubmitRejected::AlreadyPending))
    );
    assert_eq!(gateway.submits().len(), 1);

    sleep_ms(5000).await;
    let snapshot = handle.snapshot();
    assert_eq!(snapshot.phase, SessionPhase::Idle);
    assert_eq!(snapshot.staged_move, staged);
    assert!(snapshot.can_submit());

    // Retrying sends a fresh request.
    handle.submit_move().await.unwrap();
    let snapshot = wait_for(&handle, |s| s.staged_move.is_empty()).await;
    assert_eq!(snapshot.phase, SessionPhase::Idle);
    assert_eq!(gateway.submits().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_deselect_keeps_staged_move() {
    let (_gateway, handle) = start();
    handle.select_player(PlayerId(0)).await.unwrap();
    let staged = handle.edit_move(CommandEdit::new("3D1")).await.unwrap();
    handle.deselect_player().await.unwrap();
    handle.select_player(PlayerId(1)).await.unwrap();

    assert_eq!(handle.snapshot().staged_move, staged);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_closes_session() {
    let (gateway, handle) = start();
    handle.select_player(PlayerId(0)).await.unwrap();
    handle.shutdown().await.unwrap();

    assert_eq!(handle.select_player(PlayerId(1)).await, Err(SessionError::Closed));
    sleep_ms(3000).await;
    assert_eq!(gateway.fetches().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_edit_without_player_is_refused() {
    let (_gateway, handle) = start();

    let result = handle.edit_move(CommandEdit::new("2B4")).await;
    assert_eq!(
        result,
        Err(SessionError::EditRejected(EditRejected {
            phase: SessionPhase::NoPlayerSelected,
        }))
    );
    assert!(handle.snapshot().staged_move.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_edit_while_awaiting_submit_is_refused() {
    let (gateway, handle) = start();
    gateway.script_submit(SubmitScript::Delayed(500, SubmitResponse::new(true)));
    handle.select_player(PlayerId(0)).await.unwrap();
    handle.edit_move(CommandEdit::new("2B4")).await.unwrap();
    handle.submit_move().await.unwrap();

    let snapshot = handle.snapshot();
    assert_eq!(snapshot.phase, SessionPhase::AwaitingSubmitResponse);
    assert!(snapshot.input_disabled());

    let result = handle.edit_move(CommandEdit::new("3C1")).await;
    assert_eq!(
        result,
        Err(SessionError::EditRejected(EditRejected {
            phase: SessionPhase::AwaitingSubmitResponse,
        }))
    );
    assert_eq!(handle.snapshot().staged_move, tiledraft::decode("2B4"));

    let snapshot = wait_for(&handle, |s| s.phase == SessionPhase::Idle).await;
    assert!(snapshot.staged_move.is_empty());
    assert!(!snapshot.input_disabled());
    let mv = handle.edit_move(CommandEdit::new("3C1")).await.unwrap();
    assert_eq!(mv, tiledraft::decode("3C1"));
}

#[tokio::test(start_paused = true)]
async fn test_crashed_submit_ends_pending_state() {
    let (gateway, handle) = start();
    gateway.script_submit(SubmitScript::Panic);
    handle.select_player(PlayerId(0)).await.unwrap();
    let staged = handle.edit_move(CommandEdit::new("2B4")).await.unwrap();
    handle.submit_move().await.unwrap();

    let snapshot = wait_for(&handle, |s| s.phase == SessionPhase::Idle).await;
    assert_eq!(snapshot.staged_move, staged);
    assert_eq!(snapshot.status.severity, Severity::Error);

    handle.submit_move().await.unwrap();
    wait_for(&handle, |s| s.staged_move.is_empty()).await;
    assert_eq!(gateway.submits().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_polling_flag_follows_timer() {
    let (_gateway, handle) = start();
    assert!(!handle.snapshot().polling_active);

    handle.select_player(PlayerId(0)).await.unwrap();
    assert!(handle.snapshot().polling_active);
    handle.select_player(PlayerId(1)).await.unwrap();
    assert!(handle.snapshot().polling_active);

    handle.deselect_player().await.unwrap();
    assert!(!handle.snapshot().polling_active);
}
