//! Client session: player selection, staged move, polling and submission.

mod controller;
mod state;
mod timer;

pub use controller::{SessionConfig, SessionController, SessionError, SessionHandle};
pub use state::{
    EditRejected, FetchTicket, SessionPhase, SessionSnapshot, SessionState, SubmitRejected,
    TimerChange, CONTACTING_STATE_TEXT, INITIAL_STATE_TEXT, SELECT_PLAYER_PROMPT,
};
pub use timer::PollTimer;
