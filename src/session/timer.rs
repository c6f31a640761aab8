//! Poll timer owned by the session driver.

use crate::moves::PlayerId;
use std::time::Duration;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tracing::{debug, instrument};

/// Repeating poll timer for one selected player.
///
/// The timer lives exactly as long as this value. The driver holds at most
/// one, so replacing or dropping it is the only way polling stops.
#[derive(Debug)]
pub struct PollTimer {
    player: PlayerId,
    interval: Interval,
}

impl PollTimer {
    /// Starts a timer whose first tick is one `period` from now.
    #[instrument]
    pub fn start(player: PlayerId, period: Duration) -> Self {
        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        debug!("Poll timer started");
        Self { player, interval }
    }

    /// The player this timer polls for.
    pub fn player(&self) -> PlayerId {
        self.player
    }

    /// Waits for the next tick.
    pub async fn tick(&mut self) -> PlayerId {
        self.interval.tick().await;
        self.player
    }
}

impl Drop for PollTimer {
    fn drop(&mut self) {
        debug!(player = %self.player, "Poll timer stopped");
    }
}

/// Waits for the next tick of `timer`, or forever when there is none.
pub(crate) async fn next_tick(timer: &mut Option<PollTimer>) -> PlayerId {
    match timer {
        Some(timer) => timer.tick().await,
        None => std::future::pending().await,
    }
}
