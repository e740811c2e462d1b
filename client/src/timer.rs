//! Per-client countdown driver

use crate::game::{Game, TickOutcome};
use crate::role::Role;
use std::time::Duration;
use tokio::time::{interval, Interval, MissedTickBehavior};

pub const DEFAULT_TICK: Duration = Duration::from_secs(1);

pub struct TimerDriver {
    period: Duration,
}

impl TimerDriver {
    pub fn new(period: Duration) -> Self {
        Self { period }
    }

    /// Interval for the client loop. The first, immediate tick is already
    /// consumed so the first decrement happens one period after start-up.
    pub async fn start(&self) -> Interval {
        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        ticker.tick().await;
        ticker
    }
}

impl Default for TimerDriver {
    fn default() -> Self {
        Self::new(DEFAULT_TICK)
    }
}

/// Applies one tick. Only the holder of the running clock may end the match
/// on timeout; everybody else just counts down for display.
pub fn drive(game: &mut Game, role: Option<Role>) -> TickOutcome {
    let owns_clock = role
        .and_then(Role::side)
        .is_some_and(|side| side == game.state().current_turn);

    if owns_clock {
        game.tick()
    } else {
        game.tick_passive()
    }
}
