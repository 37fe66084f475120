use std::time::Duration;

use tokio::time::{Interval, MissedTickBehavior, interval};

const TICK: Duration = Duration::from_secs(1);

/// Owned handle for the one-second countdown tick.
///
/// Dropping the handle cancels the tick; there is no global timer state.
#[derive(Debug)]
pub struct AttemptTimer {
    interval: Interval,
}

impl AttemptTimer {
    /// Arm a new one-second tick. The first tick completes immediately.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn start() -> Self {
        let mut interval = interval(TICK);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { interval }
    }

    /// Wait for the next tick.
    pub async fn tick(&mut self) {
        self.interval.tick().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn ticks_once_per_second() {
        let mut timer = AttemptTimer::start();
        let started = Instant::now();

        timer.tick().await;
        assert_eq!(started.elapsed(), Duration::ZERO);

        timer.tick().await;
        timer.tick().await;
        assert_eq!(started.elapsed(), Duration::from_secs(2));
    }
}
