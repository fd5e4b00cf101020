//! Fixed-step clock driving the simulation at a constant tick rate.

use std::time::Duration;

/// Accumulates elapsed display time and converts it into whole simulation
/// steps.
///
/// When rendering falls behind, at most `max_frame_skip` steps run per frame;
/// the remaining debt stays in the accumulator and is paid off on later
/// frames, so the simulation catches up instead of spiralling.
#[derive(Debug, Clone)]
pub(crate) struct GameClock {
    tick: Duration,
    max_frame_skip: u32,
    accumulator: Duration,
}

impl GameClock {
    pub(crate) const fn new(tick: Duration, max_frame_skip: u32) -> Self {
        Self {
            tick,
            max_frame_skip,
            accumulator: Duration::ZERO,
        }
    }

    /// Banks the elapsed time and returns how many fixed steps to execute.
    pub(crate) fn advance(&mut self, elapsed: Duration) -> u32 {
        if self.tick.is_zero() {
            return 0;
        }
        self.accumulator += elapsed;

        let mut steps = 0;
        while self.accumulator >= self.tick && steps < self.max_frame_skip {
            self.accumulator -= self.tick;
            steps += 1;
        }
        steps
    }
}
