use std::time::{Duration, Instant};

pub const TIMER_HZ: u32 = 60;

/// Wall clock for the delay and sound timers. Counts whole 60 Hz periods,
/// independent of how many instructions ran in between.
#[derive(Debug)]
pub struct TimerClock {
    period: Duration,
    last: Instant,
}

impl TimerClock {
    pub fn new(now: Instant) -> Self {
        TimerClock {
            period: Duration::from_secs(1) / TIMER_HZ,
            last: now,
        }
    }

    /// Number of ticks due since the previous call. Remainders carry over.
    pub fn ticks(&mut self, now: Instant) -> u32 {
        let elapsed = now.saturating_duration_since(self.last);
        let due = (elapsed.as_nanos() / self.period.as_nanos()) as u32;
        self.last += self.period * due;
        due
    }
}
