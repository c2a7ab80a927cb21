//! Elapsed-time bookkeeping for diagnostic lines.

use std::time::{Duration, Instant};

/// Tracks time since the start of a call and since the previous lap.
#[derive(Debug, Clone, Copy)]
pub struct Stopwatch {
    started: Instant,
    last: Instant,
}

impl Stopwatch {
    pub fn start() -> Self {
        let now = Instant::now();
        Self {
            started: now,
            last: now,
        }
    }

    /// Time since the previous lap (or the start), then resets the lap mark.
    pub fn lap(&mut self) -> Duration {
        let now = Instant::now();
        let lap = now.duration_since(self.last);
        self.last = now;
        lap
    }

    /// Time since the start.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Time since the previous lap, without resetting it.
    pub fn since_lap(&self) -> Duration {
        self.last.elapsed()
    }
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::start()
    }
}

/// Seconds with millisecond precision, e.g. `1.204 sec`.
pub fn format_secs(duration: Duration) -> String {
    format!("{:.3} sec", duration.as_secs_f64())
}
