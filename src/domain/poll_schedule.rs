//! Polling schedule: attempt bound plus the delay taken before each attempt.

use serde::Deserialize;
use std::time::Duration;

/// Default backoff table, in seconds, for attempts 1..=6.
pub const DEFAULT_BACKOFF_SECS: [u64; 6] = [2, 3, 5, 7, 10, 15];
/// Delay for attempts past the end of the backoff table.
pub const DEFAULT_FLAT_DELAY_SECS: u64 = 15;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 20;

/// Which delay table the poller follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PollMode {
    /// Walk the backoff table, then fall back to the flat delay.
    #[default]
    Backoff,
    /// Flat delay before every attempt.
    LegacyFlat,
}

/// Bounded retry schedule for the activities poller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollSchedule {
    mode: PollMode,
    backoff: Vec<Duration>,
    flat: Duration,
    max_attempts: u32,
}

impl Default for PollSchedule {
    fn default() -> Self {
        Self {
            mode: PollMode::Backoff,
            backoff: DEFAULT_BACKOFF_SECS.iter().copied().map(Duration::from_secs).collect(),
            flat: Duration::from_secs(DEFAULT_FLAT_DELAY_SECS),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl PollSchedule {
    /// Schedule with the flat delay before every attempt.
    pub fn legacy() -> Self {
        Self::default().with_mode(PollMode::LegacyFlat)
    }

    pub fn with_mode(mut self, mode: PollMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_backoff(mut self, backoff: impl IntoIterator<Item = Duration>) -> Self {
        self.backoff = backoff.into_iter().collect();
        self
    }

    pub fn with_flat_delay(mut self, flat: Duration) -> Self {
        self.flat = flat;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay taken before the given 1-based attempt.
    pub fn delay_before(&self, attempt: u32) -> Duration {
        if self.mode == PollMode::LegacyFlat {
            return self.flat;
        }
        attempt
            .checked_sub(1)
            .and_then(|idx| self.backoff.get(idx as usize))
            .copied()
            .unwrap_or(self.flat)
    }

    /// `(attempt, delay)` pairs for every attempt the poller may make.
    pub fn attempts(&self) -> impl Iterator<Item = (u32, Duration)> + '_ {
        (1..=self.max_attempts).map(move |attempt| (attempt, self.delay_before(attempt)))
    }

    /// Upper bound on time spent sleeping when no answer ever arrives.
    pub fn total_delay(&self) -> Duration {
        self.attempts().map(|(_, delay)| delay).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn secs(values: &[u64]) -> Vec<Duration> {
        values.iter().copied().map(Duration::from_secs).collect()
    }

    #[test]
    fn default_schedule_walks_table_then_flat() {
        let schedule = PollSchedule::default();
        let delays: Vec<Duration> = schedule.attempts().map(|(_, d)| d).collect();

        assert_eq!(delays.len(), 20);
        assert_eq!(&delays[..6], secs(&[2, 3, 5, 7, 10, 15]).as_slice());
        assert!(delays[6..].iter().all(|d| *d == Duration::from_secs(15)));
    }

    #[test]
    fn legacy_schedule_is_flat() {
        let schedule = PollSchedule::legacy();
        assert!(schedule.attempts().all(|(_, d)| d == Duration::from_secs(15)));
        assert_eq!(schedule.total_delay(), Duration::from_secs(300));
    }

    #[test]
    fn default_total_delay() {
        // 42s of backoff + 14 * 15s flat
        assert_eq!(PollSchedule::default().total_delay(), Duration::from_secs(42 + 210));
    }

    #[test]
    fn zero_attempt_schedule_is_empty() {
        let schedule = PollSchedule::default().with_max_attempts(0);
        assert_eq!(schedule.attempts().count(), 0);
    }

    proptest! {
        #[test]
        fn attempts_past_table_use_flat_delay(attempt in 7u32..1000) {
            let schedule = PollSchedule::default();
            prop_assert_eq!(schedule.delay_before(attempt), Duration::from_secs(15));
        }

        #[test]
        fn custom_table_is_respected(
            table in prop::collection::vec(1u64..60, 0..10),
            flat in 1u64..60,
        ) {
            let schedule = PollSchedule::default()
                .with_backoff(secs(&table))
                .with_flat_delay(Duration::from_secs(flat))
                .with_max_attempts(12);
            for (attempt, delay) in schedule.attempts() {
                let expected = table.get(attempt as usize - 1).copied().unwrap_or(flat);
                prop_assert_eq!(delay, Duration::from_secs(expected));
            }
        }
    }
}
