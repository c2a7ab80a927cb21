//! Sleeper Port - timer used between poll attempts.
//!
//! Injected so the poller can be driven without real wall-clock waits.

use async_trait::async_trait;
use std::time::Duration;

#[async_trait]
pub trait Sleeper: Send + Sync {
    /// Suspends the calling task for `duration`.
    async fn sleep(&self, duration: Duration);
}
