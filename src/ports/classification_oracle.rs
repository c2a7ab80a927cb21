//! Classification Oracle Port - decides which backend a query belongs to.

use async_trait::async_trait;

use super::AIError;

#[async_trait]
pub trait ClassificationOracle: Send + Sync {
    /// Returns the oracle's raw reply, expected to be an `{agent, message}` record.
    async fn classify(&self, query: &str) -> Result<String, AIError>;
}
