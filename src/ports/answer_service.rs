//! Answer Service Port - single request/response backends.
//!
//! Direct-response backends take one POST with a single-turn chat payload and
//! reply synchronously with a JSON body that embeds the answer.

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

use crate::domain::AcquisitionError;

/// One turn of the direct-response payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectMessage {
    pub role: &'static str,
    pub content: String,
}

/// `{"messages": [{"role": "user", "content": ...}]}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectRequest {
    pub messages: Vec<DirectMessage>,
}

impl DirectRequest {
    /// Single-turn payload carrying the user's message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            messages: vec![DirectMessage {
                role: "user",
                content: content.into(),
            }],
        }
    }
}

/// Port for backends that answer in the response body.
#[async_trait]
pub trait AnswerService: Send + Sync {
    /// POSTs `request` to `url` and returns the decoded JSON body.
    ///
    /// `timeout` bounds the whole exchange. Non-success statuses are errors.
    async fn post(
        &self,
        url: &str,
        request: &DirectRequest,
        timeout: Duration,
    ) -> Result<serde_json::Value, AcquisitionError>;
}
