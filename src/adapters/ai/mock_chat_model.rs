//! Mock Chat Model for testing.
//!
//! Returns queued completions in order and records every request, so the
//! oracle and the answer relay can be tested without calling a real
//! deployment.
//!
//! # Example
//!
//! ```ignore
//! let model = MockChatModel::new()
//!     .with_response("{'agent': 'gino_agent', 'message': 'hello'}");
//!
//! let response = model.complete(request).await?;
//! ```

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::ports::{
    AIError, ChatModel, ChunkStream, CompletionRequest, CompletionResponse, FinishReason,
    ProviderInfo, StreamChunk, TokenUsage,
};

/// A configured mock response.
#[derive(Debug, Clone)]
pub enum MockResponse {
    Success(String),
    Error(MockError),
    /// Streaming starts, then fails before any content.
    BrokenStream(MockError),
}

/// Mock error kinds. `AIError` is not `Clone`, so errors are queued as these.
#[derive(Debug, Clone)]
pub enum MockError {
    RateLimited { retry_after_secs: u32 },
    Unavailable { message: String },
    AuthenticationFailed,
    Network { message: String },
    Timeout { timeout_secs: u32 },
}

impl From<MockError> for AIError {
    fn from(err: MockError) -> Self {
        match err {
            MockError::RateLimited { retry_after_secs } => AIError::rate_limited(retry_after_secs),
            MockError::Unavailable { message } => AIError::unavailable(message),
            MockError::AuthenticationFailed => AIError::AuthenticationFailed,
            MockError::Network { message } => AIError::network(message),
            MockError::Timeout { timeout_secs } => AIError::Timeout { timeout_secs },
        }
    }
}

#[derive(Debug, Clone)]
pub struct MockChatModel {
    responses: Arc<Mutex<VecDeque<MockResponse>>>,
    info: ProviderInfo,
    calls: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl Default for MockChatModel {
    fn default() -> Self {
        Self::new()
    }
}

impl MockChatModel {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            info: ProviderInfo::new("mock", "mock-deployment"),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Adds a successful response to the queue.
    pub fn with_response(self, content: impl Into<String>) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(MockResponse::Success(content.into()));
        self
    }

    /// Adds an error response to the queue.
    pub fn with_error(self, error: MockError) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(MockResponse::Error(error));
        self
    }

    /// Adds a response whose stream opens and then fails on its first chunk.
    /// Non-streaming calls get the error directly.
    pub fn with_broken_stream(self, error: MockError) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(MockResponse::BrokenStream(error));
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn get_calls(&self) -> Vec<CompletionRequest> {
        self.calls.lock().unwrap().clone()
    }

    /// Next queued response, echoing the last user message once the queue is empty.
    fn next_response(&self, request: &CompletionRequest) -> MockResponse {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                MockResponse::Success(request.last_user_message().unwrap_or_default().to_string())
            })
    }
}

#[async_trait]
impl ChatModel for MockChatModel {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError> {
        let response = self.next_response(&request);
        self.calls.lock().unwrap().push(request);

        match response {
            MockResponse::Success(content) => Ok(CompletionResponse {
                content,
                usage: TokenUsage::new(10, 20),
                model: self.info.model.clone(),
                finish_reason: FinishReason::Stop,
            }),
            MockResponse::Error(err) | MockResponse::BrokenStream(err) => Err(err.into()),
        }
    }

    async fn stream_complete(&self, request: CompletionRequest) -> Result<ChunkStream, AIError> {
        let response = self.next_response(&request);
        self.calls.lock().unwrap().push(request);

        match response {
            MockResponse::Success(content) => {
                // Split on whitespace boundaries, keeping the separators.
                let mut pieces: Vec<Result<StreamChunk, AIError>> = content
                    .split_inclusive(' ')
                    .map(|piece| Ok(StreamChunk::content(piece)))
                    .collect();
                pieces.push(Ok(StreamChunk::final_chunk(
                    FinishReason::Stop,
                    Some(TokenUsage::new(10, 20)),
                )));
                Ok(Box::pin(stream::iter(pieces)))
            }
            MockResponse::BrokenStream(err) => {
                let failed: Result<StreamChunk, AIError> = Err(err.into());
                Ok(Box::pin(stream::iter(vec![failed])))
            }
            MockResponse::Error(err) => Err(err.into()),
        }
    }

    fn provider_info(&self) -> ProviderInfo {
        self.info.clone()
    }
}
