//! Scripted direct-response backend.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::domain::AcquisitionError;
use crate::ports::{AnswerService, DirectRequest};

/// A recorded POST.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerCall {
    pub url: String,
    pub request: DirectRequest,
    pub timeout: Duration,
}

/// Returns queued bodies (or errors) in order, then `{}`.
#[derive(Debug, Clone, Default)]
pub struct MockAnswerService {
    responses: Arc<Mutex<VecDeque<Result<serde_json::Value, AcquisitionError>>>>,
    calls: Arc<Mutex<Vec<AnswerCall>>>,
}

impl MockAnswerService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a successful JSON body.
    pub fn with_body(self, body: serde_json::Value) -> Self {
        self.responses.lock().unwrap().push_back(Ok(body));
        self
    }

    /// Queues a failure.
    pub fn with_error(self, error: AcquisitionError) -> Self {
        self.responses.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn calls(&self) -> Vec<AnswerCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl AnswerService for MockAnswerService {
    async fn post(
        &self,
        url: &str,
        request: &DirectRequest,
        timeout: Duration,
    ) -> Result<serde_json::Value, AcquisitionError> {
        self.calls.lock().unwrap().push(AnswerCall {
            url: url.to_string(),
            request: request.clone(),
            timeout,
        });
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(serde_json::json!({})))
    }
}
