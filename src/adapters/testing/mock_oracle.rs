//! Scripted classification oracle.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::ports::{AIError, ClassificationOracle};

/// Replies with queued texts (or errors) in order.
#[derive(Debug, Clone, Default)]
pub struct MockOracle {
    replies: Arc<Mutex<VecDeque<Result<String, AIError>>>>,
    queries: Arc<Mutex<Vec<String>>>,
}

impl MockOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reply(self, reply: impl Into<String>) -> Self {
        self.replies.lock().unwrap().push_back(Ok(reply.into()));
        self
    }

    pub fn with_error(self, error: AIError) -> Self {
        self.replies.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl ClassificationOracle for MockOracle {
    async fn classify(&self, query: &str) -> Result<String, AIError> {
        self.queries.lock().unwrap().push(query.to_string());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AIError::unavailable("no scripted reply")))
    }
}
