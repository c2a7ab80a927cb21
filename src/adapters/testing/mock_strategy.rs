//! Scripted acquisition strategy.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::domain::{Acquisition, BackendDescriptor};
use crate::ports::AcquisitionStrategy;

/// Answers every message with the same outcome and records what it was asked.
#[derive(Debug, Clone)]
pub struct MockStrategy {
    backend: BackendDescriptor,
    outcome: Acquisition,
    messages: Arc<Mutex<Vec<String>>>,
}

impl MockStrategy {
    pub fn new(backend: BackendDescriptor, outcome: Acquisition) -> Self {
        Self {
            backend,
            outcome,
            messages: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Direct-style backend keyed `key` that answers `answer`.
    pub fn answering(key: &str, answer: &str) -> Self {
        Self::new(
            BackendDescriptor::direct(key, format!("http://{}.test", key)),
            Acquisition::Answer(answer.to_string()),
        )
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl AcquisitionStrategy for MockStrategy {
    fn backend(&self) -> &BackendDescriptor {
        &self.backend
    }

    async fn acquire(&self, message: &str) -> Acquisition {
        self.messages.lock().unwrap().push(message.to_string());
        self.outcome.clone()
    }
}
