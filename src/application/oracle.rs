//! Classification oracle backed by a chat model.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use crate::ports::{AIError, ChatModel, ClassificationOracle, CompletionRequest, MessageRole};

/// Runs the user query under the orchestrator instruction and returns the
/// model's raw reply.
pub struct ChatOracle {
    model: Arc<dyn ChatModel>,
    instruction: String,
}

impl ChatOracle {
    pub fn new(model: Arc<dyn ChatModel>, instruction: impl Into<String>) -> Self {
        Self {
            model,
            instruction: instruction.into(),
        }
    }
}

#[async_trait]
impl ClassificationOracle for ChatOracle {
    async fn classify(&self, query: &str) -> Result<String, AIError> {
        let request = CompletionRequest::new()
            .with_system_prompt(self.instruction.clone())
            .with_message(MessageRole::User, query);
        let response = self.model.complete(request).await?;
        let provider = self.model.provider_info();
        debug!(
            provider = %provider.name,
            model = %response.model,
            finish_reason = ?response.finish_reason,
            prompt_tokens = response.usage.prompt_tokens,
            completion_tokens = response.usage.completion_tokens,
            "oracle replied"
        );
        Ok(response.content)
    }
}
