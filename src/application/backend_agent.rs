//! Backend agents: one per configured backend.
//!
//! An agent acquires an answer through its strategy and, when the backend has
//! an instruction and a chat model is available, relays that answer through
//! the chat model under the instruction. Without a relay the acquired text
//! (or the rendered no-answer / error text) is yielded as a single chunk.

use futures::stream::{self, BoxStream, StreamExt};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::domain::BackendDescriptor;
use crate::ports::{AcquisitionStrategy, ChatModel, ChunkStream, CompletionRequest, MessageRole};

pub struct BackendAgent {
    strategy: Arc<dyn AcquisitionStrategy>,
    relay: Option<Arc<dyn ChatModel>>,
}

impl BackendAgent {
    pub fn new(strategy: Arc<dyn AcquisitionStrategy>) -> Self {
        Self {
            strategy,
            relay: None,
        }
    }

    /// Relays answers through `model` for backends that carry an instruction.
    pub fn with_relay(mut self, model: Arc<dyn ChatModel>) -> Self {
        self.relay = Some(model);
        self
    }

    pub fn backend(&self) -> &BackendDescriptor {
        self.strategy.backend()
    }

    pub fn key(&self) -> &str {
        self.backend().key()
    }

    pub fn label(&self) -> &str {
        self.backend().label()
    }

    /// Asks the backend and streams the reply text.
    pub async fn stream(&self, message: &str) -> BoxStream<'static, String> {
        let outcome = self.strategy.acquire(message).await;

        let relay = match (outcome.answer(), &self.relay, self.backend().instruction()) {
            (Some(answer), Some(model), Some(instruction)) => {
                Some((answer.to_string(), Arc::clone(model), instruction.to_string()))
            }
            _ => None,
        };
        let Some((answer, model, instruction)) = relay else {
            let text = outcome.render(self.label());
            return stream::once(async move { text }).boxed();
        };

        let request = CompletionRequest::new()
            .with_system_prompt(instruction)
            .with_message(MessageRole::User, relay_prompt(message, &answer));

        match model.stream_complete(request).await {
            Ok(chunks) => relay_or_fallback(chunks, answer, self.label().to_string()),
            Err(err) => {
                warn!(
                    backend = self.label(),
                    error = %err,
                    "relay unavailable, returning raw answer"
                );
                stream::once(async move { answer }).boxed()
            }
        }
    }

    /// Asks the backend and returns the whole reply.
    pub async fn respond(&self, message: &str) -> String {
        let reply: String = self.stream(message).await.collect::<Vec<_>>().await.concat();
        debug!(backend = self.label(), length = reply.chars().count(), "response collected");
        reply
    }
}

/// Relay deltas, or `answer` when the relay ends without producing any text.
fn relay_or_fallback(
    chunks: ChunkStream,
    answer: String,
    label: String,
) -> BoxStream<'static, String> {
    let deltas = chunks
        .filter_map(move |chunk| {
            let label = label.clone();
            async move {
                match chunk {
                    Ok(chunk) if chunk.is_final() => {
                        debug!(
                            backend = %label,
                            finish_reason = ?chunk.finish_reason,
                            "relay finished"
                        );
                        (!chunk.delta.is_empty()).then_some(chunk.delta)
                    }
                    Ok(chunk) if !chunk.delta.is_empty() => Some(chunk.delta),
                    Ok(_) => None,
                    Err(err) => {
                        warn!(backend = %label, error = %err, "relay chunk dropped");
                        None
                    }
                }
            }
        })
        .boxed();

    stream::unfold((Some(deltas), Some(answer)), |(deltas, fallback)| async move {
        let mut deltas = deltas?;
        match deltas.next().await {
            Some(delta) => Some((delta, (Some(deltas), None))),
            None => fallback.map(|answer| (answer, (None, None))),
        }
    })
    .boxed()
}

/// User turn handed to the relay model.
fn relay_prompt(question: &str, answer: &str) -> String {
    format!("Pertanyaan: {}\n\nJawaban dari sistem:\n{}", question, answer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::{MockChatModel, MockError};
    use crate::adapters::testing::MockStrategy;
    use crate::domain::{Acquisition, AcquisitionError};

    fn agent_with(
        outcome: Acquisition,
        instruction: Option<&str>,
    ) -> (BackendAgent, MockStrategy) {
        let mut backend = BackendDescriptor::direct("aima_agent", "http://aima.test");
        if let Some(instruction) = instruction {
            backend = backend.with_instruction(instruction);
        }
        let strategy = MockStrategy::new(backend, outcome);
        (BackendAgent::new(Arc::new(strategy.clone())), strategy)
    }

    #[tokio::test]
    async fn raw_answer_without_relay() {
        let (agent, strategy) = agent_with(Acquisition::Answer("Kargo BBM".into()), None);

        assert_eq!(agent.respond("Jenis kargo?").await, "Kargo BBM");
        assert_eq!(strategy.messages(), vec!["Jenis kargo?".to_string()]);
    }

    #[tokio::test]
    async fn answer_is_relayed_under_instruction() {
        let model = MockChatModel::new().with_response("Kargo yang diangkut adalah BBM.");
        let (agent, _) = agent_with(Acquisition::Answer("BBM".into()), Some("Jawab singkat."));
        let agent = agent.with_relay(Arc::new(model.clone()));

        assert_eq!(agent.respond("Jenis kargo?").await, "Kargo yang diangkut adalah BBM.");

        let calls = model.get_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].system_prompt.as_deref(), Some("Jawab singkat."));
        let user_turn = calls[0].last_user_message().unwrap();
        assert!(user_turn.contains("Jenis kargo?"));
        assert!(user_turn.contains("BBM"));
    }

    #[tokio::test]
    async fn relay_streams_in_chunks() {
        let model = MockChatModel::new().with_response("satu dua tiga");
        let (agent, _) = agent_with(Acquisition::Answer("x".into()), Some("i"));
        let agent = agent.with_relay(Arc::new(model));

        let chunks: Vec<String> = agent.stream("q").await.collect().await;
        assert_eq!(chunks, vec!["satu ", "dua ", "tiga"]);
    }

    #[tokio::test]
    async fn failures_are_not_relayed() {
        let model = MockChatModel::new();
        let failed = Acquisition::Failed(AcquisitionError::Timeout { timeout_secs: 40 });
        let (agent, _) = agent_with(failed, Some("i"));
        let agent = agent.with_relay(Arc::new(model.clone()));

        assert_eq!(
            agent.respond("q").await,
            "Error accessing AIMA: request timed out after 40s"
        );
        assert_eq!(model.call_count(), 0);
    }

    #[tokio::test]
    async fn no_answer_renders_sentinel() {
        let (agent, _) = agent_with(Acquisition::NoAnswer, None);
        assert_eq!(
            agent.respond("q").await,
            "AIMA tidak merespons dalam waktu yang ditentukan."
        );
    }

    #[tokio::test]
    async fn relay_failure_falls_back_to_raw_answer() {
        let model = MockChatModel::new().with_error(MockError::AuthenticationFailed);
        let (agent, _) = agent_with(Acquisition::Answer("BBM".into()), Some("i"));
        let agent = agent.with_relay(Arc::new(model));

        assert_eq!(agent.respond("q").await, "BBM");
    }

    #[tokio::test]
    async fn relay_failing_before_content_falls_back_to_raw_answer() {
        let model = MockChatModel::new().with_broken_stream(MockError::Network {
            message: "connection reset".to_string(),
        });
        let (agent, _) = agent_with(Acquisition::Answer("BBM dan LPG".into()), Some("i"));
        let agent = agent.with_relay(Arc::new(model));

        let chunks: Vec<String> = agent.stream("q").await.collect().await;
        assert_eq!(chunks, vec!["BBM dan LPG"]);
    }
}
