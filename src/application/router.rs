//! Router: classify a user query, then dispatch it to one backend.
//!
//! The oracle's reply must be an `{agent, message}` record naming a
//! registered backend. A reply that cannot be read, or that names an unknown
//! backend, ends the turn with a [`RoutingError`] and no backend is contacted.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use tracing::{info, warn};

use super::backend_agent::BackendAgent;
use super::registry::BackendRegistry;
use crate::domain::{format_secs, RoutingDecision, RoutingError, Stopwatch};
use crate::ports::ClassificationOracle;

/// A routed turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteOutcome {
    pub decision: RoutingDecision,
    /// Display label of the backend that answered.
    pub label: String,
    /// Full reply text, as streamed to the sink.
    pub reply: String,
    pub elapsed: Duration,
}

pub struct Router {
    oracle: Arc<dyn ClassificationOracle>,
    registry: BackendRegistry,
}

impl Router {
    pub fn new(oracle: Arc<dyn ClassificationOracle>, registry: BackendRegistry) -> Self {
        Self { oracle, registry }
    }

    pub fn registry(&self) -> &BackendRegistry {
        &self.registry
    }

    /// Asks the oracle which backend should handle `user_input`.
    pub async fn decide(&self, user_input: &str) -> Result<RoutingDecision, RoutingError> {
        let raw = self
            .oracle
            .classify(user_input)
            .await
            .map_err(|err| RoutingError::Oracle(err.to_string()))?;

        RoutingDecision::from_reply(&raw).map_err(|err| {
            warn!(error = %err, raw = %raw, "routing reply rejected");
            err
        })
    }

    /// Looks up the backend named by `decision`.
    pub fn resolve(&self, decision: &RoutingDecision) -> Result<&Arc<BackendAgent>, RoutingError> {
        self.registry
            .get(&decision.agent)
            .ok_or_else(|| RoutingError::UnknownAgent {
                agent: Some(decision.agent.clone()),
            })
    }

    /// Routes one user query, passing reply chunks to `sink` as they arrive.
    pub async fn route<F>(
        &self,
        user_input: &str,
        mut sink: F,
    ) -> Result<RouteOutcome, RoutingError>
    where
        F: FnMut(&str) + Send,
    {
        let watch = Stopwatch::start();

        let decision = self.decide(user_input).await?;
        let agent = self.resolve(&decision).map_err(|err| {
            warn!(agent = %decision.agent, "routing reply names an unknown agent");
            err
        })?;
        info!(backend = agent.label(), "query routed");

        let mut reply = String::new();
        let mut chunks = agent.stream(&decision.message).await;
        while let Some(chunk) = chunks.next().await {
            sink(&chunk);
            reply.push_str(&chunk);
        }

        let elapsed = watch.elapsed();
        info!(
            backend = agent.label(),
            total = %format_secs(elapsed),
            total_ms = elapsed.as_millis() as u64,
            "route completed"
        );

        Ok(RouteOutcome {
            label: agent.label().to_string(),
            decision,
            reply,
            elapsed,
        })
    }

    /// Routes one query and returns the whole reply.
    pub async fn route_collect(&self, user_input: &str) -> Result<RouteOutcome, RoutingError> {
        self.route(user_input, |_| {}).await
    }
}
