//! Routing decisions produced from the classification oracle's reply.

mod record;

pub use record::{parse_record, LiteralValue, RecordError};

use serde_json::json;
use thiserror::Error;

/// Which backend a query goes to, and what to forward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingDecision {
    /// Backend key (e.g. `gino_agent`).
    pub agent: String,
    /// Restated message to forward to that backend.
    pub message: String,
}

impl RoutingDecision {
    pub fn new(agent: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            agent: agent.into(),
            message: message.into(),
        }
    }

    /// Reads the oracle reply as a `{agent, message}` record.
    ///
    /// A reply that is not a record at all, or lacks `message`, is a parse
    /// error. A record without a string `agent` is an unknown agent, since no
    /// configured backend can match it.
    pub fn from_reply(raw: &str) -> Result<Self, RoutingError> {
        let record = parse_record(raw).map_err(|err| RoutingError::Parse {
            raw: raw.to_string(),
            reason: err.to_string(),
        })?;

        let agent = match record.get("agent") {
            Some(LiteralValue::Str(agent)) => agent.clone(),
            other => {
                return Err(RoutingError::UnknownAgent {
                    agent: other.map(LiteralValue::to_text),
                })
            }
        };

        let message = match record.get("message") {
            Some(LiteralValue::Null) | None => {
                return Err(RoutingError::Parse {
                    raw: raw.to_string(),
                    reason: "missing 'message'".to_string(),
                })
            }
            Some(value) => value.to_text(),
        };

        Ok(Self { agent, message })
    }
}

/// Routing failures. These abort the turn before any backend is contacted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoutingError {
    /// The oracle reply is not a `{agent, message}` record.
    #[error("failed to parse routing reply: {reason}")]
    Parse { raw: String, reason: String },

    /// The record names a backend that is not configured.
    #[error("unknown agent: {}", agent.as_deref().unwrap_or("None"))]
    UnknownAgent { agent: Option<String> },

    /// The oracle itself could not be reached.
    #[error("classification oracle failed: {0}")]
    Oracle(String),
}

impl RoutingError {
    /// Structured error record reported to the caller.
    pub fn to_record(&self) -> serde_json::Value {
        match self {
            RoutingError::Parse { raw, .. } => json!({
                "Error": "[ORCHESTRATOR] Failed to parse JSON",
                "raw_response": raw,
            }),
            RoutingError::UnknownAgent { agent } => json!({
                "Error": "[ORCHESTRATOR] Unknown agent",
                "agent": agent,
            }),
            RoutingError::Oracle(reason) => json!({
                "Error": "[ORCHESTRATOR] Oracle unavailable",
                "reason": reason,
            }),
        }
    }
}
