//! Backend descriptors.
//!
//! A [`BackendDescriptor`] identifies one externally hosted conversational
//! backend and how its answers are acquired. Descriptors are built once from
//! configuration and handed by value to the strategy that serves them.

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::fmt;

/// How answers are obtained from a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    /// One POST, answer embedded in the response body.
    Direct,
    /// Direct Line handshake, then poll the activities endpoint.
    Poll,
    /// Direct Line handshake, then read the activity stream.
    Stream,
}

impl StrategyKind {
    /// Returns true if the strategy needs a token / conversation handshake.
    pub fn needs_handshake(&self) -> bool {
        matches!(self, StrategyKind::Poll | StrategyKind::Stream)
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StrategyKind::Direct => "direct",
            StrategyKind::Poll => "poll",
            StrategyKind::Stream => "stream",
        };
        f.write_str(name)
    }
}

/// Endpoints and credentials of a handshake-style backend.
#[derive(Debug, Clone)]
pub struct ConversationAccess {
    /// Token endpoint, called with the backend secret.
    pub token_url: String,
    /// Conversations endpoint; activities live under `<base_url>/<id>/activities`.
    pub base_url: String,
    secret: Secret<String>,
}

impl ConversationAccess {
    /// Creates conversation access details.
    pub fn new(
        token_url: impl Into<String>,
        base_url: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        Self {
            token_url: token_url.into(),
            base_url: base_url.into(),
            secret: Secret::new(secret.into()),
        }
    }

    /// Exposes the backend secret (for the token request only).
    pub fn secret(&self) -> &str {
        self.secret.expose_secret()
    }

    /// URL of the activities collection for a conversation.
    pub fn activities_url(&self, conversation_id: &str) -> String {
        format!(
            "{}/{}/activities",
            self.base_url.trim_end_matches('/'),
            conversation_id
        )
    }
}

/// Where a backend lives, shaped by its strategy.
#[derive(Debug, Clone)]
pub enum BackendAccess {
    /// Single endpoint answering synchronously.
    Direct { url: String },
    /// Token + conversation endpoints.
    Conversation(ConversationAccess),
}

/// Immutable description of one conversational backend.
#[derive(Debug, Clone)]
pub struct BackendDescriptor {
    key: String,
    label: String,
    strategy: StrategyKind,
    access: BackendAccess,
    description: Option<String>,
    instruction: Option<String>,
}

impl BackendDescriptor {
    /// Describes a direct-response backend.
    pub fn direct(key: impl Into<String>, url: impl Into<String>) -> Self {
        Self::build(
            key.into(),
            StrategyKind::Direct,
            BackendAccess::Direct { url: url.into() },
        )
    }

    /// Describes a Direct Line backend answered by polling.
    pub fn polling(key: impl Into<String>, access: ConversationAccess) -> Self {
        Self::build(key.into(), StrategyKind::Poll, BackendAccess::Conversation(access))
    }

    /// Describes a Direct Line backend answered over the activity stream.
    pub fn streaming(key: impl Into<String>, access: ConversationAccess) -> Self {
        Self::build(
            key.into(),
            StrategyKind::Stream,
            BackendAccess::Conversation(access),
        )
    }

    fn build(key: String, strategy: StrategyKind, access: BackendAccess) -> Self {
        let label = default_label(&key);
        Self {
            key,
            label,
            strategy,
            access,
            description: None,
            instruction: None,
        }
    }

    /// Overrides the label used in diagnostics and user-facing messages.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Sets the human-readable description shown by the CLI.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the instruction used when relaying answers through the chat model.
    pub fn with_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.instruction = Some(instruction.into());
        self
    }

    /// Routing key (e.g. `gino_agent`).
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Short upper-case name (e.g. `GINO`).
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn strategy(&self) -> StrategyKind {
        self.strategy
    }

    pub fn access(&self) -> &BackendAccess {
        &self.access
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn instruction(&self) -> Option<&str> {
        self.instruction.as_deref()
    }
}

/// `gino_agent` -> `GINO`
fn default_label(key: &str) -> String {
    let stem = key.strip_suffix("_agent").unwrap_or(key);
    stem.to_uppercase()
}
