//! Direct Line conversation sessions.
//!
//! A session is created by the handshake at the start of one `ask` call and
//! dropped when that call returns. It is neither `Clone` nor shared, so a
//! session cannot leak into the handling of a second user message.

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;

/// Body of the token endpoint response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenGrant {
    pub token: String,
}

/// Body of the conversation-create response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationStart {
    pub conversation_id: String,
    #[serde(default)]
    pub stream_url: Option<String>,
}

/// Authenticated context for a single exchange with a handshake backend.
#[derive(Debug)]
pub struct ConversationSession {
    token: Secret<String>,
    conversation_id: String,
    stream_url: Option<String>,
}

impl ConversationSession {
    /// Creates a session from a bearer token and the conversation-create response.
    pub fn new(token: impl Into<String>, start: ConversationStart) -> Self {
        Self {
            token: Secret::new(token.into()),
            conversation_id: start.conversation_id,
            stream_url: start.stream_url,
        }
    }

    /// Bearer token for this conversation.
    pub fn token(&self) -> &str {
        self.token.expose_secret()
    }

    pub fn conversation_id(&self) -> &str {
        &self.conversation_id
    }

    /// Push-channel URL (only returned for streaming conversations).
    pub fn stream_url(&self) -> Option<&str> {
        self.stream_url.as_deref()
    }
}
