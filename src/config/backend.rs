//! Backend configuration

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;

use super::error::ValidationError;
use crate::domain::{BackendDescriptor, ConversationAccess, StrategyKind};

/// One backend, keyed by its backend key in `AppConfig::backends`
///
/// For `direct` backends `url` is the answer endpoint. For `poll` and
/// `stream` backends it is the Direct Line conversations endpoint, and
/// `token_url` plus `secret` are required.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    pub strategy: StrategyKind,

    pub url: String,

    pub token_url: Option<String>,

    pub secret: Option<Secret<String>>,

    /// Display label; derived from the key when absent
    pub label: Option<String>,

    /// System prompt used when relaying this backend's answers
    pub instruction: Option<String>,

    /// One-line summary shown in the CLI banner
    pub description: Option<String>,
}

impl BackendConfig {
    pub fn validate(&self, key: &str) -> Result<(), ValidationError> {
        check_url(key, &self.url)?;

        if self.strategy.needs_handshake() {
            let token_url = self
                .token_url
                .as_deref()
                .ok_or_else(|| missing(key, "token_url"))?;
            check_url(key, token_url)?;

            let has_secret = self
                .secret
                .as_ref()
                .is_some_and(|s| !s.expose_secret().is_empty());
            if !has_secret {
                return Err(missing(key, "secret"));
            }
        }
        Ok(())
    }

    /// Builds the immutable descriptor for backend `key`.
    pub fn to_descriptor(&self, key: &str) -> Result<BackendDescriptor, ValidationError> {
        self.validate(key)?;

        let mut descriptor = match self.strategy {
            StrategyKind::Direct => BackendDescriptor::direct(key, self.url.clone()),
            StrategyKind::Poll => BackendDescriptor::polling(key, self.conversation_access()),
            StrategyKind::Stream => BackendDescriptor::streaming(key, self.conversation_access()),
        };
        if let Some(label) = &self.label {
            descriptor = descriptor.with_label(label.clone());
        }
        if let Some(description) = &self.description {
            descriptor = descriptor.with_description(description.clone());
        }
        if let Some(instruction) = &self.instruction {
            descriptor = descriptor.with_instruction(instruction.clone());
        }
        Ok(descriptor)
    }

    /// Only called after `validate`, which guarantees both fields.
    fn conversation_access(&self) -> ConversationAccess {
        ConversationAccess::new(
            self.token_url.clone().unwrap_or_default(),
            self.url.clone(),
            self.secret
                .as_ref()
                .map(|s| s.expose_secret().clone())
                .unwrap_or_default(),
        )
    }
}

fn missing(key: &str, field: &'static str) -> ValidationError {
    ValidationError::BackendMissing {
        backend: key.to_string(),
        field,
    }
}

fn check_url(key: &str, url: &str) -> Result<(), ValidationError> {
    if url.is_empty() {
        return Err(missing(key, "url"));
    }
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ValidationError::InvalidBackendUrl {
            backend: key.to_string(),
            url: url.to_string(),
        });
    }
    Ok(())
}
