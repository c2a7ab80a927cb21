//! Chat-completion client configuration

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::adapters::ai::{AzureOpenAIConfig, DEFAULT_API_VERSION, MAX_RETRIES};

/// Azure OpenAI deployment used by the oracle and for answer relay
#[derive(Debug, Clone, Deserialize)]
pub struct ChatConfig {
    /// Resource endpoint, e.g. `https://my-resource.openai.azure.com`
    #[serde(default)]
    pub endpoint: String,

    /// API key
    #[serde(default = "empty_secret")]
    pub api_key: Secret<String>,

    /// Deployment name
    #[serde(default)]
    pub deployment: String,

    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Maximum retries on transient failures
    #[serde(default = "default_retries")]
    pub max_retries: u32,
}

impl ChatConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.endpoint.is_empty() {
            return Err(ValidationError::MissingRequired("CHAT__ENDPOINT"));
        }
        if !self.endpoint.starts_with("http://") && !self.endpoint.starts_with("https://") {
            return Err(ValidationError::InvalidChatEndpoint);
        }
        if self.api_key.expose_secret().is_empty() {
            return Err(ValidationError::MissingRequired("CHAT__API_KEY"));
        }
        if self.deployment.is_empty() {
            return Err(ValidationError::MissingRequired("CHAT__DEPLOYMENT"));
        }
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout("chat.timeout_secs"));
        }
        if self.max_retries > MAX_RETRIES {
            return Err(ValidationError::TooManyRetries { max: MAX_RETRIES });
        }
        Ok(())
    }

    /// Adapter configuration for this deployment.
    pub fn to_adapter_config(&self) -> AzureOpenAIConfig {
        AzureOpenAIConfig::new(
            self.endpoint.clone(),
            self.api_key.expose_secret().clone(),
            self.deployment.clone(),
        )
        .with_api_version(self.api_version.clone())
        .with_timeout(self.timeout())
        .with_max_retries(self.max_retries)
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key: empty_secret(),
            deployment: String::new(),
            api_version: default_api_version(),
            timeout_secs: default_timeout(),
            max_retries: default_retries(),
        }
    }
}

fn empty_secret() -> Secret<String> {
    Secret::new(String::new())
}

fn default_api_version() -> String {
    DEFAULT_API_VERSION.to_string()
}

fn default_timeout() -> u64 {
    60
}

fn default_retries() -> u32 {
    3
}
