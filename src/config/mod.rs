//! Application configuration module
//!
//! This module provides type-safe configuration loading using the `config`
//! and `dotenvy` crates. Values come from an optional `maf-router.toml` file
//! and from environment variables with the `MAF_ROUTER` prefix; nested values
//! use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use maf_router::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! for (key, backend) in &config.backends {
//!     println!("{} via {}", key, backend.strategy);
//! }
//! ```

mod acquisition;
mod app;
mod backend;
mod chat;
mod error;

pub use acquisition::AcquisitionConfig;
pub use app::{AppSettings, OrchestratorConfig};
pub use backend::BackendConfig;
pub use chat::ChatConfig;
pub use error::{ConfigError, ValidationError};

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

use crate::domain::BackendDescriptor;

/// Default configuration file, read from the working directory when present
pub const CONFIG_FILE: &str = "maf-router.toml";

/// Root application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Process settings (log level)
    #[serde(default)]
    pub app: AppSettings,

    /// Chat-completion deployment (oracle and relay)
    #[serde(default)]
    pub chat: ChatConfig,

    /// Classification oracle instruction
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,

    /// Backends by key (e.g. `gino_agent`)
    #[serde(default)]
    pub backends: BTreeMap<String, BackendConfig>,

    /// Timeouts and poll schedule
    #[serde(default)]
    pub acquisition: AcquisitionConfig,
}

impl AppConfig {
    /// Load configuration from `maf-router.toml` and the environment
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads `maf-router.toml` from the working directory if present
    /// 3. Reads environment variables with `MAF_ROUTER` prefix, which
    ///    override file values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `MAF_ROUTER__CHAT__ENDPOINT=https://...` -> `chat.endpoint`
    /// - `MAF_ROUTER__BACKENDS__GINO_AGENT__STRATEGY=stream` -> `backends.gino_agent.strategy`
    /// - `MAF_ROUTER__ACQUISITION__POLL_SCHEDULE_SECS=2,3,5` -> list
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::load_from(Path::new(CONFIG_FILE))
    }

    /// Load configuration from a specific file (optional) plus the environment
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path).required(false))
            .add_source(
                config::Environment::default()
                    .prefix("MAF_ROUTER")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("acquisition.poll_schedule_secs")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for the first invalid value found.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.backends.is_empty() {
            return Err(ValidationError::NoBackends);
        }
        for (key, backend) in &self.backends {
            backend.validate(key)?;
        }
        self.acquisition.validate()?;
        self.chat.validate()?;
        if self.orchestrator.instruction.trim().is_empty() {
            return Err(ValidationError::MissingRequired("ORCHESTRATOR__INSTRUCTION"));
        }
        Ok(())
    }

    /// Descriptors for every configured backend, in key order
    pub fn backend_descriptors(&self) -> Result<Vec<BackendDescriptor>, ValidationError> {
        self.backends
            .iter()
            .map(|(key, backend)| backend.to_descriptor(key))
            .collect()
    }
}
