//! Process-level settings

use serde::Deserialize;

/// Process-level settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    /// Default tracing filter directive; `RUST_LOG` takes precedence
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Emit log lines as JSON objects instead of plain text
    #[serde(default)]
    pub log_json: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Classification oracle settings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrchestratorConfig {
    /// System prompt instructing the model to answer with an
    /// `{'agent': ..., 'message': ...}` record
    #[serde(default)]
    pub instruction: String,
}
