//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the acquisition and routing logic to external systems:
//! - `ai` - Chat-completion clients (Azure OpenAI, mock)
//! - `http` - reqwest client for direct backends and Direct Line REST
//! - `websocket` - Direct Line push channel
//! - `time` - Tokio timer
//! - `testing` - In-memory backends for tests

pub mod ai;
pub mod http;
pub mod testing;
pub mod time;
pub mod websocket;

pub use ai::{AzureOpenAIChatModel, AzureOpenAIConfig, MockChatModel};
pub use http::HttpBackendClient;
pub use time::TokioSleeper;
pub use websocket::WebSocketActivityStream;
