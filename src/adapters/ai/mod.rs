//! Chat Model Adapters.
//!
//! ## Available Adapters
//!
//! - `AzureOpenAIChatModel` - Azure OpenAI chat completions deployment
//! - `MockChatModel` - Configurable mock for testing

mod azure_openai;
mod mock_chat_model;

pub use azure_openai::{
    AzureOpenAIChatModel, AzureOpenAIConfig, DEFAULT_API_VERSION, MAX_RETRIES,
};
pub use mock_chat_model::{MockChatModel, MockError, MockResponse};
