//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the acquisition/routing logic and the outside world. Adapters implement
//! these ports.
//!
//! ## Backend Ports
//!
//! - `AnswerService` - Direct-response backends (one POST)
//! - `DirectLine` - Token, conversation, and activity endpoints
//! - `ActivityStream` / `FrameReader` - Direct Line push channel
//! - `Sleeper` - Timer between poll attempts
//!
//! ## Contract Ports
//!
//! - `AcquisitionStrategy` - The Response-Acquisition Contract
//! - `ClassificationOracle` - Backend selection for a user query
//! - `ChatModel` - Chat-completion client (oracle and answer relay)

mod acquisition;
mod activity_stream;
mod answer_service;
mod chat_model;
mod classification_oracle;
mod direct_line;
mod sleeper;

pub use acquisition::AcquisitionStrategy;
pub use activity_stream::{ActivityStream, FrameReader, StreamFrame};
pub use answer_service::{AnswerService, DirectMessage, DirectRequest};
pub use chat_model::{
    AIError, ChatModel, ChunkStream, CompletionRequest, CompletionResponse, FinishReason,
    Message, MessageRole, ProviderInfo, StreamChunk, TokenUsage,
};
pub use classification_oracle::ClassificationOracle;
pub use direct_line::DirectLine;
pub use sleeper::Sleeper;
