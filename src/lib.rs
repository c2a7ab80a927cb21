//! maf-router - route user queries to conversational backends.
//!
//! A chat-model oracle classifies each query and names one backend. The
//! backend is asked through one of three acquisition strategies (direct
//! REST, Direct Line polling, Direct Line streaming) and its answer is
//! streamed back, optionally relayed through the chat model.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
