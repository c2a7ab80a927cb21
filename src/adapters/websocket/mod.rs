//! WebSocket adapters.
//!
//! - `WebSocketActivityStream` - tokio-tungstenite client for the Direct Line
//!   push channel

mod activity_stream;

pub use activity_stream::WebSocketActivityStream;
