//! Activity Stream Port - the Direct Line push channel.

use async_trait::async_trait;

use crate::domain::AcquisitionError;

/// A frame received on the push channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamFrame {
    /// Text frame; Direct Line sends activity sets as JSON text.
    Text(String),
    /// Binary frame.
    Binary(Vec<u8>),
    /// Ping / pong and other control traffic.
    Control,
}

/// An open push-channel connection.
#[async_trait]
pub trait FrameReader: Send {
    /// Next frame in arrival order, `None` once the peer has closed.
    async fn next_frame(&mut self) -> Option<Result<StreamFrame, AcquisitionError>>;

    /// Closes the connection. Errors during close are ignored.
    async fn close(&mut self);
}

/// Port for opening push-channel connections.
#[async_trait]
pub trait ActivityStream: Send + Sync {
    /// Connects to a conversation's stream URL.
    async fn connect(&self, stream_url: &str) -> Result<Box<dyn FrameReader>, AcquisitionError>;
}
