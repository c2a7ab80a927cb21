//! Direct Line push channel over tokio-tungstenite.

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::domain::AcquisitionError;
use crate::ports::{ActivityStream, FrameReader, StreamFrame};

/// Opens `wss://` connections to conversation stream URLs.
#[derive(Debug, Clone, Default)]
pub struct WebSocketActivityStream;

impl WebSocketActivityStream {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ActivityStream for WebSocketActivityStream {
    async fn connect(&self, stream_url: &str) -> Result<Box<dyn FrameReader>, AcquisitionError> {
        let (socket, _response) = connect_async(stream_url)
            .await
            .map_err(|e| AcquisitionError::stream(format!("connect failed: {}", e)))?;
        tracing::debug!("push channel connected");
        Ok(Box::new(WsFrameReader { socket }))
    }
}

struct WsFrameReader {
    socket: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl FrameReader for WsFrameReader {
    async fn next_frame(&mut self) -> Option<Result<StreamFrame, AcquisitionError>> {
        let message = match self.socket.next().await? {
            Ok(message) => message,
            Err(e) => return Some(Err(AcquisitionError::stream(e.to_string()))),
        };
        match message {
            Message::Text(text) => Some(Ok(StreamFrame::Text(text))),
            Message::Binary(bytes) => Some(Ok(StreamFrame::Binary(bytes))),
            // Ping replies are queued by tungstenite and flushed on the next read.
            Message::Close(_) => None,
            Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => {
                Some(Ok(StreamFrame::Control))
            }
        }
    }

    async fn close(&mut self) {
        if let Err(e) = self.socket.close(None).await {
            tracing::debug!(error = %e, "push channel close failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn invalid_url_is_a_stream_error() {
        let err = WebSocketActivityStream::new()
            .connect("not a url")
            .await
            .err()
            .unwrap();
        assert!(matches!(err, AcquisitionError::Stream(_)));
    }
}
