//! Scripted push channel.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::domain::AcquisitionError;
use crate::ports::{ActivityStream, FrameReader, StreamFrame};

#[derive(Debug, Default)]
struct StreamState {
    consumed: AtomicUsize,
    closed: AtomicBool,
    urls: Mutex<Vec<String>>,
}

/// Serves a fixed frame sequence to every connection.
///
/// After the last frame the connection either ends or, when `stalled`,
/// stays open without sending anything.
#[derive(Debug, Clone, Default)]
pub struct MockActivityStream {
    frames: Vec<Result<StreamFrame, AcquisitionError>>,
    stall: bool,
    connect_error: Option<AcquisitionError>,
    state: Arc<StreamState>,
}

impl MockActivityStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_frame(mut self, frame: StreamFrame) -> Self {
        self.frames.push(Ok(frame));
        self
    }

    pub fn with_frame_error(mut self, error: AcquisitionError) -> Self {
        self.frames.push(Err(error));
        self
    }

    pub fn with_connect_error(mut self, error: AcquisitionError) -> Self {
        self.connect_error = Some(error);
        self
    }

    /// Keeps the connection open after the last frame.
    pub fn stalled(mut self) -> Self {
        self.stall = true;
        self
    }

    /// Frames handed out across all connections.
    pub fn frames_consumed(&self) -> usize {
        self.state.consumed.load(Ordering::SeqCst)
    }

    /// Whether a connection was closed by the reader.
    pub fn closed(&self) -> bool {
        self.state.closed.load(Ordering::SeqCst)
    }

    pub fn connected_urls(&self) -> Vec<String> {
        self.state.urls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ActivityStream for MockActivityStream {
    async fn connect(&self, stream_url: &str) -> Result<Box<dyn FrameReader>, AcquisitionError> {
        if let Some(error) = &self.connect_error {
            return Err(error.clone());
        }
        self.state.urls.lock().unwrap().push(stream_url.to_string());
        Ok(Box::new(MockFrameReader {
            frames: self.frames.iter().cloned().collect(),
            stall: self.stall,
            state: Arc::clone(&self.state),
        }))
    }
}

struct MockFrameReader {
    frames: VecDeque<Result<StreamFrame, AcquisitionError>>,
    stall: bool,
    state: Arc<StreamState>,
}

#[async_trait]
impl FrameReader for MockFrameReader {
    async fn next_frame(&mut self) -> Option<Result<StreamFrame, AcquisitionError>> {
        match self.frames.pop_front() {
            Some(frame) => {
                self.state.consumed.fetch_add(1, Ordering::SeqCst);
                Some(frame)
            }
            None if self.stall => futures::future::pending().await,
            None => None,
        }
    }

    async fn close(&mut self) {
        self.state.closed.store(true, Ordering::SeqCst);
    }
}
