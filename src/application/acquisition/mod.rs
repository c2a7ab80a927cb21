//! Response acquisition.
//!
//! [`BackendClient`] is the single strategy type: a backend descriptor plus
//! the shared transports. The descriptor's [`StrategyKind`] selects which of
//! the three acquisition algorithms runs.
//!
//! - `direct` - one POST, answer embedded in the body
//! - `handshake` - token, conversation, and message post (shared)
//! - `poll` - activities polling on a backoff schedule
//! - `stream` - push-channel read of the answer frame

mod direct;
mod handshake;
mod poll;
mod stream;

pub use direct::extract_direct_answer;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::{
    Acquisition, AcquisitionError, BackendAccess, BackendDescriptor, PollSchedule, StrategyKind,
    AGENT_SENDER_ID,
};
use crate::ports::{AcquisitionStrategy, ActivityStream, AnswerService, DirectLine, Sleeper};

/// Default bound on a direct-response exchange.
pub const DEFAULT_DIRECT_TIMEOUT: Duration = Duration::from_secs(40);
/// Default bound on a push-channel connection's lifetime.
pub const DEFAULT_STREAM_TIMEOUT: Duration = Duration::from_secs(60);
/// Text frame carrying the answer; earlier ones echo the posted message.
pub const DEFAULT_ANSWER_FRAME: usize = 3;

/// Timing and protocol knobs shared by all backends.
#[derive(Debug, Clone)]
pub struct AcquisitionSettings {
    pub direct_timeout: Duration,
    pub stream_timeout: Duration,
    pub poll_schedule: PollSchedule,
    /// 1-based index of the text frame that carries the answer.
    pub answer_frame: usize,
    /// Sender id stamped on posted messages.
    pub agent_sender: String,
}

impl Default for AcquisitionSettings {
    fn default() -> Self {
        Self {
            direct_timeout: DEFAULT_DIRECT_TIMEOUT,
            stream_timeout: DEFAULT_STREAM_TIMEOUT,
            poll_schedule: PollSchedule::default(),
            answer_frame: DEFAULT_ANSWER_FRAME,
            agent_sender: AGENT_SENDER_ID.to_string(),
        }
    }
}

/// I/O adapters the strategies run on.
#[derive(Clone)]
pub struct Transports {
    pub answers: Arc<dyn AnswerService>,
    pub direct_line: Arc<dyn DirectLine>,
    pub streams: Arc<dyn ActivityStream>,
    pub sleeper: Arc<dyn Sleeper>,
}

/// Response-acquisition strategy for one backend.
#[derive(Clone)]
pub struct BackendClient {
    backend: BackendDescriptor,
    transports: Transports,
    settings: Arc<AcquisitionSettings>,
}

impl BackendClient {
    pub fn new(
        backend: BackendDescriptor,
        transports: Transports,
        settings: Arc<AcquisitionSettings>,
    ) -> Self {
        Self {
            backend,
            transports,
            settings,
        }
    }
}

#[async_trait]
impl AcquisitionStrategy for BackendClient {
    fn backend(&self) -> &BackendDescriptor {
        &self.backend
    }

    async fn acquire(&self, message: &str) -> Acquisition {
        let label = self.backend.label();
        match (self.backend.strategy(), self.backend.access()) {
            (StrategyKind::Direct, BackendAccess::Direct { url }) => {
                direct::acquire(
                    self.transports.answers.as_ref(),
                    label,
                    url,
                    message,
                    self.settings.direct_timeout,
                )
                .await
            }
            (StrategyKind::Poll, BackendAccess::Conversation(access)) => {
                poll::acquire(
                    self.transports.direct_line.as_ref(),
                    self.transports.sleeper.as_ref(),
                    access,
                    label,
                    message,
                    &self.settings,
                )
                .await
            }
            (StrategyKind::Stream, BackendAccess::Conversation(access)) => {
                stream::acquire(
                    self.transports.direct_line.as_ref(),
                    self.transports.streams.as_ref(),
                    access,
                    label,
                    message,
                    &self.settings,
                )
                .await
            }
            (strategy, _) => Acquisition::Failed(AcquisitionError::Misconfigured(format!(
                "no endpoints for the {} strategy",
                strategy
            ))),
        }
    }
}
