//! Acquisition timing configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::application::acquisition::{
    AcquisitionSettings, DEFAULT_ANSWER_FRAME, DEFAULT_DIRECT_TIMEOUT, DEFAULT_STREAM_TIMEOUT,
};
use crate::domain::poll_schedule::{
    DEFAULT_BACKOFF_SECS, DEFAULT_FLAT_DELAY_SECS, DEFAULT_MAX_ATTEMPTS,
};
use crate::domain::{PollMode, PollSchedule, AGENT_SENDER_ID};

/// Timeouts, poll schedule, and stream framing shared by every backend
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AcquisitionConfig {
    pub direct_timeout_secs: u64,
    pub stream_timeout_secs: u64,
    pub poll_max_attempts: u32,
    /// Delay before each of the first attempts; later ones use the flat delay
    pub poll_schedule_secs: Vec<u64>,
    /// Delay before every attempt in `legacy_flat` mode
    pub poll_flat_delay_secs: u64,
    pub poll_mode: PollMode,
    /// 1-based index of the text frame carrying the answer
    pub stream_answer_frame: usize,
    pub agent_sender_id: String,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            direct_timeout_secs: DEFAULT_DIRECT_TIMEOUT.as_secs(),
            stream_timeout_secs: DEFAULT_STREAM_TIMEOUT.as_secs(),
            poll_max_attempts: DEFAULT_MAX_ATTEMPTS,
            poll_schedule_secs: DEFAULT_BACKOFF_SECS.to_vec(),
            poll_flat_delay_secs: DEFAULT_FLAT_DELAY_SECS,
            poll_mode: PollMode::default(),
            stream_answer_frame: DEFAULT_ANSWER_FRAME,
            agent_sender_id: AGENT_SENDER_ID.to_string(),
        }
    }
}

impl AcquisitionConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.direct_timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout("acquisition.direct_timeout_secs"));
        }
        if self.stream_timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout("acquisition.stream_timeout_secs"));
        }
        if self.poll_max_attempts == 0 {
            return Err(ValidationError::InvalidPollAttempts);
        }
        match self.poll_mode {
            PollMode::Backoff if self.poll_schedule_secs.iter().all(|s| *s == 0) => {
                return Err(ValidationError::InvalidPollSchedule)
            }
            PollMode::LegacyFlat if self.poll_flat_delay_secs == 0 => {
                return Err(ValidationError::InvalidPollSchedule)
            }
            _ => {}
        }
        if self.stream_answer_frame == 0 {
            return Err(ValidationError::InvalidAnswerFrame);
        }
        if self.agent_sender_id.is_empty() {
            return Err(ValidationError::MissingRequired("ACQUISITION__AGENT_SENDER_ID"));
        }
        Ok(())
    }

    pub fn poll_schedule(&self) -> PollSchedule {
        PollSchedule::default()
            .with_mode(self.poll_mode)
            .with_backoff(self.poll_schedule_secs.iter().map(|s| Duration::from_secs(*s)))
            .with_flat_delay(Duration::from_secs(self.poll_flat_delay_secs))
            .with_max_attempts(self.poll_max_attempts)
    }

    pub fn to_settings(&self) -> AcquisitionSettings {
        AcquisitionSettings {
            direct_timeout: Duration::from_secs(self.direct_timeout_secs),
            stream_timeout: Duration::from_secs(self.stream_timeout_secs),
            poll_schedule: self.poll_schedule(),
            answer_frame: self.stream_answer_frame,
            agent_sender: self.agent_sender_id.clone(),
        }
    }
}
