//! In-memory adapters for tests.
//!
//! Scripted implementations of the backend ports. They record every call so
//! tests can assert on request order, credentials, sleeps, and consumed
//! frames without touching the network or the wall clock.

mod mock_activity_stream;
mod mock_answer_service;
mod mock_direct_line;
mod mock_oracle;
mod mock_strategy;
mod recording_sleeper;

pub use mock_activity_stream::MockActivityStream;
pub use mock_answer_service::{AnswerCall, MockAnswerService};
pub use mock_direct_line::{DirectLineCall, MockDirectLine};
pub use mock_oracle::MockOracle;
pub use mock_strategy::MockStrategy;
pub use recording_sleeper::RecordingSleeper;
