//! Domain layer containing the types the acquisition and routing layers share.
//!
//! # Module Organization
//!
//! - `backend` - Backend descriptors and acquisition strategy tags
//! - `session` - Per-query Direct Line conversation sessions
//! - `activity` - Activities exchanged within a session and answer selection
//! - `acquisition` - Acquisition outcomes and backend-layer errors
//! - `poll_schedule` - Attempt counter and backoff table for polling
//! - `diagnostics` - Elapsed-time bookkeeping for timing lines
//! - `routing` - Routing decisions and the oracle reply parser
//!
//! Nothing in here performs I/O.

pub mod acquisition;
pub mod activity;
pub mod backend;
pub mod diagnostics;
pub mod poll_schedule;
pub mod routing;
pub mod session;

pub use acquisition::{Acquisition, AcquisitionError};
pub use activity::{Activity, ActivitySet, ChannelAccount, OutgoingActivity, AGENT_SENDER_ID};
pub use backend::{BackendAccess, BackendDescriptor, ConversationAccess, StrategyKind};
pub use diagnostics::{format_secs, Stopwatch};
pub use poll_schedule::{PollMode, PollSchedule};
pub use routing::{RoutingDecision, RoutingError};
pub use session::{ConversationSession, ConversationStart};
