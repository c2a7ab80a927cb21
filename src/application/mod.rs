//! Application layer - acquisition strategies, backend agents, and routing.
//!
//! - `acquisition` - the three response-acquisition strategies
//! - `backend_agent` - per-backend entry point (acquire, then relay)
//! - `registry` - backends by key
//! - `oracle` - chat-model classification oracle
//! - `router` - classify and dispatch a user query

pub mod acquisition;
mod backend_agent;
mod oracle;
mod registry;
mod router;

pub use acquisition::{AcquisitionSettings, BackendClient, Transports};
pub use backend_agent::BackendAgent;
pub use oracle::ChatOracle;
pub use registry::BackendRegistry;
pub use router::{RouteOutcome, Router};
