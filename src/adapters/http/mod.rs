//! HTTP adapters.
//!
//! - `HttpBackendClient` - reqwest client for direct-response backends and
//!   the Direct Line REST endpoints

mod backend_client;

pub use backend_client::HttpBackendClient;
