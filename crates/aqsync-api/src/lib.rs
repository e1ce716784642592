// aqsync-api: Async Rust client for the Ardoq REST API
//
// Covers the slice of the API the sync engine needs: aggregated workspace
// reads, model reads/writes, field listing/creation, batch create, and
// component/reference update and delete.

pub mod client;
pub mod error;
pub mod rate_limit;
pub mod transport;
pub mod types;

mod fields;
mod graph;
mod models;
mod workspaces;

pub use client::ArdoqClient;
pub use error::Error;
pub use rate_limit::{RateLimit, RateLimiter};
pub use transport::{TlsMode, TransportConfig};
