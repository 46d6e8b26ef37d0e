//! HTTP gateway for Bhasha Relay.
//!
//! Serves the unified pipeline endpoints, the single-capability endpoints and
//! a health check. Validation runs before any capability is called; failures
//! come back as `{"detail": "..."}`.

pub mod direct;
pub mod error;
#[cfg(feature = "metrics")]
pub mod metrics;
pub mod multipart;
pub mod server;
pub mod state;
pub mod unified;

pub use server::{build_router, start_gateway};
pub use state::GatewayState;
