//! HTTP surface for the aggregate.
//!
//! # Data Flow
//! ```text
//! GET {path}
//!     → server.rs (request ID, trace span)
//!     → CheckContext::with_timeout(health.timeout_ms)
//!     → HealthManager::check
//!     → response.rs (map_status + JSON body)
//!
//! GET {path}/live
//!     → "ok" (process is up; no probes run)
//! ```

pub mod response;
pub mod server;

pub use server::{ActiveHealth, HealthHandle, HttpServer};
