//! Concurrent health aggregation.
//!
//! Probes several dependencies in parallel under one deadline, merges the
//! per-dependency outcomes into a single verdict, and exposes it over HTTP.

pub mod config;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod probes;

pub use config::AppConfig;
pub use health::{AggregateResponse, CheckContext, Condition, HealthManager, Outcome, Probe};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
