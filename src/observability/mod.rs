//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Check passes produce:
//!     → logging.rs (structured log events, one span per pass)
//!     → metrics.rs (pass/probe counters, gauges, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout, text or JSON)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Every pass carries a check ID in its span
//! - Metric calls are no-ops until a recorder is installed

pub mod logging;
pub mod metrics;
