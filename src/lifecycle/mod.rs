//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Validate → Build probes → Build HealthManager
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Broadcast → Server stops accepting → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Fail fast: an invalid config never reaches the manager
//! - One explicitly constructed manager, passed down; no global

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{build_manager, build_probe};
