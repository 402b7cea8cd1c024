//! Probe implementations.
//!
//! # Variants
//! - `fn_probe.rs`: arbitrary async closure
//! - `store.rs`:    data-store liveness + connection-pool saturation
//! - `cache.rs`:    cache ping + info introspection
//! - `bus.rs`:      message-bus connection + reconnect counter
//! - `tcp.rs`:      plain TCP connect, used for config-driven probes
//!
//! # Design Decisions
//! - Dependency probes talk to a small client trait, never to a concrete
//!   driver; building and connecting clients happens elsewhere
//! - Every client call is raced against the check context
//! - Errors are folded into the outcome, never returned

pub mod bus;
pub mod cache;
pub mod fn_probe;
pub mod store;
pub mod tcp;

pub use bus::{BusClient, BusProbe, BusStats, DEFAULT_RECONNECT_THRESHOLD};
pub use cache::{CacheClient, CacheProbe};
pub use fn_probe::{probe_fn, FnProbe, ProbeReport};
pub use store::{PoolStats, StoreClient, StoreProbe};
pub use tcp::TcpProbe;

use chrono::{DateTime, Utc};
use std::time::Duration;
use tokio::time::Instant;

use crate::health::{Interrupted, Outcome};

/// Errors reported by dependency clients.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProbeError {
    /// The dependency could not be reached.
    #[error("unreachable: {0}")]
    Unreachable(String),

    /// The dependency did not answer in time.
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// The check context ended first.
    #[error("interrupted: {0}")]
    Interrupted(#[from] Interrupted),

    /// Any other client-side failure.
    #[error("{0}")]
    Client(String),
}

/// Captures start time so every probe stamps outcomes the same way.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Stopwatch {
    timestamp: DateTime<Utc>,
    started: Instant,
}

impl Stopwatch {
    pub(crate) fn start() -> Self {
        Self {
            timestamp: Utc::now(),
            started: Instant::now(),
        }
    }

    pub(crate) fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Stamp start time and elapsed duration onto an outcome.
    pub(crate) fn finish(&self, outcome: Outcome) -> Outcome {
        outcome
            .started_at(self.timestamp)
            .with_duration(self.started.elapsed())
    }
}
