//! Data-store probe.
//!
//! # Policy
//! ```text
//! ping fails                                 → Unhealthy
//! ping ok, open_connections >= max (max > 0) → Degraded
//! otherwise                                  → Healthy
//! ```
//! A `max_open_connections` of 0 means the pool is unbounded.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::health::{CheckContext, Outcome, Probe};
use crate::probes::{ProbeError, Stopwatch};

/// Connection-pool counters reported by a store driver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolStats {
    pub open_connections: u64,
    pub in_use: u64,
    pub idle: u64,
    pub wait_count: u64,
    /// Pool ceiling; 0 = unlimited.
    pub max_open_connections: u64,
}

impl PoolStats {
    pub fn is_saturated(&self) -> bool {
        self.max_open_connections > 0 && self.open_connections >= self.max_open_connections
    }
}

/// Introspection a store driver must offer.
#[async_trait]
pub trait StoreClient: Send + Sync {
    async fn ping(&self) -> Result<(), ProbeError>;

    fn pool_stats(&self) -> PoolStats;
}

pub struct StoreProbe {
    name: String,
    client: Arc<dyn StoreClient>,
}

impl StoreProbe {
    pub fn new(client: Arc<dyn StoreClient>) -> Self {
        Self {
            name: "store".to_string(),
            client,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

#[async_trait]
impl Probe for StoreProbe {
    async fn execute(&self, ctx: CheckContext) -> Outcome {
        let watch = Stopwatch::start();

        let ping = match ctx.run(self.client.ping()).await {
            Ok(result) => result,
            Err(interrupted) => Err(ProbeError::from(interrupted)),
        };
        if let Err(e) = ping {
            return watch.finish(Outcome::unhealthy(
                &self.name,
                format!("store connection failed: {}", e),
            ));
        }

        let stats = self.client.pool_stats();
        let outcome = if stats.is_saturated() {
            Outcome::degraded(&self.name, "connection pool saturated")
        } else {
            Outcome::healthy(&self.name, "store connection ok")
        };

        watch.finish(
            outcome
                .with_metadata("open_connections", stats.open_connections)
                .with_metadata("in_use", stats.in_use)
                .with_metadata("idle", stats.idle)
                .with_metadata("wait_count", stats.wait_count),
        )
    }
}
