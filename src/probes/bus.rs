//! Message-bus probe.
//!
//! # Policy
//! ```text
//! not connected                          → Unhealthy
//! connected, reconnects > threshold      → Degraded
//! otherwise                              → Healthy
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::health::{CheckContext, Outcome, Probe};
use crate::probes::Stopwatch;

/// Reconnects tolerated before the bus is reported degraded.
pub const DEFAULT_RECONNECT_THRESHOLD: u64 = 5;

/// Traffic and reconnect counters reported by a bus connection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusStats {
    pub in_msgs: u64,
    pub out_msgs: u64,
    pub in_bytes: u64,
    pub out_bytes: u64,
    pub reconnects: u64,
}

/// Introspection a bus connection must offer.
pub trait BusClient: Send + Sync {
    fn is_connected(&self) -> bool;

    fn stats(&self) -> BusStats;
}

pub struct BusProbe {
    name: String,
    client: Arc<dyn BusClient>,
    reconnect_threshold: u64,
}

impl BusProbe {
    pub fn new(client: Arc<dyn BusClient>) -> Self {
        Self {
            name: "bus".to_string(),
            client,
            reconnect_threshold: DEFAULT_RECONNECT_THRESHOLD,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_reconnect_threshold(mut self, threshold: u64) -> Self {
        self.reconnect_threshold = threshold;
        self
    }
}

#[async_trait]
impl Probe for BusProbe {
    async fn execute(&self, _ctx: CheckContext) -> Outcome {
        let watch = Stopwatch::start();

        if !self.client.is_connected() {
            return watch.finish(Outcome::unhealthy(&self.name, "bus disconnected"));
        }

        let stats = self.client.stats();
        let outcome = if stats.reconnects > self.reconnect_threshold {
            Outcome::degraded(
                &self.name,
                format!(
                    "bus reconnected {} times (threshold {})",
                    stats.reconnects, self.reconnect_threshold
                ),
            )
        } else {
            Outcome::healthy(&self.name, "bus connection ok")
        };

        watch.finish(
            outcome
                .with_metadata("in_msgs", stats.in_msgs)
                .with_metadata("out_msgs", stats.out_msgs)
                .with_metadata("in_bytes", stats.in_bytes)
                .with_metadata("out_bytes", stats.out_bytes)
                .with_metadata("reconnects", stats.reconnects),
        )
    }
}
