//! TCP connect probe.
//!
//! Connects to `host:port` and drops the stream. Used for probes declared
//! in the configuration file, where no driver-specific client is available.

use async_trait::async_trait;
use std::time::Duration;
use tokio::net::TcpStream;

use crate::health::{CheckContext, Outcome, Probe};
use crate::probes::Stopwatch;

pub struct TcpProbe {
    name: String,
    address: String,
    timeout: Option<Duration>,
    degraded_after: Option<Duration>,
}

impl TcpProbe {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            timeout: None,
            degraded_after: None,
        }
    }

    /// Cap the connect attempt below the pass deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Report `Degraded` when connecting takes at least this long.
    pub fn with_degraded_after(mut self, threshold: Duration) -> Self {
        self.degraded_after = Some(threshold);
        self
    }
}

#[async_trait]
impl Probe for TcpProbe {
    async fn execute(&self, ctx: CheckContext) -> Outcome {
        let watch = Stopwatch::start();
        let ctx = match self.timeout {
            Some(timeout) => ctx.narrowed(timeout),
            None => ctx,
        };

        let outcome = match ctx.run(TcpStream::connect(&self.address)).await {
            Ok(Ok(_stream)) => {
                let connect = watch.elapsed();
                let slow = self.degraded_after.is_some_and(|threshold| connect >= threshold);
                let outcome = if slow {
                    Outcome::degraded(
                        &self.name,
                        format!("slow connect to {} ({} ms)", self.address, connect.as_millis()),
                    )
                } else {
                    Outcome::healthy(&self.name, format!("connected to {}", self.address))
                };
                outcome.with_metadata("connect_ms", connect.as_secs_f64() * 1000.0)
            }
            Ok(Err(e)) => Outcome::unhealthy(
                &self.name,
                format!("connect to {} failed: {}", self.address, e),
            ),
            Err(interrupted) => Outcome::unhealthy(
                &self.name,
                format!("connect to {} interrupted: {}", self.address, interrupted),
            ),
        };

        watch.finish(outcome.with_metadata("address", self.address.as_str()))
    }
}
