//! Cache probe.
//!
//! # Policy
//! ```text
//! ping fails                 → Unhealthy
//! ping ok, info call fails   → Degraded
//! otherwise                  → Healthy
//! ```

use async_trait::async_trait;
use std::sync::Arc;

use crate::health::{CheckContext, Outcome, Probe};
use crate::probes::{ProbeError, Stopwatch};

/// Info sections requested from the cache.
pub const INFO_SECTIONS: &[&str] = &["memory", "clients"];

/// Introspection a cache client must offer.
#[async_trait]
pub trait CacheClient: Send + Sync {
    /// Round-trip the server; returns its reply (e.g. `PONG`).
    async fn ping(&self) -> Result<String, ProbeError>;

    /// Fetch server info for the given sections.
    async fn info(&self, sections: &[&str]) -> Result<String, ProbeError>;
}

pub struct CacheProbe {
    name: String,
    client: Arc<dyn CacheClient>,
}

impl CacheProbe {
    pub fn new(client: Arc<dyn CacheClient>) -> Self {
        Self {
            name: "cache".to_string(),
            client,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

#[async_trait]
impl Probe for CacheProbe {
    async fn execute(&self, ctx: CheckContext) -> Outcome {
        let watch = Stopwatch::start();

        let ping = match ctx.run(self.client.ping()).await {
            Ok(result) => result,
            Err(interrupted) => Err(ProbeError::from(interrupted)),
        };
        let pong = match ping {
            Ok(reply) => reply,
            Err(e) => {
                return watch.finish(Outcome::unhealthy(
                    &self.name,
                    format!("cache connection failed: {}", e),
                ));
            }
        };

        let info = match ctx.run(self.client.info(INFO_SECTIONS)).await {
            Ok(result) => result,
            Err(interrupted) => Err(ProbeError::from(interrupted)),
        };

        let outcome = match info {
            Ok(info) => Outcome::healthy(&self.name, format!("cache connection ok: {}", pong))
                .with_metadata("info", info),
            Err(e) => {
                tracing::debug!(probe = %self.name, error = %e, "Cache info unavailable");
                Outcome::degraded(&self.name, format!("cache info unavailable: {}", e))
            }
        };
        watch.finish(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::Condition;

    struct MockCache {
        ping_ok: bool,
        info_ok: bool,
    }

    #[async_trait]
    impl CacheClient for MockCache {
        async fn ping(&self) -> Result<String, ProbeError> {
            if self.ping_ok {
                Ok("PONG".into())
            } else {
                Err(ProbeError::Unreachable("no route to host".into()))
            }
        }

        async fn info(&self, sections: &[&str]) -> Result<String, ProbeError> {
            if self.info_ok {
                Ok(format!("# {}\r\nused_memory:1024", sections.join(",")))
            } else {
                Err(ProbeError::Client("NOPERM".into()))
            }
        }
    }

    async fn run(ping_ok: bool, info_ok: bool) -> Outcome {
        CacheProbe::new(Arc::new(MockCache { ping_ok, info_ok }))
            .execute(CheckContext::background())
            .await
    }

    #[tokio::test]
    async fn test_ping_failure_is_unhealthy() {
        let outcome = run(false, true).await;
        assert_eq!(outcome.condition, Condition::Unhealthy);
        assert!(outcome.message.contains("no route to host"));
    }

    #[tokio::test]
    async fn test_interrupted_ping_is_unhealthy() {
        let ctx = CheckContext::background();
        ctx.cancel();
        let outcome = CacheProbe::new(Arc::new(MockCache {
            ping_ok: true,
            info_ok: true,
        }))
        .execute(ctx)
        .await;
        assert_eq!(outcome.condition, Condition::Unhealthy);
        assert_eq!(
            outcome.message,
            "cache connection failed: interrupted: check cancelled"
        );
    }

    #[tokio::test]
    async fn test_info_failure_is_degraded() {
        let outcome = run(true, false).await;
        assert_eq!(outcome.condition, Condition::Degraded);
        assert!(outcome.metadata.is_empty());
    }

    #[tokio::test]
    async fn test_healthy_carries_info() {
        let outcome = run(true, true).await;
        assert_eq!(outcome.condition, Condition::Healthy);
        assert!(outcome.message.ends_with("PONG"));
        let info = outcome.metadata["info"].as_str().unwrap();
        assert!(info.starts_with("# memory,clients"));
    }
}
