//! Closure-backed probe.

use async_trait::async_trait;
use std::future::Future;

use crate::health::{CheckContext, Condition, Metadata, Outcome, Probe};
use crate::probes::Stopwatch;

/// What a closure probe reports; the probe adds name and timing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProbeReport {
    pub condition: Condition,
    pub message: String,
    pub metadata: Metadata,
}

impl ProbeReport {
    pub fn new(condition: Condition, message: impl Into<String>) -> Self {
        Self {
            condition,
            message: message.into(),
            metadata: Metadata::new(),
        }
    }

    pub fn healthy(message: impl Into<String>) -> Self {
        Self::new(Condition::Healthy, message)
    }

    pub fn degraded(message: impl Into<String>) -> Self {
        Self::new(Condition::Degraded, message)
    }

    pub fn unhealthy(message: impl Into<String>) -> Self {
        Self::new(Condition::Unhealthy, message)
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// A named probe backed by an async closure.
pub struct FnProbe<F> {
    name: String,
    check: F,
}

impl<F, Fut> FnProbe<F>
where
    F: Fn(CheckContext) -> Fut + Send + Sync,
    Fut: Future<Output = ProbeReport> + Send + 'static,
{
    pub fn new(name: impl Into<String>, check: F) -> Self {
        Self {
            name: name.into(),
            check,
        }
    }
}

/// Shorthand for [`FnProbe::new`].
pub fn probe_fn<F, Fut>(name: impl Into<String>, check: F) -> FnProbe<F>
where
    F: Fn(CheckContext) -> Fut + Send + Sync,
    Fut: Future<Output = ProbeReport> + Send + 'static,
{
    FnProbe::new(name, check)
}

#[async_trait]
impl<F, Fut> Probe for FnProbe<F>
where
    F: Fn(CheckContext) -> Fut + Send + Sync,
    Fut: Future<Output = ProbeReport> + Send + 'static,
{
    async fn execute(&self, ctx: CheckContext) -> Outcome {
        let watch = Stopwatch::start();
        let report = (self.check)(ctx).await;
        watch.finish(
            Outcome::new(&self.name, report.condition, report.message)
                .with_metadata_map(report.metadata),
        )
    }
}
