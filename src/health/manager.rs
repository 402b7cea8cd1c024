//! Check-pass orchestration (fan-out / fan-in).
//!
//! # Data Flow
//! ```text
//! check(ctx)
//!     → snapshot registry
//!     → spawn one task per probe ──▶ execute(child ctx) ──▶ catch_unwind
//!                                                            │
//!     ◀─────────── mpsc (capacity = probe count) ◀───────────┘
//!     → select! { outcome arrives | ctx done }
//!     → all arrived: worst condition wins
//!     → ctx done:    Unhealthy + partial outcomes, stragglers discarded
//! ```
//!
//! # Design Decisions
//! - Only the fan-in loop touches the outcomes map; no locks
//! - Tasks are spawned fresh per pass, never pooled
//! - A panicking probe becomes an `Unhealthy` outcome, not a crashed pass
//! - Running out of time is itself unhealthy, whatever arrived in time

use chrono::Utc;
use futures_util::FutureExt;
use std::any::Any;
use std::collections::{BTreeSet, HashMap};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

use crate::health::outcome::Metadata;
use crate::health::response::{PENDING_KEY, REASON_KEY, TIMED_OUT_KEY};
use crate::health::{
    AggregateResponse, CheckContext, Condition, Interrupted, Outcome, Probe, Registry,
    RegistryError,
};
use crate::observability::metrics;

/// Runs check passes over a fixed set of probes.
///
/// Build one per process (or per reloaded configuration) and share it behind
/// an `Arc`; `check` only needs `&self`.
#[derive(Debug, Default)]
pub struct HealthManager {
    registry: Registry,
    version: String,
}

impl HealthManager {
    /// Create a manager with an empty registry.
    pub fn new(version: impl Into<String>) -> Self {
        Self::with_registry(version, Registry::new())
    }

    /// Create a manager over an existing registry.
    pub fn with_registry(version: impl Into<String>, registry: Registry) -> Self {
        Self {
            registry,
            version: version.into(),
        }
    }

    /// Register a probe. Configuration-time only.
    pub fn register<P>(&mut self, name: impl Into<String>, probe: P) -> Result<(), RegistryError>
    where
        P: Probe + 'static,
    {
        self.registry.register(name, probe)
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn probe_names(&self) -> Vec<String> {
        self.registry.names()
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Run every registered probe concurrently and merge the outcomes.
    ///
    /// Always returns a response. If `ctx` is done before every probe
    /// reports, the response is `Unhealthy` and carries only the outcomes
    /// that arrived in time.
    pub async fn check(&self, ctx: &CheckContext) -> AggregateResponse {
        let check_id = Uuid::new_v4();
        let span = tracing::info_span!(
            "health_check",
            %check_id,
            probes = self.registry.len()
        );
        self.run_pass(ctx).instrument(span).await
    }

    async fn run_pass(&self, ctx: &CheckContext) -> AggregateResponse {
        let started = Instant::now();
        let timestamp = Utc::now();
        let probes = self.registry.snapshot();
        let expected = probes.len();

        // Probes get a child context; it is cancelled when this pass returns
        // or is dropped, never the caller's context.
        let pass_ctx = ctx.child();
        let _cancel_probes = pass_ctx.cancel_on_drop();
        let (tx, mut rx) = mpsc::channel::<(String, Outcome)>(expected.max(1));
        let mut pending: BTreeSet<String> = BTreeSet::new();

        for (name, probe) in probes {
            pending.insert(name.clone());
            let tx = tx.clone();
            let probe_ctx = pass_ctx.child();
            tokio::spawn(
                async move {
                    let outcome = execute_guarded(&name, probe, probe_ctx).await;
                    // Receiver is gone once the pass has returned; late
                    // outcomes are dropped here.
                    let _ = tx.send((name, outcome)).await;
                }
                .in_current_span(),
            );
        }
        drop(tx);

        let mut outcomes: HashMap<String, Outcome> = HashMap::with_capacity(expected);
        let mut received = 0usize;

        while received < expected {
            // Done takes priority: an outcome that lands together with the
            // deadline or a cancellation does not complete the pass.
            tokio::select! {
                biased;
                reason = ctx.done() => {
                    return self.interrupted_response(reason, started, timestamp, outcomes, pending, expected);
                }
                msg = rx.recv() => match msg {
                    Some((name, outcome)) => {
                        received += 1;
                        pending.remove(&name);
                        log_outcome(&name, &outcome);
                        metrics::record_probe_outcome(&name, outcome.condition, outcome.duration);
                        outcomes.insert(name, outcome);
                    }
                    None => {
                        // Every sender is gone without reporting (runtime
                        // shutting down); account for the missing probes.
                        for name in std::mem::take(&mut pending) {
                            tracing::warn!(probe = %name, "Probe task ended without reporting");
                            let outcome = Outcome::unhealthy(&name, "probe task ended without reporting")
                                .started_at(timestamp);
                            outcomes.insert(name, outcome);
                        }
                        break;
                    }
                },
            }
        }

        let condition = Condition::worst(outcomes.values().map(|o| o.condition));
        let elapsed = started.elapsed();
        let mut metadata = Metadata::new();
        metadata.insert("total_duration_ms".into(), (elapsed.as_secs_f64() * 1000.0).into());
        metadata.insert("checks_count".into(), outcomes.len().into());
        metadata.insert("probes_registered".into(), expected.into());

        metrics::record_check_pass(condition, elapsed, false);
        tracing::info!(
            status = %condition,
            checks = outcomes.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Health check completed"
        );

        AggregateResponse {
            condition,
            timestamp,
            version: self.version.clone(),
            outcomes,
            metadata,
        }
    }

    fn interrupted_response(
        &self,
        reason: Interrupted,
        started: Instant,
        timestamp: chrono::DateTime<Utc>,
        outcomes: HashMap<String, Outcome>,
        pending: BTreeSet<String>,
        expected: usize,
    ) -> AggregateResponse {
        let elapsed = started.elapsed();
        let pending: Vec<String> = pending.into_iter().collect();

        tracing::warn!(
            reason = %reason,
            received = outcomes.len(),
            expected,
            pending = ?pending,
            elapsed_ms = elapsed.as_millis() as u64,
            "Health check interrupted before all probes reported"
        );
        metrics::record_check_pass(Condition::Unhealthy, elapsed, true);

        let mut metadata = Metadata::new();
        metadata.insert("total_duration_ms".into(), (elapsed.as_secs_f64() * 1000.0).into());
        metadata.insert("checks_count".into(), outcomes.len().into());
        metadata.insert("probes_registered".into(), expected.into());
        metadata.insert(TIMED_OUT_KEY.into(), true.into());
        metadata.insert(REASON_KEY.into(), reason.to_string().into());
        metadata.insert(PENDING_KEY.into(), pending.into());

        AggregateResponse {
            condition: Condition::Unhealthy,
            timestamp,
            version: self.version.clone(),
            outcomes,
            metadata,
        }
    }
}

/// Execute one probe, converting a panic into an `Unhealthy` outcome.
async fn execute_guarded(name: &str, probe: Arc<dyn Probe>, ctx: CheckContext) -> Outcome {
    let timestamp = Utc::now();
    let started = Instant::now();

    match AssertUnwindSafe(probe.execute(ctx)).catch_unwind().await {
        Ok(outcome) => outcome,
        Err(payload) => {
            let detail = panic_detail(payload.as_ref());
            tracing::error!(probe = %name, panic = %detail, "Probe panicked");
            Outcome::unhealthy(name, format!("probe panicked: {}", detail))
                .started_at(timestamp)
                .with_duration(started.elapsed())
        }
    }
}

fn panic_detail(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

fn log_outcome(name: &str, outcome: &Outcome) {
    match outcome.condition {
        Condition::Healthy => tracing::debug!(
            probe = %name,
            duration_ms = outcome.duration.as_millis() as u64,
            "Probe healthy"
        ),
        condition => tracing::warn!(
            probe = %name,
            status = %condition,
            message = %outcome.message,
            duration_ms = outcome.duration.as_millis() as u64,
            "Probe not healthy"
        ),
    }
}
