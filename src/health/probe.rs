//! Probe capability.

use async_trait::async_trait;

use crate::health::{CheckContext, Outcome};

/// A unit of work that assesses one dependency.
///
/// Failure is never raised: an unreachable or misbehaving dependency is an
/// `Unhealthy` outcome with an explanatory message. Implementations should
/// race their I/O against `ctx` (see [`CheckContext::run`]); anything they
/// emit after the manager has given up on the pass is discarded.
#[async_trait]
pub trait Probe: Send + Sync {
    async fn execute(&self, ctx: CheckContext) -> Outcome;
}
