//! Health aggregation core.
//!
//! # Data Flow
//! ```text
//! Registry (name → Probe), built at configuration time
//!     → HealthManager::check(ctx)
//!         → one task per probe: Probe::execute(child ctx) → Outcome
//!         → fan-in over a bounded channel until all report or ctx is done
//!     → AggregateResponse (worst condition, outcomes, metadata)
//!     → map_status → 200 / 503
//! ```
//!
//! # Design Decisions
//! - Condition order is Healthy < Degraded < Unhealthy; merge is `max`
//! - Probes never fail the pass; failure is an `Unhealthy` outcome
//! - A pass that runs out of time is `Unhealthy` regardless of what arrived
//! - The registry is read-only during a pass (the manager snapshots it)

pub mod condition;
pub mod context;
pub mod manager;
pub mod outcome;
pub mod probe;
pub mod registry;
pub mod response;
pub mod status;

pub use condition::Condition;
pub use context::{CheckContext, Interrupted};
pub use manager::HealthManager;
pub use outcome::{Metadata, Outcome, OutcomeView};
pub use probe::Probe;
pub use registry::{Registry, RegistryError};
pub use response::{AggregateResponse, AggregateView, PENDING_KEY, REASON_KEY, TIMED_OUT_KEY};
pub use status::map_status;
