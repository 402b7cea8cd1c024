//! Aggregate verdict of one check pass.

use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::health::outcome::{Metadata, OutcomeView};
use crate::health::{map_status, Condition, Outcome};

/// Metadata key set to `true` when a pass was cut short.
pub const TIMED_OUT_KEY: &str = "timed_out";
/// Metadata key holding why a cut-short pass stopped.
pub const REASON_KEY: &str = "reason";
/// Metadata key listing probes that had not reported when a pass stopped.
pub const PENDING_KEY: &str = "pending";

/// Result of [`HealthManager::check`](crate::health::HealthManager::check).
///
/// `condition` is the worst outcome condition, or `Unhealthy` when the pass
/// ran out of time (in which case `outcomes` holds only what arrived).
#[derive(Debug, Clone, Serialize)]
pub struct AggregateResponse {
    #[serde(rename = "status")]
    pub condition: Condition,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub version: String,
    #[serde(rename = "checks")]
    pub outcomes: HashMap<String, Outcome>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: Metadata,
}

impl AggregateResponse {
    /// Transport status code for this verdict.
    pub fn status_code(&self) -> StatusCode {
        map_status(self.condition)
    }

    /// True when the pass was cut short by its deadline or cancellation.
    pub fn timed_out(&self) -> bool {
        self.metadata
            .get(TIMED_OUT_KEY)
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }
}

/// Client-side mirror of the serialized [`AggregateResponse`].
#[derive(Debug, Clone, Deserialize)]
pub struct AggregateView {
    pub status: Condition,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub version: String,
    pub checks: HashMap<String, OutcomeView>,
    #[serde(default)]
    pub metadata: Metadata,
}
