//! Tri-state health condition.
//!
//! # Ordering
//! ```text
//! Healthy < Degraded < Unhealthy
//! ```
//! Merging is `max`: the worst condition wins. `Healthy` is the identity,
//! so an empty set of outcomes merges to `Healthy`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Health condition of a single dependency or of the whole system.
///
/// Variant order is significant: the derived `Ord` is the merge order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    /// Dependency is operating normally.
    #[default]
    Healthy,
    /// Dependency is reachable but close to a resource limit.
    Degraded,
    /// Dependency is unreachable or misbehaving.
    Unhealthy,
}

impl Condition {
    /// Fold a set of conditions into the worst one.
    pub fn worst<I>(conditions: I) -> Self
    where
        I: IntoIterator<Item = Condition>,
    {
        conditions.into_iter().fold(Condition::Healthy, Condition::max)
    }

    /// Lowercase wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::Healthy => "healthy",
            Condition::Degraded => "degraded",
            Condition::Unhealthy => "unhealthy",
        }
    }

    /// Gauge value (0 healthy, 1 degraded, 2 unhealthy).
    pub fn as_gauge(&self) -> f64 {
        match self {
            Condition::Healthy => 0.0,
            Condition::Degraded => 1.0,
            Condition::Unhealthy => 2.0,
        }
    }

    pub fn is_healthy(&self) -> bool {
        matches!(self, Condition::Healthy)
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown condition name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown health condition: {0}")]
pub struct ParseConditionError(pub String);

impl FromStr for Condition {
    type Err = ParseConditionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "healthy" => Ok(Condition::Healthy),
            "degraded" => Ok(Condition::Degraded),
            "unhealthy" => Ok(Condition::Unhealthy),
            _ => Err(ParseConditionError(s.to_string())),
        }
    }
}
