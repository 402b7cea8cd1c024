//! Result of one probe execution.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::time::Duration;

use crate::health::Condition;

/// Structured metadata attached to outcomes and responses.
pub type Metadata = BTreeMap<String, serde_json::Value>;

/// Immutable description of one dependency's condition.
///
/// Built by a probe, handed to the manager through the result channel, and
/// never modified afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outcome {
    /// Probe name.
    pub name: String,
    /// Condition reported by the probe.
    #[serde(rename = "status")]
    pub condition: Condition,
    /// Human-readable explanation.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub message: String,
    /// Wall-clock time at which the probe started.
    pub timestamp: DateTime<Utc>,
    /// How long the probe ran.
    #[serde(rename = "duration_ms", serialize_with = "serialize_millis")]
    pub duration: Duration,
    /// Dependency-reported details (pool stats, counters, ...).
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: Metadata,
}

impl Outcome {
    pub fn new(name: impl Into<String>, condition: Condition, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            condition,
            message: message.into(),
            timestamp: Utc::now(),
            duration: Duration::ZERO,
            metadata: Metadata::new(),
        }
    }

    pub fn healthy(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(name, Condition::Healthy, message)
    }

    pub fn degraded(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(name, Condition::Degraded, message)
    }

    pub fn unhealthy(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(name, Condition::Unhealthy, message)
    }

    /// Set the start timestamp.
    pub fn started_at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Set the execution duration.
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Attach one metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Merge a metadata map, overwriting existing keys.
    pub fn with_metadata_map(mut self, metadata: Metadata) -> Self {
        self.metadata.extend(metadata);
        self
    }
}

pub(crate) fn serialize_millis<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_f64(duration.as_secs_f64() * 1000.0)
}

/// Mirror of [`Outcome`] for clients reading the JSON body back.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OutcomeView {
    pub name: String,
    pub status: Condition,
    #[serde(default)]
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub duration_ms: f64,
    #[serde(default)]
    pub metadata: Metadata,
}
