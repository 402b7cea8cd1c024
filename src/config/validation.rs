//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses, paths, and value ranges
//! - Detect duplicate probe names
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use crate::config::schema::AppConfig;
use crate::observability::logging::LogFormat;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("invalid {field} address '{value}'")]
    InvalidAddress { field: String, value: String },

    #[error("health.timeout_ms must be greater than zero")]
    ZeroTimeout,

    #[error("health.path '{0}' must start with '/'")]
    InvalidPath(String),

    #[error("unknown log format '{0}' (expected text or json)")]
    UnknownLogFormat(String),

    #[error("probe #{0} has an empty name")]
    EmptyProbeName(usize),

    #[error("probe '{0}' is declared more than once")]
    DuplicateProbe(String),

    #[error("probe '{name}': {reason}")]
    InvalidProbe { name: String, reason: String },
}

/// Validate a parsed configuration.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address".into(),
            value: config.listener.bind_address.clone(),
        });
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address".into(),
            value: config.observability.metrics_address.clone(),
        });
    }

    if LogFormat::parse(&config.observability.log_format).is_none() {
        errors.push(ValidationError::UnknownLogFormat(
            config.observability.log_format.clone(),
        ));
    }

    if config.health.timeout_ms == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    if !config.health.path.starts_with('/') {
        errors.push(ValidationError::InvalidPath(config.health.path.clone()));
    }

    let mut seen = HashSet::new();
    for (i, probe) in config.probes.iter().enumerate() {
        if probe.name.trim().is_empty() {
            errors.push(ValidationError::EmptyProbeName(i));
            continue;
        }
        if !seen.insert(probe.name.as_str()) {
            errors.push(ValidationError::DuplicateProbe(probe.name.clone()));
        }
        if !is_host_port(&probe.address) {
            errors.push(ValidationError::InvalidProbe {
                name: probe.name.clone(),
                reason: format!("address '{}' is not host:port", probe.address),
            });
        }
        if probe.timeout_ms == Some(0) {
            errors.push(ValidationError::InvalidProbe {
                name: probe.name.clone(),
                reason: "timeout_ms must be greater than zero".into(),
            });
        }
        if let Some(degraded) = probe.degraded_after_ms {
            let cap = probe.timeout_ms.unwrap_or(config.health.timeout_ms);
            if degraded >= cap {
                errors.push(ValidationError::InvalidProbe {
                    name: probe.name.clone(),
                    reason: format!(
                        "degraded_after_ms ({}) must be below the timeout ({})",
                        degraded, cap
                    ),
                });
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Accept `ip:port` directly; otherwise require a non-empty host and a
/// numeric port without resolving DNS.
fn is_host_port(address: &str) -> bool {
    if address.parse::<SocketAddr>().is_ok() {
        return true;
    }
    match address.rsplit_once(':') {
        Some((host, port)) => !host.is_empty() && port.parse::<u16>().is_ok(),
        None => false,
    }
}
