//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber
//! - Resolve the log filter (CLI flag > `RUST_LOG` > config)
//! - Select text or JSON output
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - JSON format for production, text for development

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ObservabilityConfig;

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "pretty" => Some(LogFormat::Text),
            "json" => Some(LogFormat::Json),
            _ => None,
        }
    }
}

/// Pick the effective filter directive.
pub fn resolve_filter(cli_override: Option<&str>, env: Option<String>, config_level: &str) -> String {
    cli_override
        .map(str::to_string)
        .or(env)
        .unwrap_or_else(|| format!("health_aggregator={level},tower_http={level}", level = config_level))
}

/// Install the global subscriber.
pub fn init_logging(
    config: &ObservabilityConfig,
    cli_override: Option<&str>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = resolve_filter(cli_override, std::env::var("RUST_LOG").ok(), &config.log_level);
    let env_filter = EnvFilter::try_new(&filter)?;

    match LogFormat::parse(&config.log_format).unwrap_or(LogFormat::Text) {
        LogFormat::Json => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()?,
        LogFormat::Text => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init()?,
    }

    tracing::debug!(filter = %filter, format = %config.log_format, "Logging initialized");
    Ok(())
}
