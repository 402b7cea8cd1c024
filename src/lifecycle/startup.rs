//! Startup orchestration: configuration → probes → manager.

use std::sync::Arc;
use std::time::Duration;

use crate::config::{AppConfig, ProbeConfig, ProbeKind};
use crate::health::{HealthManager, Probe, Registry, RegistryError};
use crate::probes::TcpProbe;

/// Build the probe described by one config entry.
pub fn build_probe(config: &ProbeConfig) -> Arc<dyn Probe> {
    match config.kind {
        ProbeKind::Tcp => {
            let mut probe = TcpProbe::new(&config.name, &config.address);
            if let Some(ms) = config.timeout_ms {
                probe = probe.with_timeout(Duration::from_millis(ms));
            }
            if let Some(ms) = config.degraded_after_ms {
                probe = probe.with_degraded_after(Duration::from_millis(ms));
            }
            Arc::new(probe)
        }
    }
}

/// Build a manager whose registry holds every configured probe.
pub fn build_manager(config: &AppConfig) -> Result<HealthManager, RegistryError> {
    let mut registry = Registry::new();
    for probe in &config.probes {
        registry.register_arc(&probe.name, build_probe(probe))?;
    }
    tracing::info!(
        probes = ?registry.names(),
        version = %config.health.version,
        "Health manager built"
    );
    Ok(HealthManager::with_registry(&config.health.version, registry))
}
