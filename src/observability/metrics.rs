//! Metrics collection and exposition.
//!
//! # Metrics
//! - `health_checks_total` (counter): passes by aggregate status
//! - `health_check_timeouts_total` (counter): passes cut short by the deadline
//! - `health_check_duration_seconds` (histogram): pass latency
//! - `health_probe_condition` (gauge): 0=healthy, 1=degraded, 2=unhealthy;
//!   NaN once a reload removes the probe (the exporter cannot drop series)
//! - `health_probe_duration_seconds` (histogram): per-probe latency

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Duration;

use crate::health::Condition;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record the end of one check pass.
pub fn record_check_pass(condition: Condition, elapsed: Duration, timed_out: bool) {
    counter!("health_checks_total", "status" => condition.as_str()).increment(1);
    histogram!("health_check_duration_seconds").record(elapsed.as_secs_f64());
    if timed_out {
        counter!("health_check_timeouts_total").increment(1);
    }
}

/// Mark a probe's condition gauge as unknown after it leaves the registry.
pub fn retire_probe(probe: &str) {
    gauge!("health_probe_condition", "probe" => probe.to_string()).set(f64::NAN);
}

/// Record one probe outcome as it arrives.
pub fn record_probe_outcome(probe: &str, condition: Condition, duration: Duration) {
    gauge!("health_probe_condition", "probe" => probe.to_string()).set(condition.as_gauge());
    histogram!("health_probe_duration_seconds", "probe" => probe.to_string())
        .record(duration.as_secs_f64());
}
