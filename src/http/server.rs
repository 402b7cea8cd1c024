//! HTTP server setup.
//!
//! # Responsibilities
//! - Create Axum Router with the aggregate and liveness handlers
//! - Wire up middleware (tracing, request ID)
//! - Apply configuration reloads by swapping the active manager
//! - Serve until the shutdown broadcast fires

use arc_swap::ArcSwap;
use axum::{
    extract::State,
    http::HeaderName,
    routing::get,
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::{AppConfig, HealthConfig};
use crate::health::{AggregateResponse, CheckContext, HealthManager, RegistryError};
use crate::lifecycle::build_manager;
use crate::observability::metrics;

const X_REQUEST_ID: &str = "x-request-id";

/// Manager plus the budget each pass gets.
#[derive(Debug)]
pub struct ActiveHealth {
    pub manager: HealthManager,
    pub timeout: Duration,
}

/// Shared, swappable handle to the active manager.
///
/// A pass loads the current `ActiveHealth` once and keeps it for its whole
/// duration, so a reload never changes the probe set under a running pass.
#[derive(Clone)]
pub struct HealthHandle {
    inner: Arc<ArcSwap<ActiveHealth>>,
}

impl HealthHandle {
    pub fn new(manager: HealthManager, timeout: Duration) -> Self {
        Self {
            inner: Arc::new(ArcSwap::from_pointee(ActiveHealth { manager, timeout })),
        }
    }

    pub fn current(&self) -> Arc<ActiveHealth> {
        self.inner.load_full()
    }

    /// Run one pass against the current manager.
    pub async fn check(&self) -> AggregateResponse {
        let active = self.current();
        let ctx = CheckContext::with_timeout(active.timeout);
        active.manager.check(&ctx).await
    }

    /// Rebuild the manager from `config` and swap it in.
    ///
    /// Returns the names of probes the new configuration no longer has;
    /// their condition gauges are retired.
    pub fn reload(&self, config: &AppConfig) -> Result<Vec<String>, RegistryError> {
        let manager = build_manager(config)?;
        let next = Arc::new(ActiveHealth {
            manager,
            timeout: config.health.timeout(),
        });
        let previous = self.inner.swap(Arc::clone(&next));
        let removed: Vec<String> = previous
            .manager
            .probe_names()
            .into_iter()
            .filter(|name| !next.manager.registry().contains(name))
            .collect();
        for name in &removed {
            metrics::retire_probe(name);
        }
        Ok(removed)
    }
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub health: HealthHandle,
}

/// HTTP server exposing the aggregate health verdict.
pub struct HttpServer {
    router: Router,
    health: HealthHandle,
    config: HealthConfig,
}

impl HttpServer {
    /// Create a new server around an already-built manager.
    pub fn new(config: &AppConfig, manager: HealthManager) -> Self {
        let health = HealthHandle::new(manager, config.health.timeout());
        let state = AppState {
            health: health.clone(),
        };
        let router = Self::build_router(&config.health, state);
        Self {
            router,
            health,
            config: config.health.clone(),
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &HealthConfig, state: AppState) -> Router {
        let request_id = HeaderName::from_static(X_REQUEST_ID);
        Router::new()
            .route(&config.path, get(health_handler))
            .route(&config.live_path(), get(live_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::new(request_id)),
            )
    }

    /// Handle used by the reload path and by tests.
    pub fn health(&self) -> HealthHandle {
        self.health.clone()
    }

    /// Router without a listener, for in-process requests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve on `listener` until `shutdown` fires.
    ///
    /// Validated configs arriving on `config_updates` replace the probe
    /// set; the route paths stay as they were at startup.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<AppConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            path = %self.config.path,
            timeout_ms = self.config.timeout_ms,
            "Health server starting"
        );

        let health = self.health.clone();
        let path = self.config.path.clone();
        let mut reload_shutdown = shutdown.resubscribe();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    update = config_updates.recv() => match update {
                        Some(config) => apply_reload(&health, &config, &path),
                        None => break,
                    },
                    _ = reload_shutdown.recv() => break,
                }
            }
        });

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

fn apply_reload(health: &HealthHandle, config: &AppConfig, path: &str) {
    if config.health.path != path {
        tracing::warn!(
            current = %path,
            requested = %config.health.path,
            "health.path changes need a restart; keeping current path"
        );
    }
    match health.reload(config) {
        Ok(removed) => tracing::info!(
            probes = config.probes.len(),
            removed = ?removed,
            timeout_ms = config.health.timeout_ms,
            "Probe set reloaded"
        ),
        Err(e) => tracing::error!(error = %e, "Reload rejected, keeping current probes"),
    }
}

async fn health_handler(State(state): State<AppState>) -> AggregateResponse {
    state.health.check().await
}

async fn live_handler() -> &'static str {
    "ok"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProbeConfig;
    use crate::health::Condition;
    use crate::probes::{probe_fn, ProbeReport};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn server_with(condition: Condition) -> HttpServer {
        let mut manager = HealthManager::new("test");
        manager
            .register(
                "dep",
                probe_fn("dep", move |_ctx| async move { ProbeReport::new(condition, "") }),
            )
            .unwrap();
        HttpServer::new(&AppConfig::default(), manager)
    }

    async fn get(router: Router, uri: &str) -> axum::response::Response {
        router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_route_maps_status() {
        let res = get(server_with(Condition::Degraded).router(), "/health").await;
        assert_eq!(res.status(), StatusCode::OK);
        assert!(res.headers().contains_key(X_REQUEST_ID));

        let res = get(server_with(Condition::Unhealthy).router(), "/health").await;
        assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_live_route_runs_no_probes() {
        let res = get(server_with(Condition::Unhealthy).router(), "/health/live").await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_reload_swaps_probe_set() {
        let server = server_with(Condition::Healthy);
        let handle = server.health();
        assert_eq!(handle.current().manager.probe_names(), vec!["dep".to_string()]);

        let mut config = AppConfig::default();
        config.health.timeout_ms = 1234;
        config.probes.push(ProbeConfig {
            name: "tcp".into(),
            kind: Default::default(),
            address: "127.0.0.1:1".into(),
            timeout_ms: None,
            degraded_after_ms: None,
        });
        let removed = handle.reload(&config).unwrap();
        assert_eq!(removed, vec!["dep".to_string()]);

        let active = handle.current();
        assert_eq!(active.manager.probe_names(), vec!["tcp".to_string()]);
        assert_eq!(active.timeout, Duration::from_millis(1234));

        // Reloading the same set removes nothing.
        assert!(handle.reload(&config).unwrap().is_empty());
    }
}
