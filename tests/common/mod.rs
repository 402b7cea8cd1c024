//! Shared probes, mock clients and server helpers for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};

use health_aggregator::config::AppConfig;
use health_aggregator::health::{CheckContext, Condition, HealthManager, Outcome, Probe};
use health_aggregator::http::HttpServer;
use health_aggregator::lifecycle::Shutdown;
use health_aggregator::probes::{
    BusClient, BusStats, CacheClient, PoolStats, ProbeError, StoreClient,
};

/// Probe that sleeps for `delay` and then reports `condition`.
pub struct ScriptedProbe {
    pub name: String,
    pub condition: Condition,
    pub delay: Duration,
    pub calls: Arc<AtomicU64>,
}

impl ScriptedProbe {
    pub fn new(name: &str, condition: Condition, delay: Duration) -> Self {
        Self {
            name: name.into(),
            condition,
            delay,
            calls: Arc::new(AtomicU64::new(0)),
        }
    }
}

#[async_trait]
impl Probe for ScriptedProbe {
    async fn execute(&self, _ctx: CheckContext) -> Outcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        Outcome::new(&self.name, self.condition, format!("{} after {:?}", self.condition, self.delay))
            .with_duration(self.delay)
    }
}

/// Probe that panics every time it runs.
pub struct PanickingProbe;

#[async_trait]
impl Probe for PanickingProbe {
    async fn execute(&self, _ctx: CheckContext) -> Outcome {
        panic!("driver exploded");
    }
}

/// Store whose ping fails or succeeds and whose pool reports `stats`.
pub struct MockStore {
    pub reachable: bool,
    pub stats: PoolStats,
}

#[async_trait]
impl StoreClient for MockStore {
    async fn ping(&self) -> Result<(), ProbeError> {
        if self.reachable {
            Ok(())
        } else {
            Err(ProbeError::Unreachable("connection refused".into()))
        }
    }

    fn pool_stats(&self) -> PoolStats {
        self.stats
    }
}

pub struct MockCache {
    pub ping_ok: bool,
    pub info_ok: bool,
}

#[async_trait]
impl CacheClient for MockCache {
    async fn ping(&self) -> Result<String, ProbeError> {
        if self.ping_ok {
            Ok("PONG".into())
        } else {
            Err(ProbeError::Unreachable("no route to host".into()))
        }
    }

    async fn info(&self, sections: &[&str]) -> Result<String, ProbeError> {
        if self.info_ok {
            Ok(sections.join(","))
        } else {
            Err(ProbeError::Client("ERR unknown command".into()))
        }
    }
}

pub struct MockBus {
    pub connected: bool,
    pub reconnects: u64,
}

impl BusClient for MockBus {
    fn is_connected(&self) -> bool {
        self.connected
    }

    fn stats(&self) -> BusStats {
        BusStats {
            in_msgs: 10,
            out_msgs: 12,
            in_bytes: 1024,
            out_bytes: 2048,
            reconnects: self.reconnects,
        }
    }
}

/// Start the HTTP server on an ephemeral port.
///
/// Returns the bound address, the config-update sender and the shutdown
/// handle; dropping the handle does not stop the server, `trigger` does.
pub async fn start_server(
    config: &AppConfig,
    manager: HealthManager,
) -> (SocketAddr, mpsc::UnboundedSender<AppConfig>, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (update_tx, update_rx) = mpsc::unbounded_channel();
    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, manager);
    let rx: broadcast::Receiver<()> = shutdown.subscribe();
    tokio::spawn(server.run(listener, update_rx, rx));
    tokio::time::sleep(Duration::from_millis(50)).await;
    (addr, update_tx, shutdown)
}

/// Listener that accepts and holds connections; its address is a live
/// dependency for TCP probes.
pub async fn start_tcp_dependency() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    addr
}

/// An address nothing listens on.
pub async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}
