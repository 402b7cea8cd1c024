//! End-to-end behaviour of a check pass across the probe variants.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::{Duration, Instant};

use health_aggregator::health::{CheckContext, Condition, HealthManager, PENDING_KEY, REASON_KEY};
use health_aggregator::probes::{BusProbe, CacheProbe, PoolStats, StoreProbe};

mod common;
use common::{MockBus, MockCache, MockStore, PanickingProbe, ScriptedProbe};

fn scripted(conditions: &[(&str, Condition)]) -> HealthManager {
    let mut manager = HealthManager::new("it");
    for (name, condition) in conditions {
        manager
            .register(*name, ScriptedProbe::new(name, *condition, Duration::from_millis(5)))
            .unwrap();
    }
    manager
}

#[tokio::test]
async fn test_all_healthy_is_healthy() {
    let manager = scripted(&[
        ("a", Condition::Healthy),
        ("b", Condition::Healthy),
        ("c", Condition::Healthy),
    ]);
    let response = manager.check(&CheckContext::with_timeout(Duration::from_secs(1))).await;
    assert_eq!(response.condition, Condition::Healthy);
    assert_eq!(response.outcomes.len(), 3);
    assert!(!response.timed_out());
}

#[tokio::test]
async fn test_one_unhealthy_outweighs_many_healthy() {
    let mut conditions: Vec<(String, Condition)> =
        (0..10).map(|i| (format!("ok-{}", i), Condition::Healthy)).collect();
    conditions.push(("broken".into(), Condition::Unhealthy));
    let refs: Vec<(&str, Condition)> = conditions.iter().map(|(n, c)| (n.as_str(), *c)).collect();

    let response = scripted(&refs)
        .check(&CheckContext::with_timeout(Duration::from_secs(1)))
        .await;
    assert_eq!(response.condition, Condition::Unhealthy);
    assert_eq!(response.outcomes.len(), 11);
}

#[tokio::test]
async fn test_worst_degraded_is_degraded() {
    let manager = scripted(&[("a", Condition::Healthy), ("b", Condition::Degraded)]);
    let response = manager.check(&CheckContext::with_timeout(Duration::from_secs(1))).await;
    assert_eq!(response.condition, Condition::Degraded);
}

#[tokio::test]
async fn test_store_cache_bus_scenario() {
    let mut manager = HealthManager::new("1.0.0");
    manager
        .register(
            "store",
            StoreProbe::new(Arc::new(MockStore {
                reachable: true,
                stats: PoolStats {
                    open_connections: 3,
                    in_use: 1,
                    idle: 2,
                    wait_count: 0,
                    max_open_connections: 10,
                },
            })),
        )
        .unwrap();
    manager
        .register(
            "cache",
            CacheProbe::new(Arc::new(MockCache {
                ping_ok: true,
                info_ok: false,
            })),
        )
        .unwrap();
    manager
        .register(
            "bus",
            BusProbe::new(Arc::new(MockBus {
                connected: false,
                reconnects: 0,
            })),
        )
        .unwrap();

    let response = manager.check(&CheckContext::with_timeout(Duration::from_secs(1))).await;

    assert_eq!(response.condition, Condition::Unhealthy);
    assert_eq!(response.outcomes.len(), 3);
    assert_eq!(response.outcomes["store"].condition, Condition::Healthy);
    assert_eq!(response.outcomes["cache"].condition, Condition::Degraded);
    assert_eq!(response.outcomes["bus"].condition, Condition::Unhealthy);
    assert_eq!(response.outcomes["store"].metadata["open_connections"], 3);
    assert_eq!(response.version, "1.0.0");
}

#[tokio::test]
async fn test_deadline_returns_promptly() {
    let mut manager = HealthManager::new("it");
    manager
        .register(
            "probe_a",
            ScriptedProbe::new("probe_a", Condition::Healthy, Duration::from_secs(5)),
        )
        .unwrap();

    let started = Instant::now();
    let response = manager
        .check(&CheckContext::with_timeout(Duration::from_millis(50)))
        .await;
    let elapsed = started.elapsed();

    assert_eq!(response.condition, Condition::Unhealthy);
    assert!(response.outcomes.is_empty());
    assert!(response.timed_out());
    assert!(elapsed < Duration::from_millis(500), "took {:?}", elapsed);
}

#[tokio::test]
async fn test_deadline_keeps_partial_outcomes() {
    let mut manager = HealthManager::new("it");
    manager
        .register("fast", ScriptedProbe::new("fast", Condition::Healthy, Duration::ZERO))
        .unwrap();
    manager
        .register(
            "slow",
            ScriptedProbe::new("slow", Condition::Healthy, Duration::from_secs(5)),
        )
        .unwrap();

    let response = manager
        .check(&CheckContext::with_timeout(Duration::from_millis(100)))
        .await;

    assert_eq!(response.condition, Condition::Unhealthy);
    assert_eq!(response.outcomes.len(), 1);
    assert!(response.outcomes.contains_key("fast"));
    assert_eq!(response.metadata[PENDING_KEY], serde_json::json!(["slow"]));
}

#[tokio::test]
async fn test_cancellation_mid_pass() {
    let mut manager = HealthManager::new("it");
    manager
        .register(
            "slow",
            ScriptedProbe::new("slow", Condition::Healthy, Duration::from_secs(5)),
        )
        .unwrap();

    let ctx = CheckContext::background();
    let canceller = ctx.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        canceller.cancel();
    });

    let response = manager.check(&ctx).await;
    assert_eq!(response.condition, Condition::Unhealthy);
    assert!(response.outcomes.is_empty());
    assert_eq!(response.metadata[REASON_KEY], "check cancelled");
}

#[tokio::test]
async fn test_repeated_checks_agree() {
    let manager = scripted(&[("a", Condition::Healthy), ("b", Condition::Degraded)]);
    let first = manager.check(&CheckContext::with_timeout(Duration::from_secs(1))).await;
    let second = manager.check(&CheckContext::with_timeout(Duration::from_secs(1))).await;
    assert_eq!(first.condition, second.condition);
    assert_eq!(first.outcomes.len(), second.outcomes.len());
}

#[tokio::test]
async fn test_probes_run_concurrently() {
    let mut manager = HealthManager::new("it");
    let mut counters = Vec::new();
    for i in 0..5 {
        let name = format!("p{}", i);
        let probe = ScriptedProbe::new(&name, Condition::Healthy, Duration::from_millis(200));
        counters.push(probe.calls.clone());
        manager.register(name, probe).unwrap();
    }

    let started = Instant::now();
    let response = manager.check(&CheckContext::with_timeout(Duration::from_secs(2))).await;

    assert_eq!(response.condition, Condition::Healthy);
    assert!(started.elapsed() < Duration::from_millis(800));
    assert!(counters.iter().all(|c| c.load(Ordering::SeqCst) == 1));
}

#[tokio::test]
async fn test_panicking_probe_is_contained() {
    let mut manager = scripted(&[("ok", Condition::Healthy)]);
    manager.register("boom", PanickingProbe).unwrap();

    let response = manager.check(&CheckContext::with_timeout(Duration::from_secs(1))).await;
    assert_eq!(response.condition, Condition::Unhealthy);
    assert_eq!(response.outcomes.len(), 2);
    assert!(response.outcomes["boom"].message.contains("driver exploded"));

    // The manager stays usable after a panic.
    let again = manager.check(&CheckContext::with_timeout(Duration::from_secs(1))).await;
    assert_eq!(again.outcomes.len(), 2);
}

#[tokio::test]
async fn test_empty_registry() {
    let response = HealthManager::new("it")
        .check(&CheckContext::with_timeout(Duration::from_millis(10)))
        .await;
    assert_eq!(response.condition, Condition::Healthy);
    assert!(response.outcomes.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_cancelled_context_never_reports_healthy() {
    let mut manager = HealthManager::new("it");
    manager
        .register("instant", ScriptedProbe::new("instant", Condition::Healthy, Duration::ZERO))
        .unwrap();

    let mut healthy = 0;
    for _ in 0..2000 {
        let ctx = CheckContext::background();
        ctx.cancel();
        let response = manager.check(&ctx).await;
        if response.condition != Condition::Unhealthy {
            healthy += 1;
        }
    }
    assert_eq!(healthy, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_expired_deadline_never_reports_healthy() {
    let mut manager = HealthManager::new("it");
    manager
        .register("instant", ScriptedProbe::new("instant", Condition::Healthy, Duration::ZERO))
        .unwrap();

    for _ in 0..500 {
        let ctx = CheckContext::with_deadline(tokio::time::Instant::now());
        let response = manager.check(&ctx).await;
        assert_eq!(response.condition, Condition::Unhealthy);
        assert_eq!(response.metadata[REASON_KEY], "deadline exceeded");
    }
}
