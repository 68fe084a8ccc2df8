//! Contract Test: Scheduling & Shutdown
//!
//! Constraints verified:
//! - The zone is resolved exactly once per run, before any record call
//! - A zone resolution failure ends the run with an error
//! - The first cycle runs immediately, later ones on the interval
//! - Failed cycles are reported and never stop later ticks
//! - Shutdown is observed while waiting, and the run returns cleanly
//!
//! All tests run on a paused clock, so intervals cost no wall time.

mod common;

use common::*;
use ddns_core::{DdnsEngine, EngineEvent, Error, MemoryStateStore};
use ddns_core::traits::StateStore;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio_test::{assert_err, assert_ok};

fn build_engine(
    ip_source: &ControlledIpSource,
    provider: &MockDnsProvider,
    store: &MemoryStateStore,
) -> (DdnsEngine, mpsc::Receiver<EngineEvent>) {
    DdnsEngine::new(
        Box::new(ip_source.clone()),
        Box::new(provider.clone()),
        Box::new(store.clone()),
        minimal_config(),
    )
    .expect("engine construction succeeds")
}

fn drain(rx: &mut mpsc::Receiver<EngineEvent>) -> Vec<EngineEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

#[tokio::test(start_paused = true)]
async fn first_cycle_is_immediate_then_every_interval() {
    let ip_source = ControlledIpSource::new(ip("203.0.113.7"));
    let provider = MockDnsProvider::with_record("198.51.100.1");
    let store = MemoryStateStore::new();
    let (engine, _rx) = build_engine(&ip_source, &provider, &store);

    // Ticks at 0s, 60s and 120s
    let result = engine
        .run_until(tokio::time::sleep(Duration::from_secs(150)))
        .await;

    assert_ok!(result);
    assert_eq!(provider.zone_calls(), 1, "zone is resolved once per run");
    assert_eq!(ip_source.call_count(), 3);
    assert_eq!(provider.update_calls(), 1, "only the first cycle updates");
    assert_eq!(store.load().await, Some(ip("203.0.113.7")));
}

#[tokio::test(start_paused = true)]
async fn failed_cycles_do_not_stop_the_loop() {
    let ip_source = ControlledIpSource::unreachable();
    let provider = MockDnsProvider::with_record("198.51.100.1");
    let store = MemoryStateStore::new();
    let (engine, mut rx) = build_engine(&ip_source, &provider, &store);

    // Ticks at 0s, 60s, 120s and 180s
    let result = engine
        .run_until(tokio::time::sleep(Duration::from_secs(190)))
        .await;

    assert_ok!(result, "cycle failures must not propagate");
    assert_eq!(ip_source.call_count(), 4);
    assert_eq!(provider.record_calls(), 0);

    let events = drain(&mut rx);
    let failures = events
        .iter()
        .filter(|e| matches!(e, EngineEvent::CycleFailed { .. }))
        .count();
    assert_eq!(failures, 4);
    assert!(matches!(events.last(), Some(EngineEvent::Stopped { .. })));
}

#[tokio::test(start_paused = true)]
async fn zone_resolution_failure_is_fatal() {
    let ip_source = ControlledIpSource::new(ip("203.0.113.7"));
    let provider = MockDnsProvider::with_record("198.51.100.1");
    provider.fail_zone(true);
    let store = MemoryStateStore::new();
    let (engine, mut rx) = build_engine(&ip_source, &provider, &store);

    let err = assert_err!(engine.run_until(std::future::pending()).await);

    assert!(matches!(err, Error::NotFound(_)));
    assert_eq!(provider.zone_calls(), 1, "no internal retry");
    assert_eq!(ip_source.call_count(), 0, "no cycle without a zone");

    let events = drain(&mut rx);
    assert_eq!(
        events.first(),
        Some(&EngineEvent::Started {
            hostname: "ddns.example.com".to_string()
        })
    );
    assert!(matches!(events.last(), Some(EngineEvent::Stopped { .. })));
}

#[tokio::test(start_paused = true)]
async fn pending_shutdown_wins_before_zone_resolution() {
    let ip_source = ControlledIpSource::new(ip("203.0.113.7"));
    let provider = MockDnsProvider::with_record("198.51.100.1");
    let store = MemoryStateStore::new();
    let (engine, _rx) = build_engine(&ip_source, &provider, &store);

    assert_ok!(engine.run_until(async {}).await);

    assert_eq!(provider.zone_calls(), 0);
    assert_eq!(ip_source.call_count(), 0);
    assert_eq!(store.load().await, None);
}

#[tokio::test(start_paused = true)]
async fn shutdown_while_waiting_for_next_tick() {
    let ip_source = ControlledIpSource::new(ip("203.0.113.7"));
    let provider = MockDnsProvider::with_record("198.51.100.1");
    let store = MemoryStateStore::new();
    let (engine, _rx) = build_engine(&ip_source, &provider, &store);

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let engine_handle = tokio::spawn(async move {
        engine
            .run_until(async {
                let _ = shutdown_rx.await;
            })
            .await
    });

    // Cycles at 0s and 60s, shutdown at 61s
    tokio::time::sleep(Duration::from_secs(61)).await;
    shutdown_tx.send(()).unwrap();

    let result = engine_handle.await.expect("engine task does not panic");
    assert_ok!(result);
    assert_eq!(ip_source.call_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn address_change_between_ticks_is_pushed() {
    let ip_source = ControlledIpSource::new(ip("198.51.100.1"));
    let provider = MockDnsProvider::with_record("192.0.2.1");
    let store = MemoryStateStore::new();
    let (engine, _rx) = build_engine(&ip_source, &provider, &store);

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let engine_handle = tokio::spawn(async move {
        engine
            .run_until(async {
                let _ = shutdown_rx.await;
            })
            .await
    });

    tokio::time::sleep(Duration::from_secs(30)).await;
    ip_source.set_ip(ip("203.0.113.7"));

    // The 60s tick picks up the change, the 120s tick is a no-op
    tokio::time::sleep(Duration::from_secs(100)).await;
    shutdown_tx.send(()).unwrap();
    assert_ok!(engine_handle.await.unwrap());

    assert_eq!(
        provider.updated_values(),
        vec![ip("198.51.100.1"), ip("203.0.113.7")]
    );
    assert_eq!(provider.lookup_calls(), 2);
    assert_eq!(store.load().await, Some(ip("203.0.113.7")));
}
