//! Test doubles and common utilities for engine contract tests
//!
//! Every double hands out shared counters so a test can keep a handle after
//! the engine takes ownership of the boxed trait object.

#![allow(dead_code)]

use ddns_core::error::{Error, Result};
use ddns_core::traits::{DnsProvider, IpSource, RecordSnapshot, StateStore, ZoneId};
use ddns_core::DdnsConfig;
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const ZONE_ID: &str = "023e105f4ecef8ad9ca31a8372d0c353";
pub const RECORD_ID: &str = "372e67954025e0ba6aaa6d586b9e0b59";

/// An IpSource whose answer can be changed between cycles
#[derive(Clone)]
pub struct ControlledIpSource {
    current: Arc<Mutex<Option<Ipv4Addr>>>,
    call_count: Arc<AtomicUsize>,
}

impl ControlledIpSource {
    pub fn new(ip: Ipv4Addr) -> Self {
        Self {
            current: Arc::new(Mutex::new(Some(ip))),
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A source that always fails with a network error
    pub fn unreachable() -> Self {
        Self {
            current: Arc::new(Mutex::new(None)),
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn set_ip(&self, ip: Ipv4Addr) {
        *self.current.lock().unwrap() = Some(ip);
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl IpSource for ControlledIpSource {
    async fn current(&self) -> Result<Ipv4Addr> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        (*self.current.lock().unwrap()).ok_or_else(|| Error::network("connection refused"))
    }

    fn source_name(&self) -> &'static str {
        "controlled"
    }
}

/// A DnsProvider that keeps one record in memory and counts calls
#[derive(Clone)]
pub struct MockDnsProvider {
    zone_calls: Arc<AtomicUsize>,
    lookup_calls: Arc<AtomicUsize>,
    update_calls: Arc<AtomicUsize>,
    record_content: Arc<Mutex<Option<String>>>,
    zone_fails: Arc<AtomicBool>,
    update_fails: Arc<AtomicBool>,
    updated_values: Arc<Mutex<Vec<Ipv4Addr>>>,
    looked_up_hostnames: Arc<Mutex<Vec<String>>>,
}

impl MockDnsProvider {
    /// A provider whose record currently holds `content`
    pub fn with_record(content: &str) -> Self {
        Self {
            zone_calls: Arc::new(AtomicUsize::new(0)),
            lookup_calls: Arc::new(AtomicUsize::new(0)),
            update_calls: Arc::new(AtomicUsize::new(0)),
            record_content: Arc::new(Mutex::new(Some(content.to_string()))),
            zone_fails: Arc::new(AtomicBool::new(false)),
            update_fails: Arc::new(AtomicBool::new(false)),
            updated_values: Arc::new(Mutex::new(Vec::new())),
            looked_up_hostnames: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A provider whose zone has no A record for the hostname
    pub fn without_record() -> Self {
        let provider = Self::with_record("");
        *provider.record_content.lock().unwrap() = None;
        provider
    }

    /// Simulate an out-of-band edit of the record
    pub fn set_record_content(&self, content: &str) {
        *self.record_content.lock().unwrap() = Some(content.to_string());
    }

    pub fn fail_zone(&self, fail: bool) {
        self.zone_fails.store(fail, Ordering::SeqCst);
    }

    pub fn fail_updates(&self, fail: bool) {
        self.update_fails.store(fail, Ordering::SeqCst);
    }

    pub fn zone_calls(&self) -> usize {
        self.zone_calls.load(Ordering::SeqCst)
    }

    pub fn lookup_calls(&self) -> usize {
        self.lookup_calls.load(Ordering::SeqCst)
    }

    pub fn update_calls(&self) -> usize {
        self.update_calls.load(Ordering::SeqCst)
    }

    /// Record lookups plus updates
    pub fn record_calls(&self) -> usize {
        self.lookup_calls() + self.update_calls()
    }

    pub fn record_content(&self) -> Option<String> {
        self.record_content.lock().unwrap().clone()
    }

    pub fn updated_values(&self) -> Vec<Ipv4Addr> {
        self.updated_values.lock().unwrap().clone()
    }

    pub fn looked_up_hostnames(&self) -> Vec<String> {
        self.looked_up_hostnames.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl DnsProvider for MockDnsProvider {
    async fn resolve_zone(&self, domain: &str) -> Result<ZoneId> {
        self.zone_calls.fetch_add(1, Ordering::SeqCst);
        if self.zone_fails.load(Ordering::SeqCst) {
            return Err(Error::not_found(format!("Zone not found: {}", domain)));
        }
        Ok(ZoneId::new(ZONE_ID).unwrap())
    }

    async fn resolve_record(&self, zone: &ZoneId, hostname: &str) -> Result<RecordSnapshot> {
        self.lookup_calls.fetch_add(1, Ordering::SeqCst);
        assert_eq!(zone.as_str(), ZONE_ID);
        self.looked_up_hostnames
            .lock()
            .unwrap()
            .push(hostname.to_string());

        let content = self
            .record_content
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| Error::not_found(format!("DNS record not found: {}", hostname)))?;

        Ok(RecordSnapshot {
            id: RECORD_ID.to_string(),
            name: hostname.to_string(),
            content,
            record_type: "A".to_string(),
        })
    }

    async fn update_record(
        &self,
        _zone: &ZoneId,
        record: &RecordSnapshot,
        new_ip: Ipv4Addr,
    ) -> Result<RecordSnapshot> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        if self.update_fails.load(Ordering::SeqCst) {
            return Err(Error::provider("mock", "DNS record update rejected"));
        }

        self.updated_values.lock().unwrap().push(new_ip);
        *self.record_content.lock().unwrap() = Some(new_ip.to_string());

        Ok(RecordSnapshot {
            content: new_ip.to_string(),
            ..record.clone()
        })
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// A StateStore that loads a fixed value and refuses every save
#[derive(Clone)]
pub struct ReadOnlyStateStore {
    last_ip: Option<Ipv4Addr>,
    save_attempts: Arc<AtomicUsize>,
}

impl ReadOnlyStateStore {
    pub fn new(last_ip: Option<Ipv4Addr>) -> Self {
        Self {
            last_ip,
            save_attempts: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn save_attempts(&self) -> usize {
        self.save_attempts.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl StateStore for ReadOnlyStateStore {
    async fn load(&self) -> Option<Ipv4Addr> {
        self.last_ip
    }

    async fn save(&self, _ip: Ipv4Addr) -> Result<()> {
        self.save_attempts.fetch_add(1, Ordering::SeqCst);
        Err(Error::state_store("read-only file system"))
    }
}

/// Helper to create a minimal DdnsConfig for testing
pub fn minimal_config() -> DdnsConfig {
    DdnsConfig::new("test-token", "example.com").with_interval(Duration::from_secs(60))
}

pub fn ip(s: &str) -> Ipv4Addr {
    s.parse().unwrap()
}

pub fn zone() -> ZoneId {
    ZoneId::new(ZONE_ID).unwrap()
}
