// # DNS Provider Trait
//
// Defines the interface for reading and updating an A record via a provider API.
//
// ## Implementations
//
// - Cloudflare: `ddns-provider-cloudflare` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::DnsProvider;
//
// let provider = /* DnsProvider implementation */;
// let zone = provider.resolve_zone("example.com").await?;
// let record = provider.resolve_record(&zone, "ddns.example.com").await?;
// provider.update_record(&zone, &record, "203.0.113.7".parse()?).await?;
// ```

use async_trait::async_trait;
use std::fmt;
use std::net::Ipv4Addr;

/// Opaque provider-assigned identifier of a DNS zone
///
/// Never empty. Resolved once per process run.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ZoneId(String);

impl ZoneId {
    /// Wrap a provider zone identifier; `None` for blank values
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return None;
        }
        Some(Self(id))
    }

    /// The raw identifier
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A DNS record as last observed at the provider
///
/// Only valid for the call that produced it; re-fetched before every update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSnapshot {
    /// Provider record identifier
    pub id: String,
    /// Fully-qualified record name
    pub name: String,
    /// Current record value as stored remotely (not necessarily a valid IP)
    pub content: String,
    /// Record type, always "A" here
    pub record_type: String,
}

/// Trait for DNS provider implementations
///
/// # Contract
///
/// - Each method is a single request/response exchange
/// - No retry or backoff (owned by the engine's schedule)
/// - No caching between calls
/// - Missing records are reported as `Error::NotFound`, never created
/// - A provider-level failure flag in the response body wins over the HTTP status
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Look up the zone for an exact domain name
    ///
    /// On several matches the first one is authoritative.
    async fn resolve_zone(&self, domain: &str) -> Result<ZoneId, crate::Error>;

    /// Look up the A record for an exact hostname within a zone
    async fn resolve_record(
        &self,
        zone: &ZoneId,
        hostname: &str,
    ) -> Result<RecordSnapshot, crate::Error>;

    /// Point an existing A record at a new address
    ///
    /// # Returns
    ///
    /// The record as reported by the provider after the update.
    async fn update_record(
        &self,
        zone: &ZoneId,
        record: &RecordSnapshot,
        new_ip: Ipv4Addr,
    ) -> Result<RecordSnapshot, crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
