// # Cloudflare DNS Provider
//
// This crate provides the Cloudflare DNS provider for the DDNS reconciler.
//
// ## Behavior
//
// - One HTTP request per trait call
// - HTTP timeout configured (30 seconds)
// - The response envelope's `success` flag wins over the HTTP status
// - Missing zones and records are `Error::NotFound`; records are never created
// - No retry, backoff or caching (the engine's schedule is the retry)
//
// ## Security Requirements
//
// - API token NEVER appears in logs or `Debug` output
// - Construction fails fast if the token is empty
//
// ## API Reference
//
// - Cloudflare API v4: https://developers.cloudflare.com/api/
// - List Zones: GET `/zones?name=...`
// - List DNS Records: GET `/zones/:zone_id/dns_records?type=A&name=...`
// - Patch DNS Record: PATCH `/zones/:zone_id/dns_records/:record_id`

mod api;

pub use api::{RECORD_TTL, RECORD_TYPE};

use async_trait::async_trait;
use ddns_core::traits::{DnsProvider, RecordSnapshot, ZoneId};
use ddns_core::{Error, Result};
use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::net::Ipv4Addr;
use std::time::Duration;

use api::{DnsRecord, UpdateRequest, Zone};

/// Cloudflare API base URL
pub const CLOUDFLARE_API_BASE: &str = "https://api.cloudflare.com/client/v4";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

pub(crate) const PROVIDER_NAME: &str = "cloudflare";

/// Cloudflare DNS provider
///
/// Stateless between calls: the zone id is passed in by the engine, and
/// record snapshots are never cached.
pub struct CloudflareProvider {
    /// Cloudflare API token
    /// ⚠️ NEVER log this value
    api_token: String,

    /// API root, overridable for tests
    base_url: String,

    /// HTTP client for API requests
    client: reqwest::Client,
}

// Custom Debug implementation that hides the API token
impl std::fmt::Debug for CloudflareProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudflareProvider")
            .field("api_token", &"<REDACTED>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl CloudflareProvider {
    /// Create a new Cloudflare provider
    ///
    /// # Parameters
    ///
    /// - `api_token`: Cloudflare API token with Zone:Read and DNS:Edit permissions
    ///
    /// # Errors
    ///
    /// `Error::Config` if the token is empty or the HTTP client cannot be built.
    pub fn new(api_token: impl Into<String>) -> Result<Self> {
        let api_token = api_token.into();
        if api_token.trim().is_empty() {
            return Err(Error::config("Cloudflare API token cannot be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_token,
            base_url: CLOUDFLARE_API_BASE.to_string(),
            client,
        })
    }

    /// Point the provider at a different API root (e.g. a mock server)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// API root in use
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send one request and decode its `result`
    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        what: &str,
    ) -> Result<T> {
        api::decode(self.execute(request, what).await?, what)
    }

    /// Authenticate and send one request, returning the `result` of a
    /// successful envelope
    async fn execute(
        &self,
        request: reqwest::RequestBuilder,
        what: &str,
    ) -> Result<Option<Value>> {
        let response = request
            .bearer_auth(&self.api_token)
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(|e| Error::network(format!("{} request failed: {}", what, e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::network(format!("Failed to read {} response: {}", what, e)))?;

        tracing::trace!("{} answered with HTTP {}", what, status);
        api::verdict(status, &body, what)
    }
}

#[async_trait]
impl DnsProvider for CloudflareProvider {
    /// # API Call
    ///
    /// ```http
    /// GET /zones?name=example.com
    /// Authorization: Bearer <token>
    /// ```
    async fn resolve_zone(&self, domain: &str) -> Result<ZoneId> {
        tracing::debug!("Looking up zone ID for domain: {}", domain);

        let url = format!("{}/zones", self.base_url);
        let zones: Vec<Zone> = self
            .send(self.client.get(&url).query(&[("name", domain)]), "zone lookup")
            .await?;

        let zone = zones
            .into_iter()
            .next()
            .ok_or_else(|| Error::not_found(format!("Zone not found: {}", domain)))?;

        tracing::debug!("Found zone {} ({})", zone.name, zone.id);
        ZoneId::new(zone.id).ok_or_else(|| {
            Error::provider(
                PROVIDER_NAME,
                format!("Zone lookup for {} returned an empty zone ID", domain),
            )
        })
    }

    /// # API Call
    ///
    /// ```http
    /// GET /zones/:zone_id/dns_records?type=A&name=ddns.example.com
    /// Authorization: Bearer <token>
    /// ```
    async fn resolve_record(&self, zone: &ZoneId, hostname: &str) -> Result<RecordSnapshot> {
        tracing::debug!("Looking up {} record: {}", RECORD_TYPE, hostname);

        let url = format!("{}/zones/{}/dns_records", self.base_url, zone);
        let records: Vec<DnsRecord> = self
            .send(
                self.client
                    .get(&url)
                    .query(&[("type", RECORD_TYPE), ("name", hostname)]),
                "record lookup",
            )
            .await?;

        let record = records.into_iter().next().ok_or_else(|| {
            Error::not_found(format!(
                "DNS record not found: {} (type: {})",
                hostname, RECORD_TYPE
            ))
        })?;

        tracing::debug!("Found record ID: {}", record.id);
        Ok(record.into())
    }

    /// # API Call
    ///
    /// ```http
    /// PATCH /zones/:zone_id/dns_records/:record_id
    /// {"type": "A", "name": "ddns.example.com", "content": "203.0.113.7", "ttl": 120}
    /// ```
    async fn update_record(
        &self,
        zone: &ZoneId,
        record: &RecordSnapshot,
        new_ip: Ipv4Addr,
    ) -> Result<RecordSnapshot> {
        tracing::info!(
            "Updating Cloudflare DNS record: {} -> {} (was: {})",
            record.name,
            new_ip,
            record.content
        );

        let url = format!(
            "{}/zones/{}/dns_records/{}",
            self.base_url, zone, record.id
        );
        let payload = UpdateRequest {
            record_type: RECORD_TYPE,
            name: &record.name,
            content: new_ip.to_string(),
            ttl: RECORD_TTL,
        };

        let result = self
            .execute(self.client.patch(&url).json(&payload), "record update")
            .await?;

        // `success` alone confirms the update; the echoed record is optional
        match result.map(serde_json::from_value::<DnsRecord>) {
            Some(Ok(updated)) => Ok(updated.into()),
            _ => {
                tracing::debug!("Update accepted without a usable record in the response");
                Ok(RecordSnapshot {
                    content: new_ip.to_string(),
                    ..record.clone()
                })
            }
        }
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }
}
