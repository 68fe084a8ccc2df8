// # HTTP IP Source
//
// This crate discovers the public IPv4 address by asking an address-echo
// service (default: https://api.ip.sb/ip) that answers with the caller's
// address as plain text.
//
// ## Behavior
//
// - One GET per call, 10 second timeout
// - The body is trimmed and must parse as an IPv4 address
// - No caching and no retry: every cycle observes the live address

use ddns_core::config::DEFAULT_IP_ECHO_URL;
use ddns_core::traits::IpSource;
use ddns_core::{Error, Result};

use std::net::Ipv4Addr;
use std::time::Duration;

/// Timeout for a single echo request
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// IP source backed by a plain-text address-echo service
#[derive(Debug, Clone)]
pub struct HttpIpSource {
    /// URL to fetch the address from
    url: String,

    /// HTTP client
    client: reqwest::Client,
}

impl HttpIpSource {
    /// Create a new HTTP IP source
    ///
    /// # Parameters
    ///
    /// - `url`: echo service URL (e.g., "https://api.ip.sb/ip")
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let url = url.into();
        if url.trim().is_empty() {
            return Err(Error::config("IP echo URL cannot be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { url, client })
    }

    /// Source pointed at the default echo service
    pub fn with_default_url() -> Result<Self> {
        Self::new(DEFAULT_IP_ECHO_URL)
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait::async_trait]
impl IpSource for HttpIpSource {
    async fn current(&self) -> Result<Ipv4Addr> {
        tracing::debug!("Fetching public IP from {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| Error::network(format!("IP lookup request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::network(format!(
                "IP lookup returned HTTP {}",
                status
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::network(format!("Failed to read IP lookup response: {}", e)))?;

        parse_ipv4(&body)
    }

    fn source_name(&self) -> &'static str {
        "http"
    }
}

/// Parse an echo service body into an IPv4 address
fn parse_ipv4(body: &str) -> Result<Ipv4Addr> {
    let text = body.trim();
    text.parse()
        .map_err(|_| Error::ip_source(format!("Invalid IPv4 address from echo service: {:?}", text)))
}
