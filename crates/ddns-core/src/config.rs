//! Configuration types for the DDNS system
//!
//! [`DdnsConfig`] is built once at startup and handed to the engine by value.
//! Nothing mutates it afterwards.

use std::path::PathBuf;
use std::time::Duration;

/// Subdomain label that selects the base domain itself
pub const APEX_SENTINEL: &str = "@";

/// Default subdomain label
pub const DEFAULT_SUBDOMAIN: &str = "ddns";

/// Default poll interval (5 minutes)
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Default location of the last-confirmed IP file
pub const DEFAULT_STATE_PATH: &str = "/data/current_ip.txt";

/// Default address-echo service
pub const DEFAULT_IP_ECHO_URL: &str = "https://api.ip.sb/ip";

/// Main DDNS configuration
#[derive(Clone)]
pub struct DdnsConfig {
    /// Provider API token (bearer credential)
    pub api_token: String,

    /// Base domain, e.g. "example.com"
    pub domain: String,

    /// Subdomain label, or [`APEX_SENTINEL`] for the base domain
    pub subdomain: String,

    /// Time between reconciliation cycles
    pub interval: Duration,

    /// Path of the last-confirmed IP file
    pub state_path: PathBuf,

    /// URL of the address-echo service
    pub ip_echo_url: String,
}

// The token must never reach logs
impl std::fmt::Debug for DdnsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DdnsConfig")
            .field("api_token", &"<REDACTED>")
            .field("domain", &self.domain)
            .field("subdomain", &self.subdomain)
            .field("interval", &self.interval)
            .field("state_path", &self.state_path)
            .field("ip_echo_url", &self.ip_echo_url)
            .finish()
    }
}

impl DdnsConfig {
    /// Create a configuration with defaults for everything but the credential and domain
    pub fn new(api_token: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            api_token: api_token.into(),
            domain: domain.into(),
            subdomain: DEFAULT_SUBDOMAIN.to_string(),
            interval: DEFAULT_INTERVAL,
            state_path: PathBuf::from(DEFAULT_STATE_PATH),
            ip_echo_url: DEFAULT_IP_ECHO_URL.to_string(),
        }
    }

    /// Set the subdomain label
    pub fn with_subdomain(mut self, subdomain: impl Into<String>) -> Self {
        self.subdomain = subdomain.into();
        self
    }

    /// Set the poll interval
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Set the state file path
    pub fn with_state_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.state_path = path.into();
        self
    }

    /// Set the address-echo URL
    pub fn with_ip_echo_url(mut self, url: impl Into<String>) -> Self {
        self.ip_echo_url = url.into();
        self
    }

    /// Fully-qualified hostname whose A record is managed
    pub fn hostname(&self) -> String {
        if self.subdomain == APEX_SENTINEL {
            self.domain.clone()
        } else {
            format!("{}.{}", self.subdomain, self.domain)
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.api_token.trim().is_empty() {
            return Err(crate::Error::config("API token cannot be empty"));
        }

        validate_domain_name(&self.domain)?;

        if self.subdomain != APEX_SENTINEL {
            validate_domain_name(&self.hostname())?;
        }

        if self.interval.is_zero() {
            return Err(crate::Error::config("Poll interval must be > 0"));
        }

        if self.ip_echo_url.is_empty() {
            return Err(crate::Error::config("IP echo URL cannot be empty"));
        }

        if self.state_path.as_os_str().is_empty() {
            return Err(crate::Error::config("State file path cannot be empty"));
        }

        Ok(())
    }
}

/// Basic RFC 1035 domain name validation
fn validate_domain_name(domain: &str) -> Result<(), crate::Error> {
    if domain.is_empty() {
        return Err(crate::Error::config("Domain name cannot be empty"));
    }

    if domain.len() > 253 {
        return Err(crate::Error::config(format!(
            "Domain name too long: {} chars (max 253)",
            domain.len()
        )));
    }

    for label in domain.split('.') {
        if label.is_empty() {
            return Err(crate::Error::config(format!(
                "Domain name has empty label: '{}'",
                domain
            )));
        }

        if label.len() > 63 {
            return Err(crate::Error::config(format!(
                "Domain label too long: {} chars (max 63). Label: '{}'",
                label.len(),
                label
            )));
        }

        if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(crate::Error::config(format!(
                "Domain label contains invalid characters: '{}'",
                label
            )));
        }

        if label.starts_with('-') || label.ends_with('-') {
            return Err(crate::Error::config(format!(
                "Domain label cannot start or end with hyphen: '{}'",
                label
            )));
        }
    }

    Ok(())
}
