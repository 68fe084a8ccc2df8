// Environment configuration for ddnsd
//
// Variables are read through a lookup function so parsing can be tested
// without touching the process environment. Warnings are collected here and
// logged once tracing is initialized.

use anyhow::{Context, Result, bail};
use ddns_core::DdnsConfig;
use ddns_core::config::{DEFAULT_IP_ECHO_URL, DEFAULT_STATE_PATH, DEFAULT_SUBDOMAIN};
use std::time::Duration;
use tracing::Level;

pub const ENV_API_TOKEN: &str = "CLOUDFLARE_API_TOKEN";
pub const ENV_DOMAIN: &str = "DOMAIN";
pub const ENV_SUBDOMAIN: &str = "SUBDOMAIN";
pub const ENV_CHECK_INTERVAL: &str = "CHECK_INTERVAL";
pub const ENV_STATE_PATH: &str = "DDNS_STATE_PATH";
pub const ENV_IP_ECHO_URL: &str = "DDNS_IP_ECHO_URL";
pub const ENV_LOG_LEVEL: &str = "DDNS_LOG_LEVEL";

/// Values shipped in the sample environment file
const PLACEHOLDER_TOKEN: &str = "your_api_token_here";
const PLACEHOLDER_DOMAIN: &str = "example.com";

/// Check interval in minutes when `CHECK_INTERVAL` is unset or unusable
const DEFAULT_CHECK_INTERVAL_MINUTES: u64 = 5;

/// Daemon configuration loaded from the environment
#[derive(Debug)]
pub struct EnvConfig {
    /// Engine configuration, already validated
    pub ddns: DdnsConfig,

    /// Maximum tracing level
    pub log_level: Level,

    /// Non-fatal problems found while parsing
    pub warnings: Vec<String>,
}

impl EnvConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    ///
    /// Blank values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let mut warnings = Vec::new();

        let api_token = match get(ENV_API_TOKEN) {
            None => bail!(
                "{} is required. Set it via: export {}=your_token",
                ENV_API_TOKEN,
                ENV_API_TOKEN
            ),
            Some(token) if token == PLACEHOLDER_TOKEN => bail!(
                "{} is still the placeholder value. \
                Use an API token with Zone:Read and DNS:Edit permissions.",
                ENV_API_TOKEN
            ),
            Some(token) => token,
        };

        let domain = match get(ENV_DOMAIN) {
            None => bail!(
                "{} is required. Set it via: export {}=your-domain.net",
                ENV_DOMAIN,
                ENV_DOMAIN
            ),
            Some(domain) if domain.eq_ignore_ascii_case(PLACEHOLDER_DOMAIN) => bail!(
                "{} is still the placeholder value '{}'. Set it to the zone you own.",
                ENV_DOMAIN,
                PLACEHOLDER_DOMAIN
            ),
            Some(domain) => domain,
        };

        let subdomain = get(ENV_SUBDOMAIN).unwrap_or_else(|| DEFAULT_SUBDOMAIN.to_string());

        let default_interval = Duration::from_secs(DEFAULT_CHECK_INTERVAL_MINUTES * 60);
        let interval = match get(ENV_CHECK_INTERVAL) {
            None => default_interval,
            Some(raw) => parse_minutes(&raw).unwrap_or_else(|| {
                warnings.push(format!(
                    "Invalid {} '{}', using default of {} minutes",
                    ENV_CHECK_INTERVAL, raw, DEFAULT_CHECK_INTERVAL_MINUTES
                ));
                default_interval
            }),
        };

        let state_path = get(ENV_STATE_PATH).unwrap_or_else(|| DEFAULT_STATE_PATH.to_string());
        let ip_echo_url = get(ENV_IP_ECHO_URL).unwrap_or_else(|| DEFAULT_IP_ECHO_URL.to_string());

        if !ip_echo_url.starts_with("https://") && !ip_echo_url.starts_with("http://") {
            bail!(
                "{} must use HTTP or HTTPS scheme. Got: {}",
                ENV_IP_ECHO_URL,
                ip_echo_url
            );
        }
        if ip_echo_url.starts_with("http://") {
            warnings.push(format!(
                "{} uses HTTP (not HTTPS). Consider using HTTPS.",
                ENV_IP_ECHO_URL
            ));
        }

        let log_level = match get(ENV_LOG_LEVEL) {
            None => Level::INFO,
            Some(raw) => parse_level(&raw).with_context(|| {
                format!(
                    "{} '{}' is not valid. Valid levels: trace, debug, info, warn, error",
                    ENV_LOG_LEVEL, raw
                )
            })?,
        };

        let ddns = DdnsConfig::new(api_token, domain)
            .with_subdomain(subdomain)
            .with_interval(interval)
            .with_state_path(state_path)
            .with_ip_echo_url(ip_echo_url);

        ddns.validate().context("Invalid DDNS configuration")?;

        Ok(Self {
            ddns,
            log_level,
            warnings,
        })
    }
}

/// Parse a positive, possibly fractional, number of minutes
fn parse_minutes(raw: &str) -> Option<Duration> {
    let minutes: f64 = raw.parse().ok()?;
    if !minutes.is_finite() || minutes <= 0.0 {
        return None;
    }

    Duration::try_from_secs_f64(minutes * 60.0)
        .ok()
        .filter(|interval| !interval.is_zero())
}

fn parse_level(raw: &str) -> Option<Level> {
    match raw.to_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        _ => None,
    }
}
