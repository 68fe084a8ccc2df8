//! Cloudflare API v4 wire types and response interpretation
//!
//! Every endpoint answers with the same envelope:
//!
//! ```json
//! { "success": false, "result": null, "errors": [{ "code": 9109, "message": "..." }] }
//! ```
//!
//! The envelope's `success` flag is authoritative whenever the body parses:
//! Cloudflare can return HTTP 200 with `success: false`. The HTTP status only
//! decides the outcome when the body is not an envelope (proxies, outages).

use ddns_core::{Error, Result};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

use crate::PROVIDER_NAME;

/// TTL applied on every update, in seconds
///
/// Kept short because the address is expected to change.
pub const RECORD_TTL: u32 = 120;

/// Record type managed by this provider
pub const RECORD_TYPE: &str = "A";

#[derive(Debug, Deserialize)]
struct Envelope {
    success: bool,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default, deserialize_with = "null_as_empty")]
    errors: Vec<ApiMessage>,
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<ApiMessage>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<ApiMessage>>::deserialize(deserializer)?.unwrap_or_default())
}

/// An entry of the envelope's `errors` array
#[derive(Debug, Clone, Deserialize)]
pub struct ApiMessage {
    #[serde(default)]
    pub code: Option<i64>,
    pub message: String,
}

impl fmt::Display for ApiMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "{} (code {})", self.message, code),
            None => f.write_str(&self.message),
        }
    }
}

/// `result` entry of `GET /zones`
#[derive(Debug, Clone, Deserialize)]
pub struct Zone {
    pub id: String,
    pub name: String,
}

/// `result` entry of `GET /zones/:zone_id/dns_records` and `PATCH` responses
#[derive(Debug, Clone, Deserialize)]
pub struct DnsRecord {
    pub id: String,
    pub name: String,
    pub content: String,
    #[serde(rename = "type", default = "default_record_type")]
    pub record_type: String,
}

fn default_record_type() -> String {
    RECORD_TYPE.to_string()
}

impl From<DnsRecord> for ddns_core::RecordSnapshot {
    fn from(record: DnsRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            content: record.content,
            record_type: record.record_type,
        }
    }
}

/// Body of `PATCH /zones/:zone_id/dns_records/:record_id`
#[derive(Debug, Serialize)]
pub struct UpdateRequest<'a> {
    #[serde(rename = "type")]
    pub record_type: &'static str,
    pub name: &'a str,
    pub content: String,
    pub ttl: u32,
}

/// Decide the outcome of a raw response
///
/// Returns the envelope's `result` (possibly absent) when `success` is true.
/// `what` names the operation for error messages.
pub fn verdict(status: StatusCode, body: &str, what: &str) -> Result<Option<Value>> {
    let envelope: Envelope = match serde_json::from_str(body) {
        Ok(envelope) => envelope,
        Err(parse_err) => return Err(status_error(status, body, what, &parse_err)),
    };

    if !envelope.success {
        let message = match envelope.errors.first() {
            Some(first) => format!("{} failed: {}", what, first),
            None => format!("{} failed (HTTP {}) without an error message", what, status),
        };
        return Err(Error::provider(PROVIDER_NAME, message));
    }

    Ok(envelope.result.filter(|result| !result.is_null()))
}

/// Turn a successful `result` into the expected type
pub fn decode<T: DeserializeOwned>(result: Option<Value>, what: &str) -> Result<T> {
    serde_json::from_value(result.unwrap_or(Value::Null)).map_err(|e| {
        Error::provider(
            PROVIDER_NAME,
            format!("Unexpected {} result format: {}", what, e),
        )
    })
}

/// Map a response whose body is not an envelope
fn status_error(
    status: StatusCode,
    body: &str,
    what: &str,
    parse_err: &serde_json::Error,
) -> Error {
    if status.is_success() {
        return Error::provider(
            PROVIDER_NAME,
            format!("Failed to parse {} response: {}", what, parse_err),
        );
    }

    let body = body.trim();
    match status.as_u16() {
        401 | 403 => Error::auth(format!(
            "Invalid API token or insufficient permissions ({}). Status: {}",
            what, status
        )),
        404 => Error::not_found(format!("{}: HTTP {}", what, status)),
        429 => Error::rate_limited(format!(
            "Rate limit exceeded during {}. Status: {}",
            what, status
        )),
        500..=599 => Error::provider(
            PROVIDER_NAME,
            format!(
                "Cloudflare server error (transient) during {}: {} - {}",
                what, status, body
            ),
        ),
        _ => Error::provider(
            PROVIDER_NAME,
            format!("{} failed: {} - {}", what, status, body),
        ),
    }
}
