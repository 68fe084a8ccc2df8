// # IP Source Trait
//
// Defines the interface for discovering the current public IPv4 address.
//
// ## Implementations
//
// - HTTP address-echo service: `ddns-ip-http` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::IpSource;
//
// let source = /* IpSource implementation */;
// let current_ip = source.current().await?;
// ```

use async_trait::async_trait;
use std::net::Ipv4Addr;

/// Trait for IP source implementations
///
/// # Contract
///
/// - One outbound lookup per call, bounded by a short timeout
/// - No retry: the next scheduled cycle is the retry
/// - No caching: every call observes the live address
#[async_trait]
pub trait IpSource: Send + Sync {
    /// Get the current public IPv4 address
    ///
    /// # Returns
    ///
    /// - `Ok(Ipv4Addr)`: The current address
    /// - `Err(Error::Network)`: Transport failure, timeout or non-success status
    /// - `Err(Error::IpSource)`: The service answered with something that is not IPv4
    async fn current(&self) -> Result<Ipv4Addr, crate::Error>;

    /// Short name for logging
    fn source_name(&self) -> &'static str;
}
