// # State Store Trait
//
// Defines the interface for persisting the last IP the provider accepted.
//
// ## Purpose
//
// The stored address is the basis for change detection across restarts:
// an unchanged public IP costs zero provider API calls.
//
// ## Implementations
//
// - File-based: plain-text file holding one IPv4 address
// - Memory: non-persistent, for embedding and tests
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::StateStore;
//
// let store = /* StateStore implementation */;
//
// // Unknown state is None, never an error
// let last_ip = store.load().await;
//
// // Only after the provider confirmed the update
// store.save("203.0.113.7".parse()?).await?;
// ```

use async_trait::async_trait;
use std::net::Ipv4Addr;

/// Trait for state store implementations
///
/// # Contract
///
/// - `load()` never fails the caller: missing, unreadable or corrupt state is `None`
/// - `save()` rewrites the whole state and may fail; callers treat that as degraded,
///   not fatal
/// - No handles or locks are held between calls
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Get the last address confirmed by the provider, if known
    async fn load(&self) -> Option<Ipv4Addr>;

    /// Record an address the provider has just accepted
    ///
    /// # Returns
    ///
    /// - `Ok(())`: Persisted
    /// - `Err(Error::StateStore)`: Storage error
    async fn save(&self, ip: Ipv4Addr) -> Result<(), crate::Error>;
}
