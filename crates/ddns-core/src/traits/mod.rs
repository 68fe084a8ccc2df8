//! Core traits for the DDNS system
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`IpSource`]: Discover the current public address
//! - [`DnsProvider`]: Read and update the A record via a provider API
//! - [`StateStore`]: Persist the last address the provider accepted

pub mod ip_source;
pub mod dns_provider;
pub mod state_store;

pub use ip_source::IpSource;
pub use dns_provider::{DnsProvider, RecordSnapshot, ZoneId};
pub use state_store::StateStore;
