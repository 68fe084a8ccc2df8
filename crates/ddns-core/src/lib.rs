// # ddns-core
//
// Core library for the single-record DDNS reconciler.
//
// ## Architecture Overview
//
// This library provides the core functionality for dynamic DNS updates:
// - **IpSource**: Trait for discovering the current public IP
// - **DnsProvider**: Trait for reading and updating the A record via a provider API
// - **StateStore**: Trait for persisting the last IP the provider accepted
// - **DdnsEngine**: Reconciliation cycle plus the interval/shutdown driver
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Core logic is separate from implementations
// 2. **Remote Is the Source of Truth**: Local state is written only after the
//    provider confirms an update
// 3. **Library-First**: The daemon is a thin layer over this crate
// 4. **Idempotency**: An unchanged address costs no provider API calls

pub mod traits;
pub mod engine;
pub mod config;
pub mod error;
pub mod state;

// Re-export core types for convenience
pub use traits::{IpSource, DnsProvider, StateStore, RecordSnapshot, ZoneId};
pub use engine::{DdnsEngine, EngineEvent, CycleOutcome};
pub use config::DdnsConfig;
pub use error::{Error, Result};
pub use state::{MemoryStateStore, FileStateStore};
