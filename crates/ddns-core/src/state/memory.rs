// # Memory State Store
//
// In-memory implementation of StateStore.
//
// ## Crash Behavior
//
// - State is lost on restart
// - The first cycle after a restart treats the address as unknown and
//   pushes it to the provider again, which is harmless
//
// ## When to Use
//
// - Embedding the engine where the caller owns persistence
// - Tests

use async_trait::async_trait;
use std::net::Ipv4Addr;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::Error;
use crate::traits::state_store::StateStore;

/// In-memory state store implementation
///
/// Clones share the same slot, so a test can keep a handle while the engine
/// owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStateStore {
    inner: Arc<RwLock<Option<Ipv4Addr>>>,
}

impl MemoryStateStore {
    /// Create an empty store (last IP unknown)
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already knows `ip`
    pub fn with_ip(ip: Ipv4Addr) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Some(ip))),
        }
    }

    /// Forget the stored address
    pub async fn clear(&self) {
        *self.inner.write().await = None;
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn load(&self) -> Option<Ipv4Addr> {
        *self.inner.read().await
    }

    async fn save(&self, ip: Ipv4Addr) -> Result<(), Error> {
        *self.inner.write().await = Some(ip);
        Ok(())
    }
}
