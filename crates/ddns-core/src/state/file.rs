// # File State Store
//
// File-based implementation of StateStore.
//
// ## Purpose
//
// Remembers the last IP the provider accepted across daemon restarts, so an
// unchanged address after a restart costs no API calls.
//
// ## Crash Behavior
//
// - Atomic writes: the address is written to `<path>.tmp`, then renamed
// - Corruption: an unparsable file is treated as unknown state, which forces
//   one update and rewrites the file
//
// ## File Format
//
// A single line holding a dotted IPv4 address. Surrounding whitespace is
// ignored on load.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::Error;
use crate::traits::state_store::StateStore;

/// File-based state store
///
/// The file is opened per call; no handle is held between cycles.
///
/// # Example
///
/// ```rust,no_run
/// use ddns_core::state::FileStateStore;
/// use ddns_core::traits::StateStore;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = FileStateStore::new("/var/lib/ddns/current_ip.txt");
///
///     store.save("203.0.113.7".parse()?).await?;
///     assert_eq!(store.load().await, Some("203.0.113.7".parse()?));
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct FileStateStore {
    path: PathBuf,
}

impl FileStateStore {
    /// Create a store backed by `path`
    ///
    /// Nothing is touched on disk until the first `save()`.
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    /// Path of the state file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get path to temporary file for atomic writes
    ///
    /// Appends `.tmp` rather than replacing the extension, so
    /// `current_ip.txt` becomes `current_ip.txt.tmp`.
    fn temp_path(&self) -> PathBuf {
        let mut temp = self.path.clone().into_os_string();
        temp.push(".tmp");
        PathBuf::from(temp)
    }

    async fn read_state(&self) -> Result<Option<Ipv4Addr>, Error> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("State file does not exist: {}", self.path.display());
                return Ok(None);
            }
            Err(e) => {
                return Err(Error::state_store(format!(
                    "Failed to read state file {}: {}",
                    self.path.display(),
                    e
                )));
            }
        };

        let content = content.trim();
        if content.is_empty() {
            return Ok(None);
        }

        content.parse().map(Some).map_err(|e| {
            Error::state_store(format!(
                "State file {} does not hold an IPv4 address ({:?}): {}",
                self.path.display(),
                content,
                e
            ))
        })
    }
}

#[async_trait]
impl StateStore for FileStateStore {
    async fn load(&self) -> Option<Ipv4Addr> {
        match self.read_state().await {
            Ok(ip) => ip,
            Err(e) => {
                tracing::warn!("{}. Treating last IP as unknown.", e);
                None
            }
        }
    }

    async fn save(&self, ip: Ipv4Addr) -> Result<(), Error> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).await.map_err(|e| {
                Error::state_store(format!(
                    "Failed to create state directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let temp_path = self.temp_path();
        fs::write(&temp_path, ip.to_string()).await.map_err(|e| {
            Error::state_store(format!(
                "Failed to write temp file {}: {}",
                temp_path.display(),
                e
            ))
        })?;

        fs::rename(&temp_path, &self.path).await.map_err(|e| {
            Error::state_store(format!(
                "Failed to rename {} to {}: {}",
                temp_path.display(),
                self.path.display(),
                e
            ))
        })?;

        tracing::trace!("State written to file: {}", self.path.display());
        Ok(())
    }
}
