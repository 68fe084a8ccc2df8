//! Core DDNS engine
//!
//! The DdnsEngine is responsible for:
//! - Resolving the provider zone once per run
//! - Running a reconciliation cycle immediately, then on a fixed interval
//! - Stopping cleanly when the shutdown future completes
//!
//! ## Architecture
//!
//! ```text
//!                 ┌──────────────┐   tick / shutdown
//!                 │  DdnsEngine  │◄──────────────────
//!                 └──────────────┘
//!                         │ reconcile()
//!         ┌───────────────┼───────────────────┐
//!         ▼               ▼                   ▼
//! ┌─────────────┐  ┌──────────────┐   ┌─────────────┐
//! │  IpSource   │  │ StateStore   │   │ DnsProvider │
//! │ (current)   │  │ (load/save)  │   │ (get/patch) │
//! └─────────────┘  └──────────────┘   └─────────────┘
//! ```
//!
//! ## Cycle Flow
//!
//! 1. Fetch the current public IP
//! 2. Compare with the last IP in the StateStore
//! 3. If changed (or unknown), re-read the record and update it
//! 4. On success, save the new IP
//! 5. Emit an event for monitoring/logging

mod reconcile;

pub use reconcile::CycleOutcome;

use crate::config::DdnsConfig;
use crate::error::Result;
use crate::traits::{DnsProvider, IpSource, StateStore, ZoneId};
use std::future::Future;
use std::net::Ipv4Addr;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

/// Capacity of the engine event channel
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Events emitted by the DdnsEngine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// Engine started
    Started {
        hostname: String,
    },

    /// Zone identifier resolved for this run
    ZoneResolved {
        zone_id: String,
    },

    /// Public IP unchanged, no provider calls made
    UpdateSkipped {
        hostname: String,
        current_ip: Ipv4Addr,
    },

    /// DNS record now points at `new_ip`
    UpdateSucceeded {
        hostname: String,
        new_ip: Ipv4Addr,
        previous_ip: Option<Ipv4Addr>,
        previous_content: String,
    },

    /// The record was updated but the local state could not be written
    StateSaveFailed {
        error: String,
    },

    /// A cycle ended with an error; the next tick retries
    CycleFailed {
        error: String,
    },

    /// Engine stopped
    Stopped {
        reason: String,
    },
}

/// Core DDNS engine
///
/// Owns the three collaborators and the immutable configuration.
///
/// ## Lifecycle
///
/// 1. Create with [`DdnsEngine::new()`]
/// 2. Drive with [`DdnsEngine::run_until()`]
/// 3. The engine returns when the shutdown future completes
///
/// ## Threading
///
/// Exactly one cycle is in flight at a time. A tick that comes due while a
/// cycle is still running is delayed, not queued.
pub struct DdnsEngine {
    /// IP source for the current public address
    ip_source: Box<dyn IpSource>,

    /// DNS provider for reading and updating the record
    provider: Box<dyn DnsProvider>,

    /// State store for change detection across restarts
    state_store: Box<dyn StateStore>,

    /// Immutable run configuration
    config: DdnsConfig,

    /// Managed hostname, derived from the configuration once
    hostname: String,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<EngineEvent>,
}

impl DdnsEngine {
    /// Create a new DDNS engine
    ///
    /// # Returns
    ///
    /// A tuple of (engine, event_receiver) where event_receiver yields engine events.
    /// Dropping the receiver is fine; events are then discarded.
    pub fn new(
        ip_source: Box<dyn IpSource>,
        provider: Box<dyn DnsProvider>,
        state_store: Box<dyn StateStore>,
        config: DdnsConfig,
    ) -> Result<(Self, mpsc::Receiver<EngineEvent>)> {
        config.validate()?;

        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let hostname = config.hostname();

        let engine = Self {
            ip_source,
            provider,
            state_store,
            config,
            hostname,
            event_tx: tx,
        };

        Ok((engine, rx))
    }

    /// Hostname whose A record this engine manages
    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// Run configuration
    pub fn config(&self) -> &DdnsConfig {
        &self.config
    }

    /// Resolve the zone for the configured base domain
    pub async fn resolve_zone(&self) -> Result<ZoneId> {
        info!(
            "Resolving {} zone for {}",
            self.provider.provider_name(),
            self.config.domain
        );

        let zone = self.provider.resolve_zone(&self.config.domain).await?;
        info!("Zone ID: {}", zone);

        self.emit_event(EngineEvent::ZoneResolved {
            zone_id: zone.to_string(),
        });

        Ok(zone)
    }

    /// Run until `shutdown` completes
    ///
    /// Resolves the zone once, then reconciles immediately and every
    /// `config.interval`. Cycle failures are logged and retried on the next
    /// tick.
    ///
    /// # Returns
    ///
    /// - `Ok(())`: Clean shutdown
    /// - `Err(Error)`: Zone resolution failed
    pub async fn run_until<F>(&self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        self.emit_event(EngineEvent::Started {
            hostname: self.hostname.clone(),
        });
        info!(
            "Managing {} (check interval {:?})",
            self.hostname, self.config.interval
        );

        let zone = tokio::select! {
            biased;

            _ = &mut shutdown => {
                self.stop("Shutdown signal before zone resolution");
                return Ok(());
            }

            zone = self.resolve_zone() => match zone {
                Ok(zone) => zone,
                Err(e) => {
                    error!("Failed to resolve zone: {}", e);
                    self.stop("Zone resolution failed");
                    return Err(e);
                }
            },
        };

        // The first tick completes immediately
        let mut ticker = tokio::time::interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;

                _ = &mut shutdown => {
                    self.stop("Shutdown signal");
                    break;
                }

                _ = ticker.tick() => {
                    self.run_cycle(&zone).await;
                    debug!("Next check in {:?}", self.config.interval);
                }
            }
        }

        Ok(())
    }

    /// Run one cycle and report its outcome without propagating errors
    async fn run_cycle(&self, zone: &ZoneId) {
        if let Err(e) = self.reconcile(zone).await {
            error!("Check failed for {}: {}", self.hostname, e);
            self.emit_event(EngineEvent::CycleFailed {
                error: e.to_string(),
            });
        }
    }

    fn stop(&self, reason: &str) {
        info!("Engine stopped: {}", reason);
        self.emit_event(EngineEvent::Stopped {
            reason: reason.to_string(),
        });
    }

    /// Emit an engine event
    fn emit_event(&self, event: EngineEvent) {
        match self.event_tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                warn!("Event channel full, dropping event");
            }
            // Nobody is listening
            Err(TrySendError::Closed(_)) => {}
        }
    }
}
