//! A single reconciliation cycle

use super::{DdnsEngine, EngineEvent};
use crate::error::Result;
use crate::traits::ZoneId;
use std::net::Ipv4Addr;
use tracing::{debug, info, warn};

/// Result of one successful cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The public IP matches the stored one; the provider was not contacted
    Unchanged {
        ip: Ipv4Addr,
    },

    /// The provider accepted the new address
    Updated {
        /// Record that was updated
        record_id: String,
        /// Stored IP before the cycle, `None` on first run
        previous_ip: Option<Ipv4Addr>,
        /// Remote record content before the update
        previous_content: String,
        /// Address now held by the record
        new_ip: Ipv4Addr,
        /// Whether the new address was written to the state store
        state_saved: bool,
    },
}

impl DdnsEngine {
    /// Run one reconciliation cycle against an already resolved zone
    ///
    /// Local state is written only after the provider confirmed the update.
    /// Any error leaves it untouched, so the next cycle retries the same
    /// transition.
    pub async fn reconcile(&self, zone: &ZoneId) -> Result<CycleOutcome> {
        debug!(
            "Fetching current public IP via {}",
            self.ip_source.source_name()
        );
        let current_ip = self.ip_source.current().await?;
        info!("Current public IP: {}", current_ip);

        let previous_ip = self.state_store.load().await;

        if previous_ip == Some(current_ip) {
            info!("IP unchanged, no update needed");
            self.emit_event(EngineEvent::UpdateSkipped {
                hostname: self.hostname.clone(),
                current_ip,
            });
            return Ok(CycleOutcome::Unchanged { ip: current_ip });
        }

        match previous_ip {
            Some(ip) => info!("IP change detected: {} -> {}", ip, current_ip),
            None => info!("IP change detected: (first run) -> {}", current_ip),
        }

        // Always re-read: the record may have been edited out of band
        let record = self
            .provider
            .resolve_record(zone, &self.hostname)
            .await?;
        debug!(
            "DNS record {} currently holds {}",
            record.id, record.content
        );

        let updated = self
            .provider
            .update_record(zone, &record, current_ip)
            .await?;

        let state_saved = match self.state_store.save(current_ip).await {
            Ok(()) => true,
            Err(e) => {
                warn!("DNS record updated but local state was not saved: {}", e);
                self.emit_event(EngineEvent::StateSaveFailed {
                    error: e.to_string(),
                });
                false
            }
        };

        info!("DNS record updated: {} -> {}", self.hostname, current_ip);
        self.emit_event(EngineEvent::UpdateSucceeded {
            hostname: self.hostname.clone(),
            new_ip: current_ip,
            previous_ip,
            previous_content: record.content.clone(),
        });

        Ok(CycleOutcome::Updated {
            record_id: updated.id,
            previous_ip,
            previous_content: record.content,
            new_ip: current_ip,
            state_saved,
        })
    }
}
