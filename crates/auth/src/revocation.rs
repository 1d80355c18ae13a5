//! Process-local revocation registry and its background sweeper.
//!
//! Entries map a full credential string to that credential's original expiry.
//! An entry leaves the registry only through [`RevocationRegistry::sweep`],
//! and only once its expiry is strictly in the past.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info};

#[derive(Debug, Default)]
pub struct RevocationRegistry {
    entries: RwLock<HashMap<String, DateTime<Utc>>>,
}

impl RevocationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `token`. Idempotent.
    ///
    /// Returns `true` when this call inserted the entry, `false` when the
    /// token was already revoked (the stored expiry is left untouched).
    pub fn revoke(&self, token: &str, expires_at: DateTime<Utc>) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        match entries.entry(token.to_owned()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(expires_at);
                debug!(%expires_at, "credential revoked");
                true
            }
        }
    }

    pub fn is_revoked(&self, token: &str) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(token)
    }

    /// Stored expiry of a revoked token.
    pub fn expiry_of(&self, token: &str) -> Option<DateTime<Utc>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(token)
            .copied()
    }

    /// Remove every entry whose expiry is before `now`. Returns how many were
    /// removed.
    pub fn sweep(&self, now: DateTime<Utc>) -> usize {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|_, expires_at| *expires_at >= now);
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Sweeper
// ─────────────────────────────────────────────────────────────────────────────

/// Handle for a running sweeper. Dropping it stops the sweeper.
#[derive(Debug)]
pub struct SweeperHandle {
    shutdown: Option<oneshot::Sender<()>>,
    join: Option<JoinHandle<()>>,
}

impl SweeperHandle {
    /// Stop the sweeper and wait for its task to finish.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(join) = self.join.take() {
            let _ = join.await;
        }
    }
}

impl Drop for SweeperHandle {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

/// Periodic reclamation of expired registry entries.
pub struct RevocationSweeper;

impl RevocationSweeper {
    /// Spawn the sweeper on the current Tokio runtime.
    ///
    /// The first sweep happens one full `every` after spawning.
    pub fn spawn(registry: Arc<RevocationRegistry>, every: Duration) -> SweeperHandle {
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

        let join = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // `interval` completes its first tick immediately.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    _ = ticker.tick() => {
                        let removed = registry.sweep(Utc::now());
                        if removed > 0 {
                            info!(removed, remaining = registry.len(), "revocation sweep reclaimed entries");
                        } else {
                            debug!(remaining = registry.len(), "revocation sweep found nothing to reclaim");
                        }
                    }
                }
            }
            debug!("revocation sweeper stopped");
        });

        SweeperHandle {
            shutdown: Some(shutdown_tx),
            join: Some(join),
        }
    }
}
