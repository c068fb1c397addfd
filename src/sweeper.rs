/// Expiry sweeper: periodic reclamation of renewal tokens past their
/// expiry.
///
/// Purely a storage-reclamation mechanism. Correctness does not depend on
/// it: `refresh_session` rejects expired tokens whether or not they have
/// been physically deleted, so a missed or delayed tick is harmless.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::error::StoreError;
use crate::store::SessionStore;

/// Delete every renewal token whose expiry is strictly before now.
pub async fn sweep_expired(store: &dyn SessionStore) -> Result<u64, StoreError> {
    let cutoff = Utc::now();
    let removed = store.delete_expired_renewal_tokens(cutoff).await?;

    tracing::info!(removed, cutoff = %cutoff, "expired renewal tokens swept");
    Ok(removed)
}

/// Handle to the recurring sweep task.
pub struct Sweeper {
    shutdown: watch::Sender<()>,
    handle: JoinHandle<()>,
}

impl Sweeper {
    /// Spawn the sweep loop. The first sweep runs one full interval after
    /// startup; exactly one sweep is ever in flight, and a sweep that
    /// overruns the interval delays the next tick rather than overlapping
    /// it. Sweep errors are logged and retried on the next tick.
    pub fn start(store: Arc<dyn SessionStore>, interval: Duration) -> Self {
        let (shutdown, mut shutdown_rx) = watch::channel(());

        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if let Err(e) = sweep_expired(store.as_ref()).await {
                            tracing::error!(error = %e, "sweep failed; will retry next tick");
                        }
                    }
                    // Only observed between sweeps, so an in-progress sweep
                    // always runs to completion.
                    _ = shutdown_rx.changed() => {
                        tracing::info!("sweeper stopping");
                        break;
                    }
                }
            }
        });

        Self { shutdown, handle }
    }

    /// Signal the loop to stop and wait for it to finish.
    pub async fn stop(self) {
        let _ = self.shutdown.send(());
        let _ = self.handle.await;
    }
}
