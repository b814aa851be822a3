//! Periodic expiry sweeper
//!
//! A background task that calls `sweep_expired()` on a fixed interval for
//! the lifetime of the application. The sweeper only bounds storage growth:
//! `get` re-checks expiry lazily, so link usability never depends on a
//! sweep having run.

use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::store::UrlStore;

/// Default sweep cadence (5 minutes)
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Handle to a running sweeper task
///
/// Holding the handle keeps the task alive; [`Sweeper::stop`] shuts it down
/// deterministically so tests never leave a dangling timer behind.
pub struct Sweeper {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl Sweeper {
    /// Spawns the sweep loop on the current tokio runtime.
    pub fn start(store: Arc<Mutex<UrlStore>>, interval: Duration) -> Sweeper {
        let (shutdown, mut rx) = watch::channel(false);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // A tokio interval fires immediately; skip that first tick so
            // the cadence starts one interval after startup.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let removed = store.lock().unwrap().sweep_expired();
                        if removed > 0 {
                            info!(removed, "sweeper removed expired URLs");
                        } else {
                            debug!("sweeper found nothing to remove");
                        }
                    }
                    _ = rx.changed() => break,
                }
            }
        });

        Sweeper { shutdown, handle }
    }

    /// Signals the task to stop and waits for it to finish.
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        let _ = self.handle.await;
    }
}
