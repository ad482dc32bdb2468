//! Expired-document cleanup.
//!
//! Reads already treat expired documents as absent and delete them lazily, so
//! sweeping only reclaims space held by sessions nobody asks for again.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tokio::time::{Duration, interval};
use tracing::{debug, error, info};

use crate::clock::{Clock, SystemClock};
use crate::error::StoreResult;
use crate::store::{DocumentStore, Filter};

/// Delete every document whose expiry is strictly before `now`.
pub fn sweep_expired(store: &dyn DocumentStore, now: DateTime<Utc>) -> StoreResult<u64> {
    store.delete(&Filter::all().expires_before(now))
}

/// Periodically sweeps expired documents from a store.
pub struct ExpirySweeper {
    store: Arc<dyn DocumentStore>,
    clock: Arc<dyn Clock>,
    task: Mutex<Option<tokio::task::AbortHandle>>,
}

impl ExpirySweeper {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            clock: Arc::new(SystemClock),
            task: Mutex::new(None),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Run a single sweep now.
    pub fn sweep_once(&self) -> StoreResult<u64> {
        let removed = sweep_expired(self.store.as_ref(), self.clock.now())?;
        if removed > 0 {
            info!(removed, "Swept expired sessions");
        } else {
            debug!("No expired sessions to sweep");
        }
        Ok(removed)
    }

    /// Start sweeping every `period`, replacing any running schedule.
    ///
    /// The first sweep runs immediately.
    pub async fn start(self: Arc<Self>, period: Duration) {
        let mut task = self.task.lock().await;
        if let Some(previous) = task.take() {
            previous.abort();
        }

        info!(period_secs = period.as_secs(), "Starting expiry sweeper");

        let sweeper = Arc::downgrade(&self);
        let handle = tokio::spawn(async move {
            let mut ticker = interval(period);
            loop {
                ticker.tick().await;
                let Some(sweeper) = sweeper.upgrade() else {
                    break;
                };
                // Store calls may block for the whole busy timeout.
                match tokio::task::spawn_blocking(move || sweeper.sweep_once()).await {
                    Ok(Ok(_)) => {}
                    Ok(Err(e)) => error!(error = %e, "Expiry sweep failed"),
                    Err(e) => error!(error = %e, "Expiry sweep task panicked"),
                }
            }
        });

        *task = Some(handle.abort_handle());
    }

    pub async fn stop(&self) {
        if let Some(handle) = self.task.lock().await.take() {
            handle.abort();
            info!("Stopped expiry sweeper");
        }
    }

    pub async fn is_running(&self) -> bool {
        self.task
            .lock()
            .await
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }
}

impl Drop for ExpirySweeper {
    fn drop(&mut self) {
        if let Some(handle) = self.task.get_mut().take() {
            handle.abort();
        }
    }
}
