//! Background task purging expired sessions.

use super::SessionStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::info;

/// Spawns a task calling [`SessionStore::purge_expired`] every `interval`.
///
/// The task runs until aborted through the returned handle.
pub fn spawn_reaper<S>(store: Arc<S>, interval: Duration) -> JoinHandle<()>
where
    S: SessionStore + ?Sized + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let purged = store.purge_expired().await;
            if purged > 0 {
                let remaining = store.count().await;
                info!(purged, remaining, "Purged expired sessions");
            }
        }
    })
}
