//! Periodic mirroring of the event log to the backup store.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::backup::BackupStore;
use crate::event::RawEvent;

/// Spawn the sync task. It only reads the log, and writes a final snapshot on cancellation.
pub(super) fn spawn_backup_sync(
    store: Arc<dyn BackupStore>,
    session_id: String,
    log: Arc<RwLock<Vec<RawEvent>>>,
    interval: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut synced = 0;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    synced = sync_once(store.as_ref(), &session_id, &log, synced).await;
                }
            }
        }
        sync_once(store.as_ref(), &session_id, &log, synced).await;
        debug!("Backup sync for session {} finished", session_id);
    })
}

/// Save a snapshot if the log grew since the last one. Returns the synced length.
async fn sync_once(
    store: &dyn BackupStore,
    session_id: &str,
    log: &RwLock<Vec<RawEvent>>,
    synced: usize,
) -> usize {
    let snapshot = {
        let events = log.read().await;
        if events.len() == synced {
            return synced;
        }
        events.clone()
    };
    match store.save(session_id, &snapshot).await {
        Ok(()) => {
            trace!("Backed up {} events for session {}", snapshot.len(), session_id);
            snapshot.len()
        }
        Err(e) => {
            warn!("Backup sync failed for session {}: {}", session_id, e);
            synced
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backup::MemoryBackup;

    #[tokio::test(start_paused = true)]
    async fn test_sync_mirrors_log_until_cancelled() {
        let store = Arc::new(MemoryBackup::new());
        let log = Arc::new(RwLock::new(vec![RawEvent::navigate("https://example.com", 1)]));
        let cancel = CancellationToken::new();
        let handle = spawn_backup_sync(
            store.clone(),
            "s1".to_string(),
            log.clone(),
            Duration::from_millis(2000),
            cancel.clone(),
        );

        time::sleep(Duration::from_millis(100)).await;
        assert_eq!(store.load("s1").await.unwrap().map(|e| e.len()), Some(1));

        log.write().await.push(RawEvent::navigate("https://example.com/next", 2));
        time::sleep(Duration::from_millis(2500)).await;
        assert_eq!(store.load("s1").await.unwrap().map(|e| e.len()), Some(2));

        log.write().await.push(RawEvent::navigate("https://example.com/last", 3));
        cancel.cancel();
        handle.await.unwrap();
        assert_eq!(store.load("s1").await.unwrap().map(|e| e.len()), Some(3));
    }
}
