//! Out-of-page backup of the captured event log.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::error::RecorderError;
use crate::event::RawEvent;

/// Storage for periodic snapshots of a session's event log.
#[async_trait]
pub trait BackupStore: Send + Sync {
    /// Replace the stored snapshot for a session.
    async fn save(&self, session_id: &str, events: &[RawEvent]) -> Result<(), RecorderError>;

    /// Latest snapshot for a session, if any.
    async fn load(&self, session_id: &str) -> Result<Option<Vec<RawEvent>>, RecorderError>;

    async fn remove(&self, session_id: &str) -> Result<(), RecorderError>;
}

/// In-memory backup store.
#[derive(Default)]
pub struct MemoryBackup {
    sessions: RwLock<HashMap<String, Vec<RawEvent>>>,
}

impl MemoryBackup {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BackupStore for MemoryBackup {
    async fn save(&self, session_id: &str, events: &[RawEvent]) -> Result<(), RecorderError> {
        self.sessions
            .write()
            .await
            .insert(session_id.to_string(), events.to_vec());
        Ok(())
    }

    async fn load(&self, session_id: &str) -> Result<Option<Vec<RawEvent>>, RecorderError> {
        Ok(self.sessions.read().await.get(session_id).cloned())
    }

    async fn remove(&self, session_id: &str) -> Result<(), RecorderError> {
        self.sessions.write().await.remove(session_id);
        Ok(())
    }
}

/// File backup store, one JSON file per session:
/// ```text
/// {dir}/
/// └── {session_id}.json
/// ```
///
/// Writes go to a temporary sibling and are renamed into place, so a crash
/// mid-write leaves the previous snapshot intact.
pub struct FileBackup {
    dir: PathBuf,
}

impl FileBackup {
    pub async fn new(dir: impl Into<PathBuf>) -> Result<Self, RecorderError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await?;
        debug!("FileBackup initialized at {:?}", dir);
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn session_path(&self, session_id: &str) -> PathBuf {
        let sanitized: String = session_id
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{}.json", sanitized))
    }
}

#[async_trait]
impl BackupStore for FileBackup {
    async fn save(&self, session_id: &str, events: &[RawEvent]) -> Result<(), RecorderError> {
        let path = self.session_path(session_id);
        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_vec(events)?;
        fs::write(&tmp, json).await?;
        fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn load(&self, session_id: &str) -> Result<Option<Vec<RawEvent>>, RecorderError> {
        let path = self.session_path(session_id);
        let content = match fs::read(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        match serde_json::from_slice(&content) {
            Ok(events) => Ok(Some(events)),
            Err(e) => {
                warn!("Discarding unreadable backup {:?}: {}", path, e);
                Err(RecorderError::Backup(format!("corrupt backup {:?}: {}", path, e)))
            }
        }
    }

    async fn remove(&self, session_id: &str) -> Result<(), RecorderError> {
        match fs::remove_file(self.session_path(session_id)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
