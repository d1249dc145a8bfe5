//! Screenshot and report files written during a run.

use std::path::{Path, PathBuf};

use tokio::fs;

/// A directory that receives whole files or nothing.
///
/// Each write goes to a hidden temporary file first and is renamed into
/// place, so an interrupted capture never leaves a truncated artifact.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub async fn write(&self, name: &str, bytes: &[u8]) -> std::io::Result<PathBuf> {
        fs::create_dir_all(&self.root).await?;
        let path = self.root.join(name);
        let tmp = self.root.join(format!(".{}.tmp", name));
        if let Err(e) = fs::write(&tmp, bytes).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(e);
        }
        fs::rename(&tmp, &path).await?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_creates_directory() {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(dir.path().join("wf-1"));
        let path = store.write("000-before.png", b"png").await.unwrap();

        assert_eq!(path, dir.path().join("wf-1").join("000-before.png"));
        assert_eq!(std::fs::read(&path).unwrap(), b"png");
        let leftovers: Vec<_> = std::fs::read_dir(store.root())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[tokio::test]
    async fn test_overwrite_replaces_content() {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(dir.path());
        store.write("report.json", b"{}").await.unwrap();
        let path = store.write("report.json", b"{\"a\":1}").await.unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "{\"a\":1}");
    }
}
