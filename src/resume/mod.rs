use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::fs;
use tokio::sync::Mutex;
use tracing::info;

use crate::error::{ProctorError, Result};

/// Stores the candidate's resume document
///
/// Pure file transfer: one document at a time under the configured
/// directory. The active flag flips only after the filesystem operation
/// succeeds; a failed store or clear leaves it untouched.
pub struct ResumeStore {
    dir: PathBuf,
    stored: Mutex<Option<PathBuf>>,
    active: AtomicBool,
}

impl ResumeStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            stored: Mutex::new(None),
            active: AtomicBool::new(false),
        }
    }

    /// Save the uploaded document, replacing any previous one.
    pub async fn store(&self, filename: &str, bytes: &[u8]) -> Result<()> {
        // Only the final path component; uploads don't get to pick
        // directories.
        let name = Path::new(filename)
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "resume".into());

        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| ProctorError::Resume(format!("{}: {}", self.dir.display(), e)))?;

        let path = self.dir.join(name);
        fs::write(&path, bytes)
            .await
            .map_err(|e| ProctorError::Resume(format!("{}: {}", path.display(), e)))?;

        info!("Resume stored: {} ({} bytes)", path.display(), bytes.len());

        *self.stored.lock().await = Some(path);
        self.active.store(true, Ordering::SeqCst);
        Ok(())
    }

    /// Remove the stored document.
    pub async fn clear(&self) -> Result<()> {
        let mut stored = self.stored.lock().await;

        let path = stored
            .as_ref()
            .ok_or_else(|| ProctorError::Resume("no resume stored".to_string()))?;

        fs::remove_file(path)
            .await
            .map_err(|e| ProctorError::Resume(format!("{}: {}", path.display(), e)))?;

        info!("Resume deleted: {}", path.display());

        *stored = None;
        self.active.store(false, Ordering::SeqCst);
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn store_then_clear_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = ResumeStore::new(dir.path());

        store.store("cv.pdf", b"resume bytes").await.unwrap();
        assert!(store.is_active());
        assert!(dir.path().join("cv.pdf").exists());

        store.clear().await.unwrap();
        assert!(!store.is_active());
        assert!(!dir.path().join("cv.pdf").exists());
    }

    #[tokio::test]
    async fn path_components_in_filenames_are_dropped() {
        let dir = TempDir::new().unwrap();
        let store = ResumeStore::new(dir.path());

        store.store("nested/dir/../cv.pdf", b"x").await.unwrap();
        assert!(dir.path().join("cv.pdf").exists());
    }

    #[tokio::test]
    async fn failed_store_leaves_flag_untouched() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("occupied");
        tokio::fs::write(&blocker, b"file, not a directory")
            .await
            .unwrap();

        // Target directory path runs through a regular file.
        let store = ResumeStore::new(blocker.join("sub"));
        let result = store.store("cv.pdf", b"x").await;

        assert!(result.is_err());
        assert!(!store.is_active());
    }

    #[tokio::test]
    async fn clear_without_store_fails_and_flag_is_unchanged() {
        let dir = TempDir::new().unwrap();
        let store = ResumeStore::new(dir.path());

        assert!(store.clear().await.is_err());
        assert!(!store.is_active());
    }
}
