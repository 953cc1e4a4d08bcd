//! Per-job scratch files.
//!
//! Each composition gets a unique token so concurrent jobs sharing one
//! working directory never collide. Cleanup is best-effort and runs on
//! both success and failure paths; a missed file is a disk-space nuisance,
//! not an error worth failing the request over.

use std::path::{Path, PathBuf};

use tracing::debug;
use uuid::Uuid;

use crate::error::MediaResult;

/// A set of token-named working files inside a shared directory.
#[derive(Debug)]
pub struct ScratchDir {
    root: PathBuf,
    token: String,
    files: Vec<PathBuf>,
}

impl ScratchDir {
    /// Create the working directory (if needed) and a fresh token.
    pub async fn create(root: impl AsRef<Path>) -> MediaResult<Self> {
        let root = root.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&root).await?;
        Ok(Self {
            root,
            token: Uuid::new_v4().to_string(),
            files: Vec::new(),
        })
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Allocate (and record) a scratch file path like `bg-<token>.mp4`.
    pub fn file(&mut self, prefix: &str, extension: &str) -> PathBuf {
        let path = self
            .root
            .join(format!("{prefix}-{}.{extension}", self.token));
        self.files.push(path.clone());
        path
    }

    /// Remove every recorded scratch file, ignoring missing ones.
    pub async fn cleanup(&self) {
        for file in &self.files {
            if tokio::fs::remove_file(file).await.is_ok() {
                debug!(file = %file.display(), "Removed scratch file");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_files_are_token_scoped() {
        let dir = tempfile::tempdir().unwrap();
        let mut a = ScratchDir::create(dir.path()).await.unwrap();
        let mut b = ScratchDir::create(dir.path()).await.unwrap();

        assert_ne!(a.file("bg", "mp4"), b.file("bg", "mp4"));
    }

    #[tokio::test]
    async fn test_cleanup_removes_recorded_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut scratch = ScratchDir::create(dir.path()).await.unwrap();

        let bg = scratch.file("bg", "mp4");
        let fg = scratch.file("fg", "mp4");
        std::fs::write(&bg, b"a").unwrap();
        std::fs::write(&fg, b"b").unwrap();

        scratch.cleanup().await;
        assert!(!bg.exists());
        assert!(!fg.exists());
    }

    #[tokio::test]
    async fn test_cleanup_tolerates_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut scratch = ScratchDir::create(dir.path()).await.unwrap();
        let _never_written = scratch.file("bg", "mp4");
        scratch.cleanup().await;
    }

    #[tokio::test]
    async fn test_create_makes_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("work").join("renders");
        let _scratch = ScratchDir::create(&nested).await.unwrap();
        assert!(nested.is_dir());
    }
}
