//! The pipeline's scratch directory.
//!
//! One directory, three well-known files. Every run starts by deleting
//! them, so a directory is a single slot overwritten by each invocation.
//! Two runs sharing one `Workspace` at the same time will corrupt each
//! other's files; callers serialize runs.

use std::io;
use std::path::{Path, PathBuf};

/// Private copy of the source clip.
pub const STAGED_ORIGINAL: &str = "original.mp4";
/// Time-reversed copy of the staged original.
pub const REVERSED_CLIP: &str = "reversed.mp4";
/// Original followed by reversed.
pub const CONCATENATED_OUTPUT: &str = "boomerang.mp4";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn staged_original(&self) -> PathBuf {
        self.root.join(STAGED_ORIGINAL)
    }

    pub fn reversed_clip(&self) -> PathBuf {
        self.root.join(REVERSED_CLIP)
    }

    pub fn concatenated_output(&self) -> PathBuf {
        self.root.join(CONCATENATED_OUTPUT)
    }

    /// All files a run may leave behind.
    pub fn artifacts(&self) -> [PathBuf; 3] {
        [
            self.staged_original(),
            self.reversed_clip(),
            self.concatenated_output(),
        ]
    }

    /// Whether `path` resolves to one of the existing artifacts.
    pub fn holds(&self, path: &Path) -> bool {
        let Ok(target) = std::fs::canonicalize(path) else {
            return false;
        };
        self.artifacts()
            .iter()
            .filter_map(|artifact| std::fs::canonicalize(artifact).ok())
            .any(|artifact| artifact == target)
    }

    /// Create the directory if needed and delete previous artifacts.
    ///
    /// Idempotent: artifacts that do not exist are not an error.
    pub async fn reset(&self) -> io::Result<()> {
        tokio::fs::create_dir_all(&self.root).await?;
        for artifact in self.artifacts() {
            remove_if_exists(&artifact).await?;
        }
        Ok(())
    }
}

async fn remove_if_exists(path: &Path) -> io::Result<()> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {
            tracing::trace!("Removed {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn artifact_paths_live_in_root() {
        let ws = Workspace::new("/tmp/work");
        assert_eq!(ws.staged_original(), Path::new("/tmp/work/original.mp4"));
        assert_eq!(ws.reversed_clip(), Path::new("/tmp/work/reversed.mp4"));
        assert_eq!(ws.concatenated_output(), Path::new("/tmp/work/boomerang.mp4"));
    }

    #[tokio::test]
    async fn reset_creates_missing_directory() {
        let dir = tempdir().unwrap();
        let ws = Workspace::new(dir.path().join("nested").join("work"));

        ws.reset().await.unwrap();
        assert!(ws.root().is_dir());
    }

    #[tokio::test]
    async fn reset_removes_previous_artifacts_only() {
        let dir = tempdir().unwrap();
        let ws = Workspace::new(dir.path());
        for artifact in ws.artifacts() {
            std::fs::write(&artifact, b"stale").unwrap();
        }
        let unrelated = dir.path().join("keep.txt");
        std::fs::write(&unrelated, b"keep").unwrap();

        ws.reset().await.unwrap();

        for artifact in ws.artifacts() {
            assert!(!artifact.exists());
        }
        assert!(unrelated.exists());
    }

    #[tokio::test]
    async fn reset_is_idempotent() {
        let dir = tempdir().unwrap();
        let ws = Workspace::new(dir.path());
        ws.reset().await.unwrap();
        ws.reset().await.unwrap();
    }

    #[test]
    fn holds_matches_existing_artifacts_only() {
        let dir = tempdir().unwrap();
        let ws = Workspace::new(dir.path().join("work"));
        std::fs::create_dir_all(ws.root()).unwrap();
        std::fs::write(ws.concatenated_output(), b"out").unwrap();
        let outside = dir.path().join("clip.mp4");
        std::fs::write(&outside, b"clip").unwrap();

        assert!(ws.holds(&ws.concatenated_output()));
        assert!(ws.holds(&ws.root().join(".").join(CONCATENATED_OUTPUT)));
        assert!(!ws.holds(&ws.staged_original()));
        assert!(!ws.holds(&outside));
    }

    #[tokio::test]
    async fn reset_fails_when_root_is_a_file() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("not_a_dir");
        std::fs::write(&file, b"x").unwrap();

        let ws = Workspace::new(&file);
        assert!(ws.reset().await.is_err());
    }
}
