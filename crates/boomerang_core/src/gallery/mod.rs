//! Album persistence for finished boomerangs.
//!
//! The pipeline hands back a path inside its scratch directory; the next
//! run will delete that file. Saving copies it into a named album, where it
//! stays.

mod directory;

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Local};
use serde::Serialize;
use thiserror::Error;

pub use directory::DirectoryGallery;

/// File extensions listed as videos.
pub const VIDEO_EXTENSIONS: [&str; 5] = ["mp4", "mov", "m4v", "mkv", "webm"];

#[derive(Error, Debug)]
pub enum GalleryError {
    #[error("Nothing to save, file not found: {}", .0.display())]
    SourceMissing(PathBuf),

    #[error("Gallery I/O error while {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: io::Error,
    },
}

impl GalleryError {
    pub fn io(operation: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            source,
        }
    }
}

pub type GalleryResult<T> = Result<T, GalleryError>;

/// One saved video in an album.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GalleryAsset {
    pub id: String,
    pub album: String,
    pub path: PathBuf,
    pub created_at: DateTime<Local>,
}

/// Destination for finished boomerangs.
#[async_trait]
pub trait GalleryWriter: Send + Sync {
    /// Persist `file` as a new asset in `album`, creating the album if needed.
    async fn save_to_album(&self, file: &Path, album: &str) -> GalleryResult<GalleryAsset>;

    /// Assets in `album`, oldest first. A missing album is empty.
    async fn list_album(&self, album: &str) -> GalleryResult<Vec<GalleryAsset>>;
}

pub(crate) fn is_video_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| VIDEO_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}
