//! Gallery stored as plain directories: one directory per album.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Local};

use super::{is_video_file, GalleryAsset, GalleryError, GalleryResult, GalleryWriter};

#[derive(Debug, Clone)]
pub struct DirectoryGallery {
    root: PathBuf,
}

impl DirectoryGallery {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn album_dir(&self, album: &str) -> PathBuf {
        self.root.join(sanitize_album(album))
    }

    /// Unique asset id: `boomerang_<timestamp>_<8 hex>`.
    fn new_asset_id() -> String {
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        format!(
            "boomerang_{}_{}",
            Local::now().format("%Y%m%d_%H%M%S"),
            &suffix[..8]
        )
    }
}

#[async_trait]
impl GalleryWriter for DirectoryGallery {
    async fn save_to_album(&self, file: &Path, album: &str) -> GalleryResult<GalleryAsset> {
        if !tokio::fs::try_exists(file).await.unwrap_or(false) {
            return Err(GalleryError::SourceMissing(file.to_path_buf()));
        }

        let album_dir = self.album_dir(album);
        tokio::fs::create_dir_all(&album_dir)
            .await
            .map_err(|e| GalleryError::io("creating album", e))?;

        let extension = file
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("mp4");
        let id = Self::new_asset_id();
        let dest = album_dir.join(format!("{}.{}", id, extension));

        tokio::fs::copy(file, &dest)
            .await
            .map_err(|e| GalleryError::io("copying asset", e))?;

        tracing::info!("Saved {} to album '{}'", dest.display(), album);

        Ok(GalleryAsset {
            id,
            album: album.to_string(),
            path: dest,
            created_at: Local::now(),
        })
    }

    async fn list_album(&self, album: &str) -> GalleryResult<Vec<GalleryAsset>> {
        let album_dir = self.album_dir(album);
        if !tokio::fs::try_exists(&album_dir).await.unwrap_or(false) {
            tracing::debug!("Album '{}' not found", album);
            return Ok(Vec::new());
        }

        let mut entries = tokio::fs::read_dir(&album_dir)
            .await
            .map_err(|e| GalleryError::io("reading album", e))?;

        let mut assets = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| GalleryError::io("reading album", e))?
        {
            let path = entry.path();
            if !is_video_file(&path) {
                continue;
            }

            let metadata = entry
                .metadata()
                .await
                .map_err(|e| GalleryError::io("reading asset metadata", e))?;
            if !metadata.is_file() {
                continue;
            }

            let created = metadata
                .created()
                .or_else(|_| metadata.modified())
                .map_err(|e| GalleryError::io("reading asset timestamp", e))?;

            let id = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();

            assets.push(GalleryAsset {
                id,
                album: album.to_string(),
                path,
                created_at: DateTime::<Local>::from(created),
            });
        }

        assets.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(assets)
    }
}

/// Album names become a single directory component.
fn sanitize_album(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            _ => c,
        })
        .collect();

    match cleaned.as_str() {
        "" | "." | ".." => "_".to_string(),
        _ => cleaned,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn save_creates_album_and_copies_file() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("boomerang.mp4");
        std::fs::write(&output, b"clip").unwrap();

        let gallery = DirectoryGallery::new(dir.path().join("gallery"));
        let asset = gallery.save_to_album(&output, "mini-when-videos").await.unwrap();

        assert!(asset.path.starts_with(gallery.album_dir("mini-when-videos")));
        assert!(asset.id.starts_with("boomerang_"));
        assert_eq!(std::fs::read(&asset.path).unwrap(), b"clip");
        // Original is copied, not moved
        assert!(output.exists());
    }

    #[tokio::test]
    async fn saved_asset_encodes_as_json() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("boomerang.mp4");
        std::fs::write(&output, b"clip").unwrap();

        let gallery = DirectoryGallery::new(dir.path().join("gallery"));
        let asset = gallery.save_to_album(&output, "album").await.unwrap();

        let json = serde_json::to_value(&asset).unwrap();
        assert_eq!(json["album"], "album");
        assert!(json["created_at"].is_string());
    }

    #[tokio::test]
    async fn repeated_saves_get_distinct_assets() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("boomerang.mp4");
        std::fs::write(&output, b"clip").unwrap();

        let gallery = DirectoryGallery::new(dir.path().join("gallery"));
        let a = gallery.save_to_album(&output, "album").await.unwrap();
        let b = gallery.save_to_album(&output, "album").await.unwrap();

        assert_ne!(a.path, b.path);
        assert_eq!(gallery.list_album("album").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn save_missing_file_fails() {
        let dir = tempdir().unwrap();
        let gallery = DirectoryGallery::new(dir.path());
        let err = gallery
            .save_to_album(&dir.path().join("absent.mp4"), "album")
            .await
            .unwrap_err();
        assert!(matches!(err, GalleryError::SourceMissing(_)));
    }

    #[tokio::test]
    async fn missing_album_lists_empty() {
        let dir = tempdir().unwrap();
        let gallery = DirectoryGallery::new(dir.path());
        assert!(gallery.list_album("nope").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_skips_non_videos() {
        let dir = tempdir().unwrap();
        let gallery = DirectoryGallery::new(dir.path());
        let album = gallery.album_dir("album");
        std::fs::create_dir_all(&album).unwrap();
        std::fs::write(album.join("one.mp4"), b"v").unwrap();
        std::fs::write(album.join("thumbs.db"), b"x").unwrap();

        let assets = gallery.list_album("album").await.unwrap();
        assert_eq!(assets.len(), 1);
        assert_eq!(assets[0].id, "one");
        assert_eq!(assets[0].album, "album");
    }

    #[test]
    fn album_names_stay_inside_root() {
        assert_eq!(sanitize_album("mini-when-videos"), "mini-when-videos");
        assert_eq!(sanitize_album("../escape"), ".._escape");
        assert_eq!(sanitize_album(".."), "_");
        assert_eq!(sanitize_album("  "), "_");
    }
}
