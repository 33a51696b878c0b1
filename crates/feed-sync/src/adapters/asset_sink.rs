//! Filesystem Asset Sink
//!
//! Writes downloaded images into a directory. There is no viewer to hand
//! a URI to from a terminal, so `open_external` only announces it.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::domain::{FeedError, SavedAsset};
use crate::ports::outbound::AssetSink;

/// Asset sink writing into `dir`.
#[derive(Clone, Debug)]
pub struct FsAssetSink {
    dir: PathBuf,
}

impl FsAssetSink {
    /// Sink writing into `dir` (created on first save).
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Target directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl AssetSink for FsAssetSink {
    async fn save(&self, file_name: &str, bytes: Vec<u8>) -> Result<SavedAsset, FeedError> {
        let file_name = sanitize_file_name(file_name);
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| FeedError::Asset(format!("{}: {e}", self.dir.display())))?;

        let path = self.dir.join(&file_name);
        let size = bytes.len();
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| FeedError::Asset(format!("{}: {e}", path.display())))?;

        Ok(SavedAsset {
            file_name,
            location: path.display().to_string(),
            size,
        })
    }

    async fn open_external(&self, uri: &str) -> Result<(), FeedError> {
        info!(%uri, "[feed-sync] Open the image in a browser");
        Ok(())
    }
}

/// Keep a single safe path component.
fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "download".to_string()
    } else {
        cleaned.to_string()
    }
}
