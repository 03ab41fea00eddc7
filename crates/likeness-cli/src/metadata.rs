//! Filesystem-backed [`MetadataReader`].

use std::path::{Path, PathBuf};

use likeness_core::{
  Error, Result,
  ingest::{MetadataReader, PhotoMetadata},
};
use tracing::debug;

/// Reads image dimensions from the file header and the modification time
/// from the filesystem. Camera time and place are left empty, so capture
/// time falls back to the filename, then the modification time.
pub struct LocalMetadataReader;

impl MetadataReader for LocalMetadataReader {
  async fn read(&self, path: &Path) -> Result<PhotoMetadata> {
    let fs_meta = tokio::fs::metadata(path).await.map_err(|e| Error::Metadata {
      path:    path.to_path_buf(),
      message: e.to_string(),
    })?;

    let owned: PathBuf = path.to_path_buf();
    let dims = tokio::task::spawn_blocking(move || image::image_dimensions(&owned))
      .await
      .map_err(|e| Error::Metadata { path: path.to_path_buf(), message: e.to_string() })?;
    let (width, height) = match dims {
      Ok((w, h)) => (Some(w), Some(h)),
      Err(e) => {
        debug!(path = %path.display(), error = %e, "image dimensions unavailable");
        (None, None)
      }
    };

    Ok(PhotoMetadata {
      taken_at: None,
      location: Default::default(),
      width,
      height,
      modified: fs_meta.modified().ok(),
    })
  }
}
