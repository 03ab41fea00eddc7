//! Photo ingestion: fingerprint, deduplicate, detect faces.
//!
//! Face detection and metadata extraction are external collaborators plugged
//! in through [`FaceDetector`] and [`MetadataReader`]. Each photo yields its
//! own `Result`; one unreadable file never stops the batch.

use std::{
  path::{Path, PathBuf},
  time::SystemTime,
};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
  Error, Result, capture,
  face::DetectedFace,
  fingerprint::Fingerprint,
  photo::{Location, NewPhoto, PhotoSighting},
  store::LibraryStore,
};

// ─── Config ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
  /// Run the face detector on unanalyzed photos.
  pub detect_faces: bool,
  /// Lowercase file extensions considered photos.
  pub extensions:   Vec<String>,
}

impl Default for ImportConfig {
  fn default() -> Self {
    Self {
      detect_faces: true,
      extensions:   ["jpg", "jpeg", "png", "webp"].map(String::from).to_vec(),
    }
  }
}

impl ImportConfig {
  pub fn accepts(&self, path: &Path) -> bool {
    path
      .extension()
      .and_then(|e| e.to_str())
      .is_some_and(|e| self.extensions.iter().any(|x| x.eq_ignore_ascii_case(e)))
  }
}

// ─── Collaborators ───────────────────────────────────────────────────────────

/// Metadata an external reader extracted from an image file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhotoMetadata {
  /// Capture time recorded by the camera, if any.
  pub taken_at: Option<NaiveDateTime>,
  pub location: Location,
  pub width:    Option<u32>,
  pub height:   Option<u32>,
  pub modified: Option<SystemTime>,
}

pub trait MetadataReader {
  async fn read(&self, path: &Path) -> Result<PhotoMetadata>;
}

/// Finds faces in an image and embeds each one.
pub trait FaceDetector {
  async fn detect(&self, path: &Path) -> Result<Vec<DetectedFace>>;
}

// ─── Reports ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sighting {
  /// First time this content was seen.
  New,
  /// Same content seen before, possibly under another path.
  Known,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestOutcome {
  pub photo_id: Uuid,
  pub sighting: Sighting,
  /// Faces stored by this ingest; `None` when detection did not run.
  pub faces:    Option<usize>,
}

/// Per-photo results of a batch, in input order.
#[derive(Debug, Default)]
pub struct IngestReport {
  pub results: Vec<(PathBuf, Result<IngestOutcome>)>,
}

impl IngestReport {
  pub fn succeeded(&self) -> impl Iterator<Item = (&Path, &IngestOutcome)> {
    self
      .results
      .iter()
      .filter_map(|(p, r)| r.as_ref().ok().map(|o| (p.as_path(), o)))
  }

  pub fn failed(&self) -> impl Iterator<Item = (&Path, &Error)> {
    self
      .results
      .iter()
      .filter_map(|(p, r)| r.as_ref().err().map(|e| (p.as_path(), e)))
  }

  pub fn new_photos(&self) -> usize {
    self.succeeded().filter(|(_, o)| o.sighting == Sighting::New).count()
  }

  pub fn faces_detected(&self) -> usize {
    self.succeeded().filter_map(|(_, o)| o.faces).sum()
  }
}

/// Progress of a batch, reported after every photo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestProgress {
  pub done:  usize,
  pub total: usize,
}

// ─── Ingestor ────────────────────────────────────────────────────────────────

/// Imports photos into a [`LibraryStore`].
pub struct Ingestor<'a, S, M, D> {
  store:        &'a S,
  metadata:     M,
  detector:     D,
  detect_faces: bool,
}

impl<'a, S, M, D> Ingestor<'a, S, M, D>
where
  S: LibraryStore,
  M: MetadataReader,
  D: FaceDetector,
{
  pub fn new(store: &'a S, metadata: M, detector: D) -> Self {
    Self { store, metadata, detector, detect_faces: true }
  }

  /// Record metadata only; photos stay unanalyzed for a later run.
  pub fn without_detection(mut self) -> Self {
    self.detect_faces = false;
    self
  }

  pub fn with_config(mut self, config: &ImportConfig) -> Self {
    self.detect_faces = config.detect_faces;
    self
  }

  pub async fn ingest_all<P, F>(&self, paths: &[P], progress: F) -> IngestReport
  where
    P: AsRef<Path>,
    F: Fn(IngestProgress),
  {
    let total = paths.len();
    let mut report = IngestReport { results: Vec::with_capacity(total) };
    for (i, path) in paths.iter().enumerate() {
      let path = path.as_ref();
      let result = self.ingest(path).await;
      if let Err(e) = &result {
        warn!(path = %path.display(), error = %e, "photo could not be ingested");
      }
      report.results.push((path.to_path_buf(), result));
      progress(IngestProgress { done: i + 1, total });
    }
    info!(
      total,
      new = report.new_photos(),
      faces = report.faces_detected(),
      failed = report.failed().count(),
      "ingest finished"
    );
    report
  }

  /// Import one file. A file whose content is already known refreshes the
  /// existing record and is only analyzed if that never happened.
  pub async fn ingest(&self, path: &Path) -> Result<IngestOutcome> {
    let fingerprint = Fingerprint::of_file(path).await?;
    let filename = path
      .file_name()
      .map(|n| n.to_string_lossy().into_owned())
      .unwrap_or_default();
    let path_str = path.to_string_lossy().into_owned();
    let meta = self.metadata.read(path).await?;

    let (photo_id, analyzed, sighting) =
      match self.store.find_photo_by_fingerprint(&fingerprint).await.map_err(Error::store)? {
        Some(existing) => {
          debug!(photo_id = %existing.photo_id, %fingerprint, "known photo, refreshing");
          self
            .store
            .refresh_photo(existing.photo_id, PhotoSighting {
              path:     path_str,
              filename,
              location: meta.location,
            })
            .await
            .map_err(Error::store)?;
          (existing.photo_id, existing.analyzed, Sighting::Known)
        }
        None => {
          let captured_at = capture::resolve(meta.taken_at, &filename, meta.modified);
          let photo = self
            .store
            .insert_photo(NewPhoto {
              fingerprint,
              path: path_str,
              filename,
              captured_at,
              location: meta.location,
              width: meta.width,
              height: meta.height,
            })
            .await
            .map_err(Error::store)?;
          (photo.photo_id, false, Sighting::New)
        }
      };

    if analyzed || !self.detect_faces {
      return Ok(IngestOutcome { photo_id, sighting, faces: None });
    }

    let detected = self.detector.detect(path).await?;
    let stored = self
      .store
      .record_detection(photo_id, detected)
      .await
      .map_err(Error::store)?;
    debug!(%photo_id, faces = stored.len(), "faces recorded");

    Ok(IngestOutcome { photo_id, sighting, faces: Some(stored.len()) })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn extension_match_ignores_case() {
    let cfg = ImportConfig::default();
    assert!(cfg.accepts(Path::new("/a/IMG_0001.JPG")));
    assert!(cfg.accepts(Path::new("b.webp")));
    assert!(!cfg.accepts(Path::new("b.faces.json")));
    assert!(!cfg.accepts(Path::new("README")));
  }

  #[test]
  fn report_tallies() {
    let id = Uuid::new_v4();
    let report = IngestReport {
      results: vec![
        (PathBuf::from("a.jpg"), Ok(IngestOutcome { photo_id: id, sighting: Sighting::New, faces: Some(2) })),
        (PathBuf::from("b.jpg"), Ok(IngestOutcome { photo_id: id, sighting: Sighting::Known, faces: None })),
        (PathBuf::from("c.jpg"), Err(Error::Io(std::io::ErrorKind::NotFound.into()))),
      ],
    };
    assert_eq!(report.new_photos(), 1);
    assert_eq!(report.faces_detected(), 2);
    assert_eq!(report.failed().count(), 1);
  }
}
