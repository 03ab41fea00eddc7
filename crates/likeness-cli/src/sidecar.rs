//! [`FaceDetector`] backed by JSON sidecar files.
//!
//! The face model runs outside this program and leaves its results next to
//! each image as `<image>.faces.json`:
//!
//! ```json
//! { "faces": [ { "bbox": { "left": 10, "top": 20, "right": 110, "bottom": 140 },
//!                "embedding": [0.013, -0.207, ...] } ] }
//! ```

use std::{
  ffi::OsString,
  path::{Path, PathBuf},
};

use likeness_core::{Error, Result, face::DetectedFace, ingest::FaceDetector};
use serde::Deserialize;

pub const SIDECAR_SUFFIX: &str = ".faces.json";

#[derive(Deserialize)]
struct SidecarFile {
  faces: Vec<DetectedFace>,
}

pub fn sidecar_path(image: &Path) -> PathBuf {
  let mut s: OsString = image.as_os_str().to_owned();
  s.push(SIDECAR_SUFFIX);
  PathBuf::from(s)
}

pub struct SidecarDetector;

impl FaceDetector for SidecarDetector {
  async fn detect(&self, path: &Path) -> Result<Vec<DetectedFace>> {
    let detection_error = |message: String| Error::Detection { path: path.to_path_buf(), message };

    let sidecar = sidecar_path(path);
    let raw = tokio::fs::read(&sidecar)
      .await
      .map_err(|e| detection_error(format!("{}: {e}", sidecar.display())))?;
    let file: SidecarFile = serde_json::from_slice(&raw)
      .map_err(|e| detection_error(format!("{}: {e}", sidecar.display())))?;

    Ok(file.faces)
  }
}
