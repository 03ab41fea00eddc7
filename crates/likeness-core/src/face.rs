//! Detected faces.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Face rectangle in pixel coordinates of the original image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
  pub left:   i32,
  pub top:    i32,
  pub right:  i32,
  pub bottom: i32,
}

impl BoundingBox {
  pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
    Self { left, top, right, bottom }
  }

  pub fn width(&self) -> i64 { (self.right as i64 - self.left as i64).max(0) }

  pub fn height(&self) -> i64 { (self.bottom as i64 - self.top as i64).max(0) }

  pub fn area(&self) -> i64 { self.width() * self.height() }
}

/// A face belonging to exactly one photo. Only `person_id` ever changes
/// after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Face {
  pub face_id:     Uuid,
  pub photo_id:    Uuid,
  pub embedding:   Vec<f32>,
  pub bbox:        BoundingBox,
  /// `None` while unassigned.
  pub person_id:   Option<Uuid>,
  pub detected_at: DateTime<Utc>,
}

/// A face as reported by a [`crate::ingest::FaceDetector`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedFace {
  pub bbox:      BoundingBox,
  pub embedding: Vec<f32>,
}

/// A face together with the location of the photo it was found in.
#[derive(Debug, Clone)]
pub struct PersonFace {
  pub face:       Face,
  pub photo_path: String,
}

/// Pick the face with the largest bounding box, the best candidate for a
/// person thumbnail. Ties keep the earliest face.
pub fn representative_face(faces: &[PersonFace]) -> Option<&PersonFace> {
  faces.iter().fold(None, |best: Option<&PersonFace>, pf| match best {
    Some(b) if b.face.bbox.area() >= pf.face.bbox.area() => Some(b),
    _ => Some(pf),
  })
}
