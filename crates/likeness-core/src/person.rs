//! Person identities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named identity. Persons are created by the resolver and never deleted
/// automatically; the name is free for the user to edit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Person {
  pub person_id:  Uuid,
  pub name:       String,
  /// Mean embedding of the faces assigned to this person. `None` until one
  /// is committed, or when the stored blob could not be decoded.
  pub centroid:   Option<Vec<f32>>,
  /// Number of faces the centroid was computed from.
  pub face_count: u32,
  pub created_at: DateTime<Utc>,
}

/// Input to [`crate::store::LibraryStore::create_person`].
#[derive(Debug, Clone)]
pub struct NewPerson {
  pub name:       String,
  pub centroid:   Option<Vec<f32>>,
  pub face_count: u32,
}

/// A person together with the number of faces currently pointing at it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonSummary {
  pub person:         Person,
  pub assigned_faces: u64,
}

/// Parse the index out of an auto-generated name such as `"Person 12"`.
pub fn auto_name_index(prefix: &str, name: &str) -> Option<u64> {
  name
    .strip_prefix(prefix)?
    .strip_prefix(' ')?
    .parse()
    .ok()
}

/// Next free auto-generated index: one past the largest in use, starting at 1.
pub fn next_auto_index<'a>(prefix: &str, names: impl IntoIterator<Item = &'a str>) -> u64 {
  names
    .into_iter()
    .filter_map(|n| auto_name_index(prefix, n))
    .max()
    .map_or(1, |m| m + 1)
}

pub fn auto_name(prefix: &str, index: u64) -> String { format!("{prefix} {index}") }
