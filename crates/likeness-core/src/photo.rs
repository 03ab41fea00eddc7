//! Photo records.
//!
//! A photo is keyed by its content [`Fingerprint`]: the same bytes seen under
//! a new path or filename update the existing record instead of creating a
//! second one.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::fingerprint::Fingerprint;

/// Reverse-geocoded place a photo was taken at.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
  pub city:    Option<String>,
  pub country: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Photo {
  pub photo_id:    Uuid,
  pub fingerprint: Fingerprint,
  pub path:        String,
  pub filename:    String,
  /// Best-effort local capture time; see [`crate::capture`].
  pub captured_at: Option<NaiveDateTime>,
  pub location:    Location,
  pub width:       Option<u32>,
  pub height:      Option<u32>,
  /// Set once face detection has run; cleared only by an explicit reset.
  pub analyzed:    bool,
  pub imported_at: DateTime<Utc>,
}

/// Input to [`crate::store::LibraryStore::insert_photo`].
#[derive(Debug, Clone)]
pub struct NewPhoto {
  pub fingerprint: Fingerprint,
  pub path:        String,
  pub filename:    String,
  pub captured_at: Option<NaiveDateTime>,
  pub location:    Location,
  pub width:       Option<u32>,
  pub height:      Option<u32>,
}

/// The mutable part of a photo refreshed on every repeat sighting.
#[derive(Debug, Clone)]
pub struct PhotoSighting {
  pub path:     String,
  pub filename: String,
  pub location: Location,
}

/// Gallery filter for [`crate::store::LibraryStore::search_photos`].
#[derive(Debug, Clone, Default)]
pub struct PhotoQuery {
  /// Photos containing these persons.
  pub person_ids:         Vec<Uuid>,
  /// With `true`, a photo must contain every person in `person_ids`;
  /// otherwise any one of them is enough.
  pub match_all:          bool,
  /// Also return photos that contain at least one unassigned face.
  pub include_unassigned: bool,
  pub captured_from:      Option<NaiveDateTime>,
  pub captured_to:        Option<NaiveDateTime>,
  /// Case-insensitive substring over city and country.
  pub location:           Option<String>,
  pub limit:              Option<usize>,
  pub offset:             Option<usize>,
}
