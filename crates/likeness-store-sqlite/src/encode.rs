//! Encoding and decoding helpers between domain types and SQLite columns.
//!
//! UTC timestamps are stored as RFC 3339 strings, local capture times in a
//! fixed ISO layout that sorts lexicographically. UUIDs are hyphenated
//! lowercase strings, fingerprints lowercase hex, embeddings raw
//! little-endian `f32` blobs.

use chrono::{DateTime, NaiveDateTime, Utc};
use likeness_core::{
  embedding,
  face::{BoundingBox, Face},
  fingerprint::Fingerprint,
  person::Person,
  photo::{Location, Photo},
};
use tracing::warn;
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── Timestamps ──────────────────────────────────────────────────────────────

const LOCAL_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn encode_local(dt: NaiveDateTime) -> String { dt.format(LOCAL_FORMAT).to_string() }

pub fn decode_local(s: &str) -> Result<NaiveDateTime> {
  NaiveDateTime::parse_from_str(s, LOCAL_FORMAT).map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawPhoto::from_row`].
pub const PHOTO_COLUMNS: &str = "photo_id, fingerprint, path, filename, captured_at, \
                                 city, country, width, height, analyzed, imported_at";

/// Raw values read directly from a `photos` row.
pub struct RawPhoto {
  pub photo_id:    String,
  pub fingerprint: String,
  pub path:        String,
  pub filename:    String,
  pub captured_at: Option<String>,
  pub city:        Option<String>,
  pub country:     Option<String>,
  pub width:       Option<u32>,
  pub height:      Option<u32>,
  pub analyzed:    bool,
  pub imported_at: String,
}

impl RawPhoto {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      photo_id:    row.get(0)?,
      fingerprint: row.get(1)?,
      path:        row.get(2)?,
      filename:    row.get(3)?,
      captured_at: row.get(4)?,
      city:        row.get(5)?,
      country:     row.get(6)?,
      width:       row.get(7)?,
      height:      row.get(8)?,
      analyzed:    row.get(9)?,
      imported_at: row.get(10)?,
    })
  }

  pub fn into_photo(self) -> Result<Photo> {
    Ok(Photo {
      photo_id:    decode_uuid(&self.photo_id)?,
      fingerprint: self.fingerprint.parse::<Fingerprint>()?,
      path:        self.path,
      filename:    self.filename,
      captured_at: self.captured_at.as_deref().map(decode_local).transpose()?,
      location:    Location { city: self.city, country: self.country },
      width:       self.width,
      height:      self.height,
      analyzed:    self.analyzed,
      imported_at: decode_dt(&self.imported_at)?,
    })
  }
}

/// Column list matching [`RawFace::from_row`].
pub const FACE_COLUMNS: &str = "f.face_id, f.photo_id, f.person_id, f.embedding, f.bbox_left, \
                                f.bbox_top, f.bbox_right, f.bbox_bottom, f.detected_at";

/// Raw values read directly from a `faces` row.
pub struct RawFace {
  pub face_id:     String,
  pub photo_id:    String,
  pub person_id:   Option<String>,
  pub embedding:   Vec<u8>,
  pub bbox:        [i32; 4],
  pub detected_at: String,
}

impl RawFace {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      face_id:     row.get(0)?,
      photo_id:    row.get(1)?,
      person_id:   row.get(2)?,
      embedding:   row.get(3)?,
      bbox:        [row.get(4)?, row.get(5)?, row.get(6)?, row.get(7)?],
      detected_at: row.get(8)?,
    })
  }

  pub fn into_face(self) -> Result<Face> {
    let [left, top, right, bottom] = self.bbox;
    Ok(Face {
      face_id:     decode_uuid(&self.face_id)?,
      photo_id:    decode_uuid(&self.photo_id)?,
      embedding:   embedding::decode_blob(&self.embedding)?,
      bbox:        BoundingBox { left, top, right, bottom },
      person_id:   self.person_id.as_deref().map(decode_uuid).transpose()?,
      detected_at: decode_dt(&self.detected_at)?,
    })
  }
}

/// Column list matching [`RawPerson::from_row`].
pub const PERSON_COLUMNS: &str = "p.person_id, p.name, p.centroid, p.face_count, p.created_at";

/// Raw values read directly from a `persons` row.
pub struct RawPerson {
  pub person_id:  String,
  pub name:       String,
  pub centroid:   Option<Vec<u8>>,
  pub face_count: u32,
  pub created_at: String,
}

impl RawPerson {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      person_id:  row.get(0)?,
      name:       row.get(1)?,
      centroid:   row.get(2)?,
      face_count: row.get(3)?,
      created_at: row.get(4)?,
    })
  }

  /// A centroid blob that fails to decode is dropped, not fatal: the person
  /// is still listed and simply cannot be matched by distance.
  pub fn into_person(self) -> Result<Person> {
    let person_id = decode_uuid(&self.person_id)?;
    let centroid = match self.centroid.as_deref().map(embedding::decode_blob) {
      Some(Ok(c)) => Some(c),
      Some(Err(e)) => {
        warn!(%person_id, error = %e, "ignoring undecodable centroid");
        None
      }
      None => None,
    };
    Ok(Person {
      person_id,
      name: self.name,
      centroid,
      face_count: self.face_count,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}
