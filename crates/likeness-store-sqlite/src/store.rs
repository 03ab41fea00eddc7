//! [`SqliteStore`]: the SQLite implementation of [`LibraryStore`].

use std::path::Path;

use chrono::Utc;
use likeness_core::{
  embedding::encode_blob,
  face::{DetectedFace, Face, PersonFace},
  fingerprint::Fingerprint,
  person::{NewPerson, Person, PersonSummary},
  photo::{NewPhoto, Photo, PhotoQuery, PhotoSighting},
  resolve::ResolutionWrite,
  store::LibraryStore,
};
use rusqlite::{OptionalExtension as _, types::Value};
use tracing::warn;
use uuid::Uuid;

use crate::{
  Error, Result,
  encode::{
    FACE_COLUMNS, PERSON_COLUMNS, PHOTO_COLUMNS, RawFace, RawPerson, RawPhoto, encode_dt,
    encode_local, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Likeness library backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

/// Decode face rows, skipping any that cannot be decoded.
fn decode_faces(raws: Vec<RawFace>) -> Vec<Face> {
  raws
    .into_iter()
    .filter_map(|raw| {
      let face_id = raw.face_id.clone();
      raw
        .into_face()
        .inspect_err(|e| warn!(%face_id, error = %e, "skipping undecodable face"))
        .ok()
    })
    .collect()
}

fn insert_person(conn: &rusqlite::Connection, person: &Person) -> rusqlite::Result<()> {
  conn.execute(
    "INSERT INTO persons (person_id, name, centroid, face_count, created_at)
     VALUES (?1, ?2, ?3, ?4, ?5)",
    rusqlite::params![
      encode_uuid(person.person_id),
      person.name,
      person.centroid.as_deref().map(encode_blob),
      person.face_count,
      encode_dt(person.created_at),
    ],
  )?;
  Ok(())
}

fn set_centroid(
  conn: &rusqlite::Connection,
  person_id: Uuid,
  centroid: Option<&[f32]>,
  face_count: u32,
) -> rusqlite::Result<usize> {
  conn.execute(
    "UPDATE persons SET centroid = ?2, face_count = ?3 WHERE person_id = ?1",
    rusqlite::params![encode_uuid(person_id), centroid.map(encode_blob), face_count],
  )
}

/// The row an [`LibraryStore::apply_resolution`] write could not find.
enum MissingRow {
  Face(Uuid),
  Person(Uuid),
}

// ─── LibraryStore impl ───────────────────────────────────────────────────────

impl LibraryStore for SqliteStore {
  type Error = Error;

  // ── Photos ────────────────────────────────────────────────────────────────

  async fn find_photo_by_fingerprint(&self, fingerprint: &Fingerprint) -> Result<Option<Photo>> {
    let hex = fingerprint.to_hex();

    let raw: Option<RawPhoto> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {PHOTO_COLUMNS} FROM photos WHERE fingerprint = ?1"),
            rusqlite::params![hex],
            RawPhoto::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawPhoto::into_photo).transpose()
  }

  async fn get_photo(&self, photo_id: Uuid) -> Result<Option<Photo>> {
    let id_str = encode_uuid(photo_id);

    let raw: Option<RawPhoto> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {PHOTO_COLUMNS} FROM photos WHERE photo_id = ?1"),
            rusqlite::params![id_str],
            RawPhoto::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawPhoto::into_photo).transpose()
  }

  async fn insert_photo(&self, input: NewPhoto) -> Result<Photo> {
    let photo = Photo {
      photo_id:    Uuid::new_v4(),
      fingerprint: input.fingerprint,
      path:        input.path,
      filename:    input.filename,
      captured_at: input.captured_at,
      location:    input.location,
      width:       input.width,
      height:      input.height,
      analyzed:    false,
      imported_at: Utc::now(),
    };

    let id_str       = encode_uuid(photo.photo_id);
    let hex          = photo.fingerprint.to_hex();
    let path         = photo.path.clone();
    let filename     = photo.filename.clone();
    let captured_str = photo.captured_at.map(encode_local);
    let city         = photo.location.city.clone();
    let country      = photo.location.country.clone();
    let (width, height) = (photo.width, photo.height);
    let imported_str = encode_dt(photo.imported_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO photos (
             photo_id, fingerprint, path, filename, captured_at,
             city, country, width, height, analyzed, imported_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, 0, ?10)",
          rusqlite::params![
            id_str,
            hex,
            path,
            filename,
            captured_str,
            city,
            country,
            width,
            height,
            imported_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(photo)
  }

  async fn refresh_photo(&self, photo_id: Uuid, sighting: PhotoSighting) -> Result<()> {
    let id_str = encode_uuid(photo_id);

    let updated = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE photos SET path = ?2, filename = ?3, city = ?4, country = ?5
           WHERE photo_id = ?1",
          rusqlite::params![
            id_str,
            sighting.path,
            sighting.filename,
            sighting.location.city,
            sighting.location.country,
          ],
        )?)
      })
      .await?;

    if updated == 0 {
      return Err(Error::PhotoNotFound(photo_id));
    }
    Ok(())
  }

  async fn record_detection(&self, photo_id: Uuid, faces: Vec<DetectedFace>) -> Result<Vec<Face>> {
    let detected_at = Utc::now();
    let faces: Vec<Face> = faces
      .into_iter()
      .map(|d| Face {
        face_id: Uuid::new_v4(),
        photo_id,
        embedding: d.embedding,
        bbox: d.bbox,
        person_id: None,
        detected_at,
      })
      .collect();

    let id_str = encode_uuid(photo_id);
    let at_str = encode_dt(detected_at);
    let rows: Vec<(String, Vec<u8>, [i32; 4])> = faces
      .iter()
      .map(|f| {
        let b = f.bbox;
        (encode_uuid(f.face_id), encode_blob(&f.embedding), [b.left, b.top, b.right, b.bottom])
      })
      .collect();

    // Faces and the analyzed flag land together or not at all.
    let found = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let marked = tx.execute(
          "UPDATE photos SET analyzed = 1 WHERE photo_id = ?1",
          rusqlite::params![id_str],
        )?;
        if marked == 0 {
          return Ok(false);
        }
        {
          let mut stmt = tx.prepare(
            "INSERT INTO faces (
               face_id, photo_id, embedding,
               bbox_left, bbox_top, bbox_right, bbox_bottom, detected_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          )?;
          for (face_id, blob, [l, t, r, b]) in &rows {
            stmt.execute(rusqlite::params![face_id, id_str, blob, l, t, r, b, at_str])?;
          }
        }
        tx.commit()?;
        Ok(true)
      })
      .await?;

    if !found {
      return Err(Error::PhotoNotFound(photo_id));
    }
    Ok(faces)
  }

  async fn reset_analysis(&self, photo_id: Uuid) -> Result<()> {
    let id_str = encode_uuid(photo_id);

    let found = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let marked = tx.execute(
          "UPDATE photos SET analyzed = 0 WHERE photo_id = ?1",
          rusqlite::params![id_str],
        )?;
        tx.execute("DELETE FROM faces WHERE photo_id = ?1", rusqlite::params![id_str])?;
        tx.commit()?;
        Ok(marked > 0)
      })
      .await?;

    if !found {
      return Err(Error::PhotoNotFound(photo_id));
    }
    Ok(())
  }

  async fn delete_photo(&self, photo_id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(photo_id);

    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute("DELETE FROM photos WHERE photo_id = ?1", rusqlite::params![id_str])?)
      })
      .await?;

    Ok(deleted > 0)
  }

  async fn search_photos(&self, query: &PhotoQuery) -> Result<Vec<Photo>> {
    let mut conds: Vec<String> = vec![];
    let mut params: Vec<Value> = vec![];

    // Person and unassigned filters widen each other; everything else narrows.
    let mut face_conds: Vec<String> = vec![];
    if !query.person_ids.is_empty() {
      let marks = vec!["?"; query.person_ids.len()].join(", ");
      params.extend(query.person_ids.iter().map(|id| Value::Text(encode_uuid(*id))));
      if query.match_all {
        face_conds.push(format!(
          "photo_id IN (SELECT photo_id FROM faces WHERE person_id IN ({marks})
                        GROUP BY photo_id HAVING COUNT(DISTINCT person_id) = ?)"
        ));
        params.push(Value::Integer(query.person_ids.len() as i64));
      } else {
        face_conds.push(format!(
          "photo_id IN (SELECT photo_id FROM faces WHERE person_id IN ({marks}))"
        ));
      }
    }
    if query.include_unassigned {
      face_conds
        .push("photo_id IN (SELECT photo_id FROM faces WHERE person_id IS NULL)".to_owned());
    }
    if !face_conds.is_empty() {
      conds.push(format!("({})", face_conds.join(" OR ")));
    }

    if let Some(from) = query.captured_from {
      conds.push("captured_at >= ?".to_owned());
      params.push(Value::Text(encode_local(from)));
    }
    if let Some(to) = query.captured_to {
      conds.push("captured_at <= ?".to_owned());
      params.push(Value::Text(encode_local(to)));
    }
    if let Some(text) = &query.location {
      let pattern = format!("%{}%", text.to_lowercase());
      conds.push("(LOWER(city) LIKE ? OR LOWER(country) LIKE ?)".to_owned());
      params.push(Value::Text(pattern.clone()));
      params.push(Value::Text(pattern));
    }

    let where_clause = if conds.is_empty() {
      String::new()
    } else {
      format!("WHERE {}", conds.join(" AND "))
    };

    // SQLite treats a negative LIMIT as unbounded.
    params.push(Value::Integer(query.limit.map_or(-1, |l| l as i64)));
    params.push(Value::Integer(query.offset.unwrap_or(0) as i64));

    let sql = format!(
      "SELECT {PHOTO_COLUMNS} FROM photos
       {where_clause}
       ORDER BY captured_at IS NULL, captured_at, rowid
       LIMIT ? OFFSET ?"
    );

    let raws: Vec<RawPhoto> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params), RawPhoto::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPhoto::into_photo).collect()
  }

  // ── Faces ─────────────────────────────────────────────────────────────────

  async fn list_faces(&self) -> Result<Vec<Face>> {
    let raws: Vec<RawFace> = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare(&format!("SELECT {FACE_COLUMNS} FROM faces f ORDER BY f.rowid"))?;
        let rows = stmt
          .query_map([], RawFace::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(decode_faces(raws))
  }

  async fn list_person_faces(&self, person_id: Uuid) -> Result<Vec<PersonFace>> {
    let id_str = encode_uuid(person_id);

    let raws: Vec<(RawFace, String)> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {FACE_COLUMNS}, ph.path
           FROM faces f JOIN photos ph ON ph.photo_id = f.photo_id
           WHERE f.person_id = ?1
           ORDER BY f.rowid"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], |row| {
            Ok((RawFace::from_row(row)?, row.get(9)?))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(
      raws
        .into_iter()
        .filter_map(|(raw, photo_path)| {
          let face_id = raw.face_id.clone();
          match raw.into_face() {
            Ok(face) => Some(PersonFace { face, photo_path }),
            Err(e) => {
              warn!(%face_id, error = %e, "skipping undecodable face");
              None
            }
          }
        })
        .collect(),
    )
  }

  async fn assign_faces(&self, assignments: &[(Uuid, Uuid)]) -> Result<()> {
    if assignments.is_empty() {
      return Ok(());
    }
    let rows: Vec<(String, String)> = assignments
      .iter()
      .map(|(face, person)| (encode_uuid(*face), encode_uuid(*person)))
      .collect();

    let missing: Option<String> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        {
          let mut stmt = tx.prepare("UPDATE faces SET person_id = ?2 WHERE face_id = ?1")?;
          for (face_id, person_id) in &rows {
            if stmt.execute(rusqlite::params![face_id, person_id])? == 0 {
              // Dropping the transaction rolls it back.
              return Ok(Some(face_id.clone()));
            }
          }
        }
        tx.commit()?;
        Ok(None)
      })
      .await?;

    match missing {
      Some(face_id) => Err(Error::FaceNotFound(Uuid::parse_str(&face_id)?)),
      None => Ok(()),
    }
  }

  // ── Persons ───────────────────────────────────────────────────────────────

  async fn list_persons(&self) -> Result<Vec<Person>> {
    let raws: Vec<RawPerson> = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare(&format!("SELECT {PERSON_COLUMNS} FROM persons p ORDER BY p.rowid"))?;
        let rows = stmt
          .query_map([], RawPerson::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPerson::into_person).collect()
  }

  async fn create_person(&self, input: NewPerson) -> Result<Person> {
    let person = Person {
      person_id:  Uuid::new_v4(),
      name:       input.name,
      centroid:   input.centroid,
      face_count: input.face_count,
      created_at: Utc::now(),
    };

    let row = person.clone();
    self
      .conn
      .call(move |conn| {
        insert_person(conn, &row)?;
        Ok(())
      })
      .await?;

    Ok(person)
  }

  async fn update_centroid(
    &self,
    person_id: Uuid,
    centroid: Option<Vec<f32>>,
    face_count: u32,
  ) -> Result<()> {
    let updated = self
      .conn
      .call(move |conn| Ok(set_centroid(conn, person_id, centroid.as_deref(), face_count)?))
      .await?;

    if updated == 0 {
      return Err(Error::PersonNotFound(person_id));
    }
    Ok(())
  }

  async fn rename_person(&self, person_id: Uuid, name: String) -> Result<()> {
    let id_str = encode_uuid(person_id);

    let updated = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE persons SET name = ?2 WHERE person_id = ?1",
          rusqlite::params![id_str, name],
        )?)
      })
      .await?;

    if updated == 0 {
      return Err(Error::PersonNotFound(person_id));
    }
    Ok(())
  }

  async fn apply_resolution(&self, write: ResolutionWrite) -> Result<()> {
    let missing: Option<MissingRow> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        for person in &write.new_persons {
          insert_person(&tx, person)?;
        }
        {
          let mut stmt = tx.prepare("UPDATE faces SET person_id = ?2 WHERE face_id = ?1")?;
          for (face_id, person_id) in &write.assignments {
            let params = rusqlite::params![encode_uuid(*face_id), encode_uuid(*person_id)];
            if stmt.execute(params)? == 0 {
              return Ok(Some(MissingRow::Face(*face_id)));
            }
          }
        }
        for change in &write.centroid_updates {
          let centroid = change.centroid.as_deref();
          if set_centroid(&tx, change.person_id, centroid, change.face_count)? == 0 {
            return Ok(Some(MissingRow::Person(change.person_id)));
          }
        }
        tx.commit()?;
        Ok(None)
      })
      .await?;

    match missing {
      Some(MissingRow::Face(id)) => Err(Error::FaceNotFound(id)),
      Some(MissingRow::Person(id)) => Err(Error::PersonNotFound(id)),
      None => Ok(()),
    }
  }

  async fn person_summaries(&self) -> Result<Vec<PersonSummary>> {
    let raws: Vec<(RawPerson, u64)> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {PERSON_COLUMNS}, COUNT(f.face_id) AS assigned
           FROM persons p JOIN faces f ON f.person_id = p.person_id
           GROUP BY p.person_id
           ORDER BY assigned DESC, p.rowid"
        ))?;
        let rows = stmt
          .query_map([], |row| {
            Ok((RawPerson::from_row(row)?, row.get::<_, i64>(5)? as u64))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(|(raw, assigned_faces)| {
        Ok(PersonSummary { person: raw.into_person()?, assigned_faces })
      })
      .collect()
  }
}
