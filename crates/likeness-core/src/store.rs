//! The `LibraryStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `likeness-store-sqlite`).
//! The ingestion pipeline and the identity resolver depend on this
//! abstraction, not on any concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  face::{DetectedFace, Face, PersonFace},
  fingerprint::Fingerprint,
  person::{NewPerson, Person, PersonSummary},
  photo::{NewPhoto, Photo, PhotoQuery, PhotoSighting},
  resolve::ResolutionWrite,
};

/// Abstraction over a Likeness library backend.
///
/// Faces are append-only apart from their person assignment. Persons are only
/// ever created, renamed, or have their centroid replaced.
///
/// All methods return `Send` futures so a resolution pass can run on a
/// background tokio task.
pub trait LibraryStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Photos ────────────────────────────────────────────────────────────

  /// Look up a photo by content fingerprint. Returns `None` if unseen.
  fn find_photo_by_fingerprint<'a>(
    &'a self,
    fingerprint: &'a Fingerprint,
  ) -> impl Future<Output = Result<Option<Photo>, Self::Error>> + Send + 'a;

  fn get_photo(
    &self,
    photo_id: Uuid,
  ) -> impl Future<Output = Result<Option<Photo>, Self::Error>> + Send + '_;

  /// Insert a photo. Fails if the fingerprint is already present.
  fn insert_photo(
    &self,
    input: NewPhoto,
  ) -> impl Future<Output = Result<Photo, Self::Error>> + Send + '_;

  /// Refresh path, filename and location of a known photo in place.
  fn refresh_photo(
    &self,
    photo_id: Uuid,
    sighting: PhotoSighting,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Persist the faces detected in a photo and mark it analyzed, atomically.
  fn record_detection(
    &self,
    photo_id: Uuid,
    faces: Vec<DetectedFace>,
  ) -> impl Future<Output = Result<Vec<Face>, Self::Error>> + Send + '_;

  /// Delete a photo's faces and clear its analyzed flag so the next import
  /// detects faces again.
  fn reset_analysis(
    &self,
    photo_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Delete a photo and, by cascade, its faces. Returns `false` if absent.
  fn delete_photo(
    &self,
    photo_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Gallery search, ordered by capture time.
  fn search_photos<'a>(
    &'a self,
    query: &'a PhotoQuery,
  ) -> impl Future<Output = Result<Vec<Photo>, Self::Error>> + Send + 'a;

  // ── Faces ─────────────────────────────────────────────────────────────

  /// All faces in insertion order. Rows whose embedding cannot be decoded
  /// are skipped.
  fn list_faces(
    &self,
  ) -> impl Future<Output = Result<Vec<Face>, Self::Error>> + Send + '_;

  /// Faces assigned to a person, joined with their photo paths.
  fn list_person_faces(
    &self,
    person_id: Uuid,
  ) -> impl Future<Output = Result<Vec<PersonFace>, Self::Error>> + Send + '_;

  /// Set `person_id` on each `(face_id, person_id)` pair in one transaction.
  fn assign_faces<'a>(
    &'a self,
    assignments: &'a [(Uuid, Uuid)],
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  // ── Persons ───────────────────────────────────────────────────────────

  /// All persons in creation order. An undecodable centroid is returned as
  /// `None`.
  fn list_persons(
    &self,
  ) -> impl Future<Output = Result<Vec<Person>, Self::Error>> + Send + '_;

  fn create_person(
    &self,
    input: NewPerson,
  ) -> impl Future<Output = Result<Person, Self::Error>> + Send + '_;

  fn update_centroid(
    &self,
    person_id: Uuid,
    centroid: Option<Vec<f32>>,
    face_count: u32,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn rename_person(
    &self,
    person_id: Uuid,
    name: String,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Create persons, assign faces and replace centroids in one transaction.
  /// On error nothing is written.
  fn apply_resolution(
    &self,
    write: ResolutionWrite,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Persons with at least one assigned face, with live face counts.
  fn person_summaries(
    &self,
  ) -> impl Future<Output = Result<Vec<PersonSummary>, Self::Error>> + Send + '_;
}
