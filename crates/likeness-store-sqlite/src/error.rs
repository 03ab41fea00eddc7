//! Error type for `likeness-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] likeness_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("photo not found: {0}")]
  PhotoNotFound(uuid::Uuid),

  #[error("person not found: {0}")]
  PersonNotFound(uuid::Uuid),

  /// An assignment referenced a face that does not exist.
  #[error("face not found: {0}")]
  FaceNotFound(uuid::Uuid),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
