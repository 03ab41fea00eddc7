//! Error types for `likeness-core`.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("an identity resolution pass is already running")]
  ResolutionInProgress,

  #[error("identity resolution was cancelled")]
  Cancelled,

  #[error("invalid resolver configuration: {0}")]
  InvalidConfig(String),

  #[error("malformed embedding blob of {0} bytes")]
  MalformedEmbedding(usize),

  #[error("invalid fingerprint: {0:?}")]
  InvalidFingerprint(String),

  #[error("face detection failed for {path:?}: {message}")]
  Detection { path: PathBuf, message: String },

  #[error("metadata extraction failed for {path:?}: {message}")]
  Metadata { path: PathBuf, message: String },

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}

impl Error {
  /// Wrap a backend error.
  pub fn store<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(err))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
