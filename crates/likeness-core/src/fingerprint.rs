//! Content fingerprints used as the photo deduplication key.
//!
//! A fingerprint is the SHA-256 digest of a file's full byte content. Files
//! are streamed in fixed-size chunks so memory use does not grow with file
//! size.

use std::{fmt, path::Path, str::FromStr};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::{Error, Result};

/// Read buffer size for streaming digests.
pub const CHUNK_SIZE: usize = 64 * 1024;

/// A 256-bit content digest. Displays as lowercase hex.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
  pub fn of_bytes(bytes: &[u8]) -> Self {
    Self(Sha256::digest(bytes).into())
  }

  /// Digest everything `reader` yields, `CHUNK_SIZE` bytes at a time.
  pub async fn of_reader<R>(mut reader: R) -> Result<Self>
  where
    R: AsyncRead + Unpin,
  {
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; CHUNK_SIZE];
    loop {
      let n = reader.read(&mut buf).await?;
      if n == 0 {
        break;
      }
      hasher.update(&buf[..n]);
    }
    Ok(Self(hasher.finalize().into()))
  }

  pub async fn of_file(path: impl AsRef<Path>) -> Result<Self> {
    let file = tokio::fs::File::open(path).await?;
    Self::of_reader(file).await
  }

  pub fn to_hex(&self) -> String { hex::encode(self.0) }
}

impl fmt::Display for Fingerprint {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.to_hex())
  }
}

impl fmt::Debug for Fingerprint {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Fingerprint({})", &self.to_hex()[..12])
  }
}

impl FromStr for Fingerprint {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    let mut out = [0u8; 32];
    hex::decode_to_slice(s, &mut out)
      .map_err(|_| Error::InvalidFingerprint(s.to_owned()))?;
    Ok(Self(out))
  }
}

impl From<Fingerprint> for String {
  fn from(f: Fingerprint) -> Self { f.to_hex() }
}

impl TryFrom<String> for Fingerprint {
  type Error = Error;

  fn try_from(s: String) -> Result<Self> { s.parse() }
}

#[cfg(test)]
mod tests {
  use std::io::Write as _;

  use super::*;

  #[test]
  fn known_digest() {
    // sha256("abc")
    assert_eq!(
      Fingerprint::of_bytes(b"abc").to_string(),
      "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
  }

  #[test]
  fn hex_parse_roundtrip_and_rejects_garbage() {
    let f = Fingerprint::of_bytes(b"photo");
    assert_eq!(f.to_string().parse::<Fingerprint>().unwrap(), f);
    assert!("not-hex".parse::<Fingerprint>().is_err());
    assert!("abcd".parse::<Fingerprint>().is_err());
  }

  #[tokio::test]
  async fn streaming_matches_in_memory_across_chunk_boundaries() {
    let data: Vec<u8> = (0..(CHUNK_SIZE * 3 + 17)).map(|i| (i % 251) as u8).collect();
    let streamed = Fingerprint::of_reader(data.as_slice()).await.unwrap();
    assert_eq!(streamed, Fingerprint::of_bytes(&data));
  }

  #[tokio::test]
  async fn identical_files_share_a_fingerprint() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a.jpg");
    let b = dir.path().join("renamed copy.jpg");
    for p in [&a, &b] {
      let mut f = std::fs::File::create(p).unwrap();
      f.write_all(b"same bytes").unwrap();
    }
    assert_eq!(
      Fingerprint::of_file(&a).await.unwrap(),
      Fingerprint::of_file(&b).await.unwrap()
    );
  }
}
