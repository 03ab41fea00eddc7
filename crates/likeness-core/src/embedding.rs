//! Embedding vectors: similarity metrics, averaging, and the binary blob
//! representation used by storage backends.
//!
//! Blobs are the raw little-endian `f32` values with no header, so an
//! encode/decode cycle is lossless and the blob length is always
//! `4 * dimension`.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── Metric ──────────────────────────────────────────────────────────────────

/// Distance function used for clustering and centroid matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
  /// `1 - cosine_similarity`; ranges over `[0, 2]`.
  #[default]
  Cosine,
  /// Plain L2 distance.
  Euclidean,
}

impl Metric {
  pub fn distance(self, a: &[f32], b: &[f32]) -> f32 {
    match self {
      Self::Cosine => 1.0 - cosine_sim(a, b),
      Self::Euclidean => euclidean(a, b),
    }
  }
}

/// Cosine similarity. Accumulates in `f64`; zero vectors have similarity 0.
pub fn cosine_sim(a: &[f32], b: &[f32]) -> f32 {
  let mut dot = 0.0f64;
  let mut na = 0.0f64;
  let mut nb = 0.0f64;
  for (&x, &y) in a.iter().zip(b) {
    let (x, y) = (x as f64, y as f64);
    dot += x * y;
    na += x * x;
    nb += y * y;
  }
  let denom = na.sqrt() * nb.sqrt();
  if denom == 0.0 {
    return 0.0;
  }
  (dot / denom) as f32
}

pub fn euclidean(a: &[f32], b: &[f32]) -> f32 {
  a.iter()
    .zip(b)
    .map(|(&x, &y)| {
      let d = x as f64 - y as f64;
      d * d
    })
    .sum::<f64>()
    .sqrt() as f32
}

/// Scale `v` to unit length in place. Zero vectors are left untouched.
pub fn l2_normalize(v: &mut [f32]) {
  let norm = v.iter().map(|&x| (x as f64) * (x as f64)).sum::<f64>().sqrt();
  if norm > 0.0 {
    let scale = (1.0 / norm) as f32;
    for x in v.iter_mut() {
      *x *= scale;
    }
  }
}

/// Component-wise arithmetic mean. Returns `None` for an empty input.
///
/// All vectors must share the length of the first one; callers filter by
/// dimension before averaging.
pub fn mean<'a, I>(vectors: I) -> Option<Vec<f32>>
where
  I: IntoIterator<Item = &'a [f32]>,
{
  let mut iter = vectors.into_iter();
  let first = iter.next()?;
  let mut sum: Vec<f64> = first.iter().map(|&x| x as f64).collect();
  let mut n = 1usize;
  for v in iter {
    for (acc, &x) in sum.iter_mut().zip(v) {
      *acc += x as f64;
    }
    n += 1;
  }
  let n = n as f64;
  Some(sum.into_iter().map(|x| (x / n) as f32).collect())
}

// ─── Blob codec ──────────────────────────────────────────────────────────────

pub fn encode_blob(v: &[f32]) -> Vec<u8> {
  let mut out = Vec::with_capacity(v.len() * 4);
  for x in v {
    out.extend_from_slice(&x.to_le_bytes());
  }
  out
}

/// Decode a blob written by [`encode_blob`].
///
/// Fails with [`Error::MalformedEmbedding`] when the length is not a multiple
/// of four or the blob is empty.
pub fn decode_blob(bytes: &[u8]) -> Result<Vec<f32>> {
  if bytes.is_empty() || bytes.len() % 4 != 0 {
    return Err(Error::MalformedEmbedding(bytes.len()));
  }
  Ok(
    bytes
      .chunks_exact(4)
      .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
      .collect(),
  )
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn cosine_sim_identical_orthogonal_opposite() {
    assert!((cosine_sim(&[1.0, 0.0], &[2.0, 0.0]) - 1.0).abs() < 1e-6);
    assert!(cosine_sim(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
    assert!((cosine_sim(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 1e-6);
  }

  #[test]
  fn cosine_sim_zero_vector_is_zero() {
    assert_eq!(cosine_sim(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
  }

  #[test]
  fn euclidean_three_four_five() {
    assert!((euclidean(&[0.0, 0.0], &[3.0, 4.0]) - 5.0).abs() < 1e-6);
    assert!((Metric::Euclidean.distance(&[1.0, 1.0], &[1.0, 1.0])).abs() < 1e-6);
  }

  #[test]
  fn normalize_unit_and_zero() {
    let mut v = [3.0, 4.0];
    l2_normalize(&mut v);
    assert!((v[0] - 0.6).abs() < 1e-6);
    assert!((v[1] - 0.8).abs() < 1e-6);

    let mut z = [0.0, 0.0];
    l2_normalize(&mut z);
    assert_eq!(z, [0.0, 0.0]);
  }

  #[test]
  fn mean_of_vectors() {
    let a = [1.0f32, 2.0];
    let b = [3.0f32, 6.0];
    let m = mean([a.as_slice(), b.as_slice()]).unwrap();
    assert_eq!(m, vec![2.0, 4.0]);
    assert!(mean(std::iter::empty::<&[f32]>()).is_none());
  }

  #[test]
  fn blob_preserves_bits() {
    let v = vec![0.1f32, -3.5e-12, f32::MAX, 1.0 / 3.0];
    let decoded = decode_blob(&encode_blob(&v)).unwrap();
    let bits = |xs: &[f32]| xs.iter().map(|x| x.to_bits()).collect::<Vec<_>>();
    assert_eq!(bits(&decoded), bits(&v));
  }

  #[test]
  fn blob_rejects_ragged_and_empty() {
    assert!(matches!(decode_blob(&[0, 1, 2]), Err(Error::MalformedEmbedding(3))));
    assert!(matches!(decode_blob(&[]), Err(Error::MalformedEmbedding(0))));
  }
}
