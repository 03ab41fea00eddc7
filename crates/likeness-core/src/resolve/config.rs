use serde::{Deserialize, Serialize};

use crate::{Error, Result, embedding::Metric};

/// Which faces take part in clustering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClusterScope {
  /// Re-cluster every face on each pass. Earlier splits can be merged again;
  /// the dominant-person rule keeps identities stable.
  #[default]
  All,
  /// Only cluster faces that have never been assigned. Cheaper, but cannot
  /// correct earlier mistakes.
  Unassigned,
}

/// How a person's centroid is refreshed after a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CentroidUpdate {
  /// Mean of every face assigned to the person after the pass.
  #[default]
  Exact,
  /// Mean of the merged cluster members plus the previous centroid counted
  /// once, regardless of how many faces it summarised. Drifts on repeated
  /// passes; kept for libraries built with that formula.
  Legacy,
}

/// Tunables for [`super::IdentityResolver`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
  /// Length of every embedding produced by the face model.
  pub embedding_dim:   usize,
  pub metric:          Metric,
  /// DBSCAN neighbourhood radius.
  pub eps:             f32,
  /// DBSCAN density; 1 puts every face in a cluster.
  pub min_samples:     usize,
  /// Distance used when matching a cluster mean against person centroids.
  pub match_metric:    Metric,
  /// Maximum `match_metric` distance between a cluster mean and a person
  /// centroid for the cluster to join that person. Must not be looser than
  /// `eps`.
  pub match_threshold: f32,
  /// L2-normalise embeddings before clustering and averaging.
  pub normalize:       bool,
  pub scope:           ClusterScope,
  pub centroid_update: CentroidUpdate,
  /// Prefix of generated names (`"Person 7"`).
  pub name_prefix:     String,
}

impl Default for ResolverConfig {
  fn default() -> Self {
    Self {
      embedding_dim:   512,
      metric:          Metric::Cosine,
      eps:             0.4,
      min_samples:     1,
      match_metric:    Metric::Euclidean,
      match_threshold: 0.5,
      normalize:       true,
      scope:           ClusterScope::All,
      centroid_update: CentroidUpdate::Exact,
      name_prefix:     "Person".into(),
    }
  }
}

impl ResolverConfig {
  pub fn validate(&self) -> Result<()> {
    if self.embedding_dim == 0 {
      return Err(Error::InvalidConfig("embedding_dim must be positive".into()));
    }
    if self.min_samples == 0 {
      return Err(Error::InvalidConfig("min_samples must be at least 1".into()));
    }
    if !(self.eps.is_finite() && self.eps > 0.0) {
      return Err(Error::InvalidConfig(format!("eps must be positive, got {}", self.eps)));
    }
    if !(self.match_threshold.is_finite() && self.match_threshold >= 0.0) {
      return Err(Error::InvalidConfig(format!(
        "match_threshold must be non-negative, got {}",
        self.match_threshold
      )));
    }
    if let Some(t) = self.match_threshold_in(self.metric)
      && t > self.eps
    {
      return Err(Error::InvalidConfig(format!(
        "match_threshold {} ({:?}) is looser than eps {} ({:?})",
        self.match_threshold, self.match_metric, self.eps, self.metric
      )));
    }
    if self.name_prefix.trim().is_empty() {
      return Err(Error::InvalidConfig("name_prefix must not be empty".into()));
    }
    Ok(())
  }

  /// `match_threshold` expressed in `metric`, when the two scales are
  /// comparable. Cosine and Euclidean distances only convert on unit vectors
  /// (`euclidean² = 2 · cosine`).
  fn match_threshold_in(&self, metric: Metric) -> Option<f32> {
    let t = self.match_threshold;
    match (self.match_metric, metric) {
      (a, b) if a == b => Some(t),
      _ if !self.normalize => None,
      (Metric::Euclidean, Metric::Cosine) => Some(t * t / 2.0),
      (Metric::Cosine, Metric::Euclidean) => Some((2.0 * t).sqrt()),
      _ => None,
    }
  }
}
