use std::collections::VecDeque;

use crate::embedding::Metric;

/// Output of [`dbscan`]: one label per input point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clustering {
  /// `Some(c)` for a member of cluster `c`, `None` for noise.
  pub labels:   Vec<Option<usize>>,
  /// Number of clusters; labels are `0..clusters`.
  pub clusters: usize,
}

impl Clustering {
  /// Point indices per cluster, in cluster order.
  pub fn members(&self) -> Vec<Vec<usize>> {
    let mut out = vec![Vec::new(); self.clusters];
    for (i, label) in self.labels.iter().enumerate() {
      if let Some(c) = label {
        out[*c].push(i);
      }
    }
    out
  }

  pub fn noise(&self) -> usize { self.labels.iter().filter(|l| l.is_none()).count() }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum State {
  Unvisited,
  Noise,
  Member(usize),
}

/// Density-based clustering.
///
/// A point is a core point when at least `min_pts` points (itself included)
/// lie within `eps`. Clusters grow from core points through their
/// neighbourhoods; points reachable from no core point are noise. Cluster
/// numbering follows input order, so identical input yields identical labels.
pub fn dbscan(points: &[&[f32]], metric: Metric, eps: f32, min_pts: usize) -> Clustering {
  let n = points.len();
  let mut state = vec![State::Unvisited; n];
  let mut clusters = 0usize;

  for i in 0..n {
    if state[i] != State::Unvisited {
      continue;
    }

    let neighbors = range_query(points, i, metric, eps);
    if neighbors.len() < min_pts {
      state[i] = State::Noise;
      continue;
    }

    let c = clusters;
    clusters += 1;
    state[i] = State::Member(c);

    let mut seeds: VecDeque<usize> = neighbors.into_iter().filter(|&j| j != i).collect();
    while let Some(q) = seeds.pop_front() {
      match state[q] {
        // Border point: joins the cluster but does not expand it.
        State::Noise => {
          state[q] = State::Member(c);
          continue;
        }
        State::Member(_) => continue,
        State::Unvisited => {}
      }
      state[q] = State::Member(c);

      let q_neighbors = range_query(points, q, metric, eps);
      if q_neighbors.len() >= min_pts {
        seeds.extend(q_neighbors);
      }
    }
  }

  let labels = state
    .into_iter()
    .map(|s| match s {
      State::Member(c) => Some(c),
      _ => None,
    })
    .collect();

  Clustering { labels, clusters }
}

fn range_query(points: &[&[f32]], idx: usize, metric: Metric, eps: f32) -> Vec<usize> {
  let q = points[idx];
  points
    .iter()
    .enumerate()
    .filter(|(_, p)| metric.distance(q, p) <= eps)
    .map(|(i, _)| i)
    .collect()
}
