//! Incremental identity resolution.
//!
//! A pass reads every face and person, clusters the face embeddings with
//! DBSCAN, and reconciles each cluster against the stored persons:
//!
//! 1. if members already belong to a person, the most common one wins;
//! 2. otherwise the nearest person centroid within the match threshold;
//! 3. otherwise a new `"Person N"` is created.
//!
//! Faces are then written back with their person and the affected centroids
//! are recomputed, all in one store transaction. Running a pass twice without
//! new faces changes nothing.

mod config;
mod dbscan;
mod engine;
mod plan;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::person::Person;

pub use config::{CentroidUpdate, ClusterScope, ResolverConfig};
pub use dbscan::{Clustering, dbscan};
pub use engine::{GateGuard, IdentityResolver, ResolutionGate};
pub use plan::{
  CentroidChange, ClusterOutcome, Decision, PersonRef, Plan, PlannedPerson, plan,
};

/// Progress events emitted during a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveProgress {
  Loading,
  Clustering { faces: usize },
  Reconciling { done: usize, total: usize },
  Writing,
  Done,
}

/// What a pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveSummary {
  pub faces_processed: usize,
  pub clusters_found:  usize,
  pub persons_created: usize,
  pub persons_updated: usize,
  pub faces_assigned:  usize,
  pub noise_faces:     usize,
  pub skipped_faces:   usize,
}

/// Every write of one pass. Stores apply it atomically through
/// [`crate::store::LibraryStore::apply_resolution`].
#[derive(Debug, Clone, Default)]
pub struct ResolutionWrite {
  pub new_persons:      Vec<Person>,
  /// `(face_id, person_id)`; may reference persons in `new_persons`.
  pub assignments:      Vec<(Uuid, Uuid)>,
  pub centroid_updates: Vec<CentroidChange>,
}
