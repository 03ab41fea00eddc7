//! The in-memory half of a resolution pass.
//!
//! [`plan`] turns a snapshot of faces and persons into a [`Plan`]: which
//! person each clustered face belongs to, which persons must be created, and
//! which centroids change. Nothing here touches storage, so a cancelled or
//! failed pass leaves the library untouched.

use std::collections::HashMap;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use uuid::Uuid;

use super::{
  ResolveProgress,
  config::{CentroidUpdate, ClusterScope, ResolverConfig},
  dbscan::dbscan,
};
use crate::{
  Error, Result,
  embedding::{l2_normalize, mean},
  face::Face,
  person::{Person, auto_name, next_auto_index},
};

// ─── Plan types ──────────────────────────────────────────────────────────────

/// A person a cluster resolves to: either one already stored, or the n-th
/// entry of [`Plan::new_persons`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PersonRef {
  Existing(Uuid),
  New(usize),
}

impl PersonRef {
  /// Substitute the ids the store assigned to newly created persons.
  pub fn resolve(self, created: &[Uuid]) -> Uuid {
    match self {
      Self::Existing(id) => id,
      Self::New(i) => created[i],
    }
  }
}

/// Why a cluster ended up with its person.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Decision {
  /// Most members were already assigned to this person.
  Dominant { votes: usize },
  /// The cluster mean lay within the match threshold of this centroid.
  Matched { distance: f32 },
  Created,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlannedPerson {
  pub name:       String,
  pub centroid:   Vec<f32>,
  pub face_count: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CentroidChange {
  pub person_id:  Uuid,
  pub centroid:   Option<Vec<f32>>,
  pub face_count: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClusterOutcome {
  pub faces:    Vec<Uuid>,
  pub person:   PersonRef,
  pub decision: Decision,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Plan {
  pub clusters:         Vec<ClusterOutcome>,
  pub new_persons:      Vec<PlannedPerson>,
  /// One entry per clustered face, including faces whose person is unchanged.
  pub assignments:      Vec<(Uuid, PersonRef)>,
  /// Existing persons whose centroid or face count changes.
  pub centroid_updates: Vec<CentroidChange>,
  /// Faces that went through clustering.
  pub faces_processed:  usize,
  /// Clustered faces labelled noise; their assignment is left as it was.
  pub noise_faces:      usize,
  /// Faces excluded because their embedding has the wrong dimension.
  pub skipped_faces:    usize,
}

// ─── Planning ────────────────────────────────────────────────────────────────

struct Sample {
  face_id: Uuid,
  vector:  Vec<f32>,
  /// Prior assignment, restricted to persons that still exist.
  prior:   Option<Uuid>,
}

/// Cluster `faces` and reconcile the clusters against `persons`.
///
/// `cancel` is checked before each cluster is reconciled; a cancelled pass
/// returns [`Error::Cancelled`].
pub fn plan(
  faces: &[Face],
  persons: &[Person],
  cfg: &ResolverConfig,
  cancel: &CancellationToken,
  progress: &(dyn Fn(ResolveProgress) + Send + Sync),
) -> Result<Plan> {
  cfg.validate()?;
  let dim = cfg.embedding_dim;

  // Creation order is the tie-break rank between persons.
  let mut by_age: Vec<&Person> = persons.iter().collect();
  by_age.sort_by_key(|p| (p.created_at, p.person_id));
  let rank: HashMap<Uuid, usize> =
    by_age.iter().enumerate().map(|(i, p)| (p.person_id, i)).collect();

  // ── Samples ───────────────────────────────────────────────────────────
  let mut skipped = 0usize;
  let mut samples = Vec::with_capacity(faces.len());
  for face in faces {
    if face.embedding.len() != dim {
      skipped += 1;
      continue;
    }
    let mut vector = face.embedding.clone();
    if cfg.normalize {
      l2_normalize(&mut vector);
    }
    let prior = face.person_id.filter(|id| rank.contains_key(id));
    samples.push(Sample { face_id: face.face_id, vector, prior });
  }
  if skipped > 0 {
    warn!(
      skipped,
      expected = dim,
      "faces with a mismatched embedding dimension were skipped; the embedding model may have changed"
    );
  }

  let input: Vec<usize> = samples
    .iter()
    .enumerate()
    .filter(|(_, s)| match cfg.scope {
      ClusterScope::All => true,
      ClusterScope::Unassigned => s.prior.is_none(),
    })
    .map(|(i, _)| i)
    .collect();

  // ── Clustering ────────────────────────────────────────────────────────
  progress(ResolveProgress::Clustering { faces: input.len() });
  let points: Vec<&[f32]> = input.iter().map(|&i| samples[i].vector.as_slice()).collect();
  let clustering = dbscan(&points, cfg.metric, cfg.eps, cfg.min_samples);
  let members = clustering.members();

  // ── Reconciliation ────────────────────────────────────────────────────
  let mut candidates: Vec<(PersonRef, Vec<f32>)> = Vec::new();
  for p in persons {
    match &p.centroid {
      Some(c) if c.len() == dim => candidates.push((PersonRef::Existing(p.person_id), c.clone())),
      Some(c) => warn!(
        person_id = %p.person_id,
        expected = dim,
        got = c.len(),
        "ignoring person centroid with mismatched dimension"
      ),
      None => {}
    }
  }

  let mut next_index = next_auto_index(&cfg.name_prefix, persons.iter().map(|p| p.name.as_str()));
  let mut new_persons: Vec<PlannedPerson> = Vec::new();
  let mut outcomes: Vec<ClusterOutcome> = Vec::with_capacity(members.len());
  let total = members.len();

  // Sample indices of each reconciled cluster, with its person.
  let mut resolved: Vec<(Vec<usize>, PersonRef)> = Vec::with_capacity(members.len());

  for (c, cluster) in members.iter().enumerate() {
    if cancel.is_cancelled() {
      return Err(Error::Cancelled);
    }

    let indices: Vec<usize> = cluster.iter().map(|&k| input[k]).collect();
    let cluster_samples: Vec<&Sample> = indices.iter().map(|&i| &samples[i]).collect();
    let Some(cluster_mean) = mean(cluster_samples.iter().map(|s| s.vector.as_slice())) else {
      continue;
    };

    let (person, decision) = if let Some((id, votes)) = dominant_person(&cluster_samples, &rank) {
      (PersonRef::Existing(id), Decision::Dominant { votes })
    } else if let Some((person, distance)) = nearest(&candidates, &cluster_mean, cfg) {
      (person, Decision::Matched { distance })
    } else {
      let index = new_persons.len();
      new_persons.push(PlannedPerson {
        name:       auto_name(&cfg.name_prefix, next_index),
        centroid:   cluster_mean.clone(),
        face_count: cluster.len() as u32,
      });
      next_index += 1;
      candidates.push((PersonRef::New(index), cluster_mean.clone()));
      (PersonRef::New(index), Decision::Created)
    };

    debug!(cluster = c, size = cluster.len(), ?person, ?decision, "reconciled cluster");
    outcomes.push(ClusterOutcome {
      faces: cluster_samples.iter().map(|s| s.face_id).collect(),
      person,
      decision,
    });
    resolved.push((indices, person));
    progress(ResolveProgress::Reconciling { done: c + 1, total });
  }

  // ── Final assignment of every valid sample ────────────────────────────
  let mut target: Vec<Option<PersonRef>> =
    samples.iter().map(|s| s.prior.map(PersonRef::Existing)).collect();
  let mut assignments = Vec::new();
  for (indices, person) in &resolved {
    for &i in indices {
      target[i] = Some(*person);
      assignments.push((samples[i].face_id, *person));
    }
  }

  let mut groups: HashMap<PersonRef, Vec<&[f32]>> = HashMap::new();
  for (s, t) in samples.iter().zip(&target) {
    if let Some(t) = t {
      groups.entry(*t).or_default().push(s.vector.as_slice());
    }
  }

  // ── Centroids ─────────────────────────────────────────────────────────
  for (i, planned) in new_persons.iter_mut().enumerate() {
    if let Some(vs) = groups.get(&PersonRef::New(i)) {
      planned.face_count = vs.len() as u32;
      if let Some(m) = mean(vs.iter().copied()) {
        planned.centroid = m;
      }
    }
  }

  let centroid_updates = match cfg.centroid_update {
    CentroidUpdate::Exact => exact_updates(persons, &groups),
    CentroidUpdate::Legacy => legacy_updates(persons, &groups, &resolved, &samples, dim),
  };

  Ok(Plan {
    clusters: outcomes,
    new_persons,
    assignments,
    centroid_updates,
    faces_processed: input.len(),
    noise_faces: clustering.noise(),
    skipped_faces: skipped,
  })
}

/// Most frequent prior person among the members. Ties go to the person
/// created first.
fn dominant_person(members: &[&Sample], rank: &HashMap<Uuid, usize>) -> Option<(Uuid, usize)> {
  let mut votes: HashMap<Uuid, usize> = HashMap::new();
  for id in members.iter().filter_map(|s| s.prior) {
    *votes.entry(id).or_default() += 1;
  }
  votes
    .into_iter()
    .min_by_key(|(id, n)| (std::cmp::Reverse(*n), rank[id]))
}

/// Closest candidate strictly within the match threshold.
fn nearest(
  candidates: &[(PersonRef, Vec<f32>)],
  cluster_mean: &[f32],
  cfg: &ResolverConfig,
) -> Option<(PersonRef, f32)> {
  candidates
    .iter()
    .map(|(p, c)| (*p, cfg.match_metric.distance(cluster_mean, c)))
    .filter(|(_, d)| *d < cfg.match_threshold)
    .min_by(|a, b| a.1.total_cmp(&b.1))
}

fn exact_updates(persons: &[Person], groups: &HashMap<PersonRef, Vec<&[f32]>>) -> Vec<CentroidChange> {
  let mut out = Vec::new();
  for p in persons {
    match groups.get(&PersonRef::Existing(p.person_id)) {
      Some(vs) => {
        let centroid = mean(vs.iter().copied());
        let face_count = vs.len() as u32;
        if centroid != p.centroid || face_count != p.face_count {
          out.push(CentroidChange { person_id: p.person_id, centroid, face_count });
        }
      }
      // Lost every face; the last centroid stays for matching.
      None if p.face_count != 0 => out.push(CentroidChange {
        person_id:  p.person_id,
        centroid:   p.centroid.clone(),
        face_count: 0,
      }),
      None => {}
    }
  }
  out
}

fn legacy_updates<'a>(
  persons: &'a [Person],
  groups: &HashMap<PersonRef, Vec<&[f32]>>,
  resolved: &[(Vec<usize>, PersonRef)],
  samples: &'a [Sample],
  dim: usize,
) -> Vec<CentroidChange> {
  let mut merged: HashMap<Uuid, Vec<&'a [f32]>> = HashMap::new();
  for (indices, person) in resolved {
    if let PersonRef::Existing(id) = person {
      let vs = merged.entry(*id).or_default();
      vs.extend(indices.iter().map(|&i| samples[i].vector.as_slice()));
    }
  }

  let mut out = Vec::new();
  for p in persons {
    let Some(vs) = merged.get_mut(&p.person_id) else { continue };
    if let Some(old) = p.centroid.as_deref().filter(|c| c.len() == dim) {
      vs.push(old);
    }
    let face_count = groups
      .get(&PersonRef::Existing(p.person_id))
      .map_or(0, |g| g.len() as u32);
    out.push(CentroidChange {
      person_id: p.person_id,
      centroid: mean(vs.iter().copied()),
      face_count,
    });
  }
  out
}

#[cfg(test)]
mod tests {
  use chrono::{Duration, Utc};

  use super::*;
  use crate::{embedding::Metric, face::BoundingBox};

  const DIM: usize = 3;

  fn cfg() -> ResolverConfig {
    ResolverConfig { embedding_dim: DIM, ..Default::default() }
  }

  fn face(v: [f32; 3], person: Option<Uuid>) -> Face {
    Face {
      face_id:     Uuid::new_v4(),
      photo_id:    Uuid::new_v4(),
      embedding:   v.to_vec(),
      bbox:        BoundingBox::new(0, 0, 10, 10),
      person_id:   person,
      detected_at: Utc::now(),
    }
  }

  fn person(name: &str, centroid: Option<Vec<f32>>, face_count: u32, age: i64) -> Person {
    Person {
      person_id: Uuid::new_v4(),
      name: name.into(),
      centroid,
      face_count,
      created_at: Utc::now() - Duration::seconds(age),
    }
  }

  fn run(faces: &[Face], persons: &[Person], cfg: &ResolverConfig) -> Plan {
    plan(faces, persons, cfg, &CancellationToken::new(), &|_| {}).unwrap()
  }

  /// Apply a plan to in-memory copies, the way the resolver applies it to a
  /// store.
  fn apply(faces: &mut [Face], persons: &mut Vec<Person>, plan: &Plan) {
    let created: Vec<Uuid> = plan
      .new_persons
      .iter()
      .map(|np| {
        let p = Person {
          person_id:  Uuid::new_v4(),
          name:       np.name.clone(),
          centroid:   Some(np.centroid.clone()),
          face_count: np.face_count,
          created_at: Utc::now(),
        };
        let id = p.person_id;
        persons.push(p);
        id
      })
      .collect();
    for (face_id, r) in &plan.assignments {
      let f = faces.iter_mut().find(|f| f.face_id == *face_id).unwrap();
      f.person_id = Some(r.resolve(&created));
    }
    for ch in &plan.centroid_updates {
      let p = persons.iter_mut().find(|p| p.person_id == ch.person_id).unwrap();
      p.centroid = ch.centroid.clone();
      p.face_count = ch.face_count;
    }
  }

  #[test]
  fn empty_snapshot_is_a_no_op() {
    let plan = run(&[], &[], &cfg());
    assert_eq!(plan, Plan::default());
  }

  #[test]
  fn separate_groups_become_separate_people() {
    let faces = vec![
      face([1.0, 0.0, 0.0], None),
      face([0.99, 0.1, 0.0], None),
      face([0.0, 1.0, 0.0], None),
    ];
    let plan = run(&faces, &[], &cfg());

    assert_eq!(plan.clusters.len(), 2);
    assert_eq!(plan.new_persons.len(), 2);
    assert_eq!(plan.new_persons[0].name, "Person 1");
    assert_eq!(plan.new_persons[0].face_count, 2);
    assert_eq!(plan.new_persons[1].name, "Person 2");
    assert_eq!(plan.assignments.len(), 3);
    assert!(plan.clusters.iter().all(|c| c.decision == Decision::Created));
  }

  #[test]
  fn dominant_prior_assignment_wins_over_a_closer_centroid() {
    let anchor = person("Anchor", Some(vec![0.0, 0.0, 1.0]), 2, 20);
    // Centroid identical to the cluster, but nobody in the cluster points at it.
    let lookalike = person("Lookalike", Some(vec![1.0, 0.0, 0.0]), 1, 10);
    let faces = vec![
      face([1.0, 0.0, 0.0], Some(anchor.person_id)),
      face([1.0, 0.01, 0.0], Some(anchor.person_id)),
      face([1.0, 0.0, 0.01], Some(lookalike.person_id)),
      face([1.0, 0.02, 0.0], None),
    ];
    let plan = run(&faces, &[anchor.clone(), lookalike], &cfg());

    assert_eq!(plan.clusters.len(), 1);
    assert_eq!(plan.clusters[0].person, PersonRef::Existing(anchor.person_id));
    assert_eq!(plan.clusters[0].decision, Decision::Dominant { votes: 2 });
    assert!(plan.new_persons.is_empty());
  }

  #[test]
  fn dominant_tie_goes_to_the_older_person() {
    let older = person("Older", None, 1, 100);
    let newer = person("Newer", None, 1, 1);
    let faces = vec![
      face([1.0, 0.0, 0.0], Some(newer.person_id)),
      face([1.0, 0.01, 0.0], Some(older.person_id)),
    ];
    for persons in [[newer.clone(), older.clone()], [older.clone(), newer.clone()]] {
      let plan = run(&faces, &persons, &cfg());
      assert_eq!(plan.clusters[0].person, PersonRef::Existing(older.person_id));
    }
  }

  #[test]
  fn unassigned_cluster_matches_nearest_centroid_within_threshold() {
    let far = person("Far", Some(vec![0.0, 1.0, 0.0]), 3, 20);
    let near = person("Near", Some(vec![0.9, 0.1, 0.0]), 3, 10);
    let faces = vec![face([1.0, 0.0, 0.0], None)];
    let plan = run(&faces, &[far, near.clone()], &cfg());

    assert_eq!(plan.clusters[0].person, PersonRef::Existing(near.person_id));
    assert!(matches!(plan.clusters[0].decision, Decision::Matched { .. }));
    assert!(plan.new_persons.is_empty());
  }

  #[test]
  fn distant_face_creates_exactly_one_person() {
    let known = person("Known", Some(vec![1.0, 0.0, 0.0]), 3, 10);
    let faces = vec![face([0.0, 0.0, 1.0], None)];
    let plan = run(&faces, &[known], &cfg());

    assert_eq!(plan.new_persons.len(), 1);
    assert_eq!(plan.clusters[0].decision, Decision::Created);
  }

  #[test]
  fn faces_outside_eps_stay_separate_people() {
    // 57 degrees apart: cosine 0.455 and euclidean 0.95, both outside the
    // clustering radius and the match threshold.
    let angle = 57f32.to_radians();
    let faces = vec![face([1.0, 0.0, 0.0], None), face([angle.cos(), angle.sin(), 0.0], None)];
    let plan = run(&faces, &[], &cfg());

    assert_eq!(plan.clusters.len(), 2);
    assert_eq!(plan.new_persons.len(), 2);
    assert!(plan.clusters.iter().all(|c| c.decision == Decision::Created));
    assert_ne!(plan.assignments[0].1, plan.assignments[1].1);
  }

  #[test]
  fn generated_names_continue_after_existing_ones() {
    let p = person("Person 7", Some(vec![1.0, 0.0, 0.0]), 1, 10);
    let faces = vec![face([0.0, 1.0, 0.0], None), face([0.0, 0.0, 1.0], None)];
    let plan = run(&faces, &[p], &cfg());
    let names: Vec<_> = plan.new_persons.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["Person 8", "Person 9"]);
  }

  #[test]
  fn undecodable_centroid_is_ignored_for_matching() {
    let broken = person("Broken", None, 4, 10);
    let faces = vec![face([1.0, 0.0, 0.0], None)];
    let plan = run(&faces, &[broken], &cfg());
    assert_eq!(plan.new_persons.len(), 1);
  }

  #[test]
  fn mismatched_dimensions_are_skipped() {
    let mut odd = face([1.0, 0.0, 0.0], None);
    odd.embedding.push(0.5);
    let wrong_centroid = person("Old model", Some(vec![1.0, 0.0, 0.0, 0.0]), 1, 10);
    let faces = vec![odd, face([1.0, 0.0, 0.0], None)];
    let plan = run(&faces, &[wrong_centroid], &cfg());

    assert_eq!(plan.skipped_faces, 1);
    assert_eq!(plan.faces_processed, 1);
    assert_eq!(plan.new_persons.len(), 1);
  }

  #[test]
  fn noise_faces_keep_their_previous_state() {
    let cfg = ResolverConfig { min_samples: 2, ..cfg() };
    let p = person("P", Some(vec![0.0, 0.0, 1.0]), 1, 10);
    let lonely_assigned = face([0.0, 0.0, 1.0], Some(p.person_id));
    let lonely_new = face([0.0, 1.0, 0.0], None);
    let faces = vec![
      face([1.0, 0.0, 0.0], None),
      face([1.0, 0.01, 0.0], None),
      lonely_assigned.clone(),
      lonely_new.clone(),
    ];
    let plan = run(&faces, &[p.clone()], &cfg);

    assert_eq!(plan.noise_faces, 2);
    assert_eq!(plan.assignments.len(), 2);
    assert!(plan.assignments.iter().all(|(id, _)| *id != lonely_assigned.face_id && *id != lonely_new.face_id));
    // The noise face still counts towards its existing person.
    assert!(plan.centroid_updates.is_empty());
  }

  #[test]
  fn unassigned_scope_leaves_assigned_faces_alone() {
    let cfg = ResolverConfig { scope: ClusterScope::Unassigned, ..cfg() };
    let p = person("P", Some(vec![1.0, 0.0, 0.0]), 1, 10);
    let assigned = face([1.0, 0.0, 0.0], Some(p.person_id));
    let fresh = face([1.0, 0.05, 0.0], None);
    let plan = run(&[assigned.clone(), fresh.clone()], &[p.clone()], &cfg);

    assert_eq!(plan.faces_processed, 1);
    assert_eq!(plan.assignments, vec![(fresh.face_id, PersonRef::Existing(p.person_id))]);
    assert_eq!(plan.centroid_updates[0].face_count, 2);
  }

  #[test]
  fn exact_centroid_is_the_mean_of_all_assigned_faces() {
    let cfg = ResolverConfig { normalize: false, ..cfg() };
    let p = person("P", Some(vec![1.0, 0.0, 0.0]), 1, 10);
    let faces = vec![
      face([1.0, 0.0, 0.0], Some(p.person_id)),
      face([1.0, 0.2, 0.0], None),
      face([1.0, 0.0, 0.2], None),
    ];
    let plan = run(&faces, &[p.clone()], &cfg);

    let ch = &plan.centroid_updates[0];
    assert_eq!(ch.person_id, p.person_id);
    assert_eq!(ch.face_count, 3);
    let c = ch.centroid.as_ref().unwrap();
    assert!((c[0] - 1.0).abs() < 1e-6);
    assert!((c[1] - 0.2 / 3.0).abs() < 1e-6);
    assert!((c[2] - 0.2 / 3.0).abs() < 1e-6);
  }

  #[test]
  fn legacy_centroid_counts_old_centroid_once() {
    let cfg = ResolverConfig {
      normalize: false,
      centroid_update: CentroidUpdate::Legacy,
      metric: Metric::Euclidean,
      match_threshold: 0.4,
      ..cfg()
    };
    let p = person("P", Some(vec![0.0, 0.0, 0.0]), 10, 10);
    let faces = vec![face([0.3, 0.0, 0.0], None), face([0.3, 0.0, 0.0], None)];
    let plan = run(&faces, &[p.clone()], &cfg);

    assert_eq!(plan.clusters[0].person, PersonRef::Existing(p.person_id));
    let c = plan.centroid_updates[0].centroid.as_ref().unwrap();
    assert!((c[0] - 0.2).abs() < 1e-6);
  }

  #[test]
  fn second_pass_over_applied_plan_changes_nothing() {
    let mut faces = vec![
      face([1.0, 0.0, 0.0], None),
      face([0.98, 0.1, 0.0], None),
      face([0.0, 1.0, 0.0], None),
      face([0.1, 0.97, 0.05], None),
      face([0.0, 0.0, 1.0], None),
    ];
    let mut persons = Vec::new();

    let first = run(&faces, &persons, &cfg());
    apply(&mut faces, &mut persons, &first);
    let assigned: Vec<_> = faces.iter().map(|f| f.person_id).collect();
    let centroids: Vec<_> = persons.iter().map(|p| p.centroid.clone()).collect();

    let second = run(&faces, &persons, &cfg());
    assert!(second.new_persons.is_empty());
    assert!(second.centroid_updates.is_empty());
    apply(&mut faces, &mut persons, &second);

    assert_eq!(faces.iter().map(|f| f.person_id).collect::<Vec<_>>(), assigned);
    assert_eq!(persons.iter().map(|p| p.centroid.clone()).collect::<Vec<_>>(), centroids);
  }

  #[test]
  fn cancelled_token_stops_before_reconciling() {
    let cancel = CancellationToken::new();
    cancel.cancel();
    let faces = vec![face([1.0, 0.0, 0.0], None)];
    let result = plan(&faces, &[], &cfg(), &cancel, &|_| {});
    assert!(matches!(result, Err(Error::Cancelled)));
  }

  #[test]
  fn reports_progress_per_cluster() {
    use std::sync::Mutex;

    let seen = Mutex::new(Vec::new());
    let faces = vec![face([1.0, 0.0, 0.0], None), face([0.0, 1.0, 0.0], None)];
    plan(&faces, &[], &cfg(), &CancellationToken::new(), &|p| seen.lock().unwrap().push(p)).unwrap();

    assert_eq!(
      seen.into_inner().unwrap(),
      vec![
        ResolveProgress::Clustering { faces: 2 },
        ResolveProgress::Reconciling { done: 1, total: 2 },
        ResolveProgress::Reconciling { done: 2, total: 2 },
      ]
    );
  }
}
