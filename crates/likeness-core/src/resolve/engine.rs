use chrono::{Duration, Utc};
use tokio::sync::{Mutex, MutexGuard};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use uuid::Uuid;

use super::{ResolutionWrite, ResolveProgress, ResolveSummary, ResolverConfig, plan::plan};
use crate::{Error, Result, person::Person, store::LibraryStore};

// ─── Gate ────────────────────────────────────────────────────────────────────

/// Mutual exclusion around a full resolution pass.
///
/// A pass reads every centroid, recomputes them in memory and writes them
/// back; two interleaved passes would lose each other's updates.
#[derive(Debug, Default)]
pub struct ResolutionGate {
  lock: Mutex<()>,
}

/// Held for the duration of a pass.
#[derive(Debug)]
pub struct GateGuard<'a> {
  _guard: MutexGuard<'a, ()>,
}

impl ResolutionGate {
  pub fn new() -> Self { Self::default() }

  /// Enter immediately or fail with [`Error::ResolutionInProgress`].
  pub fn try_enter(&self) -> Result<GateGuard<'_>> {
    self
      .lock
      .try_lock()
      .map(|g| GateGuard { _guard: g })
      .map_err(|_| Error::ResolutionInProgress)
  }

  /// Wait for any running pass to finish, then enter.
  pub async fn enter(&self) -> GateGuard<'_> {
    GateGuard { _guard: self.lock.lock().await }
  }
}

// ─── Resolver ────────────────────────────────────────────────────────────────

/// Runs identity resolution passes against a [`LibraryStore`].
///
/// The resolver owns no persistent state: every pass starts from a fresh
/// snapshot of the store. Wrap it in an `Arc` to run passes on a background
/// task while the foreground keeps ingesting photos.
pub struct IdentityResolver<S> {
  store:  S,
  config: ResolverConfig,
  gate:   ResolutionGate,
}

impl<S: LibraryStore> IdentityResolver<S> {
  pub fn new(store: S, config: ResolverConfig) -> Result<Self> {
    config.validate()?;
    Ok(Self { store, config, gate: ResolutionGate::new() })
  }

  pub fn store(&self) -> &S { &self.store }

  pub fn config(&self) -> &ResolverConfig { &self.config }

  /// Run one pass with no progress reporting and no cancellation.
  pub async fn resolve_identities(&self) -> Result<ResolveSummary> {
    self.resolve(&CancellationToken::new(), |_| {}).await
  }

  /// Run one pass. Fails with [`Error::ResolutionInProgress`] if another pass
  /// is running.
  pub async fn resolve<F>(&self, cancel: &CancellationToken, progress: F) -> Result<ResolveSummary>
  where
    F: Fn(ResolveProgress) + Send + Sync,
  {
    let _guard = self.gate.try_enter()?;
    self.run(cancel, &progress).await
  }

  /// Run one pass after any pass already in flight has finished.
  pub async fn resolve_queued<F>(
    &self,
    cancel: &CancellationToken,
    progress: F,
  ) -> Result<ResolveSummary>
  where
    F: Fn(ResolveProgress) + Send + Sync,
  {
    let _guard = self.gate.enter().await;
    self.run(cancel, &progress).await
  }

  async fn run(
    &self,
    cancel: &CancellationToken,
    progress: &(dyn Fn(ResolveProgress) + Send + Sync),
  ) -> Result<ResolveSummary> {
    progress(ResolveProgress::Loading);
    let faces = self.store.list_faces().await.map_err(Error::store)?;
    let persons = self.store.list_persons().await.map_err(Error::store)?;

    if faces.is_empty() {
      info!("no faces to resolve");
      progress(ResolveProgress::Done);
      return Ok(ResolveSummary::default());
    }

    let plan = plan(&faces, &persons, &self.config, cancel, progress)?;

    // Past this point the pass is committed; cancellation is no longer
    // observed.
    progress(ResolveProgress::Writing);

    // Later persons of the same pass rank after earlier ones.
    let now = Utc::now();
    let new_persons: Vec<Person> = plan
      .new_persons
      .iter()
      .enumerate()
      .map(|(i, planned)| Person {
        person_id:  Uuid::new_v4(),
        name:       planned.name.clone(),
        centroid:   Some(planned.centroid.clone()),
        face_count: planned.face_count,
        created_at: now + Duration::microseconds(i as i64),
      })
      .collect();
    for p in &new_persons {
      debug!(person_id = %p.person_id, name = %p.name, faces = p.face_count, "creating person");
    }

    let created: Vec<Uuid> = new_persons.iter().map(|p| p.person_id).collect();
    let assignments: Vec<(Uuid, Uuid)> = plan
      .assignments
      .iter()
      .map(|(face_id, person)| (*face_id, person.resolve(&created)))
      .collect();
    let faces_assigned = assignments.len();

    self
      .store
      .apply_resolution(ResolutionWrite {
        new_persons,
        assignments,
        centroid_updates: plan.centroid_updates.clone(),
      })
      .await
      .map_err(Error::store)?;

    let summary = ResolveSummary {
      faces_processed: plan.faces_processed,
      clusters_found:  plan.clusters.len(),
      persons_created: plan.new_persons.len(),
      persons_updated: plan.centroid_updates.len(),
      faces_assigned,
      noise_faces:     plan.noise_faces,
      skipped_faces:   plan.skipped_faces,
    };
    info!(
      faces = summary.faces_processed,
      clusters = summary.clusters_found,
      created = summary.persons_created,
      updated = summary.persons_updated,
      noise = summary.noise_faces,
      skipped = summary.skipped_faces,
      "identity resolution finished"
    );
    progress(ResolveProgress::Done);
    Ok(summary)
  }
}
