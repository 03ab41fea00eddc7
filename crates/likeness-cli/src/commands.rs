//! Subcommand implementations.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, bail};
use likeness_core::{
  face::{BoundingBox, representative_face},
  ingest::{ImportConfig, Ingestor, Sighting},
  photo::PhotoQuery,
  resolve::{IdentityResolver, ResolveSummary},
  store::LibraryStore,
};
use likeness_store_sqlite::SqliteStore;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;
use walkdir::WalkDir;

use crate::{metadata::LocalMetadataReader, settings::Settings, sidecar::SidecarDetector};

#[derive(Clone, Copy)]
pub struct Output {
  pub json: bool,
}

impl Output {
  fn emit<T: Serialize>(self, value: &T, human: impl FnOnce(&T)) -> anyhow::Result<()> {
    if self.json {
      println!("{}", serde_json::to_string_pretty(value)?);
    } else {
      human(value);
    }
    Ok(())
  }
}

// ─── import ──────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ImportSummary {
  scanned: usize,
  new:     usize,
  known:   usize,
  faces:   usize,
  failed:  Vec<FailedImport>,
  /// The resolution pass run after detection, if any.
  #[serde(skip_serializing_if = "Option::is_none")]
  resolved: Option<ResolveSummary>,
}

#[derive(Serialize)]
struct FailedImport {
  path:  PathBuf,
  error: String,
}

/// Files under `dir` with an accepted extension, sorted for stable ordering.
fn collect_photos(dir: &Path, config: &ImportConfig) -> anyhow::Result<Vec<PathBuf>> {
  if !dir.is_dir() {
    bail!("{} is not a directory", dir.display());
  }
  let mut paths: Vec<PathBuf> = WalkDir::new(dir)
    .follow_links(true)
    .into_iter()
    .filter_map(|entry| match entry {
      Ok(e) => Some(e),
      Err(e) => {
        warn!(error = %e, "skipping unreadable directory entry");
        None
      }
    })
    .filter(|e| e.file_type().is_file() && config.accepts(e.path()))
    .map(walkdir::DirEntry::into_path)
    .collect();
  paths.sort();
  Ok(paths)
}

/// Import flags.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImportOptions {
  /// Record metadata only.
  pub no_faces:   bool,
  /// Skip the resolution pass after detection.
  pub no_resolve: bool,
}

pub async fn import(
  store: &SqliteStore,
  settings: &Settings,
  dir: &Path,
  opts: ImportOptions,
  out: Output,
) -> anyhow::Result<()> {
  let paths = collect_photos(dir, &settings.import)?;
  info!(dir = %dir.display(), photos = paths.len(), "importing");

  let mut ingestor =
    Ingestor::new(store, LocalMetadataReader, SidecarDetector).with_config(&settings.import);
  if opts.no_faces {
    ingestor = ingestor.without_detection();
  }

  let report = ingestor
    .ingest_all(&paths, |p| {
      if p.done % 100 == 0 {
        info!(done = p.done, total = p.total, "import progress");
      }
    })
    .await;

  let resolved = if !opts.no_resolve && report.faces_detected() > 0 {
    Some(run_resolution(store.clone(), settings).await?)
  } else {
    None
  };

  let summary = ImportSummary {
    scanned: report.results.len(),
    new:     report.new_photos(),
    known:   report.succeeded().filter(|(_, o)| o.sighting == Sighting::Known).count(),
    faces:   report.faces_detected(),
    failed:  report
      .failed()
      .map(|(path, e)| FailedImport { path: path.to_path_buf(), error: e.to_string() })
      .collect(),
    resolved,
  };

  out.emit(&summary, |s| {
    println!(
      "{} scanned, {} new, {} already known, {} faces detected",
      s.scanned, s.new, s.known, s.faces
    );
    for f in &s.failed {
      println!("  failed: {}: {}", f.path.display(), f.error);
    }
    if let Some(r) = &s.resolved {
      print_resolution(r);
    }
  })
}

// ─── resolve ─────────────────────────────────────────────────────────────────

/// One resolution pass; Ctrl-C cancels it before anything is written.
async fn run_resolution(store: SqliteStore, settings: &Settings) -> anyhow::Result<ResolveSummary> {
  let resolver = IdentityResolver::new(store, settings.resolver.clone())?;

  let cancel = CancellationToken::new();
  let interrupt = {
    let cancel = cancel.clone();
    tokio::spawn(async move {
      if tokio::signal::ctrl_c().await.is_ok() {
        warn!("interrupted, cancelling identity resolution");
        cancel.cancel();
      }
    })
  };

  let result = resolver
    .resolve(&cancel, |p| debug!(progress = ?p, "identity resolution"))
    .await;
  interrupt.abort();
  result.context("identity resolution failed")
}

fn print_resolution(s: &ResolveSummary) {
  println!(
    "{} faces in {} clusters: {} new people, {} updated, {} unclustered, {} skipped",
    s.faces_processed,
    s.clusters_found,
    s.persons_created,
    s.persons_updated,
    s.noise_faces,
    s.skipped_faces
  );
}

pub async fn resolve(store: SqliteStore, settings: &Settings, out: Output) -> anyhow::Result<()> {
  let summary = run_resolution(store, settings).await?;
  out.emit(&summary, print_resolution)
}

// ─── people / rename ─────────────────────────────────────────────────────────

pub async fn people(store: &SqliteStore, out: Output) -> anyhow::Result<()> {
  let summaries = store.person_summaries().await?;
  out.emit(&summaries, |list| {
    for s in list {
      println!("{}  {:<24} {} faces", s.person.person_id, s.person.name, s.assigned_faces);
    }
  })
}

pub async fn rename(store: &SqliteStore, person_id: Uuid, name: String) -> anyhow::Result<()> {
  let name = name.trim().to_owned();
  if name.is_empty() {
    bail!("name must not be empty");
  }
  store.rename_person(person_id, name).await?;
  Ok(())
}

// ─── photos / face ───────────────────────────────────────────────────────────

pub async fn photos(store: &SqliteStore, query: &PhotoQuery, out: Output) -> anyhow::Result<()> {
  let photos = store.search_photos(query).await?;
  out.emit(&photos, |list| {
    for p in list {
      let when = p
        .captured_at
        .map_or_else(|| "unknown date".to_owned(), |t| t.format("%Y-%m-%d %H:%M:%S").to_string());
      println!("{when:<19}  {}", p.path);
    }
  })
}

#[derive(Serialize)]
struct FaceView {
  person_id:  Uuid,
  face_id:    Uuid,
  photo_path: String,
  bbox:       BoundingBox,
}

pub async fn face(store: &SqliteStore, person_id: Uuid, out: Output) -> anyhow::Result<()> {
  let faces = store.list_person_faces(person_id).await?;
  let Some(best) = representative_face(&faces) else {
    bail!("person {person_id} has no faces");
  };
  let view = FaceView {
    person_id,
    face_id: best.face.face_id,
    photo_path: best.photo_path.clone(),
    bbox: best.face.bbox,
  };
  out.emit(&view, |v| {
    let b = v.bbox;
    println!("{} [{},{} {}x{}]", v.photo_path, b.left, b.top, b.width(), b.height());
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn collects_accepted_files_recursively() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    std::fs::create_dir_all(root.join("2023/may")).unwrap();
    for name in ["b.jpg", "a.PNG", "2023/may/c.jpeg", "a.PNG.faces.json", "notes.txt"] {
      std::fs::write(root.join(name), b"x").unwrap();
    }

    let found = collect_photos(root, &ImportConfig::default()).unwrap();
    let rel: Vec<_> = found.iter().map(|p| p.strip_prefix(root).unwrap().to_path_buf()).collect();
    assert_eq!(rel, vec![
      PathBuf::from("2023/may/c.jpeg"),
      PathBuf::from("a.PNG"),
      PathBuf::from("b.jpg"),
    ]);
  }

  fn small_settings(dir: &Path) -> Settings {
    Settings {
      store_path: dir.join("library.db"),
      resolver:   likeness_core::resolve::ResolverConfig {
        embedding_dim: 2,
        ..Default::default()
      },
      import:     ImportConfig::default(),
    }
  }

  /// Two photos of the same face, with sidecars.
  fn write_library(root: &Path) {
    for (name, bytes) in [("a.jpg", &b"first"[..]), ("b.jpg", &b"second"[..])] {
      let image = root.join(name);
      std::fs::write(&image, bytes).unwrap();
      std::fs::write(
        crate::sidecar::sidecar_path(&image),
        r#"{"faces":[{"bbox":{"left":0,"top":0,"right":50,"bottom":50},"embedding":[1.0,0.02]}]}"#,
      )
      .unwrap();
    }
  }

  #[tokio::test]
  async fn import_resolves_detected_faces() {
    let dir = tempfile::tempdir().unwrap();
    write_library(dir.path());
    let settings = small_settings(dir.path());
    let store = SqliteStore::open_in_memory().await.unwrap();

    import(&store, &settings, dir.path(), ImportOptions::default(), Output { json: true })
      .await
      .unwrap();

    let faces = store.list_faces().await.unwrap();
    assert_eq!(faces.len(), 2);
    assert!(faces.iter().all(|f| f.person_id.is_some()));
    assert_eq!(store.list_persons().await.unwrap().len(), 1);
  }

  #[tokio::test]
  async fn no_resolve_leaves_faces_unassigned() {
    let dir = tempfile::tempdir().unwrap();
    write_library(dir.path());
    let settings = small_settings(dir.path());
    let store = SqliteStore::open_in_memory().await.unwrap();

    let opts = ImportOptions { no_resolve: true, ..Default::default() };
    import(&store, &settings, dir.path(), opts, Output { json: true }).await.unwrap();

    let faces = store.list_faces().await.unwrap();
    assert_eq!(faces.len(), 2);
    assert!(faces.iter().all(|f| f.person_id.is_none()));
    assert!(store.list_persons().await.unwrap().is_empty());
  }

  #[test]
  fn import_root_must_be_a_directory() {
    assert!(collect_photos(Path::new("/nonexistent/dir"), &ImportConfig::default()).is_err());
  }
}
