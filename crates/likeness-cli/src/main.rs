//! `likeness`: import photos and group their faces into people.
//!
//! # Usage
//!
//! ```text
//! likeness import ~/Pictures/2023
//! likeness resolve
//! likeness people
//! likeness rename 6f1c… "Grandma"
//! likeness photos --person 6f1c… --from 2023-05-01
//! ```
//!
//! Settings come from `likeness.toml` (or `--config`) and `LIKENESS_*`
//! environment variables.

mod commands;
mod metadata;
mod settings;
mod sidecar;

use std::path::PathBuf;

use anyhow::Context as _;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use likeness_core::photo::PhotoQuery;
use likeness_store_sqlite::SqliteStore;
use settings::Settings;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Parser)]
#[command(author, version, about = "Photo library face grouping")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "likeness.toml")]
  config: PathBuf,

  /// Print results as JSON.
  #[arg(long, global = true)]
  json: bool,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Import every photo under a directory.
  Import {
    dir:        PathBuf,
    /// Record metadata only; faces are detected on a later import.
    #[arg(long)]
    no_faces:   bool,
    /// Do not group newly detected faces into people.
    #[arg(long)]
    no_resolve: bool,
  },
  /// Group detected faces into people.
  Resolve,
  /// List people with their face counts.
  People,
  /// Give a person a name.
  Rename { person_id: Uuid, name: String },
  /// Search the gallery.
  Photos {
    /// Photos containing this person; repeat for several.
    #[arg(long = "person", value_name = "ID")]
    persons:    Vec<Uuid>,
    /// Require every `--person` instead of any.
    #[arg(long)]
    all:        bool,
    /// Also show photos with faces not yet assigned to anyone.
    #[arg(long)]
    unassigned: bool,
    #[arg(long, value_name = "YYYY-MM-DD")]
    from:       Option<NaiveDate>,
    #[arg(long, value_name = "YYYY-MM-DD")]
    to:         Option<NaiveDate>,
    /// Substring of city or country.
    #[arg(long)]
    location:   Option<String>,
    #[arg(long)]
    limit:      Option<usize>,
    #[arg(long)]
    offset:     Option<usize>,
  },
  /// Show the best thumbnail face for a person.
  Face { person_id: Uuid },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();
  let settings = Settings::load(&cli.config)?;

  if let Some(parent) = settings.store_path.parent()
    && !parent.as_os_str().is_empty()
  {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("failed to create {}", parent.display()))?;
  }
  let store = SqliteStore::open(&settings.store_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", settings.store_path))?;

  let out = commands::Output { json: cli.json };
  match cli.command {
    Command::Import { dir, no_faces, no_resolve } => {
      let opts = commands::ImportOptions { no_faces, no_resolve };
      commands::import(&store, &settings, &dir, opts, out).await
    }
    Command::Resolve => commands::resolve(store, &settings, out).await,
    Command::People => commands::people(&store, out).await,
    Command::Rename { person_id, name } => commands::rename(&store, person_id, name).await,
    Command::Photos { persons, all, unassigned, from, to, location, limit, offset } => {
      let query = PhotoQuery {
        person_ids: persons,
        match_all: all,
        include_unassigned: unassigned,
        captured_from: from.and_then(|d| d.and_hms_opt(0, 0, 0)),
        captured_to: to.and_then(|d| d.and_hms_milli_opt(23, 59, 59, 999)),
        location,
        limit,
        offset,
      };
      commands::photos(&store, &query, out).await
    }
    Command::Face { person_id } => commands::face(&store, person_id, out).await,
  }
}
