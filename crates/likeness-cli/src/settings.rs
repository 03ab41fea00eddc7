//! Layered configuration: defaults, then `likeness.toml`, then `LIKENESS_*`
//! environment variables.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use likeness_core::{ingest::ImportConfig, resolve::ResolverConfig};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
  /// SQLite library file; a leading `~/` is expanded.
  pub store_path: PathBuf,
  pub resolver:   ResolverConfig,
  pub import:     ImportConfig,
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      store_path: PathBuf::from("~/.local/share/likeness/library.db"),
      resolver:   ResolverConfig::default(),
      import:     ImportConfig::default(),
    }
  }
}

impl Settings {
  /// Nested keys use a double underscore in the environment, e.g.
  /// `LIKENESS_RESOLVER__EPS=0.35`.
  pub fn load(file: &Path) -> anyhow::Result<Self> {
    let raw = config::Config::builder()
      .add_source(config::File::from(file).required(false))
      .add_source(
        config::Environment::with_prefix("LIKENESS")
          .prefix_separator("_")
          .separator("__")
          .try_parsing(true),
      )
      .build()
      .context("failed to read configuration")?;

    let mut settings: Settings = raw
      .try_deserialize()
      .context("failed to deserialise settings")?;
    settings.store_path = expand_tilde(&settings.store_path);
    settings.resolver.validate()?;
    Ok(settings)
  }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
