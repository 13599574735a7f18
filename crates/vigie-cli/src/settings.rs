//! Runtime settings, read from an optional TOML file and `VIGIE_*`
//! environment variables.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
  /// SQLite database file. A leading `~/` is expanded.
  #[serde(default = "default_store_path")]
  pub store_path:   PathBuf,
  #[serde(default = "default_upstream_url")]
  pub upstream_url: String,
  /// Bound on one upstream transfer.
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
}

fn default_store_path() -> PathBuf { PathBuf::from("vigie.db") }

fn default_upstream_url() -> String { vigie_ingest::DEFAULT_URL.to_owned() }

fn default_timeout_secs() -> u64 { vigie_ingest::DEFAULT_TIMEOUT.as_secs() }

impl Settings {
  /// Layer `path` (if it exists) under the environment.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path.to_path_buf()).required(false))
      .add_source(config::Environment::with_prefix("VIGIE"))
      .build()
      .with_context(|| format!("failed to read config file {path:?}"))?;

    let mut settings: Settings = settings
      .try_deserialize()
      .context("failed to deserialise Settings")?;
    settings.store_path = expand_tilde(&settings.store_path);
    Ok(settings)
  }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
