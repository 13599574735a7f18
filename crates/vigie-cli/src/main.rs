//! `vigie`: operator CLI for the Vigie violation store.
//!
//! # Usage
//!
//! ```
//! vigie ingest                       # fetch the open-data export and merge it
//! vigie ingest --file violations.csv # merge a local copy instead
//! vigie search --establishment cafe --street "rue principale"
//! vigie range --from 2024-01-01 --to 2024-01-31
//! vigie --format xml stats
//! ```
//!
//! Settings come from `vigie.toml` (or `--config`) and `VIGIE_*` variables.
//! `ingest` is meant to be run from cron; it exits non-zero when the run
//! fails as a whole.

mod render;
mod settings;

use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use render::{Format, render, render_names, render_stats};
use settings::Settings;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use vigie_core::{date::DateRange, query::SearchCriteria, store::ViolationStore};
use vigie_ingest::{FileSource, HttpSource, IngestReport, Ingestor, UpstreamSource};
use vigie_store_sqlite::SqliteStore;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "vigie", author, version, about = "Food-establishment violation store")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "vigie.toml", global = true)]
  config: PathBuf,

  /// Output format for query results.
  #[arg(short, long, value_enum, default_value_t = Format::Json, global = true)]
  format: Format,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Fetch the upstream document and merge violations not yet stored.
  Ingest {
    /// Read the document from a local file instead of the upstream URL.
    #[arg(long, value_name = "FILE")]
    file: Option<PathBuf>,
  },
  /// Search by establishment, owner, and street; newest first.
  Search {
    #[arg(long)]
    establishment: Option<String>,
    #[arg(long)]
    owner:         Option<String>,
    /// Every word must appear in the address, in any order.
    #[arg(long)]
    street:        Option<String>,
  },
  /// Violations dated within an inclusive range (YYYY-MM-DD or YYYYMMDD).
  Range {
    #[arg(long)]
    from: String,
    #[arg(long)]
    to:   String,
  },
  /// Distinct establishment names.
  Establishments,
  /// Violation count per establishment, highest first.
  Stats,
  /// The establishment with the most violations.
  Worst,
  /// Establishment names for the given violation identifiers.
  Lookup {
    #[arg(required = true)]
    ids: Vec<i64>,
  },
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Logs go to stderr; stdout carries only command output.
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

  let store = SqliteStore::open(&settings.store_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", settings.store_path))?;
  let store = Arc::new(store);

  let output = match cli.command {
    Command::Ingest { file } => {
      let report = match file {
        Some(path) => ingest(store, FileSource::new(path)).await?,
        None => {
          let source = HttpSource::new(
            settings.upstream_url.clone(),
            Duration::from_secs(settings.timeout_secs),
          )
          .context("failed to build HTTP client")?;
          ingest(store, source).await?
        }
      };
      serde_json::to_string_pretty(&report)?
    }
    Command::Search { establishment, owner, street } => {
      let criteria = SearchCriteria { establishment, owner, street };
      let records = store.search(&criteria).await.context("search failed")?;
      render(&records, "contraventions", cli.format)?
    }
    Command::Range { from, to } => {
      let range = DateRange::parse(&from, &to)?;
      let records = store
        .in_date_range(&range)
        .await
        .context("date range search failed")?;
      render(&records, "contraventions", cli.format)?
    }
    Command::Establishments => {
      let names = store
        .establishments()
        .await
        .context("listing establishments failed")?;
      render_names(&names, cli.format)?
    }
    Command::Stats => {
      let stats = store.statistics().await.context("statistics failed")?;
      render_stats(&stats, cli.format)?
    }
    Command::Worst => {
      let worst = store
        .worst_establishment()
        .await
        .context("worst establishment query failed")?;
      if worst.is_none() {
        tracing::info!("no violations recorded");
      }
      match cli.format {
        Format::Json => serde_json::to_string_pretty(&worst)?,
        format => render_stats(worst.as_slice(), format)?,
      }
    }
    Command::Lookup { ids } => {
      let refs = store
        .establishments_by_ids(&ids)
        .await
        .context("lookup failed")?;
      render(&refs, "etablissements", cli.format)?
    }
  };

  println!("{output}");
  Ok(())
}

async fn ingest<U: UpstreamSource>(
  store: Arc<SqliteStore>,
  source: U,
) -> anyhow::Result<IngestReport> {
  Ingestor::new(store, source)
    .run()
    .await
    .context("ingestion run failed")
}
