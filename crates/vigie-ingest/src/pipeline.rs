//! [`Ingestor`]: one fetch-parse-merge run against a store.

use std::{collections::HashSet, sync::Arc};

use sha2::{Digest, Sha256};
use tokio::sync::Mutex;
use tracing::Instrument as _;
use uuid::Uuid;
use vigie_core::store::{StagedRow, ViolationStore};

use crate::{
  Error, IngestReport, Result, RowError, UpstreamSource,
  parse::{Candidate, parse_document},
};

/// Synchronises a [`ViolationStore`] with an [`UpstreamSource`].
///
/// Runs on the same ingestor are serialised. Runs from independent
/// ingestors (or processes) stay safe because the store's merge rejects
/// identifiers that are already present.
pub struct Ingestor<S, U> {
  store:    Arc<S>,
  source:   U,
  run_lock: Mutex<()>,
}

impl<S, U> Ingestor<S, U>
where
  S: ViolationStore,
  U: UpstreamSource,
{
  pub fn new(store: Arc<S>, source: U) -> Self {
    Self { store, source, run_lock: Mutex::new(()) }
  }

  pub fn source(&self) -> &U { &self.source }

  /// Run one ingestion.
  ///
  /// Returns `Err` only when the run as a whole failed, in which case nothing
  /// was written. Bad rows are skipped and listed in the report.
  pub async fn run(&self) -> Result<IngestReport> {
    let _guard = self.run_lock.lock().await;
    let run_id = Uuid::new_v4();

    let result = self
      .execute(run_id)
      .instrument(tracing::info_span!("ingest", %run_id))
      .await;
    if let Err(e) = &result {
      tracing::error!(%run_id, error = %e, "ingestion run failed");
    }
    result
  }

  async fn execute(&self, run_id: Uuid) -> Result<IngestReport> {
    let document = self.source.fetch().await?;
    let document_sha256 = hex::encode(Sha256::digest(&document));
    tracing::info!(bytes = document.len(), sha256 = %document_sha256, "fetched upstream document");

    let rows = parse_document(&document)?;
    let rows_seen = rows.len();

    let mut errors: Vec<RowError> = Vec::new();
    let mut candidates: Vec<(usize, Candidate)> = Vec::with_capacity(rows_seen);
    for row in rows {
      match row.outcome {
        Ok(candidate) => candidates.push((row.ordinal, candidate)),
        Err(e) => errors.push(e),
      }
    }

    let ids: Vec<i64> = candidates.iter().map(|(_, c)| c.id).collect();
    let existing = self.store.existing_ids(&ids).await.map_err(store_error)?;

    // A repeat of an id stored earlier or staged earlier in this document is
    // a duplicate, whatever its other fields hold.
    let mut duplicates = 0;
    let mut staged_ids = HashSet::new();
    let mut staged = Vec::with_capacity(candidates.len());
    for (ordinal, candidate) in candidates {
      let id = candidate.id;
      if existing.contains(&id) || staged_ids.contains(&id) {
        duplicates += 1;
        continue;
      }
      match candidate.into_record() {
        Ok(record) => {
          staged_ids.insert(id);
          staged.push(StagedRow { ordinal, record });
        }
        Err(kind) => errors.push(RowError { ordinal, id: Some(id), kind }),
      }
    }

    let outcome = self.store.merge(staged).await.map_err(store_error)?;
    duplicates += outcome.duplicates;
    errors.extend(outcome.failures.into_iter().map(RowError::from));
    errors.sort_by_key(|e| e.ordinal);

    for e in &errors {
      tracing::warn!(ordinal = e.ordinal, id = ?e.id, error = %e.kind, "row skipped");
    }

    let report = IngestReport {
      run_id,
      document_sha256,
      rows_seen,
      inserted: outcome.inserted,
      duplicates,
      errors,
    };
    tracing::info!(
      rows = report.rows_seen,
      inserted = report.inserted,
      duplicates = report.duplicates,
      errors = report.errors.len(),
      "ingestion run complete"
    );
    Ok(report)
  }
}

fn store_error<E>(e: E) -> Error
where
  E: std::error::Error + Send + Sync + 'static,
{
  Error::Store(Box::new(e))
}
