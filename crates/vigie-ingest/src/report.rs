//! Outcome of one ingestion run.

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;
use vigie_core::store::RowFailure;

/// Why a single row was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "type", content = "detail", rename_all = "snake_case")]
pub enum RowErrorKind {
  #[error("id_poursuite is not an integer: {0:?}")]
  InvalidId(String),

  #[error("business_id is not an integer: {0:?}")]
  InvalidBusinessId(String),

  /// The CSV record itself is unusable (wrong field count, bad UTF-8).
  #[error("malformed record: {0}")]
  Malformed(String),

  #[error("insert rejected: {0}")]
  Insert(String),
}

/// A skipped row, located by its 1-based position among the data rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowError {
  pub ordinal: usize,
  pub id:      Option<i64>,
  pub kind:    RowErrorKind,
}

impl From<RowFailure> for RowError {
  fn from(failure: RowFailure) -> Self {
    Self {
      ordinal: failure.ordinal,
      id:      Some(failure.id),
      kind:    RowErrorKind::Insert(failure.reason),
    }
  }
}

/// Summary of a successful run.
///
/// `rows_seen == inserted + duplicates + errors.len()`.
#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
  pub run_id:          Uuid,
  /// Hex SHA-256 of the fetched document.
  pub document_sha256: String,
  pub rows_seen:       usize,
  pub inserted:        usize,
  pub duplicates:      usize,
  /// Row-level errors in document order.
  pub errors:          Vec<RowError>,
}
