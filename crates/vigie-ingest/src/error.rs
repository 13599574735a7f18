//! Run-level errors for `vigie-ingest`.
//!
//! Anything here aborts the run before the store is touched. Row-level
//! problems are reported through [`RowError`](crate::RowError) instead.

use std::path::PathBuf;

use thiserror::Error;

/// The upstream document could not be retrieved in full.
#[derive(Debug, Error)]
pub enum TransferError {
  #[error("request failed: {0}")]
  Request(#[from] reqwest::Error),

  #[error("upstream responded with status {0}")]
  Status(reqwest::StatusCode),

  #[error("cannot read {path:?}: {source}")]
  Io {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },
}

#[derive(Debug, Error)]
pub enum Error {
  #[error("transfer failed: {0}")]
  Transfer(#[from] TransferError),

  #[error("unreadable document header: {0}")]
  Document(#[from] csv::Error),

  #[error("document header is missing columns: {}", .0.join(", "))]
  MissingColumns(Vec<&'static str>),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
