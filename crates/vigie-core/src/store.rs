//! The `ViolationStore` trait and its merge types.
//!
//! The trait is implemented by storage backends (e.g. `vigie-store-sqlite`).
//! Ingestion and the operator CLI depend on this abstraction, not on any
//! concrete backend.

use std::{collections::HashSet, future::Future};

use serde::Serialize;

use crate::{
  date::DateRange,
  query::SearchCriteria,
  violation::{EstablishmentRef, EstablishmentStat, ViolationRecord},
};

// ─── Merge types ─────────────────────────────────────────────────────────────

/// A parsed upstream row awaiting insertion.
#[derive(Debug, Clone)]
pub struct StagedRow {
  /// 1-based position of the row among the document's data rows.
  pub ordinal: usize,
  pub record:  ViolationRecord,
}

/// A staged row the backend failed to insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowFailure {
  pub ordinal: usize,
  pub id:      i64,
  pub reason:  String,
}

/// What a [`ViolationStore::merge`] call did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeOutcome {
  pub inserted:   usize,
  /// Rows whose identifier was already present when the insert ran.
  pub duplicates: usize,
  pub failures:   Vec<RowFailure>,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a violation store backend.
///
/// Records are append-only: no method updates or removes a stored record.
/// Every read observes a single consistent state of the store and never a
/// partially merged batch.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes.
pub trait ViolationStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Writes ────────────────────────────────────────────────────────────

  /// Return the subset of `ids` already present in the store.
  ///
  /// A pre-check only; [`merge`](Self::merge) is the authoritative guard
  /// against duplicates.
  fn existing_ids<'a>(
    &'a self,
    ids: &'a [i64],
  ) -> impl Future<Output = Result<HashSet<i64>, Self::Error>> + Send + 'a;

  /// Insert each staged row whose identifier is absent, as a single atomic
  /// batch.
  ///
  /// A row rejected because its identifier already exists counts as a
  /// duplicate. Any other per-row failure is reported in
  /// [`MergeOutcome::failures`] and does not prevent the remaining rows from
  /// being inserted. An `Err` means nothing was written.
  fn merge(
    &self,
    rows: Vec<StagedRow>,
  ) -> impl Future<Output = Result<MergeOutcome, Self::Error>> + Send + '_;

  // ── Reads ─────────────────────────────────────────────────────────────

  /// Total number of stored records.
  fn count(&self) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// Records matching every present criterion, newest violation first.
  fn search<'a>(
    &'a self,
    criteria: &'a SearchCriteria,
  ) -> impl Future<Output = Result<Vec<ViolationRecord>, Self::Error>> + Send + 'a;

  /// Records whose violation date lies in `range` (both ends inclusive),
  /// newest first.
  fn in_date_range<'a>(
    &'a self,
    range: &'a DateRange,
  ) -> impl Future<Output = Result<Vec<ViolationRecord>, Self::Error>> + Send + 'a;

  /// Distinct establishment names, sorted lexicographically.
  fn establishments(
    &self,
  ) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send + '_;

  /// `(id, establishment)` pairs for the stored records whose identifier is
  /// in `ids`, ordered by identifier.
  fn establishments_by_ids<'a>(
    &'a self,
    ids: &'a [i64],
  ) -> impl Future<Output = Result<Vec<EstablishmentRef>, Self::Error>> + Send + 'a;

  // ── Aggregates ────────────────────────────────────────────────────────

  /// Violation count per establishment, highest count first; equal counts
  /// are ordered by establishment name ascending.
  fn statistics(
    &self,
  ) -> impl Future<Output = Result<Vec<EstablishmentStat>, Self::Error>> + Send + '_;

  /// The head of [`statistics`](Self::statistics), or `None` when the store
  /// is empty.
  fn worst_establishment(
    &self,
  ) -> impl Future<Output = Result<Option<EstablishmentStat>, Self::Error>> + Send + '_;
}
