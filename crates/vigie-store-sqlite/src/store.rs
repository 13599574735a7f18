//! [`SqliteStore`]: the SQLite implementation of [`ViolationStore`].

use std::{collections::HashSet, path::Path, time::Duration};

use rusqlite::{OptionalExtension as _, TransactionBehavior, params_from_iter};

use vigie_core::{
  date::DateRange,
  query::SearchCriteria,
  store::{MergeOutcome, RowFailure, StagedRow, ViolationStore},
  violation::{EstablishmentRef, EstablishmentStat, ViolationRecord},
};

use crate::{
  Result,
  encode::{
    IN_CHUNK, INSERT_VIOLATION, VIOLATION_COLUMNS, placeholders, ref_from_row, stat_from_row,
    violation_from_row,
  },
  filter::Filter,
  schema::SCHEMA,
};

/// Establishment counts, highest first, ties broken by name.
const STATISTICS: &str = "SELECT etablissement, COUNT(*) AS nb
   FROM violations
   GROUP BY etablissement
   ORDER BY nb DESC, etablissement ASC";

/// How long a writer waits for another process holding the write lock.
const BUSY_TIMEOUT: Duration = Duration::from_secs(30);

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Vigie violation store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  #[cfg(test)]
  pub(crate) async fn execute_batch(&self, sql: &'static str) -> Result<()> {
    self.conn.call(move |conn| Ok(conn.execute_batch(sql)?)).await?;
    Ok(())
  }

  /// Run a violation `SELECT` with `filter`, newest first.
  async fn select_violations(&self, filter: Filter) -> Result<Vec<ViolationRecord>> {
    let records = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {VIOLATION_COLUMNS} FROM violations {} ORDER BY date DESC, id_poursuite DESC",
          filter.where_clause()
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(params_from_iter(filter.params()), violation_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(records)
  }
}

// ─── ViolationStore impl ─────────────────────────────────────────────────────

impl ViolationStore for SqliteStore {
  type Error = crate::Error;

  // ── Writes ────────────────────────────────────────────────────────────────

  async fn existing_ids(&self, ids: &[i64]) -> Result<HashSet<i64>> {
    if ids.is_empty() {
      return Ok(HashSet::new());
    }
    let ids = ids.to_vec();

    let found = self
      .conn
      .call(move |conn| {
        // One read transaction, so every chunk sees the same snapshot.
        let tx = conn.transaction()?;
        let mut found = HashSet::new();
        for chunk in ids.chunks(IN_CHUNK) {
          let sql = format!(
            "SELECT id_poursuite FROM violations WHERE id_poursuite IN ({})",
            placeholders(chunk.len())
          );
          let mut stmt = tx.prepare(&sql)?;
          let rows = stmt.query_map(params_from_iter(chunk), |row| row.get::<_, i64>(0))?;
          for id in rows {
            found.insert(id?);
          }
        }
        tx.commit()?;
        Ok(found)
      })
      .await?;

    Ok(found)
  }

  async fn merge(&self, rows: Vec<StagedRow>) -> Result<MergeOutcome> {
    let outcome = self
      .conn
      .call(move |conn| {
        // Immediate: take the write lock up front so a concurrent writer
        // waits instead of failing at commit.
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let mut outcome = MergeOutcome::default();
        {
          let mut stmt = tx.prepare(INSERT_VIOLATION)?;
          for StagedRow { ordinal, record: r } in &rows {
            let inserted = stmt.execute(rusqlite::params![
              r.id,
              r.business_id,
              r.date,
              r.description,
              r.address,
              r.judgment_date,
              r.establishment,
              r.amount,
              r.owner,
              r.city,
              r.status,
              r.status_date,
              r.category,
            ]);
            match inserted {
              Ok(0) => outcome.duplicates += 1,
              Ok(_) => outcome.inserted += 1,
              Err(e) => outcome.failures.push(RowFailure {
                ordinal: *ordinal,
                id:      r.id,
                reason:  e.to_string(),
              }),
            }
          }
        }
        tx.commit()?;
        Ok(outcome)
      })
      .await?;

    tracing::debug!(
      inserted = outcome.inserted,
      duplicates = outcome.duplicates,
      failures = outcome.failures.len(),
      "merge committed"
    );
    Ok(outcome)
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn count(&self) -> Result<u64> {
    let count: i64 = self
      .conn
      .call(|conn| {
        Ok(conn.query_row("SELECT COUNT(*) FROM violations", [], |row| row.get(0))?)
      })
      .await?;
    Ok(count.max(0) as u64)
  }

  async fn search(&self, criteria: &SearchCriteria) -> Result<Vec<ViolationRecord>> {
    let records = self.select_violations(Filter::for_criteria(criteria)).await?;
    tracing::debug!(?criteria, matches = records.len(), "search");
    Ok(records)
  }

  async fn in_date_range(&self, range: &DateRange) -> Result<Vec<ViolationRecord>> {
    let records = self.select_violations(Filter::for_date_range(range)).await?;
    tracing::debug!(
      start = %range.start,
      end = %range.end,
      matches = records.len(),
      "date range search"
    );
    Ok(records)
  }

  async fn establishments(&self) -> Result<Vec<String>> {
    let names = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT DISTINCT etablissement FROM violations ORDER BY etablissement",
        )?;
        let rows = stmt
          .query_map([], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(names)
  }

  async fn establishments_by_ids(&self, ids: &[i64]) -> Result<Vec<EstablishmentRef>> {
    if ids.is_empty() {
      return Ok(Vec::new());
    }
    let mut ids = ids.to_vec();
    ids.sort_unstable();
    ids.dedup();

    let refs = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut refs = Vec::new();
        for chunk in ids.chunks(IN_CHUNK) {
          let sql = format!(
            "SELECT id_poursuite, etablissement FROM violations
             WHERE id_poursuite IN ({})
             ORDER BY id_poursuite",
            placeholders(chunk.len())
          );
          let mut stmt = tx.prepare(&sql)?;
          let rows = stmt.query_map(params_from_iter(chunk), ref_from_row)?;
          for r in rows {
            refs.push(r?);
          }
        }
        tx.commit()?;
        Ok(refs)
      })
      .await?;

    Ok(refs)
  }

  // ── Aggregates ────────────────────────────────────────────────────────────

  async fn statistics(&self) -> Result<Vec<EstablishmentStat>> {
    let stats = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(STATISTICS)?;
        let rows = stmt
          .query_map([], stat_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(stats)
  }

  async fn worst_establishment(&self) -> Result<Option<EstablishmentStat>> {
    let worst = self
      .conn
      .call(|conn| {
        Ok(
          conn
            .query_row(&format!("{STATISTICS} LIMIT 1"), [], stat_from_row)
            .optional()?,
        )
      })
      .await?;
    Ok(worst)
  }
}
