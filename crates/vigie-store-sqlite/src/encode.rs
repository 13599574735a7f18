//! Mapping between [`ViolationRecord`] and `violations` rows, plus the SQL
//! text fragments shared by the store's statements.

use vigie_core::violation::{EstablishmentRef, EstablishmentStat, ViolationRecord};

/// Column list in [`ViolationRecord`] field order. Every `SELECT` that feeds
/// [`violation_from_row`] must use it.
pub const VIOLATION_COLUMNS: &str = "id_poursuite, business_id, date, description, adresse, \
   date_jugement, etablissement, montant, proprietaire, ville, statut, date_statut, categorie";

/// Import statement; the primary key turns a repeated identifier into a
/// zero-row insert instead of an error.
pub const INSERT_VIOLATION: &str = "INSERT INTO violations (
     id_poursuite, business_id, date, description, adresse,
     date_jugement, etablissement, montant, proprietaire, ville,
     statut, date_statut, categorie
   ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
   ON CONFLICT (id_poursuite) DO NOTHING";

/// Upper bound on bound parameters per `IN (...)` list.
pub const IN_CHUNK: usize = 500;

pub fn violation_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ViolationRecord> {
  Ok(ViolationRecord {
    id:            row.get(0)?,
    business_id:   row.get(1)?,
    date:          row.get(2)?,
    description:   row.get(3)?,
    address:       row.get(4)?,
    judgment_date: row.get(5)?,
    establishment: row.get(6)?,
    amount:        row.get(7)?,
    owner:         row.get(8)?,
    city:          row.get(9)?,
    status:        row.get(10)?,
    status_date:   row.get(11)?,
    category:      row.get(12)?,
  })
}

pub fn stat_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<EstablishmentStat> {
  let count: i64 = row.get(1)?;
  Ok(EstablishmentStat {
    establishment: row.get(0)?,
    count:         count.max(0) as u64,
  })
}

pub fn ref_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<EstablishmentRef> {
  Ok(EstablishmentRef {
    id:            row.get(0)?,
    establishment: row.get(1)?,
  })
}

/// `?, ?, ?` with `n` placeholders.
pub fn placeholders(n: usize) -> String { vec!["?"; n].join(", ") }
