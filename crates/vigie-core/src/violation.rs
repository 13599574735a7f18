//! Violation records: the fundamental unit of the Vigie store.
//!
//! A record mirrors one row of the upstream open-data document. Records are
//! created once, the first time their external identifier is observed, and are
//! never updated or deleted afterwards.

use serde::Serialize;

/// The thirteen upstream column names, in document order.
pub const COLUMNS: [&str; 13] = [
  "id_poursuite",
  "business_id",
  "date",
  "description",
  "adresse",
  "date_jugement",
  "etablissement",
  "montant",
  "proprietaire",
  "ville",
  "statut",
  "date_statut",
  "categorie",
];

/// One upstream violation entry.
///
/// Serialises with the upstream column names so that callers exporting
/// records reproduce the dataset's vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViolationRecord {
  /// External identifier (`id_poursuite`); the sole deduplication key.
  #[serde(rename = "id_poursuite")]
  pub id:            i64,
  pub business_id:   i64,
  /// Violation date as provided upstream, normally `YYYYMMDD`; never coerced.
  pub date:          String,
  pub description:   String,
  #[serde(rename = "adresse")]
  pub address:       String,
  #[serde(rename = "date_jugement")]
  pub judgment_date: Option<String>,
  #[serde(rename = "etablissement")]
  pub establishment: String,
  /// Monetary amount, verbatim.
  #[serde(rename = "montant")]
  pub amount:        String,
  #[serde(rename = "proprietaire")]
  pub owner:         String,
  #[serde(rename = "ville")]
  pub city:          String,
  #[serde(rename = "statut")]
  pub status:        String,
  #[serde(rename = "date_statut")]
  pub status_date:   Option<String>,
  #[serde(rename = "categorie")]
  pub category:      String,
}

/// Number of violations recorded against one establishment name.
///
/// Derived on every aggregation query; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EstablishmentStat {
  #[serde(rename = "etablissement")]
  pub establishment: String,
  #[serde(rename = "nb")]
  pub count:         u64,
}

/// An (external identifier, establishment name) pair, as returned by the
/// identifier-set lookup backing watch-lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EstablishmentRef {
  #[serde(rename = "id_poursuite")]
  pub id:            i64,
  #[serde(rename = "etablissement")]
  pub establishment: String,
}
