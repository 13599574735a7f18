//! CSV parsing of the upstream document.
//!
//! Only the header is fatal: a document whose header lacks one of the
//! thirteen columns is rejected as a whole. Every data row is parsed on its
//! own and a bad row only yields a [`RowError`].

use serde::Deserialize;
use vigie_core::violation::{COLUMNS, ViolationRecord};

use crate::{Error, Result, RowError, RowErrorKind};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// One data row, every cell as text.
#[derive(Debug, Clone, Deserialize)]
pub struct RawRow {
  pub id_poursuite:  String,
  pub business_id:   String,
  pub date:          String,
  pub description:   String,
  pub adresse:       String,
  pub date_jugement: String,
  pub etablissement: String,
  pub montant:       String,
  pub proprietaire:  String,
  pub ville:         String,
  pub statut:        String,
  pub date_statut:   String,
  pub categorie:     String,
}

/// A row whose external identifier parsed; the rest is still raw.
#[derive(Debug, Clone)]
pub struct Candidate {
  pub id:  i64,
  pub raw: RawRow,
}

impl Candidate {
  /// Finish parsing. Cells are kept verbatim apart from `business_id`, and
  /// empty nullable dates become `None`. A `date` outside the `YYYYMMDD`
  /// form is still kept, with a warning.
  pub fn into_record(self) -> Result<ViolationRecord, RowErrorKind> {
    let raw = self.raw;
    let business_id = raw
      .business_id
      .trim()
      .parse()
      .map_err(|_| RowErrorKind::InvalidBusinessId(raw.business_id.clone()))?;

    if !is_compact_date(&raw.date) {
      tracing::warn!(
        id = self.id,
        date = %raw.date,
        "date is not in YYYYMMDD form; date range searches will not match it"
      );
    }

    Ok(ViolationRecord {
      id: self.id,
      business_id,
      date: raw.date,
      description: raw.description,
      address: raw.adresse,
      judgment_date: non_empty(raw.date_jugement),
      establishment: raw.etablissement,
      amount: raw.montant,
      owner: raw.proprietaire,
      city: raw.ville,
      status: raw.statut,
      status_date: non_empty(raw.date_statut),
      category: raw.categorie,
    })
  }
}

#[derive(Debug)]
pub struct ParsedRow {
  /// 1-based position among the data rows.
  pub ordinal: usize,
  pub outcome: Result<Candidate, RowError>,
}

/// Parse `document` into rows, in document order.
pub fn parse_document(document: &[u8]) -> Result<Vec<ParsedRow>> {
  let document = document.strip_prefix(UTF8_BOM).unwrap_or(document);

  let mut reader = csv::ReaderBuilder::new()
    .has_headers(true)
    .trim(csv::Trim::Headers)
    .from_reader(document);

  let headers = reader.headers()?.clone();
  let missing: Vec<&'static str> = COLUMNS
    .iter()
    .copied()
    .filter(|column| !headers.iter().any(|h| h == *column))
    .collect();
  if !missing.is_empty() {
    return Err(Error::MissingColumns(missing));
  }

  let rows = reader
    .deserialize::<RawRow>()
    .enumerate()
    .map(|(i, result)| {
      let ordinal = i + 1;
      let outcome = match result {
        Ok(raw) => parse_id(&raw.id_poursuite)
          .map(|id| Candidate { id, raw })
          .map_err(|kind| RowError { ordinal, id: None, kind }),
        Err(e) => Err(RowError {
          ordinal,
          id: None,
          kind: RowErrorKind::Malformed(e.to_string()),
        }),
      };
      ParsedRow { ordinal, outcome }
    })
    .collect();

  Ok(rows)
}

fn parse_id(cell: &str) -> Result<i64, RowErrorKind> {
  cell
    .trim()
    .parse()
    .map_err(|_| RowErrorKind::InvalidId(cell.to_owned()))
}

fn is_compact_date(cell: &str) -> bool {
  cell.len() == 8 && cell.bytes().all(|b| b.is_ascii_digit())
}

fn non_empty(cell: String) -> Option<String> {
  if cell.trim().is_empty() { None } else { Some(cell) }
}
