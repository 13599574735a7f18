//! `WHERE` clause builder for the search queries.
//!
//! Starts from the unconditional predicate and conjunctively appends one
//! predicate per constraint. Only fixed column names ever reach the SQL text;
//! every user-supplied value travels as a bound parameter.

use vigie_core::{date::DateRange, query::SearchCriteria};

/// Searchable columns of the `violations` table.
#[derive(Debug, Clone, Copy)]
pub enum Column {
  Establishment,
  Owner,
  Address,
  Date,
}

impl Column {
  fn name(self) -> &'static str {
    match self {
      Column::Establishment => "etablissement",
      Column::Owner => "proprietaire",
      Column::Address => "adresse",
      Column::Date => "date",
    }
  }
}

#[derive(Debug, Default)]
pub struct Filter {
  predicates: Vec<String>,
  params:     Vec<String>,
}

impl Filter {
  pub fn new() -> Self { Self::default() }

  /// Filter for [`SearchCriteria`]: each present fragment, and each street
  /// token separately, must occur in its column.
  pub fn for_criteria(criteria: &SearchCriteria) -> Self {
    let mut filter = Self::new();
    if let Some(fragment) = criteria.establishment_fragment() {
      filter.contains(Column::Establishment, fragment);
    }
    if let Some(fragment) = criteria.owner_fragment() {
      filter.contains(Column::Owner, fragment);
    }
    for token in criteria.street_tokens() {
      filter.contains(Column::Address, token);
    }
    filter
  }

  pub fn for_date_range(range: &DateRange) -> Self {
    let mut filter = Self::new();
    filter.between(Column::Date, range.start.as_str(), range.end.as_str());
    filter
  }

  /// Case-insensitive (ASCII) literal substring match.
  pub fn contains(&mut self, column: Column, fragment: &str) -> &mut Self {
    self
      .predicates
      .push(format!("{} LIKE ? ESCAPE '\\'", column.name()));
    self.params.push(format!("%{}%", escape_like(fragment)));
    self
  }

  /// Inclusive range on a text column.
  pub fn between(&mut self, column: Column, low: &str, high: &str) -> &mut Self {
    self
      .predicates
      .push(format!("{} BETWEEN ? AND ?", column.name()));
    self.params.push(low.to_owned());
    self.params.push(high.to_owned());
    self
  }

  pub fn where_clause(&self) -> String {
    let mut sql = String::from("WHERE 1 = 1");
    for predicate in &self.predicates {
      sql.push_str(" AND ");
      sql.push_str(predicate);
    }
    sql
  }

  /// Bound values, in placeholder order.
  pub fn params(&self) -> &[String] { &self.params }
}

/// Escape `LIKE` metacharacters so the fragment matches literally.
fn escape_like(fragment: &str) -> String {
  let mut escaped = String::with_capacity(fragment.len());
  for c in fragment.chars() {
    if matches!(c, '\\' | '%' | '_') {
      escaped.push('\\');
    }
    escaped.push(c);
  }
  escaped
}
