//! Search criteria for [`ViolationStore::search`](crate::store::ViolationStore::search).

/// Optional, conjunctive search criteria.
///
/// Each present criterion is a case-insensitive substring match against its
/// field. A criterion that is `None`, empty, or whitespace-only imposes no
/// constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchCriteria {
  /// Fragment of the establishment name.
  pub establishment: Option<String>,
  /// Fragment of the owner name.
  pub owner:         Option<String>,
  /// Street phrase; every whitespace-separated token must occur in the
  /// address, in any order.
  pub street:        Option<String>,
}

impl SearchCriteria {
  pub fn establishment(mut self, fragment: impl Into<String>) -> Self {
    self.establishment = Some(fragment.into());
    self
  }

  pub fn owner(mut self, fragment: impl Into<String>) -> Self {
    self.owner = Some(fragment.into());
    self
  }

  pub fn street(mut self, phrase: impl Into<String>) -> Self {
    self.street = Some(phrase.into());
    self
  }

  /// The establishment fragment, trimmed, if it constrains anything.
  pub fn establishment_fragment(&self) -> Option<&str> { non_blank(&self.establishment) }

  /// The owner fragment, trimmed, if it constrains anything.
  pub fn owner_fragment(&self) -> Option<&str> { non_blank(&self.owner) }

  /// Whitespace-separated tokens of the street criterion.
  pub fn street_tokens(&self) -> Vec<&str> {
    self
      .street
      .as_deref()
      .map(|s| s.split_whitespace().collect())
      .unwrap_or_default()
  }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
  value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}
