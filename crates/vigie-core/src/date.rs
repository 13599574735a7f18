//! Calendar dates in the stored representation.
//!
//! Upstream dates are stored verbatim and are normally `YYYYMMDD`, which
//! orders lexicographically in calendar order. Date-range queries compare
//! against that text, so bounds must be normalised into the same form first.

use std::fmt;

use chrono::{Datelike, NaiveDate};

use crate::{Error, Result};

/// A validated calendar date rendered as `YYYYMMDD`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CompactDate(String);

impl CompactDate {
  /// Parse `YYYY-MM-DD`, `YYYY/MM/DD`, or `YYYYMMDD`.
  ///
  /// A separator is only accepted at the fourth and seventh positions, and
  /// both separators must be the same.
  pub fn parse(input: &str) -> Result<Self> {
    let invalid = || Error::InvalidDate(input.to_owned());
    let s = input.trim();
    if !s.is_ascii() {
      return Err(invalid());
    }
    let b = s.as_bytes();

    let (year, month, day) = match b.len() {
      8 => (&s[0..4], &s[4..6], &s[6..8]),
      10 if b[4] == b[7] && matches!(b[4], b'-' | b'/') => (&s[0..4], &s[5..7], &s[8..10]),
      _ => return Err(invalid()),
    };
    if ![year, month, day]
      .iter()
      .all(|part| part.bytes().all(|c| c.is_ascii_digit()))
    {
      return Err(invalid());
    }

    let year: i32 = year.parse().map_err(|_| invalid())?;
    let month: u32 = month.parse().map_err(|_| invalid())?;
    let day: u32 = day.parse().map_err(|_| invalid())?;

    NaiveDate::from_ymd_opt(year, month, day)
      .map(Self::from)
      .ok_or_else(invalid)
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl From<NaiveDate> for CompactDate {
  fn from(date: NaiveDate) -> Self {
    Self(format!("{:04}{:02}{:02}", date.year(), date.month(), date.day()))
  }
}

impl fmt::Display for CompactDate {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

/// An inclusive `[start, end]` range of violation dates.
///
/// `start <= end` is not enforced; a reversed range simply matches nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRange {
  pub start: CompactDate,
  pub end:   CompactDate,
}

impl DateRange {
  pub fn new(start: CompactDate, end: CompactDate) -> Self { Self { start, end } }

  /// Parse both bounds with [`CompactDate::parse`].
  pub fn parse(start: &str, end: &str) -> Result<Self> {
    Ok(Self::new(CompactDate::parse(start)?, CompactDate::parse(end)?))
  }
}
