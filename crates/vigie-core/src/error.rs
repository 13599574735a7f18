//! Error types for `vigie-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid date {0:?}: expected YYYY-MM-DD or YYYYMMDD")]
  InvalidDate(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
