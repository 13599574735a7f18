//! Ingestion pipeline for the Vigie violation store.
//!
//! Fetches the upstream open-data document in one transfer, parses it as CSV,
//! and merges every previously unseen violation into a
//! [`ViolationStore`](vigie_core::store::ViolationStore). Running it again over
//! the same document changes nothing.
//!
//! ```rust,ignore
//! let source   = HttpSource::new(DEFAULT_URL, DEFAULT_TIMEOUT)?;
//! let ingestor = Ingestor::new(store, source);
//! let report   = ingestor.run().await?;
//! ```

#![allow(async_fn_in_trait)]

pub mod error;
pub mod parse;
pub mod pipeline;
pub mod report;
pub mod source;

pub use error::{Error, Result, TransferError};
pub use pipeline::Ingestor;
pub use report::{IngestReport, RowError, RowErrorKind};
pub use source::{DEFAULT_TIMEOUT, DEFAULT_URL, FileSource, HttpSource, UpstreamSource};
