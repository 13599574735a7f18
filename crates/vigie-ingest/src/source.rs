//! Where the upstream document comes from.

use std::{future::Future, path::PathBuf, time::Duration};

use bytes::Bytes;
use reqwest::Client;

use crate::TransferError;

/// Montréal open-data export of food-establishment violations.
pub const DEFAULT_URL: &str = "https://data.montreal.ca/dataset/05a9e718-6810-4e73-8bb9-5955efeb91a0/resource/7f939a08-be8a-45e1-b208-d8744dca8fc6/download/violations.csv";

/// Upper bound on one complete transfer, connection included.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// A source able to deliver the whole upstream document at once.
pub trait UpstreamSource: Send + Sync {
  /// Retrieve the complete document. Anything short of the full body is a
  /// [`TransferError`].
  fn fetch(&self) -> impl Future<Output = Result<Bytes, TransferError>> + Send + '_;
}

// ─── HTTP ────────────────────────────────────────────────────────────────────

/// Single bulk `GET` against a fixed URL.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct HttpSource {
  client: Client,
  url:    String,
}

impl HttpSource {
  pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, TransferError> {
    let client = Client::builder().timeout(timeout).build()?;
    Ok(Self { client, url: url.into() })
  }
}

impl UpstreamSource for HttpSource {
  async fn fetch(&self) -> Result<Bytes, TransferError> {
    let resp = self.client.get(&self.url).send().await?;

    let status = resp.status();
    if !status.is_success() {
      return Err(TransferError::Status(status));
    }
    Ok(resp.bytes().await?)
  }
}

// ─── Local file ──────────────────────────────────────────────────────────────

/// A previously downloaded copy of the document, for offline imports.
#[derive(Debug, Clone)]
pub struct FileSource {
  path: PathBuf,
}

impl FileSource {
  pub fn new(path: impl Into<PathBuf>) -> Self { Self { path: path.into() } }
}

impl UpstreamSource for FileSource {
  async fn fetch(&self) -> Result<Bytes, TransferError> {
    tokio::fs::read(&self.path)
      .await
      .map(Bytes::from)
      .map_err(|source| TransferError::Io { path: self.path.clone(), source })
  }
}
