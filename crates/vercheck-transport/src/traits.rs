//! Source abstraction for vercheck.
//!
//! Every way of obtaining manifest text implements `ManifestSource`, so the
//! checker stays independent of the transport.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use vercheck_protocol::MAX_MANIFEST_SIZE;

/// Errors raised while fetching manifest text.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The HTTP request could not be completed.
    #[cfg(feature = "http")]
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("Unexpected HTTP status {0}")]
    Status(u16),

    /// The body exceeds the manifest size limit.
    #[error("Manifest size {0} exceeds maximum {MAX_MANIFEST_SIZE}")]
    TooLarge(usize),

    /// The body is not valid UTF-8.
    #[error("Manifest is not valid UTF-8")]
    Decode,

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The location cannot be turned into a source.
    #[error("Invalid manifest location: {0}")]
    InvalidLocation(String),
}

/// Options shared by network sources.
#[derive(Debug, Clone)]
pub struct SourceOptions {
    /// Whole-request timeout.
    pub timeout: Duration,
    /// `User-Agent` header sent with requests.
    pub user_agent: String,
}

impl Default for SourceOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            user_agent: concat!("vercheck/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Something that can produce the text of a manifest.
#[async_trait]
pub trait ManifestSource: Send + Sync {
    /// Fetch the raw manifest text.
    ///
    /// The text is returned as-is; trimming and parsing belong to the caller.
    async fn fetch(&self) -> Result<String, FetchError>;

    /// Get the source kind (e.g., "http", "file").
    fn name(&self) -> &'static str;

    /// Human-readable location, used in logs and messages.
    fn location(&self) -> String;
}

/// Check the size limit and decode a manifest body.
pub(crate) fn decode_body(body: Vec<u8>) -> Result<String, FetchError> {
    if body.len() > MAX_MANIFEST_SIZE {
        return Err(FetchError::TooLarge(body.len()));
    }
    String::from_utf8(body).map_err(|_| FetchError::Decode)
}
