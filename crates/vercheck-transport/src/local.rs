//! Local manifest sources.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;
use vercheck_protocol::MAX_MANIFEST_SIZE;

use crate::traits::{decode_body, FetchError, ManifestSource};

/// A manifest file on the local filesystem.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    /// Create a source reading the given file.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The manifest path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ManifestSource for FileSource {
    async fn fetch(&self) -> Result<String, FetchError> {
        debug!(path = %self.path.display(), "Reading manifest file");

        let len = tokio::fs::metadata(&self.path).await?.len();
        if len > MAX_MANIFEST_SIZE as u64 {
            return Err(FetchError::TooLarge(
                usize::try_from(len).unwrap_or(usize::MAX),
            ));
        }

        decode_body(tokio::fs::read(&self.path).await?)
    }

    fn name(&self) -> &'static str {
        "file"
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

/// A source that always returns the same text.
#[derive(Debug, Clone)]
pub struct StaticSource {
    text: String,
}

impl StaticSource {
    /// Create a source returning `text`.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[async_trait]
impl ManifestSource for StaticSource {
    async fn fetch(&self) -> Result<String, FetchError> {
        Ok(self.text.clone())
    }

    fn name(&self) -> &'static str {
        "static"
    }

    fn location(&self) -> String {
        "<static>".to_string()
    }
}
