//! HTTP(S) manifest source.
//!
//! This module fetches manifest text with a plain GET using reqwest.

use async_trait::async_trait;
use reqwest::{Client, Url};
use tracing::{debug, warn};
use vercheck_protocol::MAX_MANIFEST_SIZE;

use crate::traits::{decode_body, FetchError, ManifestSource, SourceOptions};

/// A manifest served over HTTP or HTTPS.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
    url: Url,
}

impl HttpSource {
    /// Create a source for the given URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is not a valid `http`/`https` URL or the
    /// client cannot be built.
    pub fn new(url: &str, options: &SourceOptions) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(options.timeout)
            .user_agent(&options.user_agent)
            .build()?;
        Self::with_client(client, url)
    }

    /// Create a source that shares an existing client.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is not a valid `http`/`https` URL.
    pub fn with_client(client: Client, url: &str) -> Result<Self, FetchError> {
        let parsed =
            Url::parse(url).map_err(|e| FetchError::InvalidLocation(format!("{url}: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(FetchError::InvalidLocation(format!(
                "{url}: unsupported scheme {}",
                parsed.scheme()
            )));
        }
        Ok(Self {
            client,
            url: parsed,
        })
    }

    /// The manifest URL.
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl ManifestSource for HttpSource {
    async fn fetch(&self) -> Result<String, FetchError> {
        debug!(url = %self.url, "Fetching manifest");

        let mut response = self.client.get(self.url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!(url = %self.url, status = status.as_u16(), "Manifest request rejected");
            return Err(FetchError::Status(status.as_u16()));
        }

        if let Some(len) = response.content_length() {
            if len > MAX_MANIFEST_SIZE as u64 {
                return Err(FetchError::TooLarge(
                    usize::try_from(len).unwrap_or(usize::MAX),
                ));
            }
        }

        // Content-Length is optional, so the limit is enforced while reading too.
        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            body.extend_from_slice(&chunk);
            if body.len() > MAX_MANIFEST_SIZE {
                return Err(FetchError::TooLarge(body.len()));
            }
        }

        debug!(url = %self.url, bytes = body.len(), "Manifest received");
        decode_body(body)
    }

    fn name(&self) -> &'static str {
        "http"
    }

    fn location(&self) -> String {
        self.url.to_string()
    }
}
