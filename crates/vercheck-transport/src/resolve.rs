//! Source selection from a location string.

use std::sync::Arc;

use crate::local::FileSource;
use crate::traits::{FetchError, ManifestSource, SourceOptions};

/// Build the source that serves `location`.
///
/// - `http://` and `https://` URLs use the HTTP source
/// - `file://` URLs and bare paths use the file source
///
/// # Errors
///
/// Returns an error for other schemes, for HTTP locations when the `http`
/// feature is disabled, or when the HTTP source cannot be built.
pub fn source_for(
    location: &str,
    options: &SourceOptions,
) -> Result<Arc<dyn ManifestSource>, FetchError> {
    let location = location.trim();
    if location.is_empty() {
        return Err(FetchError::InvalidLocation("empty location".into()));
    }

    if location.starts_with("http://") || location.starts_with("https://") {
        return http_source(location, options);
    }

    if let Some(path) = location.strip_prefix("file://") {
        return Ok(Arc::new(FileSource::new(path)));
    }

    if let Some((scheme, _)) = location.split_once("://") {
        return Err(FetchError::InvalidLocation(format!(
            "{location}: unsupported scheme {scheme}"
        )));
    }

    Ok(Arc::new(FileSource::new(location)))
}

#[cfg(feature = "http")]
fn http_source(
    location: &str,
    options: &SourceOptions,
) -> Result<Arc<dyn ManifestSource>, FetchError> {
    Ok(Arc::new(crate::http::HttpSource::new(location, options)?))
}

#[cfg(not(feature = "http"))]
fn http_source(
    location: &str,
    _options: &SourceOptions,
) -> Result<Arc<dyn ManifestSource>, FetchError> {
    Err(FetchError::InvalidLocation(format!(
        "{location}: built without HTTP support"
    )))
}
