//! Manifest text format.
//!
//! A manifest is a single line holding one version string, usually with a
//! trailing newline. Anything around the version other than whitespace is
//! rejected.

use thiserror::Error;

use crate::version::{Version, VersionError};

/// Maximum manifest body size (1 KiB).
pub const MAX_MANIFEST_SIZE: usize = 1024;

const BOM: char = '\u{feff}';

/// Errors that can occur while reading manifest text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ManifestError {
    /// The manifest holds nothing but whitespace.
    #[error("Manifest is empty")]
    Empty,

    /// The manifest holds more than one non-empty line.
    #[error("Manifest has {0} non-empty lines, expected 1")]
    MultipleLines(usize),

    /// The line is not a valid version.
    #[error(transparent)]
    Version(#[from] VersionError),
}

/// Parse manifest text into a version.
///
/// # Errors
///
/// Returns an error if the text is blank, spans several lines, or does not
/// hold a valid version.
pub fn parse_manifest(text: &str) -> Result<Version, ManifestError> {
    let trimmed = text.trim_start_matches(BOM).trim();
    if trimmed.is_empty() {
        return Err(ManifestError::Empty);
    }

    let lines = trimmed.lines().filter(|l| !l.trim().is_empty()).count();
    if lines > 1 {
        return Err(ManifestError::MultipleLines(lines));
    }

    Ok(Version::parse(trimmed)?)
}

/// Render the manifest text for a version.
#[must_use]
pub fn render_manifest(version: &Version) -> String {
    format!("{version}\n")
}
