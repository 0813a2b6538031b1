//! Update checking.
//!
//! A check is one linear request/response: parse the running version, fetch
//! the manifest, parse it, compare. There is no retry and no cache.

use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info, warn};
use vercheck_protocol::{parse_manifest, ManifestError, Version};
use vercheck_transport::{FetchError, ManifestSource};

use crate::metrics;

/// Which side of the comparison a version came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionRole {
    /// The version supplied by the caller.
    Current,
    /// The version read from the manifest.
    Remote,
}

impl fmt::Display for VersionRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Current => "current",
            Self::Remote => "remote",
        })
    }
}

/// Update check errors.
#[derive(Debug, Error)]
pub enum CheckError {
    /// The manifest could not be fetched.
    #[error("Failed to fetch manifest from {location}: {source}")]
    FetchFailed {
        /// Where the manifest was requested from.
        location: String,
        /// The underlying transport error.
        #[source]
        source: FetchError,
    },

    /// The current or remote version is malformed.
    #[error("Invalid {role} version: {source}")]
    InvalidVersionFormat {
        /// Which version was rejected.
        role: VersionRole,
        /// What was wrong with it.
        #[source]
        source: ManifestError,
    },
}

impl CheckError {
    /// Short error kind, used as a metrics label.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::FetchFailed { .. } => "fetch_failed",
            Self::InvalidVersionFormat { .. } => "invalid_version_format",
        }
    }
}

/// Result of a successful check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CheckOutcome {
    /// The manifest holds a newer version.
    UpdateAvailable {
        /// The running version.
        current: Version,
        /// The published version.
        latest: Version,
    },
    /// The running version is the published one or newer.
    UpToDate {
        /// The running version.
        current: Version,
        /// The published version.
        latest: Version,
    },
}

impl CheckOutcome {
    /// Compare two versions without fetching anything.
    #[must_use]
    pub fn evaluate(current: Version, latest: Version) -> Self {
        if latest > current {
            Self::UpdateAvailable { current, latest }
        } else {
            Self::UpToDate { current, latest }
        }
    }

    /// Whether an update should be offered.
    #[must_use]
    pub fn is_update_available(&self) -> bool {
        matches!(self, Self::UpdateAvailable { .. })
    }

    /// The running version.
    #[must_use]
    pub fn current(&self) -> &Version {
        match self {
            Self::UpdateAvailable { current, .. } | Self::UpToDate { current, .. } => current,
        }
    }

    /// The published version.
    #[must_use]
    pub fn latest(&self) -> &Version {
        match self {
            Self::UpdateAvailable { latest, .. } | Self::UpToDate { latest, .. } => latest,
        }
    }
}

impl fmt::Display for CheckOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UpdateAvailable { latest, .. } => write!(f, "update available, {latest}"),
            Self::UpToDate { .. } => f.write_str("up to date"),
        }
    }
}

/// Checks a manifest source for a newer version.
#[derive(Clone)]
pub struct UpdateChecker {
    source: Arc<dyn ManifestSource>,
}

impl UpdateChecker {
    /// Create a checker over the given source.
    #[must_use]
    pub fn new(source: Arc<dyn ManifestSource>) -> Self {
        Self { source }
    }

    /// The source this checker reads from.
    #[must_use]
    pub fn source(&self) -> &dyn ManifestSource {
        self.source.as_ref()
    }

    /// Check whether the manifest announces a version newer than `current`.
    ///
    /// `current` is trimmed before parsing. If it is malformed nothing is
    /// fetched.
    ///
    /// # Errors
    ///
    /// Returns [`CheckError::InvalidVersionFormat`] if either version is
    /// malformed, or [`CheckError::FetchFailed`] if the source fails.
    pub async fn check(&self, current: &str) -> Result<CheckOutcome, CheckError> {
        let current = match Version::parse(current.trim()) {
            Ok(version) => version,
            Err(e) => {
                warn!(error = %e, "Current version is malformed");
                let err = CheckError::InvalidVersionFormat {
                    role: VersionRole::Current,
                    source: e.into(),
                };
                metrics::record_error(err.kind());
                return Err(err);
            }
        };
        self.check_version(current).await
    }

    /// Like [`check`](Self::check) with an already parsed version.
    ///
    /// # Errors
    ///
    /// Returns [`CheckError::FetchFailed`] if the source fails, or
    /// [`CheckError::InvalidVersionFormat`] if the manifest is malformed.
    pub async fn check_version(&self, current: Version) -> Result<CheckOutcome, CheckError> {
        let started = Instant::now();
        let result = self.fetch_and_compare(current).await;
        match &result {
            Ok(outcome) => metrics::record_check(
                self.source.name(),
                outcome.is_update_available(),
                started.elapsed(),
            ),
            Err(err) => metrics::record_error(err.kind()),
        }
        result
    }

    async fn fetch_and_compare(&self, current: Version) -> Result<CheckOutcome, CheckError> {
        let location = self.source.location();
        debug!(source = self.source.name(), %location, %current, "Checking for update");

        let text = match self.source.fetch().await {
            Ok(text) => text,
            Err(source) => {
                warn!(%location, error = %source, "Manifest fetch failed");
                return Err(CheckError::FetchFailed { location, source });
            }
        };

        let latest = parse_manifest(&text).map_err(|source| {
            warn!(%location, error = %source, "Manifest is malformed");
            CheckError::InvalidVersionFormat {
                role: VersionRole::Remote,
                source,
            }
        })?;

        let outcome = CheckOutcome::evaluate(current, latest);
        info!(
            %location,
            current = %outcome.current(),
            latest = %outcome.latest(),
            update_available = outcome.is_update_available(),
            "Update check complete"
        );
        Ok(outcome)
    }
}
