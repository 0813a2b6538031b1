//! Directory-backed manifest store.
//!
//! Each application has one file, `<root>/<app>.txt`, holding its latest
//! version. Publishing overwrites the file; there is no history.

use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};
use vercheck_protocol::{parse_manifest, render_manifest, ManifestError, Version};

use crate::metrics;

/// File extension of manifest files.
pub const MANIFEST_EXTENSION: &str = "txt";

/// Maximum application name length.
pub const MAX_APP_NAME_LEN: usize = 128;

/// Store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The application name cannot be used as a file name.
    #[error("Invalid application name: {0:?}")]
    InvalidAppName(String),

    /// A stored manifest could not be parsed.
    #[error("Invalid manifest for {app}: {source}")]
    Manifest {
        /// The application.
        app: String,
        /// The parse error.
        #[source]
        source: ManifestError,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// One published application version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestEntry {
    /// Application name.
    pub app: String,
    /// Latest published version.
    pub version: Version,
}

/// Manifest files under a root directory.
#[derive(Debug, Clone)]
pub struct ManifestStore {
    root: PathBuf,
}

impl ManifestStore {
    /// Open a store, creating the root directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        debug!(root = %root.display(), "Opened manifest store");
        Ok(Self { root })
    }

    /// The store's root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the manifest file for `app`.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is not a valid application name.
    pub fn path_for(&self, app: &str) -> Result<PathBuf, StoreError> {
        validate_app_name(app)?;
        Ok(self.root.join(format!("{app}.{MANIFEST_EXTENSION}")))
    }

    /// Publish `version` as the latest release of `app`.
    ///
    /// The file is replaced atomically. Returns the version it replaced, if
    /// there was a readable one.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is invalid or the file cannot be written.
    pub fn publish(&self, app: &str, version: &Version) -> Result<Option<Version>, StoreError> {
        let path = self.path_for(app)?;
        let previous = match self.read(app) {
            Ok(previous) => previous,
            Err(StoreError::Manifest { source, .. }) => {
                warn!(app, error = %source, "Overwriting malformed manifest");
                None
            }
            Err(e) => return Err(e),
        };

        let tmp = self.root.join(format!(".{app}.{MANIFEST_EXTENSION}.tmp"));
        replace_file(&tmp, &path, &render_manifest(version))?;
        metrics::record_publish();

        match &previous {
            Some(old) => info!(app, from = %old, to = %version, "Published manifest"),
            None => info!(app, to = %version, "Published manifest"),
        }
        Ok(previous)
    }

    /// Read the latest version of `app`, or `None` if it was never published.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is invalid, the file cannot be read, or
    /// its content is not a valid manifest.
    pub fn read(&self, app: &str) -> Result<Option<Version>, StoreError> {
        let path = self.path_for(app)?;
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        parse_manifest(&text)
            .map(Some)
            .map_err(|source| StoreError::Manifest {
                app: app.to_string(),
                source,
            })
    }

    /// All published manifests, sorted by application name.
    ///
    /// Files that are not valid manifests are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be listed.
    pub fn list(&self) -> Result<Vec<ManifestEntry>, StoreError> {
        let mut entries = Vec::new();

        for dir_entry in fs::read_dir(&self.root)? {
            let path = dir_entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(MANIFEST_EXTENSION) {
                continue;
            }
            let Some(app) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if validate_app_name(app).is_err() {
                continue;
            }

            match self.read(app) {
                Ok(Some(version)) => entries.push(ManifestEntry {
                    app: app.to_string(),
                    version,
                }),
                Ok(None) => {}
                Err(e) => warn!(app, error = %e, "Skipping unreadable manifest"),
            }
        }

        entries.sort_by(|a, b| a.app.cmp(&b.app));
        Ok(entries)
    }

    /// Delete the manifest of `app`. Returns whether a file was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is invalid or the file cannot be removed.
    pub fn remove(&self, app: &str) -> Result<bool, StoreError> {
        match fs::remove_file(self.path_for(app)?) {
            Ok(()) => {
                info!(app, "Removed manifest");
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

/// Write `contents` to `tmp`, then rename it over `path`.
///
/// The temporary file is removed if either step fails.
fn replace_file(tmp: &Path, path: &Path, contents: &str) -> io::Result<()> {
    let result = fs::write(tmp, contents).and_then(|()| fs::rename(tmp, path));
    if result.is_err() {
        let _ = fs::remove_file(tmp);
    }
    result
}

/// Validate an application name.
///
/// Names are 1 to 128 characters from `[A-Za-z0-9._-]` and must not start
/// with a dot.
///
/// # Errors
///
/// Returns [`StoreError::InvalidAppName`] if the name is not acceptable.
pub fn validate_app_name(app: &str) -> Result<(), StoreError> {
    let valid = !app.is_empty()
        && app.len() <= MAX_APP_NAME_LEN
        && !app.starts_with('.')
        && app
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b'-'));

    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidAppName(app.to_string()))
    }
}
