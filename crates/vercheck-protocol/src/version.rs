//! Semantic versions for vercheck.
//!
//! This module wraps [`semver::Version`] for `MAJOR.MINOR.PATCH[-PRERELEASE][+BUILD]`
//! strings. Unlike the wrapped type, equality and ordering follow semver
//! precedence only, so build metadata never decides a comparison.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use thiserror::Error;

pub use semver::{BuildMetadata, Prerelease};

/// Errors produced while parsing or bumping a version.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionError {
    /// The string is not a valid `MAJOR.MINOR.PATCH[-PRE][+BUILD]` version.
    #[error("Invalid version format {input:?}: {reason}")]
    InvalidVersionFormat {
        /// The rejected input.
        input: String,
        /// What was wrong with it.
        reason: String,
    },

    /// Bumping would push a component past `u64::MAX`.
    #[error("Cannot bump {level} version of {version}: component out of range")]
    BumpOverflow {
        /// The version that was bumped.
        version: String,
        /// The component that overflowed.
        level: BumpLevel,
    },
}

impl VersionError {
    fn invalid(input: &str, err: &semver::Error) -> Self {
        Self::InvalidVersionFormat {
            input: input.to_string(),
            reason: err.to_string(),
        }
    }

    /// The version string the error is about.
    #[must_use]
    pub fn input(&self) -> &str {
        match self {
            Self::InvalidVersionFormat { input, .. } => input,
            Self::BumpOverflow { version, .. } => version,
        }
    }
}

/// Which component `Version::bump` increments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BumpLevel {
    /// Incompatible changes.
    Major,
    /// Backwards-compatible additions.
    Minor,
    /// Backwards-compatible fixes.
    Patch,
}

impl fmt::Display for BumpLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Major => "major",
            Self::Minor => "minor",
            Self::Patch => "patch",
        })
    }
}

/// A semantic version.
///
/// Equality, ordering and hashing ignore build metadata, so
/// `1.0.0+linux` and `1.0.0+macos` are the same release.
#[derive(Debug, Clone)]
pub struct Version(semver::Version);

impl Version {
    /// Create a release version with no pre-release or build metadata.
    #[must_use]
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self(semver::Version::new(major, minor, patch))
    }

    /// Parse a version string.
    ///
    /// The input must be exactly `MAJOR.MINOR.PATCH`, optionally followed by
    /// `-PRERELEASE` and then `+BUILD`. Surrounding whitespace and a leading
    /// `v` are not accepted; trim manifest text before parsing.
    ///
    /// # Errors
    ///
    /// Returns [`VersionError::InvalidVersionFormat`] if a core component is
    /// missing, non-numeric, has a leading zero or overflows, or if a
    /// pre-release or build identifier is empty or contains characters
    /// outside `[0-9A-Za-z-]`.
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        semver::Version::parse(input)
            .map(Self)
            .map_err(|e| VersionError::invalid(input, &e))
    }

    /// Incompatible API changes.
    #[must_use]
    pub fn major(&self) -> u64 {
        self.0.major
    }

    /// Backwards-compatible functionality.
    #[must_use]
    pub fn minor(&self) -> u64 {
        self.0.minor
    }

    /// Backwards-compatible fixes.
    #[must_use]
    pub fn patch(&self) -> u64 {
        self.0.patch
    }

    /// Pre-release identifiers; empty for a release.
    #[must_use]
    pub fn pre(&self) -> &Prerelease {
        &self.0.pre
    }

    /// Build metadata; never affects precedence.
    #[must_use]
    pub fn build(&self) -> &BuildMetadata {
        &self.0.build
    }

    /// The underlying `semver` version.
    #[must_use]
    pub fn as_semver(&self) -> &semver::Version {
        &self.0
    }

    /// Whether this version carries a pre-release suffix.
    #[must_use]
    pub fn is_prerelease(&self) -> bool {
        !self.0.pre.is_empty()
    }

    /// The next version at the given level.
    ///
    /// Lower components are reset to zero and pre-release and build
    /// metadata are dropped. A pre-release whose lower components are
    /// already zero is promoted to its own release, so bumping the patch of
    /// `1.2.0-rc.1` gives `1.2.0`.
    ///
    /// # Errors
    ///
    /// Returns [`VersionError::BumpOverflow`] if the incremented component is
    /// already `u64::MAX`.
    pub fn bump(&self, level: BumpLevel) -> Result<Self, VersionError> {
        let (major, minor, patch) = (self.major(), self.minor(), self.patch());
        let promote = self.is_prerelease();
        let overflow = || VersionError::BumpOverflow {
            version: self.to_string(),
            level,
        };

        let next = match level {
            BumpLevel::Major if promote && minor == 0 && patch == 0 => Self::new(major, 0, 0),
            BumpLevel::Major => Self::new(major.checked_add(1).ok_or_else(overflow)?, 0, 0),
            BumpLevel::Minor if promote && patch == 0 => Self::new(major, minor, 0),
            BumpLevel::Minor => Self::new(major, minor.checked_add(1).ok_or_else(overflow)?, 0),
            BumpLevel::Patch if promote => Self::new(major, minor, patch),
            BumpLevel::Patch => Self::new(major, minor, patch.checked_add(1).ok_or_else(overflow)?),
        };
        Ok(next)
    }
}

/// Parse both strings and order them by precedence.
///
/// # Errors
///
/// Returns [`VersionError::InvalidVersionFormat`] for the first string that
/// fails to parse.
pub fn compare(a: &str, b: &str) -> Result<Ordering, VersionError> {
    Ok(Version::parse(a)?.cmp(&Version::parse(b)?))
}

impl From<semver::Version> for Version {
    fn from(version: semver::Version) -> Self {
        Self(version)
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp_precedence(&other.0)
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl Hash for Version {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.major.hash(state);
        self.0.minor.hash(state);
        self.0.patch.hash(state);
        self.0.pre.hash(state);
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(de::Error::custom)
    }
}
