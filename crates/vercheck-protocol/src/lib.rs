//! # vercheck-protocol
//!
//! Version and manifest definitions for vercheck.
//!
//! An application publishes its latest release as a manifest: a plain-text
//! file holding exactly one semantic version string. This crate defines how
//! that string is parsed and ordered, and how the manifest text is read and
//! written.
//!
//! ## Ordering
//!
//! - `MAJOR`, `MINOR` and `PATCH` are compared numerically (`2.0.0 < 10.0.0`)
//! - A pre-release precedes its release (`1.0.0-alpha < 1.0.0`)
//! - Build metadata is ignored (`1.0.0+a == 1.0.0+b`)
//!
//! ## Example
//!
//! ```rust
//! use std::cmp::Ordering;
//! use vercheck_protocol::{compare, manifest, Version};
//!
//! let latest = manifest::parse_manifest("0.1.10\n").unwrap();
//! let current: Version = "0.1.9".parse().unwrap();
//! assert!(latest > current);
//!
//! assert_eq!(compare("2.0.0", "10.0.0").unwrap(), Ordering::Less);
//! ```

pub mod manifest;
pub mod version;

pub use manifest::{parse_manifest, render_manifest, ManifestError, MAX_MANIFEST_SIZE};
pub use version::{compare, BumpLevel, BuildMetadata, Prerelease, Version, VersionError};
