//! # vercheck-core
//!
//! Update checking and manifest storage for vercheck.
//!
//! - **UpdateChecker** - fetch a manifest, compare it with the running version
//! - **ManifestStore** - publish and read per-application manifest files
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────┐  fetch  ┌─────────────────┐
//! │ UpdateChecker  │────────▶│ ManifestSource  │  (HTTP, file, static)
//! └────────────────┘         └─────────────────┘
//!         │                           ▲
//!         ▼                           │ serves
//!   CheckOutcome             ┌─────────────────┐
//!                            │  ManifestStore  │  <root>/<app>.txt
//!                            └─────────────────┘
//! ```

pub mod checker;
pub mod metrics;
pub mod store;

pub use checker::{CheckError, CheckOutcome, UpdateChecker, VersionRole};
pub use store::{ManifestEntry, ManifestStore, StoreError};
