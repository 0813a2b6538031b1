//! # vercheck-transport
//!
//! Manifest sources for vercheck.
//!
//! A source produces the raw manifest text. The update checker does not
//! care where it comes from:
//!
//! - **HTTP(S)** - a GET against a raw text file, the normal case
//! - **File** - a manifest on the local filesystem
//! - **Static** - a fixed string, for tests and pinned manifests
//!
//! All sources implement the `ManifestSource` trait.
//!
//! ```rust,ignore
//! use vercheck_transport::{source_for, SourceOptions};
//!
//! let source = source_for("https://example.com/myapp.txt", &SourceOptions::default())?;
//! let text = source.fetch().await?;
//! ```

pub mod local;
pub mod resolve;
pub mod traits;

#[cfg(feature = "http")]
pub mod http;

pub use local::{FileSource, StaticSource};
pub use resolve::source_for;
pub use traits::{FetchError, ManifestSource, SourceOptions};

#[cfg(feature = "http")]
pub use http::HttpSource;
