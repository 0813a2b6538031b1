//! # vercheck
//!
//! Check plain-text version manifests for updates, and publish them.
//!
//! ## Usage
//!
//! ```bash
//! # Is 0.1.1 still the latest?
//! vercheck check --current 0.1.1 --url https://example.com/myapp.txt
//!
//! # Check every [[apps]] entry of vercheck.toml
//! vercheck check-all --config /path/to/vercheck.toml
//!
//! # Publish a release manifest
//! vercheck publish myapp --bump patch --dir ./manifests
//!
//! # Compare two versions
//! vercheck compare 2.0.0 10.0.0
//! ```
//!
//! `check` exits with 0 when up to date, 10 when an update is available and
//! 1 on failure. Logs go to stderr and are filtered with `RUST_LOG`.

mod cli;
mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,vercheck_cli=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    vercheck_core::metrics::describe_metrics();

    let cli = cli::Cli::parse();
    let report = commands::run(cli).await?;
    for line in &report.lines {
        println!("{line}");
    }

    Ok(report.status.into())
}
