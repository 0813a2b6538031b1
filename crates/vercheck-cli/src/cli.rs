//! Command-line arguments.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use vercheck_protocol::BumpLevel;

/// Check published manifests for newer versions.
#[derive(Debug, Parser)]
#[command(name = "vercheck", version, about)]
pub struct Cli {
    /// Path to a vercheck.toml configuration file.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Print machine-readable JSON instead of text.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Compare two versions and print less, equal or greater.
    Compare {
        /// Left-hand version.
        a: String,
        /// Right-hand version.
        b: String,
    },

    /// Fetch a manifest and report whether an update is available.
    ///
    /// Exits with 0 when up to date and 10 when an update is available.
    Check {
        /// Version currently installed.
        #[arg(long)]
        current: Option<String>,

        /// Manifest URL or path.
        #[arg(long)]
        url: Option<String>,

        /// Application from the configuration supplying defaults.
        #[arg(long)]
        app: Option<String>,
    },

    /// Check every application listed in the configuration.
    CheckAll,

    /// Write the manifest of an application, replacing the previous one.
    Publish {
        /// Application name.
        app: String,

        /// Version to publish.
        #[arg(required_unless_present = "bump")]
        version: Option<String>,

        /// Derive the version by bumping the published one.
        #[arg(long, value_enum, conflicts_with = "version")]
        bump: Option<Bump>,

        /// Store directory, overriding the configuration.
        #[arg(long, value_name = "DIR")]
        dir: Option<PathBuf>,
    },

    /// Print published manifests.
    Show {
        /// Only this application.
        app: Option<String>,

        /// Store directory, overriding the configuration.
        #[arg(long, value_name = "DIR")]
        dir: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Bump {
    Major,
    Minor,
    Patch,
}

impl From<Bump> for BumpLevel {
    fn from(bump: Bump) -> Self {
        match bump {
            Bump::Major => Self::Major,
            Bump::Minor => Self::Minor,
            Bump::Patch => Self::Patch,
        }
    }
}
