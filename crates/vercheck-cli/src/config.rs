//! CLI configuration.
//!
//! Configuration can be loaded from:
//! - A TOML file given with `--config`
//! - `vercheck.toml` in the usual locations
//! - Environment variables (VERCHECK_*) for the defaults

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use vercheck_transport::SourceOptions;

/// Default search paths, first match wins.
const CONFIG_PATHS: [&str; 3] = [
    "vercheck.toml",
    "/etc/vercheck/vercheck.toml",
    "~/.config/vercheck/vercheck.toml",
];

/// Request timeout used when none (or zero) is configured.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// CLI configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP source configuration.
    #[serde(default)]
    pub http: HttpConfig,

    /// Manifest store configuration.
    #[serde(default)]
    pub store: StoreConfig,

    /// Applications checked by `check-all`.
    #[serde(default)]
    pub apps: Vec<AppConfig>,
}

/// HTTP source configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in seconds. Zero means the default.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// User agent sent with manifest requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Manifest store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Directory holding `<app>.txt` manifests. `~` is expanded.
    #[serde(default = "default_store_dir")]
    pub dir: String,
}

/// One application to check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application name.
    pub name: String,
    /// Version currently installed.
    pub current: String,
    /// Manifest location (URL or path).
    pub url: String,
}

// Default value functions
fn default_timeout_secs() -> u64 {
    std::env::var("VERCHECK_TIMEOUT_SECS")
        .ok()
        .and_then(|t| t.parse().ok())
        .filter(|&t| t > 0)
        .unwrap_or(DEFAULT_TIMEOUT_SECS)
}

fn default_user_agent() -> String {
    SourceOptions::default().user_agent
}

fn default_store_dir() -> String {
    std::env::var("VERCHECK_STORE_DIR").unwrap_or_else(|_| "manifests".to_string())
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            dir: default_store_dir(),
        }
    }
}

impl Config {
    /// Load configuration from `path`, or from the default paths.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit file is missing, or if a config file
    /// exists but cannot be parsed.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::from_file(path);
        }

        for path in &CONFIG_PATHS {
            let expanded = shellexpand::tilde(path);
            if Path::new(expanded.as_ref()).exists() {
                tracing::debug!(path = %expanded, "Loading configuration");
                return Self::from_file(expanded.as_ref());
            }
        }

        // Fall back to defaults with environment overrides
        Ok(Self::default())
    }

    /// Load configuration from a specific file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Options for building manifest sources.
    #[must_use]
    pub fn source_options(&self) -> SourceOptions {
        let timeout_secs = match self.http.timeout_secs {
            0 => {
                tracing::warn!(
                    default = DEFAULT_TIMEOUT_SECS,
                    "http.timeout_secs is 0, using the default"
                );
                DEFAULT_TIMEOUT_SECS
            }
            secs => secs,
        };
        SourceOptions {
            timeout: Duration::from_secs(timeout_secs),
            user_agent: self.http.user_agent.clone(),
        }
    }

    /// The store directory with `~` expanded.
    #[must_use]
    pub fn store_dir(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.store.dir).as_ref())
    }

    /// Look up an application by name.
    #[must_use]
    pub fn app(&self, name: &str) -> Option<&AppConfig> {
        self.apps.iter().find(|app| app.name == name)
    }
}
