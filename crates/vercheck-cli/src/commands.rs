//! Command handlers.
//!
//! Each handler returns a `Report`; `main` prints it and turns its status
//! into the process exit code.

use anyhow::{bail, Context, Result};
use serde_json::json;
use std::cmp::Ordering;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, warn};
use vercheck_core::{CheckError, CheckOutcome, ManifestEntry, ManifestStore, UpdateChecker};
use vercheck_protocol::Version;
use vercheck_transport::{source_for, SourceOptions};

use crate::cli::{Bump, Cli, Command};
use crate::config::Config;

/// Exit code when an update is available.
pub const EXIT_UPDATE_AVAILABLE: u8 = 10;

/// Overall result of a command, ordered from best to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Status {
    Ok,
    UpdateAvailable,
    Failed,
}

impl From<Status> for ExitCode {
    fn from(status: Status) -> Self {
        match status {
            Status::Ok => ExitCode::SUCCESS,
            Status::UpdateAvailable => ExitCode::from(EXIT_UPDATE_AVAILABLE),
            Status::Failed => ExitCode::FAILURE,
        }
    }
}

/// Lines to print and the resulting status.
#[derive(Debug)]
pub struct Report {
    pub status: Status,
    pub lines: Vec<String>,
}

impl Report {
    fn ok(line: impl Into<String>) -> Self {
        Self {
            status: Status::Ok,
            lines: vec![line.into()],
        }
    }
}

/// Run the parsed command line.
///
/// # Errors
///
/// Returns an error for invalid arguments, configuration problems and store
/// failures. Failed update checks are reported in the `Report` instead.
/// `compare` never reads the configuration.
pub async fn run(cli: Cli) -> Result<Report> {
    let json = cli.json;
    let config_path = cli.config;
    let config = || Config::load(config_path.as_deref());

    match cli.command {
        Command::Compare { a, b } => compare(&a, &b, json),
        Command::Check { current, url, app } => check(&config()?, current, url, app, json).await,
        Command::CheckAll => check_all(&config()?, json).await,
        Command::Publish {
            app,
            version,
            bump,
            dir,
        } => publish(&config()?, &app, version, bump, dir, json),
        Command::Show { app, dir } => show(&config()?, app, dir, json),
    }
}

fn ordering_name(ordering: Ordering) -> &'static str {
    match ordering {
        Ordering::Less => "less",
        Ordering::Equal => "equal",
        Ordering::Greater => "greater",
    }
}

fn compare(a: &str, b: &str, json: bool) -> Result<Report> {
    let ordering = vercheck_protocol::compare(a, b).context("Comparison aborted")?;
    let name = ordering_name(ordering);

    Ok(Report::ok(if json {
        json!({ "a": a, "b": b, "ordering": name }).to_string()
    } else {
        name.to_string()
    }))
}

async fn check(
    config: &Config,
    current: Option<String>,
    url: Option<String>,
    app: Option<String>,
    json: bool,
) -> Result<Report> {
    let app_config = match app.as_deref() {
        Some(name) => Some(
            config
                .app(name)
                .with_context(|| format!("Unknown application: {name}"))?,
        ),
        None => None,
    };

    let current = current
        .or_else(|| app_config.map(|a| a.current.clone()))
        .context("No current version, pass --current or --app")?;
    let location = url
        .or_else(|| app_config.map(|a| a.url.clone()))
        .context("No manifest location, pass --url or --app")?;

    let result = check_one(&location, &current, &config.source_options()).await;
    let status = status_of(&result);
    let line = render_check(app.as_deref(), &result, json)?;

    Ok(Report {
        status,
        lines: vec![line],
    })
}

async fn check_all(config: &Config, json: bool) -> Result<Report> {
    if config.apps.is_empty() {
        bail!("No applications configured, add [[apps]] entries to vercheck.toml");
    }

    let options = config.source_options();
    let mut report = Report {
        status: Status::Ok,
        lines: Vec::with_capacity(config.apps.len()),
    };

    for app in &config.apps {
        let result = check_one(&app.url, &app.current, &options).await;
        report.status = report.status.max(status_of(&result));
        report
            .lines
            .push(render_check(Some(&app.name), &result, json)?);
    }

    info!(
        apps = config.apps.len(),
        status = ?report.status,
        "Checked all applications"
    );
    Ok(report)
}

async fn check_one(
    location: &str,
    current: &str,
    options: &SourceOptions,
) -> Result<CheckOutcome, CheckError> {
    let source = source_for(location, options).map_err(|source| CheckError::FetchFailed {
        location: location.to_string(),
        source,
    })?;
    UpdateChecker::new(source).check(current).await
}

fn status_of(result: &Result<CheckOutcome, CheckError>) -> Status {
    match result {
        Ok(outcome) if outcome.is_update_available() => Status::UpdateAvailable,
        Ok(_) => Status::Ok,
        Err(_) => Status::Failed,
    }
}

fn render_check(
    app: Option<&str>,
    result: &Result<CheckOutcome, CheckError>,
    json: bool,
) -> Result<String> {
    if json {
        let mut value = match result {
            Ok(outcome) => serde_json::to_value(outcome)?,
            Err(err) => json!({
                "status": "error",
                "kind": err.kind(),
                "message": err.to_string(),
            }),
        };
        if let (Some(app), Some(map)) = (app, value.as_object_mut()) {
            map.insert("app".to_string(), app.into());
        }
        return Ok(value.to_string());
    }

    let prefix = app.map(|a| format!("{a}: ")).unwrap_or_default();
    Ok(match result {
        Ok(outcome) => format!("{prefix}{outcome}"),
        Err(err) => format!("{prefix}update check failed: {err}"),
    })
}

fn open_store(config: &Config, dir: Option<PathBuf>) -> Result<ManifestStore> {
    let root = dir.unwrap_or_else(|| config.store_dir());
    ManifestStore::open(&root)
        .with_context(|| format!("Failed to open manifest store: {}", root.display()))
}

fn publish(
    config: &Config,
    app: &str,
    version: Option<String>,
    bump: Option<Bump>,
    dir: Option<PathBuf>,
    json: bool,
) -> Result<Report> {
    let store = open_store(config, dir)?;

    let version = match (version, bump) {
        (Some(version), _) => {
            Version::parse(version.trim()).context("Invalid version to publish")?
        }
        (None, Some(bump)) => store
            .read(app)?
            .with_context(|| format!("{app} has no published version to bump"))?
            .bump(bump.into())
            .with_context(|| format!("Cannot bump {app}"))?,
        (None, None) => bail!("Pass a version or --bump"),
    };

    let previous = store.publish(app, &version)?;
    if let Some(previous) = &previous {
        if &version <= previous {
            warn!(app, %previous, %version, "Published version does not increase");
        }
    }

    let line = if json {
        json!({
            "app": app,
            "version": version,
            "previous": previous,
            "path": store.path_for(app)?,
        })
        .to_string()
    } else {
        match &previous {
            Some(previous) => format!("{app}: {previous} -> {version}"),
            None => format!("{app}: {version}"),
        }
    };
    Ok(Report::ok(line))
}

fn show(config: &Config, app: Option<String>, dir: Option<PathBuf>, json: bool) -> Result<Report> {
    let store = open_store(config, dir)?;

    let entries = match app {
        Some(app) => match store.read(&app)? {
            Some(version) => vec![ManifestEntry { app, version }],
            None => {
                return Ok(Report {
                    status: Status::Failed,
                    lines: vec![format!("{app}: not published")],
                })
            }
        },
        None => store.list()?,
    };

    let lines = if json {
        vec![serde_json::to_string(&entries)?]
    } else {
        entries
            .iter()
            .map(|entry| format!("{} {}", entry.app, entry.version))
            .collect()
    };
    Ok(Report {
        status: Status::Ok,
        lines,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::path::Path;

    /// Write a config whose store lives in `dir` and run the given arguments.
    async fn run_in(dir: &Path, apps: &str, args: &[&str]) -> Result<Report> {
        let config_path = dir.join("vercheck.toml");
        let store_dir = dir.join("manifests");
        std::fs::write(
            &config_path,
            format!(
                "[store]\ndir = {:?}\n{apps}",
                store_dir.display().to_string()
            ),
        )
        .unwrap();

        let config_arg = config_path.display().to_string();
        let mut argv = vec!["vercheck", "--config", config_arg.as_str()];
        argv.extend_from_slice(args);
        run(Cli::try_parse_from(argv).unwrap()).await
    }

    fn manifest_path(dir: &Path, app: &str) -> String {
        dir.join("manifests")
            .join(format!("{app}.txt"))
            .display()
            .to_string()
    }

    #[tokio::test]
    async fn test_compare() {
        let dir = tempfile::tempdir().unwrap();
        let report = run_in(dir.path(), "", &["compare", "2.0.0", "10.0.0"])
            .await
            .unwrap();
        assert_eq!(report.lines, ["less"]);
        assert_eq!(report.status, Status::Ok);

        let report = run_in(dir.path(), "", &["--json", "compare", "1.0.0", "1.0.0-alpha"])
            .await
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&report.lines[0]).unwrap();
        assert_eq!(value["ordering"], "greater");
    }

    #[tokio::test]
    async fn test_compare_ignores_config() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("vercheck.toml");
        std::fs::write(&config_path, "[[apps]\nname = ").unwrap();
        let config_arg = config_path.display().to_string();

        let argv = ["vercheck", "--config", config_arg.as_str(), "compare", "1.0.0", "2.0.0"];
        let report = run(Cli::try_parse_from(argv).unwrap()).await.unwrap();
        assert_eq!(report.lines, ["less"]);

        let cli = Cli::try_parse_from(["vercheck", "--config", config_arg.as_str(), "show"]).unwrap();
        let err = run(cli).await.unwrap_err();
        assert!(format!("{err:#}").contains("Failed to parse config file"));
    }

    #[tokio::test]
    async fn test_compare_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let err = run_in(dir.path(), "", &["compare", "abc", "1.0.0"])
            .await
            .unwrap_err();
        assert!(format!("{err:#}").contains("Invalid version format"));
    }

    #[tokio::test]
    async fn test_publish_then_check() {
        let dir = tempfile::tempdir().unwrap();
        let report = run_in(dir.path(), "", &["publish", "myapp", "0.1.2"])
            .await
            .unwrap();
        assert_eq!(report.lines, ["myapp: 0.1.2"]);

        let location = manifest_path(dir.path(), "myapp");
        let report = run_in(
            dir.path(),
            "",
            &["check", "--current", "0.1.1", "--url", &location],
        )
        .await
        .unwrap();
        assert_eq!(report.status, Status::UpdateAvailable);
        assert_eq!(report.lines, ["update available, 0.1.2"]);

        let report = run_in(
            dir.path(),
            "",
            &["check", "--current", "0.1.2", "--url", &location],
        )
        .await
        .unwrap();
        assert_eq!(report.status, Status::Ok);
        assert_eq!(report.lines, ["up to date"]);
    }

    #[tokio::test]
    async fn test_check_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let location = manifest_path(dir.path(), "absent");
        let report = run_in(
            dir.path(),
            "",
            &["check", "--current", "1.0.0", "--url", &location],
        )
        .await
        .unwrap();
        assert_eq!(report.status, Status::Failed);
        assert!(report.lines[0].starts_with("update check failed: Failed to fetch manifest"));
    }

    #[tokio::test]
    async fn test_check_requires_location() {
        let dir = tempfile::tempdir().unwrap();
        assert!(run_in(dir.path(), "", &["check", "--current", "1.0.0"])
            .await
            .is_err());
        assert!(run_in(dir.path(), "", &["check", "--app", "unknown"])
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_check_app_from_config() {
        let dir = tempfile::tempdir().unwrap();
        run_in(dir.path(), "", &["publish", "myapp", "2.0.0"])
            .await
            .unwrap();

        let apps = format!(
            "[[apps]]\nname = \"myapp\"\ncurrent = \"1.5.3\"\nurl = {:?}\n",
            manifest_path(dir.path(), "myapp")
        );
        let report = run_in(dir.path(), &apps, &["--json", "check", "--app", "myapp"])
            .await
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&report.lines[0]).unwrap();
        assert_eq!(value["status"], "update_available");
        assert_eq!(value["latest"], "2.0.0");
        assert_eq!(value["app"], "myapp");
    }

    #[tokio::test]
    async fn test_check_all_worst_status_wins() {
        let dir = tempfile::tempdir().unwrap();
        run_in(dir.path(), "", &["publish", "fresh", "1.0.0"])
            .await
            .unwrap();
        run_in(dir.path(), "", &["publish", "stale", "0.2.0"])
            .await
            .unwrap();

        let apps = format!(
            "[[apps]]\nname = \"fresh\"\ncurrent = \"1.0.0\"\nurl = {:?}\n\
             [[apps]]\nname = \"stale\"\ncurrent = \"0.1.0\"\nurl = {:?}\n",
            manifest_path(dir.path(), "fresh"),
            manifest_path(dir.path(), "stale"),
        );
        let report = run_in(dir.path(), &apps, &["check-all"]).await.unwrap();
        assert_eq!(report.status, Status::UpdateAvailable);
        assert_eq!(
            report.lines,
            ["fresh: up to date", "stale: update available, 0.2.0"]
        );

        let apps = format!(
            "{apps}[[apps]]\nname = \"broken\"\ncurrent = \"1.0\"\nurl = {:?}\n",
            manifest_path(dir.path(), "fresh"),
        );
        let report = run_in(dir.path(), &apps, &["check-all"]).await.unwrap();
        assert_eq!(report.status, Status::Failed);
        assert!(report.lines[2].starts_with("broken: update check failed: Invalid current version"));
    }

    #[tokio::test]
    async fn test_check_all_without_apps() {
        let dir = tempfile::tempdir().unwrap();
        assert!(run_in(dir.path(), "", &["check-all"]).await.is_err());
    }

    #[tokio::test]
    async fn test_publish_bump() {
        let dir = tempfile::tempdir().unwrap();
        assert!(run_in(dir.path(), "", &["publish", "myapp", "--bump", "patch"])
            .await
            .is_err());

        run_in(dir.path(), "", &["publish", "myapp", "1.4.2"])
            .await
            .unwrap();
        let report = run_in(dir.path(), "", &["publish", "myapp", "--bump", "minor"])
            .await
            .unwrap();
        assert_eq!(report.lines, ["myapp: 1.4.2 -> 1.5.0"]);
    }

    #[tokio::test]
    async fn test_publish_bump_overflow() {
        let dir = tempfile::tempdir().unwrap();
        let top = format!("{}.0.0", u64::MAX);
        run_in(dir.path(), "", &["publish", "myapp", &top])
            .await
            .unwrap();

        let err = run_in(dir.path(), "", &["publish", "myapp", "--bump", "major"])
            .await
            .unwrap_err();
        assert!(format!("{err:#}").contains("out of range"));

        // The stored manifest is left alone.
        let stored = std::fs::read_to_string(manifest_path(dir.path(), "myapp")).unwrap();
        assert_eq!(stored.trim(), top);
    }

    #[tokio::test]
    async fn test_publish_rejects_bad_input() {
        let dir = tempfile::tempdir().unwrap();
        assert!(run_in(dir.path(), "", &["publish", "myapp", "1.2"])
            .await
            .is_err());
        assert!(run_in(dir.path(), "", &["publish", "../escape", "1.2.0"])
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_show() {
        let dir = tempfile::tempdir().unwrap();
        run_in(dir.path(), "", &["publish", "b-app", "0.3.0"])
            .await
            .unwrap();
        run_in(dir.path(), "", &["publish", "a-app", "1.0.0-rc.1"])
            .await
            .unwrap();

        let report = run_in(dir.path(), "", &["show"]).await.unwrap();
        assert_eq!(report.lines, ["a-app 1.0.0-rc.1", "b-app 0.3.0"]);

        let report = run_in(dir.path(), "", &["--json", "show", "b-app"])
            .await
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&report.lines[0]).unwrap();
        assert_eq!(value[0]["version"], "0.3.0");

        let report = run_in(dir.path(), "", &["show", "c-app"]).await.unwrap();
        assert_eq!(report.status, Status::Failed);
    }
}
