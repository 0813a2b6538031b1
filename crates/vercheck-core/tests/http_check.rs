//! End-to-end update checks against a local HTTP server.

use axum::{http::StatusCode, routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use vercheck_core::{CheckError, CheckOutcome, ManifestStore, UpdateChecker};
use vercheck_protocol::Version;
use vercheck_transport::{source_for, FetchError, HttpSource, SourceOptions};

async fn serve(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn checker_for(url: &str) -> UpdateChecker {
    UpdateChecker::new(Arc::new(
        HttpSource::new(url, &SourceOptions::default()).unwrap(),
    ))
}

#[tokio::test]
async fn test_scenarios_over_http() {
    let app = Router::new()
        .route("/patch.txt", get(|| async { "0.1.2\n" }))
        .route("/same.txt", get(|| async { "1.0.0\n" }))
        .route("/major.txt", get(|| async { "2.0.0" }));
    let addr = serve(app).await;

    let outcome = checker_for(&format!("http://{addr}/patch.txt"))
        .check("0.1.1")
        .await
        .unwrap();
    assert_eq!(outcome.to_string(), "update available, 0.1.2");

    let outcome = checker_for(&format!("http://{addr}/same.txt"))
        .check("1.0.0")
        .await
        .unwrap();
    assert_eq!(outcome.to_string(), "up to date");

    let outcome = checker_for(&format!("http://{addr}/major.txt"))
        .check("1.5.3")
        .await
        .unwrap();
    assert_eq!(
        outcome,
        CheckOutcome::UpdateAvailable {
            current: Version::new(1, 5, 3),
            latest: Version::new(2, 0, 0),
        }
    );
}

#[tokio::test]
async fn test_not_found_is_fetch_failure() {
    let app = Router::new().route(
        "/gone.txt",
        get(|| async { (StatusCode::NOT_FOUND, "404: Not Found") }),
    );
    let addr = serve(app).await;

    match checker_for(&format!("http://{addr}/gone.txt"))
        .check("1.0.0")
        .await
    {
        Err(CheckError::FetchFailed {
            source: FetchError::Status(404),
            ..
        }) => {}
        other => panic!("Expected fetch failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unreachable_host_is_fetch_failure() {
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };

    let checker = checker_for(&format!("http://{addr}/myapp.txt"));
    let result = checker.check("1.0.0").await;
    assert!(matches!(result, Err(CheckError::FetchFailed { .. })));

    // The checker holds no state, a second attempt behaves the same.
    assert!(matches!(
        checker.check("1.0.0").await,
        Err(CheckError::FetchFailed { .. })
    ));
}

#[tokio::test]
async fn test_published_manifest_is_checked() {
    let dir = tempfile::tempdir().unwrap();
    let store = ManifestStore::open(dir.path()).unwrap();
    store.publish("myapp", &Version::new(0, 1, 2)).unwrap();

    let location = store.path_for("myapp").unwrap();
    let source = source_for(&location.display().to_string(), &SourceOptions::default()).unwrap();
    let outcome = UpdateChecker::new(source).check("0.1.1").await.unwrap();
    assert_eq!(outcome.to_string(), "update available, 0.1.2");

    store.publish("myapp", &Version::new(0, 1, 1)).unwrap();
    let source = source_for(&location.display().to_string(), &SourceOptions::default()).unwrap();
    let outcome = UpdateChecker::new(source).check("0.1.1").await.unwrap();
    assert_eq!(outcome.to_string(), "up to date");
}
