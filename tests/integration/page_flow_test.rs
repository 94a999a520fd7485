//! Request flow tests for the page and exporter routers.
//!
//! The table is served from a fixed in-memory source and counters live in a
//! temporary directory.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use async_trait::async_trait;
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;

use table_page::{
    database::{StaticTableSource, TableSource},
    error::DataSourceError,
    models::TableRow,
    router::{build_exporter_router, build_page_router},
    services::counters::{CounterBackend, CounterStore, FileCounterBackend, SharedCounterBackend},
    AppState, Config,
};

fn test_config(counter_file: &Path) -> Config {
    let file = counter_file.to_string_lossy().to_string();
    Config::from_vars(move |key| match key {
        "DB_HOST" => Some("localhost".to_string()),
        "DB_NAME" => Some("app".to_string()),
        "DB_USER" => Some("app".to_string()),
        "METRICS_FILE" => Some(file.clone()),
        _ => None,
    })
    .unwrap()
}

fn seeded_rows() -> Vec<TableRow> {
    vec![
        TableRow::new(1, "optimy"),
        TableRow::new(2, "Social impact"),
        TableRow::new(3, "Sustainability"),
        TableRow::new(4, "Philanthropy"),
    ]
}

fn file_state(dir: &TempDir, source: StaticTableSource) -> AppState {
    let path = dir.path().join("app_metrics.prom");
    let counters: Arc<dyn CounterBackend> =
        Arc::new(FileCounterBackend::new(CounterStore::new(&path)));
    let table_source: Arc<dyn TableSource> = Arc::new(source);
    AppState::new(test_config(&path), counters, table_source)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Option<String>, String) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_string());
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, content_type, String::from_utf8(bytes.to_vec()).unwrap())
}

#[tokio::test]
async fn test_page_lists_seeded_rows() {
    let dir = TempDir::new().unwrap();
    let app = build_page_router(file_state(&dir, StaticTableSource::with_rows(seeded_rows())));

    let (status, content_type, body) = get(&app, "/").await;

    assert_eq!(status, StatusCode::OK);
    assert!(content_type.unwrap().starts_with("text/html"));
    assert!(body.contains("Data from 'test' table:"));
    for name in ["optimy", "Social impact", "Sustainability", "Philanthropy"] {
        assert!(body.contains(name), "missing {name} in {body}");
    }
}

#[tokio::test]
async fn test_any_path_renders_the_page() {
    let dir = TempDir::new().unwrap();
    let app = build_page_router(file_state(&dir, StaticTableSource::with_rows(seeded_rows())));

    let (status, _, body) = get(&app, "/index.php?x=1").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<td>optimy</td>"));
}

#[tokio::test]
async fn test_successful_requests_are_counted() {
    let dir = TempDir::new().unwrap();
    let state = file_state(&dir, StaticTableSource::with_rows(seeded_rows()));
    let counters = state.counters.clone();
    let app = build_page_router(state);

    for _ in 0..7 {
        get(&app, "/").await;
    }

    let snapshot = counters.snapshot().await;
    assert_eq!(snapshot.requests_total(), 7);
    assert_eq!(snapshot.db_errors_total(), 0);
    assert_eq!(snapshot.up(), 1);
}

#[tokio::test]
async fn test_data_source_failure_is_rendered_and_counted() {
    let dir = TempDir::new().unwrap();
    let state = file_state(
        &dir,
        StaticTableSource::failing("Connection refused (os error 111)"),
    );
    let counters = state.counters.clone();
    let app = build_page_router(state);

    get(&app, "/").await;
    let (status, _, body) = get(&app, "/").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Connection refused (os error 111)"));
    assert!(body.starts_with("❌ Database connection failed: "));
    assert!(!body.contains("<table"));

    let snapshot = counters.snapshot().await;
    assert_eq!(snapshot.requests_total(), 2);
    assert_eq!(snapshot.db_errors_total(), 2);
    assert_eq!(snapshot.up(), 0);
}

/// Never answers within the test's request timeout.
struct StalledTableSource;

#[async_trait]
impl TableSource for StalledTableSource {
    async fn fetch_rows(&self) -> Result<Vec<TableRow>, DataSourceError> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(seeded_rows())
    }
}

#[tokio::test]
async fn test_stalled_data_source_is_counted_as_failure() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("app_metrics.prom");
    let mut config = test_config(&path);
    config.request_timeout = 1;
    let counters: Arc<dyn CounterBackend> =
        Arc::new(FileCounterBackend::new(CounterStore::new(&path)));
    let source: Arc<dyn TableSource> = Arc::new(StalledTableSource);
    let app = build_page_router(AppState::new(config, counters, source));

    let (status, _, body) = get(&app, "/").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "❌ Database connection failed: query timed out after 1s");
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "app_up 0\napp_requests_total 1\napp_db_errors_total 1\n"
    );
}

#[tokio::test]
async fn test_recovery_resets_up_gauge() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("app_metrics.prom");
    std::fs::write(&path, "app_up 0\napp_requests_total 3\napp_db_errors_total 1\n").unwrap();

    let app = build_page_router(file_state(&dir, StaticTableSource::with_rows(seeded_rows())));
    get(&app, "/").await;

    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "app_up 1\napp_requests_total 4\napp_db_errors_total 1\n"
    );
}

#[tokio::test]
async fn test_page_metrics_path_serves_bare_lines_and_counts() {
    let dir = TempDir::new().unwrap();
    let state = file_state(&dir, StaticTableSource::with_rows(seeded_rows()));
    let counters = state.counters.clone();
    let app = build_page_router(state);

    get(&app, "/").await;
    let (status, content_type, body) = get(&app, "/metrics").await;

    assert_eq!(status, StatusCode::OK);
    assert!(content_type.unwrap().starts_with("text/plain"));
    assert_eq!(body, "app_up 1\napp_requests_total 2\napp_db_errors_total 0\n");
    assert!(!body.contains("# TYPE"));
    assert_eq!(counters.snapshot().await.requests_total(), 2);
}

#[tokio::test]
async fn test_exporter_serves_annotated_counters_without_counting() {
    let dir = TempDir::new().unwrap();
    let state = file_state(&dir, StaticTableSource::failing("down"));
    let page = build_page_router(state.clone());
    let exporter = build_exporter_router(state);

    get(&page, "/").await;
    get(&page, "/").await;
    get(&page, "/").await;

    let (status, content_type, body) = get(&exporter, "/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert!(content_type.unwrap().starts_with("text/plain"));

    let type_lines: Vec<&str> = body.lines().filter(|l| l.starts_with("# TYPE")).collect();
    assert_eq!(
        type_lines,
        vec![
            "# TYPE app_up gauge",
            "# TYPE app_requests_total counter",
            "# TYPE app_db_errors_total counter",
        ]
    );
    assert!(body.contains("# TYPE app_up gauge\napp_up 0\n"));
    assert!(body.contains("# TYPE app_requests_total counter\napp_requests_total 3\n"));
    assert!(body.contains("# TYPE app_db_errors_total counter\napp_db_errors_total 3\n"));

    let (_, _, again) = get(&exporter, "/metrics").await;
    assert_eq!(body, again);
}

#[tokio::test]
async fn test_exporter_rejects_other_paths() {
    let dir = TempDir::new().unwrap();
    let exporter =
        build_exporter_router(file_state(&dir, StaticTableSource::with_rows(Vec::new())));

    let (status, _, _) = get(&exporter, "/").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unwritable_counter_file_does_not_break_the_page() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("missing-dir").join("app_metrics.prom");
    let counters: Arc<dyn CounterBackend> =
        Arc::new(FileCounterBackend::new(CounterStore::new(&path)));
    let source: Arc<dyn TableSource> = Arc::new(StaticTableSource::with_rows(seeded_rows()));
    let app = build_page_router(AppState::new(test_config(&path), counters, source));

    let (status, _, body) = get(&app, "/").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("optimy"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_shared_mode_counts_concurrent_requests() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("app_metrics.prom");
    let shared = Arc::new(SharedCounterBackend::load(CounterStore::new(&path)).await);
    let counters: Arc<dyn CounterBackend> = shared.clone();
    let source: Arc<dyn TableSource> = Arc::new(StaticTableSource::with_rows(seeded_rows()));
    let app = build_page_router(AppState::new(test_config(&path), counters.clone(), source));

    let handles: Vec<_> = (0..40)
        .map(|_| {
            let app = app.clone();
            tokio::spawn(async move { get(&app, "/").await })
        })
        .collect();
    for handle in handles {
        let (status, _, _) = handle.await.unwrap();
        assert_eq!(status, StatusCode::OK);
    }

    assert_eq!(counters.snapshot().await.requests_total(), 40);

    counters.shutdown().await;
    assert_eq!(CounterStore::new(&path).load().await.requests_total(), 40);
}
