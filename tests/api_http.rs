// tests/api_http.rs
//
// HTTP-level tests for the public API Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot; the job
// boards behind it are wiremock servers.
//
// Covered:
// - GET /health
// - POST /jobs (validation, records, archive switch)
// - POST /jobs/daily
// - GET /metrics (absent unless a handle is attached)

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use chrono::NaiveDate;
use job_harvester::ingest::types::FixedClock;
use job_harvester::{router, AppState, Harvester, HarvesterConfig, JobRecord, QueryParams};
use metrics_exporter_prometheus::PrometheusBuilder;
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use tower::ServiceExt as _; // for `oneshot`
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BODY_LIMIT: usize = 1024 * 1024;
const GUPY_JSON: &str = include_str!("fixtures/gupy_jobs.json");

async fn boards() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gupy"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::from_str::<Value>(GUPY_JSON).unwrap()),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/solides"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": { "data": [] } })))
        .mount(&server)
        .await;
    server
}

fn harvester(server: &MockServer, root: &Path) -> Harvester {
    let cfg = HarvesterConfig {
        gupy_url: format!("{}/gupy", server.uri()),
        solides_url: format!("{}/solides", server.uri()),
        output_dir: root.join("Found jobs"),
        daily_dir: root.to_path_buf(),
        daily: vec![QueryParams::new("python").workplace("remote").today_only(true)],
        ..Default::default()
    };
    Harvester::from_config(cfg)
        .expect("harvester")
        .with_clock(Arc::new(FixedClock(NaiveDate::from_ymd_opt(2024, 5, 2).unwrap())))
}

fn test_router(server: &MockServer, root: &Path) -> Router {
    router(AppState::new(harvester(server, root)))
}

fn post_json(uri: &str, payload: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .expect("build POST")
}

async fn body_bytes(resp: axum::response::Response) -> Vec<u8> {
    body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec()
}

#[tokio::test]
async fn api_health_returns_200_and_ok_body() {
    let server = boards().await;
    let tmp = tempfile::tempdir().unwrap();
    let app = test_router(&server, tmp.path());

    let req = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .expect("build GET /health");
    let resp = app.oneshot(req).await.expect("oneshot /health");
    assert_eq!(resp.status(), StatusCode::OK);
    let body = String::from_utf8(body_bytes(resp).await).expect("utf8");
    assert_eq!(body.trim(), "OK");
}

#[tokio::test]
async fn api_jobs_rejects_blank_titles() {
    let server = boards().await;
    let tmp = tempfile::tempdir().unwrap();
    let app = test_router(&server, tmp.path());

    let resp = app
        .oneshot(post_json("/jobs", json!({ "titles": ["", "   "] })))
        .await
        .expect("oneshot /jobs");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn api_jobs_returns_merged_records_without_archiving() {
    let server = boards().await;
    let tmp = tempfile::tempdir().unwrap();
    let app = test_router(&server, tmp.path());

    let resp = app
        .oneshot(post_json(
            "/jobs",
            json!({ "titles": ["python"], "todayOnly": true, "archive": false }),
        ))
        .await
        .expect("oneshot /jobs");
    assert_eq!(resp.status(), StatusCode::OK);

    let records: Vec<JobRecord> = serde_json::from_slice(&body_bytes(resp).await).expect("json");
    // Three query variants, one fresh Gupy posting each; Solides is empty.
    assert_eq!(records.len(), 3);
    assert!(records
        .iter()
        .all(|r| r.published_date.as_deref() == Some("2024-05-02")));
    assert!(!tmp.path().join("Found jobs").exists());
}

#[tokio::test]
async fn api_jobs_archives_by_default() {
    let server = boards().await;
    let tmp = tempfile::tempdir().unwrap();
    let app = test_router(&server, tmp.path());

    let resp = app
        .oneshot(post_json("/jobs", json!({ "titles": ["python"] })))
        .await
        .expect("oneshot /jobs");
    assert_eq!(resp.status(), StatusCode::OK);

    let records: Vec<Value> = serde_json::from_slice(&body_bytes(resp).await).expect("json");
    assert_eq!(records.len(), 6);
    assert!(records[0].get("organizationName").is_some());
    assert!(tmp
        .path()
        .join("Found jobs/Gupy/2024-04-28/gupy_python_2024-04-28.csv")
        .exists());
}

#[tokio::test]
async fn api_daily_returns_summary() {
    let server = boards().await;
    let tmp = tempfile::tempdir().unwrap();
    let app = test_router(&server, tmp.path());

    let resp = app
        .oneshot(post_json("/jobs/daily", json!({})))
        .await
        .expect("oneshot /jobs/daily");
    assert_eq!(resp.status(), StatusCode::OK);

    let summary: Value = serde_json::from_slice(&body_bytes(resp).await).expect("json");
    assert_eq!(summary["queries"], 1);
    assert_eq!(summary["saved"]["gupy"], 1);
    assert_eq!(summary["no_results"], 1);
    assert!(tmp.path().join("gupy_2024-05-02.csv").exists());
}

#[tokio::test]
async fn api_metrics_route_needs_a_handle() {
    let server = boards().await;
    let tmp = tempfile::tempdir().unwrap();

    let req = || {
        Request::builder()
            .uri("/metrics")
            .body(Body::empty())
            .expect("build GET /metrics")
    };

    let bare = test_router(&server, tmp.path());
    let resp = bare.oneshot(req()).await.expect("oneshot /metrics");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // Recorder built but not installed globally, so tests stay independent.
    let handle = PrometheusBuilder::new().build_recorder().handle();
    let app = router(AppState::new(harvester(&server, tmp.path())).with_metrics(handle));
    let resp = app.oneshot(req()).await.expect("oneshot /metrics");
    assert_eq!(resp.status(), StatusCode::OK);
}
