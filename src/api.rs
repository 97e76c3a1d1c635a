use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::CorsLayer;

use crate::harvester::Harvester;
use crate::ingest::aggregate::RunOptions;
use crate::ingest::daily::DailySummary;
use crate::ingest::types::JobRecord;

#[derive(Clone)]
pub struct AppState {
    pub harvester: Arc<Harvester>,
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(harvester: Harvester) -> Self {
        Self {
            harvester: Arc::new(harvester),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

pub fn create_router(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/jobs", post(search_jobs))
        .route("/jobs/daily", post(daily_sweep));

    if state.metrics.is_some() {
        router = router.route("/metrics", get(render_metrics));
    }

    router.layer(CorsLayer::very_permissive()).with_state(state)
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchReq {
    titles: Vec<String>,
    #[serde(default)]
    today_only: Option<bool>,
    #[serde(default)]
    archive: Option<bool>,
}

async fn search_jobs(
    State(state): State<AppState>,
    Json(body): Json<SearchReq>,
) -> Result<Json<Vec<JobRecord>>, (StatusCode, String)> {
    let titles: Vec<String> = body
        .titles
        .into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();
    if titles.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "titles must not be empty".into()));
    }

    let defaults = RunOptions::archival();
    let options = RunOptions {
        today_only: body.today_only.unwrap_or(defaults.today_only),
        archive: body.archive.unwrap_or(defaults.archive),
    };
    let records = state.harvester.run_all(&titles, options).await;
    Ok(Json(records))
}

async fn daily_sweep(State(state): State<AppState>) -> Json<DailySummary> {
    Json(state.harvester.run_daily().await)
}

async fn render_metrics(State(state): State<AppState>) -> String {
    state
        .metrics
        .as_ref()
        .map(PrometheusHandle::render)
        .unwrap_or_default()
}
