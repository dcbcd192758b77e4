use std::sync::Arc;

use serde::Serialize;
use shuttle_axum::axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tower_http::cors::CorsLayer;

use crate::dedup::NewsGroup;
use crate::history::{RunEntry, RunHistory};
use crate::ingest::{aggregate_timed, Aggregation, Aggregator};

const RUN_HISTORY_CAP: usize = 10;
const FAILURE_MESSAGE: &str = "Ошибка при получении новостей";

#[derive(Clone)]
pub struct AppState {
    aggregator: Arc<Aggregator>,
    runs: Arc<RunHistory>,
}

impl AppState {
    pub fn new(aggregator: Aggregator) -> Self {
        Self {
            aggregator: Arc::new(aggregator),
            runs: Arc::new(RunHistory::with_capacity(RUN_HISTORY_CAP)),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/test", get(api_test))
        .route("/api/news", get(api_news))
        .route("/debug/runs", get(debug_runs))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsResponse {
    pub success: bool,
    /// Groups before truncation.
    pub count: usize,
    /// Raw items before grouping.
    pub total_sources: usize,
    pub news: Vec<NewsGroup>,
}

impl From<Aggregation> for NewsResponse {
    fn from(agg: Aggregation) -> Self {
        Self {
            success: true,
            count: agg.total_groups,
            total_sources: agg.total_items,
            news: agg.groups,
        }
    }
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

async fn api_test() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": "Сервер работает!" }))
}

async fn api_news(State(state): State<AppState>) -> Response {
    let (res, ms) = aggregate_timed(&state.aggregator).await;
    match res {
        Ok(agg) => {
            state.runs.push(RunEntry::from_aggregation(&agg, ms));
            Json(NewsResponse::from(agg)).into_response()
        }
        Err(e) => {
            tracing::error!(error = ?e, "aggregation failed");
            state.runs.push(RunEntry::failed(ms));
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    success: false,
                    error: FAILURE_MESSAGE.to_string(),
                }),
            )
                .into_response()
        }
    }
}

async fn debug_runs(State(state): State<AppState>) -> Json<Vec<RunEntry>> {
    Json(state.runs.snapshot_last_n(RUN_HISTORY_CAP))
}
