use crate::errors::DashboardError;
use crate::metrics::export::run_pipeline;
use crate::state::AppState;
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Json, Response};
use portable_atomic::Ordering::Relaxed;
use std::sync::Arc;

/// GET /api/dashboard -- the whole export, same shape as the JSON file
pub async fn get_dashboard(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let export = state.current();
    Json(serde_json::json!(&*export))
}

/// GET /api/summary -- `{}` when there is no data
pub async fn get_summary(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let export = state.current();
    match &export.summary {
        Some(summary) => Json(serde_json::json!(summary)),
        None => Json(serde_json::json!({})),
    }
}

/// GET /api/daily
pub async fn get_daily(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let export = state.current();
    Json(serde_json::json!({ "daily_metrics": export.daily_metrics }))
}

/// GET /api/platforms
pub async fn get_platforms(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let export = state.current();
    Json(serde_json::json!({ "platform_performance": export.platform_performance }))
}

/// GET /api/campaigns
pub async fn get_campaigns(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let export = state.current();
    Json(serde_json::json!({ "campaign_performance": export.campaign_performance }))
}

/// POST /api/refresh -- reload the CSVs, rewrite the JSON file, publish.
/// CSV parsing runs on a blocking thread.
pub async fn refresh(State(state): State<Arc<AppState>>) -> Response {
    let config = state.config.clone();
    let result = tokio::task::spawn_blocking(move || run_pipeline(&config))
        .await
        .map_err(|e| DashboardError::Server(format!("refresh task: {e}")))
        .and_then(|r| r);

    match result {
        Ok(export) => {
            state.counters.refreshes.fetch_add(1, Relaxed);
            let body = serde_json::json!({
                "last_updated": export.last_updated,
                "days": export.daily_metrics.len(),
                "campaigns": export.campaign_performance.len(),
            });
            state.publish(export);
            tracing::info!("dashboard data refreshed");
            Json(body).into_response()
        }
        Err(e) => {
            state.counters.refresh_failures.fetch_add(1, Relaxed);
            tracing::error!(error = %e, "refresh failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

/// GET /api/counters -- request counters (lock-free reads)
pub async fn get_counters(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "requests_served": state.counters.requests_served.load(Relaxed),
        "refreshes": state.counters.refreshes.load(Relaxed),
        "refresh_failures": state.counters.refresh_failures.load(Relaxed),
    }))
}

/// Counts every request, static files included.
pub async fn count_requests(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    state.counters.requests_served.fetch_add(1, Relaxed);
    next.run(request).await
}
