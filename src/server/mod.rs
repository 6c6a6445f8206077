pub mod routes;

use crate::config::AppConfig;
use crate::errors::{DashboardError, DashboardResult};
use crate::ingest;
use crate::metrics::export::{write_export, DashboardExport};
use crate::state::AppState;
use axum::http::{header, HeaderValue};
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::set_header::SetResponseHeaderLayer;

/// API routes plus the dashboard directory as a static fallback.
/// Every response is marked uncacheable so the browser always sees the
/// latest export.
pub fn build_router(state: Arc<AppState>) -> Router {
    let dashboard_dir = state.config.dashboard_dir.clone();
    let static_files = ServeDir::new(&dashboard_dir)
        .fallback(ServeFile::new(dashboard_dir.join("index.html")));

    Router::new()
        .route("/api/dashboard", get(routes::get_dashboard))
        .route("/api/summary", get(routes::get_summary))
        .route("/api/daily", get(routes::get_daily))
        .route("/api/platforms", get(routes::get_platforms))
        .route("/api/campaigns", get(routes::get_campaigns))
        .route("/api/refresh", post(routes::refresh))
        .route("/api/counters", get(routes::get_counters))
        .fallback_service(static_files)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            routes::count_requests,
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-cache, no-store, must-revalidate"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::PRAGMA,
            HeaderValue::from_static("no-cache"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::EXPIRES,
            HeaderValue::from_static("0"),
        ))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Log which of the files the dashboard needs are present.
fn report_static_files(config: &AppConfig) {
    for path in [config.dashboard_dir.join("index.html"), config.output_path.clone()] {
        if path.exists() {
            tracing::info!(path = %path.display(), "found");
        } else {
            tracing::warn!(path = %path.display(), "not found");
        }
    }
}

/// Export served at startup. Missing or malformed CSVs give the empty
/// export; a failed JSON write is logged and the loaded data is still served.
fn initial_export(config: &AppConfig) -> DashboardExport {
    let dataset = match ingest::load_dataset(&config.data_dir) {
        Ok(dataset) => dataset,
        Err(e) => {
            tracing::warn!(error = %e, "could not load dashboard data; serving empty export");
            return DashboardExport::empty();
        }
    };

    let export = DashboardExport::build(&dataset);
    if let Err(e) = write_export(&export, &config.output_path) {
        tracing::warn!(error = %e, "could not write dashboard json; serving from memory");
    }
    export
}

/// Build the initial export, then serve until Ctrl+C.
pub async fn run_server(config: AppConfig) -> DashboardResult<()> {
    let startup_config = config.clone();
    let initial = tokio::task::spawn_blocking(move || initial_export(&startup_config))
        .await
        .map_err(|e| DashboardError::Server(format!("startup task: {e}")))?;

    report_static_files(&config);

    let addr = format!("0.0.0.0:{}", config.server_port);
    let state = AppState::new(config, initial);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| DashboardError::Server(format!("bind {addr}: {e}")))?;
    tracing::info!("dashboard listening on http://{addr}/");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| DashboardError::Server(e.to_string()))?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeneratorConfig;
    use crate::generator;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chrono::NaiveDate;
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn test_config(root: &TempDir) -> AppConfig {
        let dashboard_dir = root.path().join("dashboard");
        std::fs::create_dir_all(&dashboard_dir).unwrap();
        std::fs::write(dashboard_dir.join("index.html"), "<html>dashboard</html>").unwrap();
        AppConfig {
            data_dir: root.path().join("data"),
            output_path: dashboard_dir.join("dashboard_data.json"),
            dashboard_dir,
            server_port: 0,
            generator: GeneratorConfig {
                seed: 1,
                start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                days: 5,
            },
        }
    }

    fn seed_data(config: &AppConfig) -> DashboardExport {
        let data = generator::generate(&config.generator);
        generator::write_csvs(&data, &config.data_dir).unwrap();
        DashboardExport::build(&data)
    }

    async fn send(app: &Router, method: &str, uri: &str) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec();
        (status, headers, body)
    }

    fn json(body: &[u8]) -> serde_json::Value {
        serde_json::from_slice(body).unwrap()
    }

    #[tokio::test]
    async fn test_api_views() {
        let root = TempDir::new().unwrap();
        let config = test_config(&root);
        let export = seed_data(&config);
        let app = build_router(AppState::new(config, export));

        let (status, _, body) = send(&app, "GET", "/api/summary").await;
        assert_eq!(status, StatusCode::OK);
        assert!(json(&body)["total_spend"].as_f64().unwrap() > 0.0);

        let (_, _, body) = send(&app, "GET", "/api/daily").await;
        assert_eq!(json(&body)["daily_metrics"].as_array().unwrap().len(), 5);

        let (_, _, body) = send(&app, "GET", "/api/platforms").await;
        assert_eq!(json(&body)["platform_performance"].as_array().unwrap().len(), 3);

        let (_, _, body) = send(&app, "GET", "/api/campaigns").await;
        assert!(!json(&body)["campaign_performance"].as_array().unwrap().is_empty());

        let (_, _, body) = send(&app, "GET", "/api/dashboard").await;
        let v = json(&body);
        for key in ["summary", "daily_metrics", "platform_performance", "campaign_performance", "last_updated"] {
            assert!(v.get(key).is_some(), "missing {key}");
        }

        let (_, _, body) = send(&app, "GET", "/api/counters").await;
        assert_eq!(json(&body)["requests_served"], 6);
    }

    #[tokio::test]
    async fn test_empty_summary() {
        let root = TempDir::new().unwrap();
        let app = build_router(AppState::new(test_config(&root), DashboardExport::empty()));
        let (status, _, body) = send(&app, "GET", "/api/summary").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json(&body), serde_json::json!({}));
    }

    #[tokio::test]
    async fn test_refresh_publishes_and_writes_file() {
        let root = TempDir::new().unwrap();
        let config = test_config(&root);
        seed_data(&config);
        let output = config.output_path.clone();
        let app = build_router(AppState::new(config, DashboardExport::empty()));

        let (status, _, body) = send(&app, "POST", "/api/refresh").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json(&body)["days"], 5);
        assert!(output.exists());

        let (_, _, body) = send(&app, "GET", "/api/daily").await;
        assert_eq!(json(&body)["daily_metrics"].as_array().unwrap().len(), 5);

        // the written file is served as a static asset
        let (status, _, body) = send(&app, "GET", "/dashboard_data.json").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json(&body)["daily_metrics"].as_array().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_refresh_failure_keeps_previous_export() {
        let root = TempDir::new().unwrap();
        let config = test_config(&root);
        let export = seed_data(&config);
        std::fs::remove_dir_all(&config.data_dir).unwrap();
        let app = build_router(AppState::new(config, export));

        let (status, _, body) = send(&app, "POST", "/api/refresh").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(json(&body)["error"].as_str().unwrap().contains("facebook.csv"));

        let (_, _, body) = send(&app, "GET", "/api/daily").await;
        assert_eq!(json(&body)["daily_metrics"].as_array().unwrap().len(), 5);

        let (_, _, body) = send(&app, "GET", "/api/counters").await;
        let counters = json(&body);
        assert_eq!(counters["refresh_failures"], 1);
        assert_eq!(counters["refreshes"], 0);
    }

    #[tokio::test]
    async fn test_static_files_are_not_cached() {
        let root = TempDir::new().unwrap();
        let app = build_router(AppState::new(test_config(&root), DashboardExport::empty()));

        let (status, headers, body) = send(&app, "GET", "/index.html").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"<html>dashboard</html>");
        assert_eq!(headers[header::CACHE_CONTROL], "no-cache, no-store, must-revalidate");
        assert_eq!(headers[header::PRAGMA], "no-cache");
        assert_eq!(headers[header::EXPIRES], "0");

        // unknown paths fall back to the dashboard page
        let (status, _, body) = send(&app, "GET", "/some/view").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"<html>dashboard</html>");
    }

    #[test]
    fn test_initial_export_survives_write_failure() {
        let root = TempDir::new().unwrap();
        let mut config = test_config(&root);
        let expected = seed_data(&config);

        // a regular file where the output's parent directory should be
        let blocker = root.path().join("blocker");
        std::fs::write(&blocker, "not a directory").unwrap();
        config.output_path = blocker.join("dashboard_data.json");

        let export = initial_export(&config);
        assert_eq!(export.daily_metrics.len(), 5);
        assert_eq!(export.daily_metrics, expected.daily_metrics);
        assert!(export.summary.is_some());
        assert!(!config.output_path.exists());
    }

    #[test]
    fn test_initial_export_writes_json() {
        let root = TempDir::new().unwrap();
        let config = test_config(&root);
        seed_data(&config);

        let export = initial_export(&config);
        assert_eq!(export.daily_metrics.len(), 5);
        let written = json(&std::fs::read(&config.output_path).unwrap());
        assert_eq!(written["daily_metrics"].as_array().unwrap().len(), 5);
    }

    #[test]
    fn test_initial_export_without_data_is_empty() {
        let root = TempDir::new().unwrap();
        let config = test_config(&root);

        let export = initial_export(&config);
        assert!(export.summary.is_none());
        assert!(export.daily_metrics.is_empty());
        assert!(!config.output_path.exists());
    }
}
