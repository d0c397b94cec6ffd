use crate::control::CrawlController;
use crate::server::handlers::{
    download_handler, health_handler, results_handler, screenshot_handler, start_handler,
    status_handler,
};
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

/// Builds the application router around a controller
pub fn build_router(controller: CrawlController) -> Router {
    Router::new()
        .route("/start", post(start_handler))
        .route("/status", get(status_handler))
        .route("/results", get(results_handler))
        .route("/download/:filename", get(download_handler))
        .route("/screenshots/:filename", get(screenshot_handler))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(controller)
}
