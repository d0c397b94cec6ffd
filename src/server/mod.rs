//! HTTP control front end
//!
//! A small JSON API over [`CrawlController`]:
//! - `POST /start` begins a run
//! - `GET /status` and `GET /results` report on it
//! - `GET /download/{file}` and `GET /screenshots/{file}` hand out artifacts

mod handlers;
mod routes;

pub use handlers::{ApiError, ResultsResponse, StartRequest, StartResponse};
pub use routes::build_router;

use crate::config::Config;
use crate::control::CrawlController;
use anyhow::Context;

/// Binds the configured address and serves until the process exits
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let addr = config.server.listen_addr.clone();
    let controller = CrawlController::new(config);
    let app = build_router(controller);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    tracing::info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
