use crate::control::CrawlController;
use crate::pipeline::RunReport;
use crate::state::CrawlStatus;
use crate::ControlError;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

const ARCHIVE_NAME: &str = "screenshots.zip";

#[derive(Debug, Deserialize)]
pub struct StartRequest {
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StartResponse {
    pub started: bool,
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct ResultsResponse {
    pub status: CrawlStatus,
    pub report: Option<RunReport>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    running: bool,
}

/// Errors returned to HTTP clients
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Control(#[from] ControlError),

    #[error("Invalid file name: {0}")]
    BadFileName(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Control(ControlError::AlreadyRunning) => StatusCode::CONFLICT,
            ApiError::Control(ControlError::EmptySeed) => StatusCode::BAD_REQUEST,
            ApiError::BadFileName(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

/// `POST /start`
pub async fn start_handler(
    State(controller): State<CrawlController>,
    Json(request): Json<StartRequest>,
) -> Result<(StatusCode, Json<StartResponse>), ApiError> {
    controller.start(&request.url)?;
    Ok((
        StatusCode::ACCEPTED,
        Json(StartResponse {
            started: true,
            url: request.url.trim().to_string(),
        }),
    ))
}

/// `GET /status`
pub async fn status_handler(State(controller): State<CrawlController>) -> Json<CrawlStatus> {
    Json(controller.status())
}

/// `GET /results`
///
/// The report is absent until the first run has finished its export pass.
pub async fn results_handler(State(controller): State<CrawlController>) -> Json<ResultsResponse> {
    Json(ResultsResponse {
        status: controller.status(),
        report: controller.last_report(),
    })
}

/// `GET /health`
pub async fn health_handler(State(controller): State<CrawlController>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        running: controller.is_running(),
    })
}

/// `GET /download/{file}`
///
/// Serves exports by name; `screenshots.zip` comes from the parent of the
/// public screenshot directory.
pub async fn download_handler(
    State(controller): State<CrawlController>,
    Path(filename): Path<String>,
) -> Result<Response, ApiError> {
    check_file_name(&filename)?;
    let output = &controller.config().output;
    let path = if filename == ARCHIVE_NAME {
        output.screenshot_archive_path()
    } else {
        output.export_dir.join(&filename)
    };
    let bytes = read_file(path, &filename).await?;

    let disposition = format!("attachment; filename=\"{}\"", filename);
    Ok((
        [
            (header::CONTENT_TYPE, content_type(&filename).to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

/// `GET /screenshots/{file}`
pub async fn screenshot_handler(
    State(controller): State<CrawlController>,
    Path(filename): Path<String>,
) -> Result<Response, ApiError> {
    check_file_name(&filename)?;
    let path = controller
        .config()
        .output
        .public_screenshot_dir
        .join(&filename);
    let bytes = read_file(path, &filename).await?;
    Ok(([(header::CONTENT_TYPE, content_type(&filename))], bytes).into_response())
}

/// Accepts plain file names only
fn check_file_name(filename: &str) -> Result<(), ApiError> {
    let bad = filename.is_empty()
        || filename.contains("..")
        || filename.contains('/')
        || filename.contains('\\');
    if bad {
        return Err(ApiError::BadFileName(filename.to_string()));
    }
    Ok(())
}

async fn read_file(path: PathBuf, filename: &str) -> Result<Vec<u8>, ApiError> {
    match tokio::fs::read(&path).await {
        Ok(bytes) => Ok(bytes),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(ApiError::NotFound(filename.to_string()))
        }
        Err(e) => Err(e.into()),
    }
}

fn content_type(filename: &str) -> &'static str {
    match filename.rsplit_once('.').map(|(_, ext)| ext) {
        Some("csv") => "text/csv",
        Some("json") => "application/json",
        Some("md") => "text/markdown",
        Some("xlsx") => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        Some("zip") => "application/zip",
        Some("png") => "image/png",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::crawler::testing::{FakePage, FakeSite};
    use crate::server::build_router;
    use std::sync::Arc;

    struct TestServer {
        base: String,
        controller: CrawlController,
        _dir: tempfile::TempDir,
    }

    async fn spawn_server() -> TestServer {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.crawler.settle_delay_secs = 0.0;
        config.output.export_dir = dir.path().join("exports");
        config.output.screenshot_dir = dir.path().join("screenshots");
        config.output.public_screenshot_dir = dir.path().join("public/screenshots");

        let site = FakeSite::new()
            .page("https://example.com/", FakePage::linking(&["/b"]))
            .page("https://example.com/b", FakePage::default());
        let controller = CrawlController::with_launcher(config, Arc::new(site));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = build_router(controller.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        TestServer {
            base: format!("http://{}", addr),
            controller,
            _dir: dir,
        }
    }

    async fn wait_for_report(controller: &CrawlController) {
        let mut reader = controller.subscribe();
        while !reader.snapshot().completed {
            if !reader.changed().await {
                break;
            }
        }
        while controller.is_running() {
            tokio::task::yield_now().await;
        }
    }

    #[test]
    fn test_check_file_name() {
        assert!(check_file_name("user_flows.xlsx").is_ok());
        assert!(check_file_name("screenshots.zip").is_ok());
        assert!(check_file_name("").is_err());
        assert!(check_file_name("../secret").is_err());
        assert!(check_file_name("a/b.csv").is_err());
        assert!(check_file_name("a\\b.csv").is_err());
    }

    #[test]
    fn test_api_error_status_codes() {
        assert_eq!(
            ApiError::from(ControlError::AlreadyRunning).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(ControlError::EmptySeed).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::NotFound("x".to_string()).status_code(),
            StatusCode::NOT_FOUND
        );
    }

    #[tokio::test]
    async fn test_health_and_idle_status() {
        let server = spawn_server().await;
        let client = reqwest::Client::new();

        let health: serde_json::Value = client
            .get(format!("{}/health", server.base))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(health["status"], "ok");
        assert_eq!(health["running"], false);

        let status: serde_json::Value = client
            .get(format!("{}/status", server.base))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(status["running"], false);
        assert_eq!(status["completed"], false);
        assert_eq!(status["pages_crawled"], 0);
    }

    #[tokio::test]
    async fn test_start_then_download() {
        let server = spawn_server().await;
        let client = reqwest::Client::new();

        let response = client
            .post(format!("{}/start", server.base))
            .json(&serde_json::json!({ "url": "https://example.com/" }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::ACCEPTED);
        let body: StartResponse = response.json().await.unwrap();
        assert!(body.started);

        wait_for_report(&server.controller).await;

        let results: serde_json::Value = client
            .get(format!("{}/results", server.base))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(results["status"]["completed"], true);
        assert_eq!(results["report"]["pages_crawled"], 2);
        assert_eq!(results["report"]["flows_generated"], 1);

        let csv = client
            .get(format!("{}/download/cta_tracking_map.csv", server.base))
            .send()
            .await
            .unwrap();
        assert_eq!(csv.status(), reqwest::StatusCode::OK);
        assert!(csv.headers()[header::CONTENT_DISPOSITION.as_str()]
            .to_str()
            .unwrap()
            .contains("attachment"));
        assert!(csv.text().await.unwrap().starts_with("page_url,"));

        // no screenshots were captured, so there is no archive
        let zip = client
            .get(format!("{}/download/screenshots.zip", server.base))
            .send()
            .await
            .unwrap();
        assert_eq!(zip.status(), reqwest::StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_start_rejects_empty_seed() {
        let server = spawn_server().await;
        let response = reqwest::Client::new()
            .post(format!("{}/start", server.base))
            .json(&serde_json::json!({ "url": "" }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_download_rejects_traversal() {
        let server = spawn_server().await;
        let response = reqwest::Client::new()
            .get(format!("{}/download/..%2Fconfig.toml", server.base))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
    }
}
