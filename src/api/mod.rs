//! HTTP API for fare prediction.
//!
//! Provides the upload-and-predict endpoint plus operational endpoints,
//! using axum.
//!
//! ## Endpoints
//!
//! - `GET /health` - Health check (reports model readiness)
//! - `GET /metrics` - Prometheus-formatted metrics
//! - `POST /api/predict` - Upload an xlsx of flight records, download a zip
//!   with the predictions
//!
//! ## Example
//!
//! ```rust,ignore
//! use tarifa::api::{create_router, AppState};
//! use tarifa::model::FareModel;
//!
//! let model = FareModel::load("models/flight_fare.json")?;
//! let app = create_router(AppState::new(model));
//! axum::serve(listener, app).await?;
//! ```
//!
//! Handlers are stateless; the only shared state is the read-only model
//! handle and the metrics collector, so requests run concurrently without
//! coordination. All request-scoped buffers drop on every exit path.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Multipart, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tracing::{error, info};
use uuid::Uuid;

use crate::archive;
use crate::error::TarifaError;
use crate::metrics::MetricsCollector;
use crate::model::{predict_fares, FareModel};
use crate::table::RawTable;

mod types;

pub use types::{ErrorResponse, HealthResponse};

/// The only accepted upload extension.
pub const ACCEPTED_EXTENSION: &str = ".xlsx";

/// Download filename declared in the attachment disposition.
pub const ARCHIVE_DOWNLOAD_NAME: &str = "predictions.zip";

/// Attachment disposition header value for the archive response.
const ARCHIVE_DISPOSITION: &str = "attachment; filename=\"predictions.zip\"";

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Model loaded at startup; `None` when the load failed, which makes
    /// every predict call answer 503 until the process is restarted.
    model: Option<Arc<FareModel>>,
    /// Metrics collector for monitoring
    metrics: Arc<MetricsCollector>,
}

impl AppState {
    /// State with a loaded model.
    #[must_use]
    pub fn new(model: FareModel) -> Self {
        Self {
            model: Some(Arc::new(model)),
            metrics: Arc::new(MetricsCollector::new()),
        }
    }

    /// State for a process whose model never loaded. There is no reload
    /// path, so this is permanent for the process lifetime.
    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            model: None,
            metrics: Arc::new(MetricsCollector::new()),
        }
    }

    /// Whether a model is available for inference.
    #[must_use]
    pub fn is_model_loaded(&self) -> bool {
        self.model.is_some()
    }
}

/// Build the service router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route("/api/predict", post(predict_handler))
        .with_state(state)
}

/// Health check handler
async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: crate::VERSION.to_string(),
        model_loaded: state.is_model_loaded(),
        model_name: state.model.as_ref().map(|m| m.name().to_string()),
    })
}

/// Prometheus metrics handler
async fn metrics_handler(State(state): State<AppState>) -> String {
    state.metrics.to_prometheus()
}

/// Prediction handler (`POST /api/predict`).
///
/// Accepts a multipart upload with a `file` field holding an xlsx workbook
/// and answers with a zip archive of the predictions. Error classes: 400 for
/// a bad upload, 503 while no model is loaded, 500 (generic message only)
/// when inference fails.
async fn predict_handler(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, (StatusCode, Json<ErrorResponse>)> {
    let start = Instant::now();
    let request_id = Uuid::new_v4();

    match run_pipeline(&state, multipart).await {
        Ok((bytes, rows)) => {
            state.metrics.record_success(rows, start.elapsed());
            info!(
                %request_id,
                rows,
                latency_ms = start.elapsed().as_secs_f64() * 1000.0,
                "prediction archive built"
            );
            Ok((
                [
                    (header::CONTENT_TYPE, "application/zip"),
                    (header::CONTENT_DISPOSITION, ARCHIVE_DISPOSITION),
                ],
                bytes,
            )
                .into_response())
        }
        Err(err) => {
            state.metrics.record_failure();
            Err(error_response(request_id, &err))
        }
    }
}

/// The full request pipeline: accept, predict, package.
///
/// Returns the archive bytes and the number of rows predicted.
async fn run_pipeline(
    state: &AppState,
    multipart: Multipart,
) -> Result<(Vec<u8>, usize), TarifaError> {
    let upload = read_upload(multipart).await?;
    let table = RawTable::from_xlsx(&upload)?;

    let model = state
        .model
        .as_ref()
        .ok_or_else(|| TarifaError::ModelUnavailable {
            reason: "model artifact did not load at startup".to_string(),
        })?;

    let predictions = predict_fares(model, &table)?;
    let bytes = archive::package(&table, &predictions)?;
    Ok((bytes, predictions.len()))
}

/// Pull the `file` field out of the multipart body.
///
/// The extension is checked before the field content is read, so a wrong
/// extension never reaches the spreadsheet parser.
async fn read_upload(mut multipart: Multipart) -> Result<Vec<u8>, TarifaError> {
    let malformed = |e: axum::extract::multipart::MultipartError| TarifaError::Parse {
        reason: format!("malformed multipart body: {e}"),
    };

    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        if !filename.to_ascii_lowercase().ends_with(ACCEPTED_EXTENSION) {
            return Err(TarifaError::UnsupportedFormat {
                reason: format!("expected a {ACCEPTED_EXTENSION} upload, got {filename:?}"),
            });
        }

        let bytes = field.bytes().await.map_err(malformed)?;
        return Ok(bytes.to_vec());
    }

    Err(TarifaError::Parse {
        reason: "multipart body has no 'file' field".to_string(),
    })
}

/// Convert a pipeline error into the status/message pair for the caller.
///
/// Bad-input errors carry their specific message. Anything internal answers
/// with a generic message; the original cause is logged here and goes no
/// further.
fn error_response(request_id: Uuid, err: &TarifaError) -> (StatusCode, Json<ErrorResponse>) {
    match err {
        TarifaError::UnsupportedFormat { .. }
        | TarifaError::Parse { .. }
        | TarifaError::DataFormat { .. } => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: err.to_string(),
            }),
        ),
        TarifaError::ModelUnavailable { .. } => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse {
                error: err.to_string(),
            }),
        ),
        other => {
            error!(%request_id, error = %other, "prediction pipeline failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "failed to generate predictions".to_string(),
                }),
            )
        }
    }
}
