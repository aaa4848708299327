//! HTTP interface.
//!
//! ENDPOINTS:
//! - POST /prioritize: `{"patients": [...]}` → ranked list, metrics, baseline
//! - GET /health: liveness probe, `{"status": "ok"}`
//!
//! Failures never carry a partial ranking. They map to:
//!
//! | Failure | Status |
//! |---------|--------|
//! | Malformed JSON | 400 |
//! | Missing `patients` / wrong shape | 422 |
//! | Missing JSON content type | 415 |
//! | Body over the size limit | 413 |
//! | Validation, duplicate ID, empty batch | 422 |
//! | Batch too large | 413 |
//! | Internal | 500 |
//!
//! CORS is permissive so the browser form can call from another origin.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};

use crate::error::EngineError;
use crate::pipeline::{PrioritizationResponse, Prioritizer};

/// The `POST /prioritize` request body.
///
/// Records stay untyped until the validator has checked them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrioritizeRequest {
    pub patients: Vec<Value>,
}

/// Error body: `{"error": "<code>", "detail": "<reason>"}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub detail: String,
}

#[derive(Clone)]
struct AppState {
    prioritizer: Arc<Prioritizer>,
}

/// Builds the router with CORS and shared state.
pub fn router(prioritizer: Prioritizer) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/prioritize", post(prioritize_handler))
        .layer(cors)
        .with_state(AppState {
            prioritizer: Arc::new(prioritizer),
        })
}

/// Serves until Ctrl-C.
///
/// # Errors
/// Returns an error if the address cannot be bound.
pub async fn serve(addr: SocketAddr, prioritizer: Prioritizer) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let local = listener.local_addr()?;

    log::info!("waitlist-fair listening on http://{}", local);
    log::info!("  - Prioritize endpoint: POST http://{}/prioritize", local);
    log::info!("  - Health endpoint:     GET  http://{}/health", local);

    axum::serve(listener, router(prioritizer))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("failed to listen for shutdown signal: {}", e);
        return;
    }
    log::info!("shutdown signal received");
}

async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn prioritize_handler(
    State(state): State<AppState>,
    payload: Result<Json<PrioritizeRequest>, JsonRejection>,
) -> Result<Json<PrioritizationResponse>, ApiError> {
    let Json(request) = payload?;
    log::debug!("received batch of {} records", request.patients.len());

    let prioritizer = Arc::clone(&state.prioritizer);
    let response = tokio::task::spawn_blocking(move || prioritizer.prioritize(&request.patients))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))??;

    log::info!(
        "ranked {} patients: top={} high={} equity_gap={:.4}",
        response.metrics.patient_count,
        response
            .prioritized
            .first()
            .map(|p| p.patient_id.as_str())
            .unwrap_or("-"),
        response.metrics.high_risk_count,
        response.metrics.equity_gap
    );

    Ok(Json(response))
}

/// Request-level failure.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The body could not be extracted; `status` comes from the rejection.
    #[error("malformed request: {detail}")]
    Malformed { status: StatusCode, detail: String },

    /// The engine rejected the batch.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// The scoring task failed unexpectedly.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Malformed {
            status: rejection.status(),
            detail: rejection.body_text(),
        }
    }
}

impl ApiError {
    /// HTTP status for this failure.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Malformed { status, .. } => *status,
            ApiError::Engine(EngineError::BatchTooLarge { .. }) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Engine(EngineError::InsufficientData) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Engine(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Malformed { status, .. } => match *status {
                StatusCode::PAYLOAD_TOO_LARGE => "payload_too_large",
                StatusCode::UNSUPPORTED_MEDIA_TYPE => "unsupported_media_type",
                _ => "malformed_request",
            },
            ApiError::Engine(e) => e.code(),
            ApiError::Internal(_) => "internal_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            log::error!("request failed: {}", self);
        } else {
            log::warn!("request rejected: {}", self);
        }

        let body = ErrorBody {
            error: self.code().to_string(),
            detail: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
