//! Shared REST state, error responses and operational endpoints.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use campaign_core::config::ReportingConfig;
use campaign_core::CampaignError;
use campaign_reporting::{MetricStore, ReportBuilder};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::error;

/// Shared application state for REST handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<MetricStore>,
    pub builder: Arc<ReportBuilder>,
    pub reporting: ReportingConfig,
    pub node_id: String,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(store: Arc<MetricStore>, reporting: ReportingConfig, node_id: String) -> Self {
        Self {
            builder: Arc::new(ReportBuilder::new(reporting.default_days_ahead)),
            store,
            reporting,
            node_id,
            start_time: Instant::now(),
        }
    }
}

pub type ApiResult<T> = Result<T, (StatusCode, Json<ErrorResponse>)>;

pub fn api_error(
    status: StatusCode,
    error: &str,
    message: impl Into<String>,
) -> (StatusCode, Json<ErrorResponse>) {
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
            message: message.into(),
        }),
    )
}

/// Map a domain error onto an HTTP status and error body.
pub fn campaign_error(e: &CampaignError) -> (StatusCode, Json<ErrorResponse>) {
    match e {
        CampaignError::Validation(msg) => {
            metrics::counter!("api.validation_errors").increment(1);
            api_error(StatusCode::BAD_REQUEST, "invalid_request", msg.clone())
        }
        CampaignError::NotFound(id) => api_error(
            StatusCode::NOT_FOUND,
            "campaign_not_found",
            format!("no metrics recorded for campaign '{id}'"),
        ),
        other => {
            error!(error = %other, "Request processing failed");
            metrics::counter!("api.errors").increment(1);
            api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "Internal processing error",
            )
        }
    }
}

/// GET /health — Health check endpoint.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        node_id: state.node_id.clone(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        campaigns: state.store.campaign_ids().len(),
        records: state.store.len(),
    })
}

/// GET /ready — Readiness probe for Kubernetes.
pub async fn readiness() -> StatusCode {
    StatusCode::OK
}

/// GET /live — Liveness probe for Kubernetes.
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub node_id: String,
    pub uptime_secs: u64,
    pub campaigns: usize,
    pub records: usize,
}
