//! Campaign analytics REST API endpoints.

use crate::rest::{api_error, campaign_error, ApiResult, AppState};
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use campaign_core::{CampaignError, DateRange, MetricRecord};
use campaign_reporting::anomaly::{detect_latest_anomalies, Anomaly};
use campaign_reporting::trends::PeriodComparison;
use campaign_reporting::{
    calculate_advanced_metrics, calculate_metrics, compare_periods, compare_platforms, daily_totals,
    executive_summary, forecast, optimization_recommendations, project_daily, AdvancedMetrics,
    DailyProjection, ExportFormat, ForecastResult, OptimizationRecommendation,
    PlatformComparison,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

// ─── Request / response types ───────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct IngestRequest {
    pub records: Vec<MetricRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestResponse {
    pub accepted: usize,
}

#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub previous_start: Option<DateTime<Utc>>,
    pub previous_end: Option<DateTime<Utc>>,
    pub days_ahead: Option<u32>,
    #[serde(default)]
    pub format: ExportFormat,
}

#[derive(Debug, Deserialize)]
pub struct ForecastQuery {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub days_ahead: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastResponse {
    pub campaign_id: String,
    pub days_ahead: u32,
    pub forecast: ForecastResult,
    pub daily: Vec<DailyProjection>,
}

#[derive(Debug, Deserialize)]
pub struct AnomalyQuery {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub threshold: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnomalyResponse {
    pub campaign_id: String,
    pub threshold: f64,
    pub anomalies: Vec<Anomaly>,
}

#[derive(Debug, Deserialize)]
pub struct OptimizationQuery {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    /// Hour of day the campaign mostly delivers in.
    pub hour: Option<u32>,
    /// Display name for the executive summary; defaults to the campaign id.
    pub name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationResponse {
    pub campaign_id: String,
    pub metrics: AdvancedMetrics,
    pub recommendations: Vec<OptimizationRecommendation>,
    pub summary: String,
}

#[derive(Debug, Deserialize)]
pub struct ComparisonQuery {
    /// Records before `split` form the previous period, the rest the current.
    pub split: DateTime<Utc>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct PlatformQuery {
    pub campaign_id: Option<String>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

// ─── Helpers ────────────────────────────────────────────────────────────────

fn campaign_records(
    state: &AppState,
    campaign_id: &str,
    range: &DateRange,
) -> ApiResult<Vec<MetricRecord>> {
    state
        .store
        .query(campaign_id, range)
        .ok_or_else(|| campaign_error(&CampaignError::NotFound(campaign_id.to_string())))
}

fn resolve_days_ahead(state: &AppState, requested: Option<u32>) -> ApiResult<u32> {
    let days = requested.unwrap_or(state.reporting.default_days_ahead);
    if days > state.reporting.max_days_ahead {
        metrics::counter!("api.validation_errors").increment(1);
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "invalid_request",
            format!(
                "'days_ahead' must be at most {}",
                state.reporting.max_days_ahead
            ),
        ));
    }
    Ok(days)
}

// ─── Handlers ───────────────────────────────────────────────────────────────

/// POST /v1/metrics — Ingest a batch of daily metric records.
pub async fn handle_ingest(
    State(state): State<AppState>,
    Json(request): Json<IngestRequest>,
) -> ApiResult<(StatusCode, Json<IngestResponse>)> {
    if request.records.is_empty() {
        return Err(campaign_error(&CampaignError::Validation(
            "batch must contain at least one record".into(),
        )));
    }
    if request.records.len() > state.reporting.max_batch_size {
        return Err(campaign_error(&CampaignError::Validation(format!(
            "batch exceeds maximum of {} records",
            state.reporting.max_batch_size
        ))));
    }

    let accepted = state.store.record_batch(request.records).map_err(|e| {
        warn!(error = %e, "Metric batch rejected");
        campaign_error(&e)
    })?;

    metrics::counter!("api.metrics_ingested").increment(accepted as u64);
    info!(accepted, "Metric batch ingested");
    Ok((StatusCode::ACCEPTED, Json(IngestResponse { accepted })))
}

/// GET /v1/campaigns/:campaign_id/report — Analytics report as JSON or CSV.
pub async fn handle_report(
    State(state): State<AppState>,
    Path(campaign_id): Path<String>,
    Query(query): Query<ReportQuery>,
) -> ApiResult<Response> {
    let days_ahead = resolve_days_ahead(&state, query.days_ahead)?;
    let current = campaign_records(&state, &campaign_id, &DateRange::new(query.start, query.end))?;

    let previous_range = DateRange::new(query.previous_start, query.previous_end);
    let previous = if previous_range.is_unbounded() {
        None
    } else {
        state.store.query(&campaign_id, &previous_range)
    };

    let report = state
        .builder
        .generate(&campaign_id, &current, previous.as_deref(), Some(days_ahead));

    metrics::counter!("api.reports_served").increment(1);
    Ok((
        [(header::CONTENT_TYPE, query.format.content_type())],
        report.export(query.format),
    )
        .into_response())
}

/// GET /v1/campaigns/:campaign_id/forecast — Aggregate and day-by-day forecast
/// over the campaign's daily totals.
pub async fn handle_forecast(
    State(state): State<AppState>,
    Path(campaign_id): Path<String>,
    Query(query): Query<ForecastQuery>,
) -> ApiResult<Json<ForecastResponse>> {
    let days_ahead = resolve_days_ahead(&state, query.days_ahead)?;
    let records = campaign_records(&state, &campaign_id, &DateRange::new(query.start, query.end))?;
    let daily = daily_totals(&records);

    Ok(Json(ForecastResponse {
        forecast: forecast(&daily, days_ahead),
        daily: project_daily(&daily, days_ahead),
        campaign_id,
        days_ahead,
    }))
}

/// GET /v1/campaigns/:campaign_id/anomalies — Latest day against history.
pub async fn handle_anomalies(
    State(state): State<AppState>,
    Path(campaign_id): Path<String>,
    Query(query): Query<AnomalyQuery>,
) -> ApiResult<Json<AnomalyResponse>> {
    let threshold = query.threshold.unwrap_or(state.reporting.anomaly_threshold);
    if !threshold.is_finite() || threshold < 0.0 {
        return Err(campaign_error(&CampaignError::Validation(
            "'threshold' must be a finite, non-negative ratio".into(),
        )));
    }
    let records = campaign_records(&state, &campaign_id, &DateRange::new(query.start, query.end))?;

    let anomalies = detect_latest_anomalies(&records, threshold);
    if !anomalies.is_empty() {
        metrics::counter!("api.anomalies_detected").increment(anomalies.len() as u64);
    }
    Ok(Json(AnomalyResponse {
        campaign_id,
        threshold,
        anomalies,
    }))
}

/// GET /v1/campaigns/:campaign_id/optimization — Advanced metrics, typed
/// recommendations and an executive summary.
pub async fn handle_optimization(
    State(state): State<AppState>,
    Path(campaign_id): Path<String>,
    Query(query): Query<OptimizationQuery>,
) -> ApiResult<Json<OptimizationResponse>> {
    if query.hour.is_some_and(|h| h > 23) {
        return Err(campaign_error(&CampaignError::Validation(
            "'hour' must be between 0 and 23".into(),
        )));
    }
    let records = campaign_records(&state, &campaign_id, &DateRange::new(query.start, query.end))?;

    let metrics = calculate_advanced_metrics(&records);
    let recommendations = optimization_recommendations(&campaign_id, &metrics, query.hour);
    let name = query.name.as_deref().unwrap_or(&campaign_id);
    let summary = executive_summary(name, &metrics, &recommendations, Utc::now());

    Ok(Json(OptimizationResponse {
        campaign_id,
        metrics,
        recommendations,
        summary,
    }))
}

/// GET /v1/campaigns/:campaign_id/comparison — Previous vs current period.
pub async fn handle_period_comparison(
    State(state): State<AppState>,
    Path(campaign_id): Path<String>,
    Query(query): Query<ComparisonQuery>,
) -> ApiResult<Json<PeriodComparison>> {
    let records = campaign_records(&state, &campaign_id, &DateRange::new(query.start, query.end))?;
    let (previous, current): (Vec<MetricRecord>, Vec<MetricRecord>) =
        records.into_iter().partition(|r| r.date < query.split);

    Ok(Json(compare_periods(
        &campaign_id,
        &calculate_metrics(&current),
        &calculate_metrics(&previous),
    )))
}

/// GET /v1/platforms/comparison — Per-platform performance ranked by ROI.
pub async fn handle_platform_comparison(
    State(state): State<AppState>,
    Query(query): Query<PlatformQuery>,
) -> ApiResult<Json<Vec<PlatformComparison>>> {
    let range = DateRange::new(query.start, query.end);
    let records = match &query.campaign_id {
        Some(id) => campaign_records(&state, id, &range)?,
        None => state.store.all(&range),
    };
    Ok(Json(compare_platforms(&records)))
}

/// GET /v1/campaigns — Campaign ids with stored metrics.
pub async fn handle_list_campaigns(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.store.campaign_ids())
}
