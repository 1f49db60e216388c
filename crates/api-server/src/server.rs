//! API server — serves the analytics REST endpoints and the Prometheus
//! metrics exporter.

use crate::reporting_rest;
use crate::rest::{self, AppState};
use axum::routing::{get, post};
use axum::Router;
use campaign_core::config::AppConfig;
use campaign_reporting::MetricStore;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Main API server for the analytics endpoints.
pub struct ApiServer {
    config: AppConfig,
    store: Arc<MetricStore>,
}

impl ApiServer {
    pub fn new(config: AppConfig, store: Arc<MetricStore>) -> Self {
        Self { config, store }
    }

    /// Build the router with all routes and middleware attached.
    pub fn router(&self) -> Router {
        let state = AppState::new(
            self.store.clone(),
            self.config.reporting.clone(),
            self.config.node_id.clone(),
        );

        Router::new()
            // Ingestion
            .route("/v1/metrics", post(reporting_rest::handle_ingest))
            // Campaign analytics
            .route("/v1/campaigns", get(reporting_rest::handle_list_campaigns))
            .route(
                "/v1/campaigns/:campaign_id/report",
                get(reporting_rest::handle_report),
            )
            .route(
                "/v1/campaigns/:campaign_id/forecast",
                get(reporting_rest::handle_forecast),
            )
            .route(
                "/v1/campaigns/:campaign_id/anomalies",
                get(reporting_rest::handle_anomalies),
            )
            .route(
                "/v1/campaigns/:campaign_id/optimization",
                get(reporting_rest::handle_optimization),
            )
            .route(
                "/v1/campaigns/:campaign_id/comparison",
                get(reporting_rest::handle_period_comparison),
            )
            .route(
                "/v1/platforms/comparison",
                get(reporting_rest::handle_platform_comparison),
            )
            // Operational endpoints
            .route("/health", get(rest::health_check))
            .route("/ready", get(rest::readiness))
            .route("/live", get(rest::liveness))
            // Middleware
            .layer(CompressionLayer::new())
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }

    /// Start the HTTP REST server.
    pub async fn start_http(&self) -> anyhow::Result<()> {
        let app = self.router();

        let addr = SocketAddr::new(self.config.api.host.parse()?, self.config.api.http_port);

        info!(addr = %addr, "Starting HTTP server");

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }

    /// Start the metrics server on a separate port.
    pub async fn start_metrics(&self) -> anyhow::Result<()> {
        if !self.config.metrics.enabled {
            info!("Metrics exporter disabled");
            return Ok(());
        }

        metrics_exporter_prometheus::PrometheusBuilder::new()
            .with_http_listener(SocketAddr::new(
                self.config.api.host.parse()?,
                self.config.metrics.port,
            ))
            .install()?;

        info!(port = self.config.metrics.port, "Metrics exporter started");
        Ok(())
    }
}
