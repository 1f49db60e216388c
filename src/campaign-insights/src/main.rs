//! Campaign Insights — campaign performance analytics and reporting service.
//!
//! Main entry point that loads configuration, optionally seeds the metric
//! store and starts the HTTP and metrics servers.

use anyhow::Context;
use campaign_api::ApiServer;
use campaign_core::config::AppConfig;
use campaign_core::MetricRecord;
use campaign_reporting::MetricStore;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "campaign-insights")]
#[command(about = "Campaign performance analytics and reporting service")]
#[command(version)]
struct Cli {
    /// Configuration file (TOML/YAML/JSON), layered under environment overrides
    #[arg(long, env = "CAMPAIGN_INSIGHTS_CONFIG")]
    config: Option<String>,

    /// Node identifier (overrides config)
    #[arg(long, env = "CAMPAIGN_INSIGHTS__NODE_ID")]
    node_id: Option<String>,

    /// HTTP port (overrides config)
    #[arg(long, env = "CAMPAIGN_INSIGHTS__API__HTTP_PORT")]
    http_port: Option<u16>,

    /// Prometheus exporter port (overrides config)
    #[arg(long, env = "CAMPAIGN_INSIGHTS__METRICS__PORT")]
    metrics_port: Option<u16>,

    /// JSON array of metric records to load before serving
    #[arg(long)]
    seed: Option<PathBuf>,
}

fn load_seed(store: &MetricStore, path: &PathBuf) -> anyhow::Result<usize> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading seed file {}", path.display()))?;
    let records: Vec<MetricRecord> = serde_json::from_str(&raw)
        .with_context(|| format!("parsing seed file {}", path.display()))?;
    Ok(store.record_batch(records)?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "campaign_insights=info,campaign_api=info,campaign_reporting=info,tower_http=info"
                    .into()
            }),
        )
        .json()
        .init();

    let cli = Cli::parse();

    info!("Campaign Insights starting up");

    let loaded = match &cli.config {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    };
    let mut config = loaded.unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });

    if let Some(node_id) = cli.node_id {
        config.node_id = node_id;
    }
    if let Some(port) = cli.http_port {
        config.api.http_port = port;
    }
    if let Some(port) = cli.metrics_port {
        config.metrics.port = port;
    }

    info!(
        node_id = %config.node_id,
        http_port = config.api.http_port,
        metrics_port = config.metrics.port,
        max_records_per_campaign = config.reporting.max_records_per_campaign,
        "Configuration loaded"
    );

    let store = Arc::new(MetricStore::new(config.reporting.max_records_per_campaign));

    if let Some(path) = &cli.seed {
        let loaded = load_seed(&store, path)?;
        info!(
            records = loaded,
            campaigns = store.campaign_ids().len(),
            "Seed metrics loaded"
        );
    }

    let api_server = ApiServer::new(config, store);

    if let Err(e) = api_server.start_metrics().await {
        error!(error = %e, "Failed to start metrics exporter");
    }

    info!("Campaign Insights is ready to serve traffic");

    api_server.start_http().await?;

    Ok(())
}
