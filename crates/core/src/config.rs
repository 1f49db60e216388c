use serde::Deserialize;

/// Root application configuration. Loaded from environment variables
/// with the prefix `CAMPAIGN_INSIGHTS__`.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_node_id")]
    pub node_id: String,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub reporting: ReportingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_http_port")]
    pub http_port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "default_metrics_enabled")]
    pub enabled: bool,
    #[serde(default = "default_metrics_port")]
    pub port: u16,
}

// Default functions
fn default_node_id() -> String {
    "node-01".to_string()
}
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_http_port() -> u16 {
    8080
}
fn default_metrics_enabled() -> bool {
    true
}
fn default_metrics_port() -> u16 {
    9091
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            http_port: default_http_port(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_metrics_enabled(),
            port: default_metrics_port(),
        }
    }
}

// ─── Reporting Config ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct ReportingConfig {
    /// Forecast horizon used when a request does not name one.
    #[serde(default = "default_days_ahead")]
    pub default_days_ahead: u32,
    /// Upper bound accepted for a requested forecast horizon.
    #[serde(default = "default_max_days_ahead")]
    pub max_days_ahead: u32,
    /// Relative deviation from the historical average that counts as an anomaly.
    #[serde(default = "default_anomaly_threshold")]
    pub anomaly_threshold: f64,
    /// Records retained per campaign; the oldest are evicted first.
    #[serde(default = "default_max_records_per_campaign")]
    pub max_records_per_campaign: usize,
    /// Largest ingestion batch accepted in one request.
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,
}

fn default_days_ahead() -> u32 { 7 }
fn default_max_days_ahead() -> u32 { 365 }
fn default_anomaly_threshold() -> f64 { 0.3 }
fn default_max_records_per_campaign() -> usize { 10_000 }
fn default_max_batch_size() -> usize { 5_000 }

impl Default for ReportingConfig {
    fn default() -> Self {
        Self {
            default_days_ahead: default_days_ahead(),
            max_days_ahead: default_max_days_ahead(),
            anomaly_threshold: default_anomaly_threshold(),
            max_records_per_campaign: default_max_records_per_campaign(),
            max_batch_size: default_max_batch_size(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            node_id: default_node_id(),
            api: ApiConfig::default(),
            metrics: MetricsConfig::default(),
            reporting: ReportingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder().add_source(
            config::Environment::with_prefix("CAMPAIGN_INSIGHTS")
                .separator("__")
                .try_parsing(true)
                .list_separator(","),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Load configuration from a TOML file, with environment variables
    /// taking precedence over file values.
    pub fn load_from(path: &str) -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("CAMPAIGN_INSIGHTS")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(","),
            );

        builder.build()?.try_deserialize()
    }
}
