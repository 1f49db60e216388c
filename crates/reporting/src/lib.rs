//! Campaign analytics and reporting — derived metrics, trends, forecasting,
//! recommendations, platform comparison and report export.

pub mod advanced;
pub mod anomaly;
pub mod comparison;
pub mod derived;
pub mod forecast;
pub mod recommendations;
pub mod report_builder;
pub mod store;
pub mod trends;

pub use advanced::{calculate_advanced_metrics, executive_summary, AdvancedMetrics};
pub use anomaly::{detect_anomalies, detect_latest_anomalies, Anomaly};
pub use comparison::{compare_platforms, PerformanceTier, PlatformComparison};
pub use derived::{aggregate, calculate_metrics, daily_totals, DerivedMetrics, MetricTotals};
pub use forecast::{forecast, project_daily, DailyProjection, ForecastResult};
pub use recommendations::{
    generate_recommendations, optimization_recommendations, OptimizationRecommendation,
};
pub use report_builder::{generate_report, AnalyticsReport, ExportFormat, ReportBuilder};
pub use store::MetricStore;
pub use trends::{calculate_trends, compare_periods, PeriodComparison, TrendMetrics};
