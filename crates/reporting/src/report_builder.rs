//! Report assembly — combine metrics, trends, forecast and recommendations
//! into an analytics report and export it as JSON or CSV.

use crate::forecast::{forecast, ForecastResult, DEFAULT_DAYS_AHEAD};
use crate::derived::{calculate_metrics, daily_totals, DerivedMetrics};
use crate::recommendations::generate_recommendations;
use crate::trends::{calculate_trends, TrendMetrics};
use campaign_core::MetricRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};
use uuid::Uuid;

// ─── Types ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
}

impl ExportFormat {
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Csv => "text/csv; charset=utf-8",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportPeriod {
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
    pub report_id: Uuid,
    pub campaign_id: String,
    /// First and last record dates; `None` when there were no records.
    pub period: Option<ReportPeriod>,
    pub metrics: DerivedMetrics,
    pub trends: TrendMetrics,
    pub forecast: ForecastResult,
    pub recommendations: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

// ─── Report Builder ─────────────────────────────────────────────────────────

pub struct ReportBuilder {
    default_days_ahead: u32,
}

impl ReportBuilder {
    pub fn new(default_days_ahead: u32) -> Self {
        Self { default_days_ahead }
    }

    /// Build a report for `campaign_id`.
    ///
    /// `current` may arrive in any order. The forecast is fitted over one
    /// campaign-wide total per day, so several platforms reporting on the
    /// same day count as a single sample. Without previous-period records
    /// every trend is 0.
    pub fn generate(
        &self,
        campaign_id: &str,
        current: &[MetricRecord],
        previous: Option<&[MetricRecord]>,
        days_ahead: Option<u32>,
    ) -> AnalyticsReport {
        let mut ordered = current.to_vec();
        ordered.sort_by_key(|r| r.date);

        let metrics = calculate_metrics(&ordered);
        let trends = match previous {
            Some(prev) if !prev.is_empty() => calculate_trends(&ordered, prev),
            _ => TrendMetrics::default(),
        };
        let days_ahead = days_ahead.unwrap_or(self.default_days_ahead);
        let forecast = forecast(&daily_totals(&ordered), days_ahead);
        let recommendations = generate_recommendations(&metrics, &trends);

        let period = match (ordered.first(), ordered.last()) {
            (Some(first), Some(last)) => Some(ReportPeriod {
                start_date: first.date,
                end_date: last.date,
            }),
            _ => None,
        };

        metrics::counter!("reporting.reports_generated").increment(1);
        debug!(
            campaign_id,
            records = ordered.len(),
            days_ahead,
            recommendations = recommendations.len(),
            "Analytics report generated"
        );

        AnalyticsReport {
            report_id: Uuid::new_v4(),
            campaign_id: campaign_id.to_string(),
            period,
            metrics,
            trends,
            forecast,
            recommendations,
            generated_at: Utc::now(),
        }
    }
}

impl Default for ReportBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_DAYS_AHEAD)
    }
}

/// Build a report with the default forecast horizon when none is given.
pub fn generate_report(
    campaign_id: &str,
    current: &[MetricRecord],
    previous: Option<&[MetricRecord]>,
    days_ahead: Option<u32>,
) -> AnalyticsReport {
    ReportBuilder::default().generate(campaign_id, current, previous, days_ahead)
}

// ─── Export ─────────────────────────────────────────────────────────────────

impl AnalyticsReport {
    pub fn export(&self, format: ExportFormat) -> String {
        match format {
            ExportFormat::Json => self.to_json(),
            ExportFormat::Csv => self.to_csv(),
        }
    }

    /// Pretty-printed JSON dump of the whole report.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| {
            error!(error = %e, campaign_id = %self.campaign_id, "Failed to serialize report");
            "{}".to_string()
        })
    }

    /// Sectioned CSV: header, metrics, trends, forecast, recommendations.
    pub fn to_csv(&self) -> String {
        let mut lines: Vec<String> = Vec::new();

        lines.push("Campaign Analytics Report".into());
        lines.push(format!("Campaign ID,{}", csv_field(&self.campaign_id)));
        lines.push(match &self.period {
            Some(p) => format!(
                "Period,\"{} to {}\"",
                p.start_date.to_rfc3339(),
                p.end_date.to_rfc3339()
            ),
            None => "Period,\"n/a\"".into(),
        });

        lines.push(String::new());
        lines.push("Metrics".into());
        lines.push("Metric,Value".into());
        for (key, value) in self.metrics.entries() {
            lines.push(format!("{key},{value}"));
        }

        lines.push(String::new());
        lines.push("Trends".into());
        lines.push("Metric,Percentage Change".into());
        for (key, value) in self.trends.entries() {
            lines.push(format!("{key},{value}%"));
        }

        lines.push(String::new());
        lines.push("Forecast".into());
        lines.push("Metric,Value".into());
        for (key, value) in self.forecast.entries() {
            lines.push(format!("{key},{value}"));
        }

        lines.push(String::new());
        lines.push("Recommendations".into());
        for rec in &self.recommendations {
            lines.push(format!("\"{}\"", rec.replace('"', "\"\"")));
        }

        lines.join("\n")
    }
}

/// Quote a free-text cell when it would otherwise break the row.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn history(points: &[(u64, u64, u64, f64, f64)]) -> Vec<MetricRecord> {
        let start = Utc.with_ymd_and_hms(2024, 10, 1, 0, 0, 0).unwrap();
        points
            .iter()
            .enumerate()
            .map(|(i, &(impressions, clicks, conversions, spend, revenue))| MetricRecord {
                campaign_id: "cmp-42".into(),
                date: start + Duration::days(i as i64),
                impressions,
                clicks,
                conversions,
                spend,
                revenue,
                platform: "google_ads".into(),
            })
            .collect()
    }

    fn sample() -> Vec<MetricRecord> {
        history(&[
            (1000, 10, 1, 100.0, 150.0),
            (1000, 10, 1, 110.0, 165.0),
            (1000, 10, 1, 120.0, 180.0),
        ])
    }

    #[test]
    fn test_generate_report() {
        let report = generate_report("cmp-42", &sample(), None, Some(1));
        assert_eq!(report.campaign_id, "cmp-42");
        assert_eq!(report.metrics.total_spend, 330.0);
        assert_eq!(report.metrics.roi, 50.0);
        assert_eq!(report.trends, TrendMetrics::default());
        assert_eq!(report.forecast.projected_spend, 130.0);
        assert_eq!(report.forecast.projected_revenue, 195.0);
        assert_eq!(report.forecast.confidence, 65);

        let period = report.period.unwrap();
        assert_eq!(period.start_date, Utc.with_ymd_and_hms(2024, 10, 1, 0, 0, 0).unwrap());
        assert_eq!(period.end_date, Utc.with_ymd_and_hms(2024, 10, 3, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_unordered_input_is_sorted_before_forecast() {
        let mut shuffled = sample();
        shuffled.swap(0, 2);
        let report = generate_report("cmp-42", &shuffled, None, Some(1));
        assert_eq!(report.forecast.projected_spend, 130.0);
        assert!(report.period.unwrap().start_date < report.period.unwrap().end_date);
    }

    #[test]
    fn test_forecast_uses_daily_totals_across_platforms() {
        let google = sample();
        let meta: Vec<MetricRecord> = google
            .iter()
            .map(|r| MetricRecord {
                platform: "meta_ads".into(),
                spend: 100.0,
                revenue: 150.0,
                ..r.clone()
            })
            .collect();

        let mut google_first = google.clone();
        google_first.extend(meta.iter().cloned());
        let mut meta_first = meta.clone();
        meta_first.extend(google.iter().cloned());

        let a = generate_report("cmp-42", &google_first, None, Some(1));
        let b = generate_report("cmp-42", &meta_first, None, Some(1));
        assert_eq!(a.forecast, b.forecast);
        // Daily spend 200, 210, 220.
        assert_eq!(a.forecast.projected_spend, 230.0);
        assert_eq!(a.forecast.confidence, 65);
        assert_eq!(a.metrics.total_spend, 630.0);
    }

    #[test]
    fn test_previous_period_drives_trends_and_advice() {
        let current = history(&[(1000, 5, 0, 50.0, 0.0)]);
        let previous = history(&[(1000, 10, 0, 50.0, 0.0)]);
        let report = generate_report("cmp-42", &current, Some(previous.as_slice()), None);
        assert_eq!(report.trends.clicks_trend, -50.0);
        assert!(report
            .recommendations
            .iter()
            .any(|r| r.starts_with("Clicks are declining")));
    }

    #[test]
    fn test_default_days_ahead() {
        let builder = ReportBuilder::new(3);
        let report = builder.generate("cmp-42", &sample(), None, None);
        assert_eq!(report.forecast.projected_spend, 150.0);
    }

    #[test]
    fn test_empty_report() {
        let report = generate_report("cmp-empty", &[], Some(&[][..]), None);
        assert!(report.period.is_none());
        assert_eq!(report.metrics, DerivedMetrics::default());
        assert_eq!(report.forecast, ForecastResult::default());
        assert!(report.recommendations.is_empty());
    }

    #[test]
    fn test_generation_is_idempotent_on_computed_fields() {
        let records = sample();
        let a = generate_report("cmp-42", &records, Some(&records[..1]), Some(7));
        let b = generate_report("cmp-42", &records, Some(&records[..1]), Some(7));
        assert_eq!(a.campaign_id, b.campaign_id);
        assert_eq!(a.period, b.period);
        assert_eq!(a.metrics, b.metrics);
        assert_eq!(a.trends, b.trends);
        assert_eq!(a.forecast, b.forecast);
        assert_eq!(a.recommendations, b.recommendations);
    }

    #[test]
    fn test_json_round_trip() {
        let report = generate_report("cmp-42", &sample(), None, None);
        let json = report.to_json();
        let parsed: AnalyticsReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, report);

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["metrics"]["totalSpend"], 330.0);
        assert_eq!(value["metrics"]["conversionRate"], 10.0);
        assert_eq!(value["forecast"]["projectedROI"], report.forecast.projected_roi);
        assert!(value["period"]["startDate"].is_string());
    }

    #[test]
    fn test_csv_layout() {
        let report = generate_report("cmp-42", &sample(), None, Some(1));
        let csv = report.to_csv();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "Campaign Analytics Report");
        assert_eq!(lines[1], "Campaign ID,cmp-42");
        assert_eq!(
            lines[2],
            "Period,\"2024-10-01T00:00:00+00:00 to 2024-10-03T00:00:00+00:00\""
        );
        assert_eq!(lines[3], "");
        assert_eq!(lines[4], "Metrics");
        assert_eq!(lines[5], "Metric,Value");
        assert_eq!(lines[6], "totalImpressions,3000");
        assert!(lines.contains(&"roi,50"));
        assert!(lines.contains(&"Metric,Percentage Change"));
        assert!(lines.contains(&"clicksTrend,0%"));
        assert!(lines.contains(&"projectedSpend,130"));
        assert!(lines.contains(&"confidence,65"));

        let rec_header = lines.iter().position(|l| *l == "Recommendations").unwrap();
        assert_eq!(lines.len() - rec_header - 1, report.recommendations.len());
        for line in &lines[rec_header + 1..] {
            assert!(line.starts_with('"') && line.ends_with('"'));
        }
    }

    #[test]
    fn test_csv_escapes_quotes_and_commas() {
        let mut report = generate_report("cmp,\"x\"", &[], None, None);
        report.recommendations = vec!["Say \"hi\"".into()];
        let csv = report.to_csv();
        assert!(csv.contains("Campaign ID,\"cmp,\"\"x\"\"\""));
        assert!(csv.contains("Period,\"n/a\""));
        assert!(csv.ends_with("\"Say \"\"hi\"\"\""));
    }

    #[test]
    fn test_export_dispatch() {
        let report = generate_report("cmp-42", &sample(), None, None);
        assert!(report.export(ExportFormat::Csv).starts_with("Campaign Analytics Report"));
        assert!(report.export(ExportFormat::Json).starts_with('{'));
        assert_eq!(ExportFormat::Csv.content_type(), "text/csv; charset=utf-8");
    }
}
