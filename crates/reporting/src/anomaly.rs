//! Anomaly detection by relative deviation from a historical baseline.

use crate::derived::{aggregate, daily_totals, round2, DerivedMetrics};
use campaign_core::MetricRecord;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Relative deviation (0.3 = 30%) flagged when no threshold is configured.
pub const DEFAULT_THRESHOLD: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyDirection {
    High,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Anomaly {
    pub metric: String,
    pub direction: Option<AnomalyDirection>,
    pub current: f64,
    pub baseline: f64,
    /// Relative deviation from the baseline; 0 for absolute checks.
    pub deviation: f64,
    pub message: String,
}

/// Compare `current` against `baseline` and flag every metric whose relative
/// deviation exceeds `threshold`.
///
/// Metrics with a zero baseline have no relative deviation and are skipped.
/// Zero impressions is always flagged.
pub fn detect_anomalies(
    current: &DerivedMetrics,
    baseline: &DerivedMetrics,
    threshold: f64,
) -> Vec<Anomaly> {
    let checks = [
        ("ctr", "CTR", current.ctr, baseline.ctr),
        ("cpc", "CPC", current.cpc, baseline.cpc),
        (
            "conversionRate",
            "Conversion rate",
            current.conversion_rate,
            baseline.conversion_rate,
        ),
    ];

    let mut anomalies: Vec<Anomaly> = checks
        .into_iter()
        .filter(|(_, _, _, base)| *base != 0.0)
        .filter_map(|(key, label, cur, base)| {
            let deviation = (cur - base).abs() / base.abs();
            if deviation <= threshold {
                return None;
            }
            let direction = if cur > base {
                AnomalyDirection::High
            } else {
                AnomalyDirection::Low
            };
            let word = match direction {
                AnomalyDirection::High => "high",
                AnomalyDirection::Low => "low",
            };
            Some(Anomaly {
                metric: key.to_string(),
                direction: Some(direction),
                current: cur,
                baseline: base,
                deviation: round2(deviation),
                message: format!("{label} abnormally {word}"),
            })
        })
        .collect();

    if current.total_impressions == 0 {
        anomalies.push(Anomaly {
            metric: "impressions".to_string(),
            direction: None,
            current: 0.0,
            baseline: baseline.total_impressions as f64,
            deviation: 0.0,
            message: "No impressions recorded".to_string(),
        });
    }

    anomalies
}

/// Mean of the per-sample ratios (each rounded to 2 places).
///
/// Totals are summed, so only the ratio fields are meaningful as a baseline.
pub fn historical_average(samples: &[DerivedMetrics]) -> DerivedMetrics {
    if samples.is_empty() {
        return DerivedMetrics::default();
    }
    let n = samples.len() as f64;
    let mean = |f: fn(&DerivedMetrics) -> f64| round2(samples.iter().map(f).sum::<f64>() / n);

    DerivedMetrics {
        total_impressions: samples.iter().map(|m| m.total_impressions).sum(),
        total_clicks: samples.iter().map(|m| m.total_clicks).sum(),
        total_conversions: samples.iter().map(|m| m.total_conversions).sum(),
        total_spend: samples.iter().map(|m| m.total_spend).sum(),
        total_revenue: samples.iter().map(|m| m.total_revenue).sum(),
        ctr: mean(|m| m.ctr),
        conversion_rate: mean(|m| m.conversion_rate),
        cpc: mean(|m| m.cpc),
        cpa: mean(|m| m.cpa),
        roas: mean(|m| m.roas),
        roi: mean(|m| m.roi),
    }
}

/// Daily derived metrics, keyed and ordered by calendar day (UTC).
pub fn daily_metrics(records: &[MetricRecord]) -> Vec<(NaiveDate, DerivedMetrics)> {
    daily_totals(records)
        .iter()
        .map(|day| (day.date.date_naive(), DerivedMetrics::from_totals(&aggregate([day]))))
        .collect()
}

/// Check the most recent day against the average of all earlier days.
///
/// Needs at least two distinct days of data.
pub fn detect_latest_anomalies(records: &[MetricRecord], threshold: f64) -> Vec<Anomaly> {
    let daily = daily_metrics(records);
    let Some(((_, latest), history)) = daily.split_last() else {
        return Vec::new();
    };
    if history.is_empty() {
        return Vec::new();
    }

    let samples: Vec<DerivedMetrics> = history.iter().map(|(_, m)| *m).collect();
    detect_anomalies(latest, &historical_average(&samples), threshold)
}
