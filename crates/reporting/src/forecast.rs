//! Linear spend/revenue forecasting.
//!
//! Fits an ordinary least-squares slope over the index position of each
//! sample (not its date) and extrapolates from the last observed value.
//! The confidence figure is a sample-count heuristic, not a statistical
//! interval.

use crate::derived::{roi_percent, round2};
use campaign_core::MetricRecord;
use serde::{Deserialize, Serialize};

/// Horizon used when the caller does not pick one.
pub const DEFAULT_DAYS_AHEAD: u32 = 7;

/// Samples needed before a slope is meaningful.
const MIN_SAMPLES: usize = 2;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastResult {
    pub projected_revenue: f64,
    pub projected_spend: f64,
    #[serde(rename = "projectedROI")]
    pub projected_roi: f64,
    /// Heuristic 0-100 score.
    pub confidence: u32,
}

impl ForecastResult {
    pub fn entries(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("projectedRevenue", self.projected_revenue),
            ("projectedSpend", self.projected_spend),
            ("projectedROI", self.projected_roi),
            ("confidence", f64::from(self.confidence)),
        ]
    }
}

/// One day of a day-by-day projection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyProjection {
    /// Days after the last observed sample, starting at 1.
    pub day: u32,
    pub spend: f64,
    pub revenue: f64,
    pub roi: f64,
}

/// Least-squares slope of `values` against their index.
///
/// `slope = Σ((i - x̄)(yᵢ - ȳ)) / Σ((i - x̄)²)` with `x̄ = (n - 1) / 2`.
pub fn slope(values: &[f64]) -> f64 {
    let n = values.len();
    if n < MIN_SAMPLES {
        return 0.0;
    }

    let x_mean = (n - 1) as f64 / 2.0;
    let y_mean = values.iter().sum::<f64>() / n as f64;

    let (numerator, denominator) =
        values
            .iter()
            .enumerate()
            .fold((0.0, 0.0), |(num, den), (i, y)| {
                let dx = i as f64 - x_mean;
                (num + dx * (y - y_mean), den + dx * dx)
            });

    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// `last + slope * days_ahead`, or 0 for an empty series.
pub fn extrapolate(values: &[f64], days_ahead: u32) -> f64 {
    match values.last() {
        Some(last) => last + slope(values) * f64::from(days_ahead),
        None => 0.0,
    }
}

/// `min(100, max(0, 50 + 5n))`.
pub fn confidence(samples: usize) -> u32 {
    let raw = 50u64.saturating_add((samples as u64).saturating_mul(5));
    raw.min(100) as u32
}

/// Project spend, revenue and ROI `days_ahead` days past the last record.
///
/// Records are taken in the order given; callers pass them sorted by date.
pub fn forecast(records: &[MetricRecord], days_ahead: u32) -> ForecastResult {
    if records.len() < MIN_SAMPLES {
        return ForecastResult::default();
    }

    let (spend, revenue) = series(records);
    let projected_spend = extrapolate(&spend, days_ahead);
    let projected_revenue = extrapolate(&revenue, days_ahead);
    let projected_roi = if projected_spend > 0.0 {
        roi_percent(projected_revenue, projected_spend)
    } else {
        0.0
    };

    ForecastResult {
        projected_revenue: round2(projected_revenue),
        projected_spend: round2(projected_spend),
        projected_roi: round2(projected_roi),
        confidence: confidence(records.len()),
    }
}

/// Day-by-day projection for days `1..=days_ahead`. Empty when there are
/// fewer than two records.
pub fn project_daily(records: &[MetricRecord], days_ahead: u32) -> Vec<DailyProjection> {
    if records.len() < MIN_SAMPLES {
        return Vec::new();
    }

    let (spend, revenue) = series(records);
    (1..=days_ahead)
        .map(|day| {
            let s = extrapolate(&spend, day);
            let r = extrapolate(&revenue, day);
            DailyProjection {
                day,
                spend: round2(s),
                revenue: round2(r),
                roi: if s > 0.0 { round2(roi_percent(r, s)) } else { 0.0 },
            }
        })
        .collect()
}

fn series(records: &[MetricRecord]) -> (Vec<f64>, Vec<f64>) {
    records.iter().map(|r| (r.spend, r.revenue)).unzip()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn history(points: &[(f64, f64)]) -> Vec<MetricRecord> {
        let start = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        points
            .iter()
            .enumerate()
            .map(|(i, (spend, revenue))| MetricRecord {
                campaign_id: "cmp-1".into(),
                date: start + Duration::days(i as i64),
                impressions: 1000,
                clicks: 10,
                conversions: 1,
                spend: *spend,
                revenue: *revenue,
                platform: "google_ads".into(),
            })
            .collect()
    }

    #[test]
    fn test_slope_of_linear_series() {
        assert_eq!(slope(&[100.0, 110.0, 120.0]), 10.0);
        assert_eq!(slope(&[5.0, 3.0, 1.0, -1.0]), -2.0);
    }

    #[test]
    fn test_slope_degenerate_inputs() {
        assert_eq!(slope(&[]), 0.0);
        assert_eq!(slope(&[42.0]), 0.0);
        assert_eq!(slope(&[7.0, 7.0, 7.0]), 0.0);
    }

    #[test]
    fn test_one_day_forecast_extends_line() {
        let records = history(&[(100.0, 200.0), (110.0, 220.0), (120.0, 240.0)]);
        let f = forecast(&records, 1);
        assert_eq!(f.projected_spend, 130.0);
        assert_eq!(f.projected_revenue, 260.0);
        assert_eq!(f.projected_roi, 100.0);
        assert_eq!(f.confidence, 65);
    }

    #[test]
    fn test_fewer_than_two_points_is_zeroed() {
        assert_eq!(forecast(&[], 7), ForecastResult::default());
        let one = history(&[(100.0, 500.0)]);
        let f = forecast(&one, 7);
        assert_eq!(f, ForecastResult::default());
        assert_eq!(f.confidence, 0);
    }

    #[test]
    fn test_confidence_heuristic_caps_at_100() {
        assert_eq!(confidence(2), 60);
        assert_eq!(confidence(10), 100);
        assert_eq!(confidence(1_000), 100);
    }

    #[test]
    fn test_non_positive_projected_spend_gives_zero_roi() {
        // Spend falls 50/day; a week out it is negative.
        let records = history(&[(100.0, 10.0), (50.0, 10.0)]);
        let f = forecast(&records, 7);
        assert!(f.projected_spend < 0.0);
        assert_eq!(f.projected_roi, 0.0);
    }

    #[test]
    fn test_daily_projection() {
        let records = history(&[(100.0, 200.0), (110.0, 220.0), (120.0, 240.0)]);
        let days = project_daily(&records, 3);
        assert_eq!(days.len(), 3);
        assert_eq!(days[0].day, 1);
        assert_eq!(days[0].spend, 130.0);
        assert_eq!(days[2].spend, 150.0);
        assert_eq!(days[2].revenue, 300.0);
        assert_eq!(days[2].roi, 100.0);
        assert!(project_daily(&records[..1], 3).is_empty());
    }

    #[test]
    fn test_forecast_serializes_roi_key() {
        let json = serde_json::to_value(ForecastResult::default()).unwrap();
        assert!(json.get("projectedROI").is_some());
        assert!(json.get("projectedRevenue").is_some());
    }
}
