//! Period-over-period trends: percentage change per metric between a current
//! and a previous window, plus a labelled comparison of two periods.

use crate::derived::{aggregate, round2, DerivedMetrics, MetricTotals};
use campaign_core::MetricRecord;
use serde::{Deserialize, Serialize};

/// Percentage change from `previous` to `current`, rounded to 2 places.
///
/// A zero previous value has no meaningful percentage: the result is 100 when
/// `current` is positive and 0 otherwise.
pub fn percentage_change(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        return if current > 0.0 { 100.0 } else { 0.0 };
    }
    round2((current - previous) / previous * 100.0)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendMetrics {
    pub impressions_trend: f64,
    pub clicks_trend: f64,
    pub conversions_trend: f64,
    pub spend_trend: f64,
    pub revenue_trend: f64,
}

impl TrendMetrics {
    pub fn between(current: &MetricTotals, previous: &MetricTotals) -> Self {
        Self {
            impressions_trend: percentage_change(
                current.impressions as f64,
                previous.impressions as f64,
            ),
            clicks_trend: percentage_change(current.clicks as f64, previous.clicks as f64),
            conversions_trend: percentage_change(
                current.conversions as f64,
                previous.conversions as f64,
            ),
            spend_trend: percentage_change(current.spend, previous.spend),
            revenue_trend: percentage_change(current.revenue, previous.revenue),
        }
    }

    pub fn entries(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("impressionsTrend", self.impressions_trend),
            ("clicksTrend", self.clicks_trend),
            ("conversionsTrend", self.conversions_trend),
            ("spendTrend", self.spend_trend),
            ("revenueTrend", self.revenue_trend),
        ]
    }
}

/// Aggregate both record sets and compare them.
pub fn calculate_trends(current: &[MetricRecord], previous: &[MetricRecord]) -> TrendMetrics {
    TrendMetrics::between(&aggregate(current), &aggregate(previous))
}

// ─── Period comparison ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Improving,
    Declining,
    Stable,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePercentage {
    pub impressions: f64,
    pub clicks: f64,
    pub conversions: f64,
    pub spend: f64,
    pub revenue: f64,
    pub roi: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodComparison {
    pub campaign_id: String,
    pub current_metrics: DerivedMetrics,
    pub previous_metrics: DerivedMetrics,
    pub change_percentage: ChangePercentage,
    pub trend: TrendDirection,
}

/// ROI change (in percent) beyond which a period counts as improving/declining.
const STABLE_BAND: f64 = 5.0;

pub fn compare_periods(
    campaign_id: &str,
    current: &DerivedMetrics,
    previous: &DerivedMetrics,
) -> PeriodComparison {
    let change = ChangePercentage {
        impressions: percentage_change(
            current.total_impressions as f64,
            previous.total_impressions as f64,
        ),
        clicks: percentage_change(current.total_clicks as f64, previous.total_clicks as f64),
        conversions: percentage_change(
            current.total_conversions as f64,
            previous.total_conversions as f64,
        ),
        spend: percentage_change(current.total_spend, previous.total_spend),
        revenue: percentage_change(current.total_revenue, previous.total_revenue),
        roi: percentage_change(current.roi, previous.roi),
    };

    let trend = if change.roi > STABLE_BAND {
        TrendDirection::Improving
    } else if change.roi < -STABLE_BAND {
        TrendDirection::Declining
    } else {
        TrendDirection::Stable
    };

    PeriodComparison {
        campaign_id: campaign_id.to_string(),
        current_metrics: *current,
        previous_metrics: *previous,
        change_percentage: change,
        trend,
    }
}
