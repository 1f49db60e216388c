//! Metric aggregation and derived ratios (CTR, conversion rate, CPC, CPA,
//! ROAS, ROI) over raw campaign records.

use campaign_core::MetricRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Platform label on records that roll up more than one platform.
pub const ALL_PLATFORMS: &str = "all";

/// Plain sums of the raw counters over a set of records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricTotals {
    pub impressions: u64,
    pub clicks: u64,
    pub conversions: u64,
    pub spend: f64,
    pub revenue: f64,
}

impl MetricTotals {
    /// True when nothing at all was recorded.
    pub fn is_empty(&self) -> bool {
        self.impressions == 0
            && self.clicks == 0
            && self.conversions == 0
            && self.spend == 0.0
            && self.revenue == 0.0
    }
}

/// Totals plus the ratios computed from them.
///
/// Every ratio is 0 when its denominator is 0, so the struct never carries
/// NaN or infinity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedMetrics {
    pub total_impressions: u64,
    pub total_clicks: u64,
    pub total_conversions: u64,
    pub total_spend: f64,
    pub total_revenue: f64,
    /// `clicks / impressions * 100`
    pub ctr: f64,
    /// `conversions / clicks * 100`
    pub conversion_rate: f64,
    /// `spend / clicks`
    pub cpc: f64,
    /// `spend / conversions`
    pub cpa: f64,
    /// `revenue / spend * 100`
    pub roas: f64,
    /// `(revenue - spend) / spend * 100`
    pub roi: f64,
}

impl DerivedMetrics {
    pub fn from_totals(totals: &MetricTotals) -> Self {
        let impressions = totals.impressions as f64;
        let clicks = totals.clicks as f64;
        let conversions = totals.conversions as f64;

        Self {
            total_impressions: totals.impressions,
            total_clicks: totals.clicks,
            total_conversions: totals.conversions,
            total_spend: totals.spend,
            total_revenue: totals.revenue,
            ctr: round2(ratio(clicks, impressions) * 100.0),
            conversion_rate: round2(ratio(conversions, clicks) * 100.0),
            cpc: round2(ratio(totals.spend, clicks)),
            cpa: round2(ratio(totals.spend, conversions)),
            roas: round2(ratio(totals.revenue, totals.spend) * 100.0),
            roi: round2(roi_percent(totals.revenue, totals.spend)),
        }
    }

    /// Rebuild the raw sums these metrics were computed from.
    pub fn totals(&self) -> MetricTotals {
        MetricTotals {
            impressions: self.total_impressions,
            clicks: self.total_clicks,
            conversions: self.total_conversions,
            spend: self.total_spend,
            revenue: self.total_revenue,
        }
    }

    /// Ordered `(camelCase name, value)` pairs, as used by the CSV export.
    pub fn entries(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("totalImpressions", self.total_impressions as f64),
            ("totalClicks", self.total_clicks as f64),
            ("totalConversions", self.total_conversions as f64),
            ("totalSpend", self.total_spend),
            ("totalRevenue", self.total_revenue),
            ("ctr", self.ctr),
            ("conversionRate", self.conversion_rate),
            ("cpc", self.cpc),
            ("cpa", self.cpa),
            ("roas", self.roas),
            ("roi", self.roi),
        ]
    }
}

/// Sum the five raw counters. Empty input yields all zeros.
///
/// Counters saturate at `u64::MAX` instead of wrapping.
pub fn aggregate<'a, I>(records: I) -> MetricTotals
where
    I: IntoIterator<Item = &'a MetricRecord>,
{
    records
        .into_iter()
        .fold(MetricTotals::default(), |mut acc, r| {
            acc.impressions = acc.impressions.saturating_add(r.impressions);
            acc.clicks = acc.clicks.saturating_add(r.clicks);
            acc.conversions = acc.conversions.saturating_add(r.conversions);
            acc.spend += r.spend;
            acc.revenue += r.revenue;
            acc
        })
}

/// Roll records up into one record per calendar day (UTC), ascending.
///
/// Each rollup carries the earliest timestamp of its day. Days that mix
/// platforms are labelled [`ALL_PLATFORMS`]. The result does not depend on
/// the order records arrive in.
pub fn daily_totals(records: &[MetricRecord]) -> Vec<MetricRecord> {
    let mut days: BTreeMap<_, MetricRecord> = BTreeMap::new();
    for r in records {
        days.entry(r.date.date_naive())
            .and_modify(|day| {
                day.date = day.date.min(r.date);
                day.impressions = day.impressions.saturating_add(r.impressions);
                day.clicks = day.clicks.saturating_add(r.clicks);
                day.conversions = day.conversions.saturating_add(r.conversions);
                day.spend += r.spend;
                day.revenue += r.revenue;
                if day.platform != r.platform {
                    day.platform = ALL_PLATFORMS.to_string();
                }
            })
            .or_insert_with(|| r.clone());
    }
    days.into_values().collect()
}

/// Aggregate then derive ratios in one step.
pub fn calculate_metrics(records: &[MetricRecord]) -> DerivedMetrics {
    DerivedMetrics::from_totals(&aggregate(records))
}

/// `numerator / denominator`, or 0 when the denominator is 0.
pub(crate) fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// Unrounded ROI percentage; 0 when spend is 0.
pub(crate) fn roi_percent(revenue: f64, spend: f64) -> f64 {
    ratio(revenue - spend, spend) * 100.0
}

/// Round half away from zero to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
