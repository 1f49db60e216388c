//! Cross-platform comparison — per-platform metrics ranked by ROI with a
//! qualitative performance tier.

use crate::derived::{aggregate, DerivedMetrics};
use campaign_core::MetricRecord;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PerformanceTier {
    Excellent,
    Good,
    Average,
    Poor,
}

impl PerformanceTier {
    /// Tier from ROI and conversion rate (both in percent).
    pub fn assess(metrics: &DerivedMetrics) -> Self {
        let (roi, conv) = (metrics.roi, metrics.conversion_rate);
        if roi > 100.0 && conv > 3.0 {
            Self::Excellent
        } else if roi > 50.0 && conv > 2.0 {
            Self::Good
        } else if roi > 0.0 && conv > 1.0 {
            Self::Average
        } else {
            Self::Poor
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformMetrics {
    pub total_spend: f64,
    pub total_revenue: f64,
    pub roi: f64,
    pub roas: f64,
    pub ctr: f64,
    pub conversion_rate: f64,
}

impl From<&DerivedMetrics> for PlatformMetrics {
    fn from(m: &DerivedMetrics) -> Self {
        Self {
            total_spend: m.total_spend,
            total_revenue: m.total_revenue,
            roi: m.roi,
            roas: m.roas,
            ctr: m.ctr,
            conversion_rate: m.conversion_rate,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformComparison {
    pub platform: String,
    pub metrics: PlatformMetrics,
    pub performance: PerformanceTier,
}

/// Group records by platform in first-seen order.
fn group_by_platform(records: &[MetricRecord]) -> Vec<(&str, Vec<&MetricRecord>)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(&str, Vec<&MetricRecord>)> = Vec::new();

    for r in records {
        let slot = *index.entry(r.platform.as_str()).or_insert_with(|| {
            groups.push((r.platform.as_str(), Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(r);
    }
    groups
}

/// One comparison per distinct platform, sorted by descending ROI.
///
/// The sort is stable: platforms with equal ROI stay in the order they first
/// appear in `records`.
pub fn compare_platforms(records: &[MetricRecord]) -> Vec<PlatformComparison> {
    let mut comparisons: Vec<PlatformComparison> = group_by_platform(records)
        .into_iter()
        .map(|(platform, group)| {
            let metrics = DerivedMetrics::from_totals(&aggregate(group));
            PlatformComparison {
                platform: platform.to_string(),
                metrics: PlatformMetrics::from(&metrics),
                performance: PerformanceTier::assess(&metrics),
            }
        })
        .collect();

    comparisons.sort_by(|a, b| b.metrics.roi.total_cmp(&a.metrics.roi));
    comparisons
}
