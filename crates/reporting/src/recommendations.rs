//! Advisory recommendations.
//!
//! Two flavours: the plain advisory strings attached to every analytics
//! report, and typed optimization recommendations (kind, priority, expected
//! impact) used by the campaign optimization view.

use crate::advanced::AdvancedMetrics;
use crate::derived::DerivedMetrics;
use crate::trends::TrendMetrics;
use serde::{Deserialize, Serialize};

// ─── Report advisories ──────────────────────────────────────────────────────

type Predicate = fn(&DerivedMetrics, &TrendMetrics) -> bool;

/// Rules are independent; every matching rule contributes its message, in
/// table order.
const RULES: &[(Predicate, &str)] = &[
    (
        |m, _| m.ctr < 1.0,
        "CTR is below 1%. Consider improving ad copy or targeting.",
    ),
    (
        |m, _| m.ctr > 5.0,
        "Excellent CTR! Consider scaling this campaign.",
    ),
    (
        |m, _| m.conversion_rate < 1.0,
        "Low conversion rate. Review landing page and user experience.",
    ),
    (
        |m, _| m.conversion_rate > 5.0,
        "Outstanding conversion rate! Analyze what's working and replicate.",
    ),
    (
        |m, _| m.roi < 0.0,
        "Negative ROI. Consider pausing or optimizing this campaign.",
    ),
    (
        |m, _| m.roi > 100.0,
        "Exceptional ROI! This campaign is highly profitable.",
    ),
    (
        |_, t| t.clicks_trend < -20.0,
        "Clicks are declining. Refresh ad creative or adjust targeting.",
    ),
    (
        |_, t| t.clicks_trend > 20.0,
        "Clicks are increasing. Maintain current strategy.",
    ),
    (
        |m, _| m.cpa > 100.0,
        "High cost per acquisition. Consider optimizing conversion funnel.",
    ),
];

/// Evaluate the advisory table. No recorded activity yields no advice.
pub fn generate_recommendations(metrics: &DerivedMetrics, trends: &TrendMetrics) -> Vec<String> {
    if metrics.totals().is_empty() {
        return Vec::new();
    }

    RULES
        .iter()
        .filter(|(applies, _)| applies(metrics, trends))
        .map(|(_, message)| (*message).to_string())
        .collect()
}

// ─── Optimization recommendations ───────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    Budget,
    Targeting,
    Creative,
    Bidding,
    Schedule,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn label(&self) -> &'static str {
        match self {
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
            Self::Low => "LOW",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationRecommendation {
    pub campaign_id: String,
    #[serde(rename = "type")]
    pub kind: RecommendationKind,
    pub priority: Priority,
    pub title: String,
    pub description: String,
    /// Expected improvement, in percent.
    pub estimated_impact: f64,
    pub action: String,
}

/// Hours of day (UTC) where spend typically performs best.
pub const PEAK_HOURS: [u32; 6] = [10, 11, 14, 15, 19, 20];

/// Typed recommendations from advanced metrics.
///
/// `hour` is the hour of day the campaign mostly delivers in, when known.
pub fn optimization_recommendations(
    campaign_id: &str,
    metrics: &AdvancedMetrics,
    hour: Option<u32>,
) -> Vec<OptimizationRecommendation> {
    if metrics.base.totals().is_empty() {
        return Vec::new();
    }

    let rec = |kind, priority, title: &str, description: &str, impact, action: &str| {
        OptimizationRecommendation {
            campaign_id: campaign_id.to_string(),
            kind,
            priority,
            title: title.to_string(),
            description: description.to_string(),
            estimated_impact: impact,
            action: action.to_string(),
        }
    };

    let mut out = Vec::new();

    if metrics.roas_multiple < 1.0 {
        out.push(rec(
            RecommendationKind::Budget,
            Priority::High,
            "Reduce Budget",
            "ROAS is below 1:1. Consider reducing the budget or pausing the campaign.",
            15.0,
            "Reduce the budget by 25-50%",
        ));
    } else if metrics.roas_multiple > 3.0 {
        out.push(rec(
            RecommendationKind::Budget,
            Priority::High,
            "Increase Budget",
            "ROAS is excellent. Increase the budget to scale results.",
            30.0,
            "Increase the budget by 20-50%",
        ));
    }

    if metrics.base.ctr < 1.0 {
        out.push(rec(
            RecommendationKind::Creative,
            Priority::High,
            "Improve Creative",
            "CTR is very low. Test new creatives and copy.",
            40.0,
            "Create 3-5 ad variations",
        ));
    }

    if metrics.base.cpa > 50.0 {
        out.push(rec(
            RecommendationKind::Targeting,
            Priority::Medium,
            "Refine Targeting",
            "CPA is very high. Narrow the target audience.",
            25.0,
            "Adjust audience segmentation criteria",
        ));
    }

    if let Some(h) = hour {
        if !PEAK_HOURS.contains(&h) {
            out.push(rec(
                RecommendationKind::Schedule,
                Priority::Low,
                "Optimize Schedule",
                "Shift spend towards peak hours.",
                15.0,
                "Schedule delivery for peak hours",
            ));
        }
    }

    out
}
