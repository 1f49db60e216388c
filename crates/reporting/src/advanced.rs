//! Advanced campaign metrics: CPM, ROAS multiple and a 0-100 quality score,
//! plus the plain-text executive summary built on them.

use crate::derived::{aggregate, ratio, round2, DerivedMetrics, MetricTotals};
use crate::recommendations::OptimizationRecommendation;
use campaign_core::MetricRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvancedMetrics {
    #[serde(flatten)]
    pub base: DerivedMetrics,
    /// Cost per thousand impressions.
    pub cpm: f64,
    /// `revenue / spend` as a plain multiple (1.0 = break-even).
    pub roas_multiple: f64,
    pub quality_score: u32,
}

impl AdvancedMetrics {
    pub fn from_totals(totals: &MetricTotals) -> Self {
        let base = DerivedMetrics::from_totals(totals);
        Self {
            base,
            cpm: round2(ratio(totals.spend, totals.impressions as f64) * 1000.0),
            roas_multiple: round2(ratio(totals.revenue, totals.spend)),
            quality_score: quality_score(&base),
        }
    }
}

pub fn calculate_advanced_metrics(records: &[MetricRecord]) -> AdvancedMetrics {
    AdvancedMetrics::from_totals(&aggregate(records))
}

/// Score campaign quality from CTR, CPC and conversion rate.
///
/// Starts at 50; CTR adds up to 30, CPC up to 20 and conversion rate up to 20.
/// The result is capped at 100. Without clicks CPC is undefined and earns
/// nothing.
pub fn quality_score(metrics: &DerivedMetrics) -> u32 {
    let mut score = 50;

    score += match metrics.ctr {
        c if c > 5.0 => 30,
        c if c > 3.0 => 20,
        c if c > 1.0 => 10,
        _ => 0,
    };

    if metrics.total_clicks > 0 {
        score += match metrics.cpc {
            c if c < 0.5 => 20,
            c if c < 1.0 => 15,
            c if c < 2.0 => 10,
            _ => 0,
        };
    }

    score += match metrics.conversion_rate {
        c if c > 5.0 => 20,
        c if c > 2.0 => 15,
        c if c > 1.0 => 10,
        _ => 0,
    };

    score.min(100)
}

/// Human-readable campaign summary for e-mail and PDF exports.
pub fn executive_summary(
    campaign_name: &str,
    metrics: &AdvancedMetrics,
    recommendations: &[OptimizationRecommendation],
    generated_at: DateTime<Utc>,
) -> String {
    let m = &metrics.base;
    let title = format!("EXECUTIVE REPORT - {campaign_name}");
    let mut out = String::new();

    // Writing to a String cannot fail.
    let _ = writeln!(out, "{title}");
    let _ = writeln!(out, "{}", "=".repeat(title.chars().count()));
    let _ = writeln!(out);
    let _ = writeln!(out, "PERFORMANCE SUMMARY:");
    let _ = writeln!(out, "- Impressions: {}", m.total_impressions);
    let _ = writeln!(out, "- Clicks: {}", m.total_clicks);
    let _ = writeln!(out, "- Conversions: {}", m.total_conversions);
    let _ = writeln!(out, "- Spend: {:.2}", m.total_spend);
    let _ = writeln!(out, "- Revenue: {:.2}", m.total_revenue);
    let _ = writeln!(out);
    let _ = writeln!(out, "KEY METRICS:");
    let _ = writeln!(out, "- CTR: {:.2}%", m.ctr);
    let _ = writeln!(out, "- CPC: {:.2}", m.cpc);
    let _ = writeln!(out, "- CPA: {:.2}", m.cpa);
    let _ = writeln!(out, "- CPM: {:.2}", metrics.cpm);
    let _ = writeln!(out, "- ROAS: {:.2}x", metrics.roas_multiple);
    let _ = writeln!(out, "- ROI: {:.2}%", m.roi);
    let _ = writeln!(out, "- Conversion Rate: {:.2}%", m.conversion_rate);
    let _ = writeln!(out, "- Quality Score: {}/100", metrics.quality_score);
    let _ = writeln!(out);
    let _ = writeln!(out, "RECOMMENDATIONS ({}):", recommendations.len());
    for (i, r) in recommendations.iter().enumerate() {
        let _ = writeln!(
            out,
            "{}. [{}] {}: {}",
            i + 1,
            r.priority.label(),
            r.title,
            r.description
        );
    }
    let _ = writeln!(out);
    let _ = write!(out, "Generated at: {}", generated_at.to_rfc3339());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recommendations::optimization_recommendations;
    use chrono::TimeZone;

    fn totals(impressions: u64, clicks: u64, conversions: u64, spend: f64, revenue: f64) -> MetricTotals {
        MetricTotals {
            impressions,
            clicks,
            conversions,
            spend,
            revenue,
        }
    }

    #[test]
    fn test_cpm_and_roas_multiple() {
        let m = AdvancedMetrics::from_totals(&totals(20_000, 100, 4, 50.0, 125.0));
        assert_eq!(m.cpm, 2.5);
        assert_eq!(m.roas_multiple, 2.5);
        assert_eq!(m.base.roas, 250.0);
    }

    #[test]
    fn test_zero_denominators() {
        let m = AdvancedMetrics::from_totals(&MetricTotals::default());
        assert_eq!(m.cpm, 0.0);
        assert_eq!(m.roas_multiple, 0.0);
        assert_eq!(m.quality_score, 50);
    }

    #[test]
    fn test_quality_score_bands() {
        // CTR 6% (+30), CPC 0.4 (+20), conv rate 10% (+20) -> capped at 100.
        let top = AdvancedMetrics::from_totals(&totals(1000, 60, 6, 24.0, 0.0));
        assert_eq!(top.quality_score, 100);

        // CTR 2% (+10), CPC 1.5 (+10), conv rate 1.5% (+10).
        let mid = AdvancedMetrics::from_totals(&totals(10_000, 200, 3, 300.0, 0.0));
        assert_eq!(mid.quality_score, 80);

        // CTR 0.5%, CPC 5, conv rate 0%.
        let low = AdvancedMetrics::from_totals(&totals(10_000, 50, 0, 250.0, 0.0));
        assert_eq!(low.quality_score, 50);
    }

    #[test]
    fn test_flattened_wire_format() {
        let m = AdvancedMetrics::from_totals(&totals(1000, 10, 1, 10.0, 20.0));
        let json = serde_json::to_value(m).unwrap();
        assert_eq!(json["totalImpressions"], 1000);
        assert_eq!(json["cpm"], 10.0);
        assert_eq!(json["qualityScore"], m.quality_score);
    }

    #[test]
    fn test_executive_summary_lists_recommendations() {
        let m = AdvancedMetrics::from_totals(&totals(10_000, 50, 0, 250.0, 100.0));
        let recs = optimization_recommendations("cmp-1", &m, None);
        let at = Utc.with_ymd_and_hms(2024, 7, 1, 12, 0, 0).unwrap();
        let text = executive_summary("Summer Sale", &m, &recs, at);

        assert!(text.starts_with("EXECUTIVE REPORT - Summer Sale\n"));
        assert!(text.contains("- Spend: 250.00"));
        assert!(text.contains("- ROAS: 0.40x"));
        assert!(text.contains(&format!("RECOMMENDATIONS ({}):", recs.len())));
        assert!(text.contains("1. [HIGH] Reduce Budget"));
        assert!(text.ends_with("Generated at: 2024-07-01T12:00:00+00:00"));
    }
}
