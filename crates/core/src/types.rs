use crate::error::{CampaignError, CampaignResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum length of campaign and platform identifiers accepted at ingestion.
pub const MAX_ID_LEN: usize = 256;

/// One day of raw counters for a campaign on a single ad platform.
///
/// Records are produced by the periodic metric fetch against the ad platforms
/// and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricRecord {
    pub campaign_id: String,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub impressions: u64,
    #[serde(default)]
    pub clicks: u64,
    #[serde(default)]
    pub conversions: u64,
    #[serde(default)]
    pub spend: f64,
    #[serde(default)]
    pub revenue: f64,
    pub platform: String,
}

impl MetricRecord {
    /// Check the record before it is accepted into a store.
    ///
    /// The metric math itself accepts any value; this is the boundary where
    /// negative or non-finite money amounts are rejected.
    pub fn validate(&self) -> CampaignResult<()> {
        if self.campaign_id.trim().is_empty() {
            return Err(CampaignError::Validation(
                "'campaignId' must not be empty".into(),
            ));
        }
        if self.campaign_id.len() > MAX_ID_LEN {
            return Err(CampaignError::Validation(
                "'campaignId' exceeds maximum length".into(),
            ));
        }
        if self.platform.trim().is_empty() {
            return Err(CampaignError::Validation(
                "'platform' must not be empty".into(),
            ));
        }
        if self.platform.len() > MAX_ID_LEN {
            return Err(CampaignError::Validation(
                "'platform' exceeds maximum length".into(),
            ));
        }
        if !self.spend.is_finite() || self.spend < 0.0 {
            return Err(CampaignError::Validation(
                "'spend' must be a finite, non-negative amount".into(),
            ));
        }
        if !self.revenue.is_finite() || self.revenue < 0.0 {
            return Err(CampaignError::Validation(
                "'revenue' must be a finite, non-negative amount".into(),
            ));
        }
        Ok(())
    }
}

/// Inclusive date window used to select records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn new(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        Self { start, end }
    }

    /// A range with no bounds matches every record.
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn contains(&self, date: &DateTime<Utc>) -> bool {
        self.start.is_none_or(|s| *date >= s) && self.end.is_none_or(|e| *date <= e)
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record() -> MetricRecord {
        MetricRecord {
            campaign_id: "cmp-1".into(),
            date: Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
            impressions: 1000,
            clicks: 50,
            conversions: 5,
            spend: 100.0,
            revenue: 150.0,
            platform: "google_ads".into(),
        }
    }

    #[test]
    fn test_valid_record_passes() {
        assert!(record().validate().is_ok());
    }

    #[test]
    fn test_negative_spend_rejected() {
        let mut r = record();
        r.spend = -1.0;
        assert!(matches!(r.validate(), Err(CampaignError::Validation(_))));
    }

    #[test]
    fn test_non_finite_revenue_rejected() {
        let mut r = record();
        r.revenue = f64::NAN;
        assert!(r.validate().is_err());
        r.revenue = f64::INFINITY;
        assert!(r.validate().is_err());
    }

    #[test]
    fn test_empty_identifiers_rejected() {
        let mut r = record();
        r.campaign_id = "  ".into();
        assert!(r.validate().is_err());

        let mut r = record();
        r.platform = String::new();
        assert!(r.validate().is_err());

        let mut r = record();
        r.campaign_id = "x".repeat(MAX_ID_LEN + 1);
        assert!(r.validate().is_err());
    }

    #[test]
    fn test_camel_case_wire_format() {
        let json = serde_json::to_value(record()).unwrap();
        assert_eq!(json["campaignId"], "cmp-1");
        assert_eq!(json["platform"], "google_ads");

        let parsed: MetricRecord = serde_json::from_str(
            r#"{"campaignId":"c","date":"2024-03-01T00:00:00Z","clicks":3,"platform":"meta_ads"}"#,
        )
        .unwrap();
        assert_eq!(parsed.clicks, 3);
        assert_eq!(parsed.impressions, 0);
        assert_eq!(parsed.spend, 0.0);
    }

    #[test]
    fn test_date_range_bounds_are_inclusive() {
        let day = |d| Utc.with_ymd_and_hms(2024, 3, d, 0, 0, 0).unwrap();
        let range = DateRange::new(Some(day(2)), Some(day(4)));
        assert!(!range.contains(&day(1)));
        assert!(range.contains(&day(2)));
        assert!(range.contains(&day(4)));
        assert!(!range.contains(&day(5)));
        assert!(DateRange::unbounded().contains(&day(1)));
        assert!(DateRange::unbounded().is_unbounded());
    }
}
