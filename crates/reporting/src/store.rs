//! In-memory metric record store keyed by campaign.
//!
//! Handed to request handlers behind an `Arc`; each campaign keeps its
//! records sorted by date and bounded by a per-campaign cap.

use campaign_core::{CampaignResult, DateRange, MetricRecord};
use dashmap::DashMap;
use tracing::debug;

pub struct MetricStore {
    /// campaign_id -> records, ascending by date
    records: DashMap<String, Vec<MetricRecord>>,
    max_records_per_campaign: usize,
}

impl MetricStore {
    pub fn new(max_records_per_campaign: usize) -> Self {
        Self {
            records: DashMap::new(),
            max_records_per_campaign: max_records_per_campaign.max(1),
        }
    }

    /// Validate and insert one record, evicting the oldest records of the
    /// campaign when it is over capacity.
    pub fn record(&self, record: MetricRecord) -> CampaignResult<()> {
        record.validate()?;
        self.insert(record);
        Ok(())
    }

    /// Validate the whole batch first so a bad record rejects nothing partially.
    pub fn record_batch(&self, batch: Vec<MetricRecord>) -> CampaignResult<usize> {
        for r in &batch {
            r.validate()?;
        }
        let count = batch.len();
        for r in batch {
            self.insert(r);
        }
        metrics::counter!("reporting.records_stored").increment(count as u64);
        Ok(count)
    }

    fn insert(&self, record: MetricRecord) {
        let mut entry = self.records.entry(record.campaign_id.clone()).or_default();
        // Stable position: after every record with the same or an earlier date.
        let pos = entry.partition_point(|r| r.date <= record.date);
        entry.insert(pos, record);

        let overflow = entry.len().saturating_sub(self.max_records_per_campaign);
        if overflow > 0 {
            entry.drain(..overflow);
            metrics::counter!("reporting.records_evicted").increment(overflow as u64);
            debug!(overflow, "Evicted oldest metric records");
        }
    }

    /// Records of one campaign inside `range`, ascending by date.
    /// `None` when the campaign has never been seen.
    pub fn query(&self, campaign_id: &str, range: &DateRange) -> Option<Vec<MetricRecord>> {
        self.records.get(campaign_id).map(|recs| {
            recs.iter()
                .filter(|r| range.contains(&r.date))
                .cloned()
                .collect()
        })
    }

    /// Records of every campaign inside `range`.
    pub fn all(&self, range: &DateRange) -> Vec<MetricRecord> {
        let mut out: Vec<MetricRecord> = self
            .records
            .iter()
            .flat_map(|e| {
                e.value()
                    .iter()
                    .filter(|r| range.contains(&r.date))
                    .cloned()
                    .collect::<Vec<_>>()
            })
            .collect();
        out.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.campaign_id.cmp(&b.campaign_id)));
        out
    }

    pub fn contains(&self, campaign_id: &str) -> bool {
        self.records.contains_key(campaign_id)
    }

    pub fn campaign_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.records.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        ids
    }

    pub fn remove_campaign(&self, campaign_id: &str) -> bool {
        self.records.remove(campaign_id).is_some()
    }

    /// Total number of stored records.
    pub fn len(&self) -> usize {
        self.records.iter().map(|e| e.value().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MetricStore {
    fn default() -> Self {
        Self::new(10_000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn at(day: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 11, 1, 0, 0, 0).unwrap() + Duration::days(day)
    }

    fn rec(campaign: &str, day: i64, spend: f64) -> MetricRecord {
        MetricRecord {
            campaign_id: campaign.into(),
            date: at(day),
            impressions: 100,
            clicks: 5,
            conversions: 1,
            spend,
            revenue: spend * 2.0,
            platform: "google_ads".into(),
        }
    }

    #[test]
    fn test_records_kept_in_date_order() {
        let store = MetricStore::default();
        store.record(rec("a", 2, 3.0)).unwrap();
        store.record(rec("a", 0, 1.0)).unwrap();
        store.record(rec("a", 1, 2.0)).unwrap();

        let out = store.query("a", &DateRange::unbounded()).unwrap();
        let spends: Vec<f64> = out.iter().map(|r| r.spend).collect();
        assert_eq!(spends, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_same_date_keeps_arrival_order() {
        let store = MetricStore::default();
        store.record(rec("a", 0, 1.0)).unwrap();
        store.record(rec("a", 0, 2.0)).unwrap();
        let out = store.query("a", &DateRange::unbounded()).unwrap();
        assert_eq!(out[0].spend, 1.0);
        assert_eq!(out[1].spend, 2.0);
    }

    #[test]
    fn test_query_by_range_and_unknown_campaign() {
        let store = MetricStore::default();
        for d in 0..5 {
            store.record(rec("a", d, d as f64)).unwrap();
        }
        let range = DateRange::new(Some(at(1)), Some(at(3)));
        assert_eq!(store.query("a", &range).unwrap().len(), 3);
        assert!(store.query("missing", &range).is_none());

        let empty = DateRange::new(Some(at(10)), None);
        assert_eq!(store.query("a", &empty), Some(vec![]));
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let store = MetricStore::new(3);
        for d in 0..5 {
            store.record(rec("a", d, d as f64)).unwrap();
        }
        let out = store.query("a", &DateRange::unbounded()).unwrap();
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].date, at(2));
    }

    #[test]
    fn test_batch_is_all_or_nothing() {
        let store = MetricStore::default();
        let mut bad = rec("a", 1, 1.0);
        bad.spend = -5.0;
        assert!(store.record_batch(vec![rec("a", 0, 1.0), bad]).is_err());
        assert!(store.is_empty());

        assert_eq!(store.record_batch(vec![rec("a", 0, 1.0), rec("b", 0, 1.0)]).unwrap(), 2);
        assert_eq!(store.len(), 2);
        assert_eq!(store.campaign_ids(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_all_spans_campaigns() {
        let store = MetricStore::default();
        store.record(rec("b", 1, 1.0)).unwrap();
        store.record(rec("a", 0, 1.0)).unwrap();
        store.record(rec("a", 2, 1.0)).unwrap();

        let all = store.all(&DateRange::unbounded());
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].campaign_id, "a");
        assert_eq!(all[1].campaign_id, "b");

        assert!(store.remove_campaign("a"));
        assert!(!store.contains("a"));
        assert_eq!(store.len(), 1);
    }
}
