use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Date-keyed counts for one event type. Keys are ISO `YYYY-MM-DD` strings.
pub type DailySeries = BTreeMap<String, i64>;

/// Per-campaign engagement counter for one event type and sending profile.
///
/// When `daily_data` is non-empty its sum is authoritative; `total_count` is
/// only consulted when there are no dated entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignMetric {
    pub campaign_name: String,
    pub profile_name: String,
    /// Canonical event type label, e.g. `"Connection Requests Sent"`.
    pub event_type: String,
    pub total_count: i64,
    pub daily_data: DailySeries,
}

impl CampaignMetric {
    /// Builds a metric whose `total_count` is the sum of `daily_data`.
    #[must_use]
    pub fn from_daily(
        campaign_name: impl Into<String>,
        profile_name: impl Into<String>,
        event_type: impl Into<String>,
        daily_data: DailySeries,
    ) -> Self {
        let total_count = daily_data.values().sum();
        Self {
            campaign_name: campaign_name.into(),
            profile_name: profile_name.into(),
            event_type: event_type.into(),
            total_count,
            daily_data,
        }
    }

    /// Sum of `daily_data`, or `total_count` when there are no dated entries.
    #[must_use]
    pub fn effective_total(&self) -> i64 {
        if self.daily_data.is_empty() {
            self.total_count
        } else {
            self.daily_data.values().sum()
        }
    }

    /// Earliest and latest well-formed dates in `daily_data`.
    #[must_use]
    pub fn date_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        let mut dates = self
            .daily_data
            .keys()
            .filter_map(|k| NaiveDate::parse_from_str(k, "%Y-%m-%d").ok());
        let first = dates.next()?;
        Some(dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(entries: &[(&str, i64)]) -> DailySeries {
        entries.iter().map(|(k, v)| ((*k).to_string(), *v)).collect()
    }

    #[test]
    fn from_daily_sets_total_to_sum() {
        let m = CampaignMetric::from_daily(
            "C1",
            "P1",
            "Connection Requests Sent",
            series(&[("2025-01-01", 4), ("2025-01-02", 6)]),
        );
        assert_eq!(m.total_count, 10);
        assert_eq!(m.effective_total(), 10);
    }

    #[test]
    fn effective_total_prefers_daily_over_stale_total() {
        let mut m = CampaignMetric::from_daily("C1", "P1", "Messages Sent", series(&[("2025-01-01", 3)]));
        m.total_count = 99;
        assert_eq!(m.effective_total(), 3);
    }

    #[test]
    fn effective_total_falls_back_when_no_daily_data() {
        let mut m = CampaignMetric::from_daily("C1", "P1", "Messages Sent", DailySeries::new());
        m.total_count = 7;
        assert_eq!(m.effective_total(), 7);
    }

    #[test]
    fn date_span_skips_malformed_keys() {
        let m = CampaignMetric::from_daily(
            "C1",
            "P1",
            "Profile Visits",
            series(&[("2025-01-03", 1), ("garbage", 2), ("2025-01-01", 1)]),
        );
        let (start, end) = m.date_span().unwrap();
        assert_eq!(start.to_string(), "2025-01-01");
        assert_eq!(end.to_string(), "2025-01-03");
    }
}
