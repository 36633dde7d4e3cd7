//! Totals and derived rates over canonical metric series.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use leadpulse_core::{CampaignMetric, MetricKind, Vocabulary};
use serde::Serialize;

/// Inclusive date window applied to daily series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Returns `None` when `start` is after `end`.
    #[must_use]
    pub fn new(start: NaiveDate, end: NaiveDate) -> Option<Self> {
        (start <= end).then_some(Self { start, end })
    }

    /// Builds a range from optional bounds, leaving a missing side open.
    /// Returns `None` when neither bound is given or they are inverted.
    #[must_use]
    pub fn from_bounds(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Option<Self> {
        if from.is_none() && to.is_none() {
            return None;
        }
        Self::new(from.unwrap_or(NaiveDate::MIN), to.unwrap_or(NaiveDate::MAX))
    }

    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Total of one series.
///
/// A non-empty daily map is summed, restricted to `filter` when given (keys
/// that are not ISO dates are skipped under a filter). An empty daily map
/// falls back to `total_count`, and the filter does not apply to it.
#[must_use]
pub fn metric_total(metric: &CampaignMetric, filter: Option<&DateRange>) -> i64 {
    if metric.daily_data.is_empty() {
        return metric.total_count;
    }
    match filter {
        None => metric.daily_data.values().sum(),
        Some(range) => metric
            .daily_data
            .iter()
            .filter(|(key, _)| {
                NaiveDate::parse_from_str(key, "%Y-%m-%d").is_ok_and(|date| range.contains(date))
            })
            .map(|(_, count)| count)
            .sum(),
    }
}

/// `connections / invites * 100` to one decimal; 0 when there are no invites.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn acceptance_rate(invites: i64, connections: i64) -> f64 {
    if invites <= 0 {
        return 0.0;
    }
    round_to(connections as f64 / invites as f64 * 100.0, 1)
}

#[must_use]
pub fn round_to(value: f64, places: u32) -> f64 {
    let factor = f64::from(10_u32.pow(places));
    (value * factor).round() / factor
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CampaignSummary {
    pub invitations: i64,
    pub connections: i64,
    pub messages: i64,
    pub follow_ups: [i64; 3],
    pub profile_visits: i64,
    pub post_likes: i64,
    pub comments: i64,
    pub positive_responses: i64,
    pub negative_responses: i64,
    pub meetings: i64,
    pub acceptance_rate: f64,
    /// `(positive + negative) / connections * 100`, one decimal.
    pub response_rate: f64,
    /// Actions taken by the sending profile. Accepted connections are not
    /// counted.
    pub total_activities: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CampaignBreakdown {
    pub campaign_name: String,
    pub summary: CampaignSummary,
}

/// Sums series by canonical metric using an injected [`Vocabulary`].
#[derive(Debug, Clone, Copy)]
pub struct MetricsAggregator<'a> {
    vocab: &'a Vocabulary,
}

impl<'a> MetricsAggregator<'a> {
    #[must_use]
    pub fn new(vocab: &'a Vocabulary) -> Self {
        Self { vocab }
    }

    /// Sum of [`metric_total`] over every series whose label is a synonym of `kind`.
    #[must_use]
    pub fn value_for(
        &self,
        series: &[CampaignMetric],
        kind: MetricKind,
        filter: Option<&DateRange>,
    ) -> i64 {
        series
            .iter()
            .filter(|m| self.vocab.matches(&m.event_type, kind))
            .map(|m| metric_total(m, filter))
            .sum()
    }

    /// Follow-up total when any follow-ups were recorded, otherwise the
    /// literal messages series.
    #[must_use]
    pub fn messages(&self, series: &[CampaignMetric], filter: Option<&DateRange>) -> i64 {
        let follow_ups: i64 = (1..=3)
            .filter_map(MetricKind::follow_up)
            .map(|kind| self.value_for(series, kind, filter))
            .sum();
        if follow_ups > 0 {
            follow_ups
        } else {
            self.value_for(series, MetricKind::Messages, filter)
        }
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn summarize(&self, series: &[CampaignMetric], filter: Option<&DateRange>) -> CampaignSummary {
        let value = |kind| self.value_for(series, kind, filter);

        let invitations = value(MetricKind::Invitations);
        let connections = value(MetricKind::Connections);
        let messages = self.messages(series, filter);
        let profile_visits = value(MetricKind::ProfileVisits);
        let post_likes = value(MetricKind::PostLikes);
        let comments = value(MetricKind::Comments);
        let positive_responses = value(MetricKind::PositiveResponses);
        let negative_responses = value(MetricKind::NegativeResponses);

        let response_rate = if connections > 0 {
            round_to(
                (positive_responses + negative_responses) as f64 / connections as f64 * 100.0,
                1,
            )
        } else {
            0.0
        };

        CampaignSummary {
            invitations,
            connections,
            messages,
            follow_ups: [
                value(MetricKind::FollowUp1),
                value(MetricKind::FollowUp2),
                value(MetricKind::FollowUp3),
            ],
            profile_visits,
            post_likes,
            comments,
            positive_responses,
            negative_responses,
            meetings: value(MetricKind::Meetings),
            acceptance_rate: acceptance_rate(invitations, connections),
            response_rate,
            total_activities: invitations + messages + profile_visits + post_likes + comments,
        }
    }

    /// One summary per campaign, ordered by campaign name.
    #[must_use]
    pub fn summarize_by_campaign(
        &self,
        series: &[CampaignMetric],
        filter: Option<&DateRange>,
    ) -> Vec<CampaignBreakdown> {
        let mut by_campaign: BTreeMap<&str, Vec<CampaignMetric>> = BTreeMap::new();
        for metric in series {
            by_campaign
                .entry(metric.campaign_name.as_str())
                .or_default()
                .push(metric.clone());
        }
        by_campaign
            .into_iter()
            .map(|(name, metrics)| CampaignBreakdown {
                campaign_name: name.to_string(),
                summary: self.summarize(&metrics, filter),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use leadpulse_core::DailySeries;

    use super::*;

    fn series(campaign: &str, label: &str, days: &[(&str, i64)]) -> CampaignMetric {
        let daily: DailySeries = days.iter().map(|(d, n)| ((*d).to_string(), *n)).collect();
        CampaignMetric::from_daily(campaign, "P1", label, daily)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn acceptance_rate_examples() {
        assert!(acceptance_rate(0, 5).abs() < f64::EPSILON);
        assert!((acceptance_rate(10, 3) - 30.0).abs() < f64::EPSILON);
        assert!((acceptance_rate(3, 1) - 33.3).abs() < f64::EPSILON);
    }

    #[test]
    fn total_falls_back_to_total_count_when_daily_is_empty() {
        let mut metric = series("C1", "Messages Sent", &[]);
        metric.total_count = 7;
        assert_eq!(metric_total(&metric, None), 7);

        let range = DateRange::new(date(2025, 1, 1), date(2025, 1, 2)).unwrap();
        assert_eq!(metric_total(&metric, Some(&range)), 7);
    }

    #[test]
    fn total_respects_inclusive_range_and_skips_malformed_keys() {
        let metric = series(
            "C1",
            "Messages Sent",
            &[("2025-01-01", 1), ("2025-01-02", 2), ("2025-01-03", 4), ("junk", 8)],
        );
        assert_eq!(metric_total(&metric, None), 15);

        let range = DateRange::new(date(2025, 1, 2), date(2025, 1, 3)).unwrap();
        assert_eq!(metric_total(&metric, Some(&range)), 6);
    }

    #[test]
    fn date_range_bounds() {
        assert!(DateRange::new(date(2025, 2, 1), date(2025, 1, 1)).is_none());
        assert!(DateRange::from_bounds(None, None).is_none());

        let open_end = DateRange::from_bounds(Some(date(2025, 1, 10)), None).unwrap();
        assert!(open_end.contains(date(2030, 1, 1)));
        assert!(!open_end.contains(date(2025, 1, 9)));
    }

    #[test]
    fn value_for_sums_every_synonym() {
        let vocab = Vocabulary::builtin();
        let aggregator = MetricsAggregator::new(&vocab);
        let metrics = vec![
            series("C1", "Connection Requests Sent", &[("2025-01-01", 2)]),
            series("C1", "Convites Enviados", &[("2025-01-01", 3)]),
            series("C1", "Messages Sent", &[("2025-01-01", 9)]),
        ];
        assert_eq!(aggregator.value_for(&metrics, MetricKind::Invitations, None), 5);
    }

    #[test]
    fn messages_prefer_follow_ups_over_literal_series() {
        let vocab = Vocabulary::builtin();
        let aggregator = MetricsAggregator::new(&vocab);

        let literal_only = vec![series("C1", "Messages Sent", &[("2025-01-01", 9)])];
        assert_eq!(aggregator.messages(&literal_only, None), 9);

        let with_follow_ups = vec![
            series("C1", "Messages Sent", &[("2025-01-01", 9)]),
            series("C1", "Follow-Ups 1", &[("2025-01-01", 2)]),
            series("C1", "Follow-Ups 3", &[("2025-01-02", 1)]),
        ];
        assert_eq!(aggregator.messages(&with_follow_ups, None), 3);
    }

    #[test]
    fn summary_excludes_connections_from_activities() {
        let vocab = Vocabulary::builtin();
        let aggregator = MetricsAggregator::new(&vocab);
        let metrics = vec![
            series("C1", "Connection Requests Sent", &[("2025-01-01", 10)]),
            series("C1", "Connection Requests Accepted", &[("2025-01-02", 4)]),
            series("C1", "Messages Sent", &[("2025-01-02", 5)]),
            series("C1", "Profile Visits", &[("2025-01-02", 2)]),
            series("C1", "Post Likes", &[("2025-01-03", 1)]),
            series("C1", "Comments Done", &[("2025-01-03", 1)]),
            series("C1", "Positive Responses", &[("2025-01-03", 1)]),
            series("C1", "Negative Responses", &[("2025-01-04", 1)]),
        ];
        let summary = aggregator.summarize(&metrics, None);

        assert_eq!(summary.invitations, 10);
        assert_eq!(summary.connections, 4);
        assert_eq!(summary.total_activities, 10 + 5 + 2 + 1 + 1);
        assert!((summary.acceptance_rate - 40.0).abs() < f64::EPSILON);
        assert!((summary.response_rate - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn breakdown_is_ordered_by_campaign_name() {
        let vocab = Vocabulary::builtin();
        let aggregator = MetricsAggregator::new(&vocab);
        let metrics = vec![
            series("Zeta", "Connection Requests Sent", &[("2025-01-01", 1)]),
            series("Alpha", "Connection Requests Sent", &[("2025-01-01", 2)]),
        ];
        let breakdown = aggregator.summarize_by_campaign(&metrics, None);
        let names: Vec<&str> = breakdown.iter().map(|b| b.campaign_name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "Zeta"]);
        assert_eq!(breakdown[0].summary.invitations, 2);
    }
}
