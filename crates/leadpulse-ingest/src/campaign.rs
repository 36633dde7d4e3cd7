//! Parser for wide campaign-input exports: one row per
//! `(campaign, profile, event type)` with one column per calendar day.

use std::collections::{BTreeSet, HashMap};
use std::sync::LazyLock;

use chrono::NaiveDate;
use leadpulse_core::{CampaignMetric, DailySeries, Vocabulary};
use regex::Regex;
use serde::Serialize;

use crate::columns::HeaderIndex;
use crate::detect::{CAMPAIGN_NAME, EVENT_TYPE, PROFILE_NAME, TOTAL_COUNT};
use crate::error::IngestError;
use crate::parse_helpers::parse_count;
use crate::table::{cell, CsvTable};
use crate::types::ParseReport;

static DATE_COLUMN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid date column regex"));

/// All metrics for one `(profile, campaign)` pair in a file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CampaignGroup {
    pub profile_name: String,
    pub campaign_name: String,
    /// One entry per distinct canonical event type, in first-seen order.
    pub metrics: Vec<CampaignMetric>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Number of date columns in the file's header. Empty and zero cells
    /// still count, so this is days *covered*, not days with activity.
    pub active_days: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CampaignImport {
    pub groups: Vec<CampaignGroup>,
    pub report: ParseReport,
}

impl CampaignImport {
    pub fn metrics(&self) -> impl Iterator<Item = &CampaignMetric> {
        self.groups.iter().flat_map(|g| g.metrics.iter())
    }

    #[must_use]
    pub fn into_metrics(self) -> Vec<CampaignMetric> {
        self.groups.into_iter().flat_map(|g| g.metrics).collect()
    }
}

/// A date column: its index and ISO key.
struct DateColumn {
    idx: usize,
    key: String,
    date: NaiveDate,
}

#[derive(Default)]
struct GroupBuilder {
    metrics: Vec<CampaignMetric>,
    by_event: HashMap<String, usize>,
}

/// Parses a campaign-input table into grouped daily metric series.
///
/// Event types are canonicalized through `vocabulary`; rows whose campaign is
/// on the vocabulary's exclusion list are dropped. Rows missing a campaign,
/// event type, or profile are skipped and counted.
///
/// # Errors
///
/// Returns [`IngestError::MissingRequiredColumns`] if any of `Campaign Name`,
/// `Event Type`, `Profile Name`, `Total Count` is absent.
pub fn parse_campaign_metrics(
    file: &str,
    table: &CsvTable,
    vocabulary: &Vocabulary,
) -> Result<CampaignImport, IngestError> {
    let index = HeaderIndex::new(table.headers());

    let required = [
        ("Campaign Name", CAMPAIGN_NAME),
        ("Event Type", EVENT_TYPE),
        ("Profile Name", PROFILE_NAME),
        ("Total Count", TOTAL_COUNT),
    ];
    let missing: Vec<String> = required
        .iter()
        .filter(|(_, aliases)| !index.contains_any(aliases))
        .map(|(name, _)| (*name).to_string())
        .collect();
    if !missing.is_empty() {
        return Err(IngestError::MissingRequiredColumns {
            file: file.to_string(),
            columns: missing,
        });
    }

    let campaign_idx = index.find(CAMPAIGN_NAME);
    let event_idx = index.find(EVENT_TYPE);
    let profile_idx = index.find(PROFILE_NAME);
    let total_idx = index.find(TOTAL_COUNT);

    let date_columns: Vec<DateColumn> = table
        .headers()
        .iter()
        .enumerate()
        .filter(|(_, h)| DATE_COLUMN.is_match(h))
        .filter_map(|(idx, h)| {
            NaiveDate::parse_from_str(h, "%Y-%m-%d")
                .ok()
                .map(|date| DateColumn {
                    idx,
                    key: h.clone(),
                    date,
                })
        })
        .collect();
    let covered: BTreeSet<NaiveDate> = date_columns.iter().map(|c| c.date).collect();
    let start_date = covered.first().copied();
    let end_date = covered.last().copied();

    let mut report = ParseReport::default();
    let mut order: Vec<(String, String)> = Vec::new();
    let mut groups: HashMap<(String, String), GroupBuilder> = HashMap::new();

    for (row_idx, row) in table.rows().iter().enumerate() {
        let row_number = row_idx + 1;
        report.rows_read += 1;

        let campaign_name = cell(row, campaign_idx);
        let event_type = cell(row, event_idx);
        let profile_name = cell(row, profile_idx);

        if campaign_name.is_empty() || event_type.is_empty() || profile_name.is_empty() {
            report.skip(file, row_number, "missing campaign, event type, or profile");
            continue;
        }

        if vocabulary.is_excluded_campaign(campaign_name) {
            report.rows_excluded += 1;
            tracing::debug!(file, row = row_number, campaign_name, "dropping excluded campaign row");
            continue;
        }

        let mut daily = DailySeries::new();
        for column in &date_columns {
            if let Some(count) = parse_count(cell(row, Some(column.idx))) {
                *daily.entry(column.key.clone()).or_insert(0) += count;
            }
        }
        let row_total = parse_count(cell(row, total_idx)).unwrap_or(0);

        let key = (profile_name.to_string(), campaign_name.to_string());
        let group = groups.entry(key.clone()).or_insert_with(|| {
            order.push(key.clone());
            GroupBuilder::default()
        });

        let canonical = vocabulary.canonicalize(event_type);
        if let Some(&pos) = group.by_event.get(&canonical) {
            let metric = &mut group.metrics[pos];
            let previous_fallback = if metric.daily_data.is_empty() {
                metric.total_count
            } else {
                0
            };
            for (date, count) in daily {
                *metric.daily_data.entry(date).or_insert(0) += count;
            }
            metric.total_count = if metric.daily_data.is_empty() {
                previous_fallback + row_total
            } else {
                metric.daily_data.values().sum()
            };
        } else {
            let mut metric =
                CampaignMetric::from_daily(campaign_name, profile_name, canonical.clone(), daily);
            if metric.daily_data.is_empty() {
                metric.total_count = row_total;
            }
            group.by_event.insert(canonical, group.metrics.len());
            group.metrics.push(metric);
        }
    }

    let groups = order
        .into_iter()
        .filter_map(|key| {
            let builder = groups.remove(&key)?;
            let (profile_name, campaign_name) = key;
            Some(CampaignGroup {
                profile_name,
                campaign_name,
                metrics: builder.metrics,
                start_date,
                end_date,
                active_days: covered.len(),
            })
        })
        .collect();

    Ok(CampaignImport { groups, report })
}

#[cfg(test)]
#[path = "campaign_test.rs"]
mod tests;
