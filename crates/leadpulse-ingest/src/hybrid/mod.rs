//! Parser for hybrid per-lead exports with repeated follow-up blocks.
//!
//! One pass over the rows produces the [`Lead`] records, eight canonical
//! daily series per `(campaign, profile)` group, and a flag-count summary.

pub mod layout;
pub mod response;

use std::collections::HashMap;

use chrono::NaiveDate;
use leadpulse_core::{CampaignMetric, DailySeries, FollowUp, Lead, LeadStatus, MetricKind};
use serde::Serialize;

use crate::aggregate::round_to;
use crate::error::IngestError;
use crate::parse_helpers::{is_yes, non_empty, parse_date};
use crate::table::{cell, CsvTable};
use crate::types::{ImportContext, ParseReport, DEFAULT_PROFILE};

pub use layout::{resolve_layout, ColumnRole, HybridLayout, FOLLOW_UP_BLOCKS};
pub use response::{classify_response, ResponseClass};

const BLOCKS: usize = FOLLOW_UP_BLOCKS as usize;

/// Flag counts across every lead in the file.
///
/// `invites_sent`/`connections_accepted` count true flags whether or not the
/// row carries a parseable date, so they can exceed the dated daily series.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HybridSummary {
    pub total_leads: usize,
    pub invites_sent: usize,
    pub connections_accepted: usize,
    /// `connections_accepted / invites_sent * 100`, two decimals, 0 with no invites.
    pub acceptance_rate: f64,
    pub follow_ups_sent: [usize; BLOCKS],
    pub positive_responses: usize,
    pub negative_responses: usize,
    pub pending: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HybridImport {
    pub leads: Vec<Lead>,
    pub metrics: Vec<CampaignMetric>,
    pub summary: HybridSummary,
    pub report: ParseReport,
}

#[derive(Default)]
struct GroupSeries {
    sent: DailySeries,
    accepted: DailySeries,
    follow_ups: [DailySeries; BLOCKS],
    positive: DailySeries,
    negative: DailySeries,
}

impl GroupSeries {
    fn into_metrics(self, campaign: &str, profile: &str) -> Vec<CampaignMetric> {
        let mut messages = DailySeries::new();
        for series in &self.follow_ups {
            for (date, count) in series {
                *messages.entry(date.clone()).or_insert(0) += count;
            }
        }

        let [fu1, fu2, fu3] = self.follow_ups;
        [
            (MetricKind::Invitations, self.sent),
            (MetricKind::Connections, self.accepted),
            (MetricKind::Messages, messages),
            (MetricKind::FollowUp1, fu1),
            (MetricKind::FollowUp2, fu2),
            (MetricKind::FollowUp3, fu3),
            (MetricKind::PositiveResponses, self.positive),
            (MetricKind::NegativeResponses, self.negative),
        ]
        .into_iter()
        .map(|(kind, daily)| CampaignMetric::from_daily(campaign, profile, kind.canonical_label(), daily))
        .collect()
    }
}

fn bump(series: &mut DailySeries, date: NaiveDate) {
    *series.entry(date.format("%Y-%m-%d").to_string()).or_insert(0) += 1;
}

/// One decoded follow-up block.
struct Block {
    sent: bool,
    send_date: Option<NaiveDate>,
    response_text: Option<String>,
    response: ResponseClass,
    response_date: Option<NaiveDate>,
}

/// Parses a hybrid table.
///
/// Rows without a name are skipped. A row's campaign comes from its
/// campaign column, falling back to `ctx.campaign`; rows with neither are
/// skipped. The lead's overall response is the last classified follow-up
/// response (FU3 over FU2 over FU1).
///
/// # Errors
///
/// Propagates layout errors from [`resolve_layout`].
pub fn parse_hybrid(table: &CsvTable, ctx: &ImportContext) -> Result<HybridImport, IngestError> {
    let file = ctx.file_name.as_str();
    let layout = resolve_layout(file, table.headers(), ctx.strict_layout)?;
    let col = |role: ColumnRole| layout.get(role);

    let mut report = ParseReport::default();
    let mut summary = HybridSummary::default();
    let mut leads = Vec::new();
    let mut order: Vec<(String, String)> = Vec::new();
    let mut groups: HashMap<(String, String), GroupSeries> = HashMap::new();

    for (row_idx, row) in table.rows().iter().enumerate() {
        let row_number = row_idx + 1;
        report.rows_read += 1;

        let name = cell(row, col(ColumnRole::Name));
        if name.is_empty() {
            report.skip(file, row_number, "missing lead name");
            continue;
        }

        let campaign = non_empty(cell(row, col(ColumnRole::Campaign))).or_else(|| ctx.campaign.clone());
        let Some(campaign) = campaign else {
            report.skip(file, row_number, "no campaign column value and no fallback campaign");
            continue;
        };
        let profile = non_empty(cell(row, col(ColumnRole::Profile)))
            .or_else(|| ctx.profile.clone())
            .unwrap_or_else(|| DEFAULT_PROFILE.to_string());

        let invite_sent = is_yes(cell(row, col(ColumnRole::InviteFlag)));
        let accepted = is_yes(cell(row, col(ColumnRole::AcceptedFlag)));
        let invite_date = parse_date(cell(row, col(ColumnRole::InviteDate)));
        let accepted_date = if layout.has(ColumnRole::AcceptedDate) {
            parse_date(cell(row, col(ColumnRole::AcceptedDate)))
        } else {
            invite_date
        };

        let blocks: Vec<Block> = (1..=FOLLOW_UP_BLOCKS)
            .map(|n| {
                let response_text = non_empty(cell(row, col(ColumnRole::Response(n))));
                Block {
                    sent: is_yes(cell(row, col(ColumnRole::FollowUpFlag(n)))),
                    send_date: parse_date(cell(row, col(ColumnRole::FollowUpDate(n)))),
                    response: response_text
                        .as_deref()
                        .map_or(ResponseClass::None, classify_response),
                    response_text,
                    response_date: parse_date(cell(row, col(ColumnRole::ResponseDate(n)))),
                }
            })
            .collect();

        let overall = blocks
            .iter()
            .rev()
            .find(|b| b.response.is_some())
            .map(|b| (b.response, b.response_date));

        let key = (campaign.clone(), profile.clone());
        let series = groups.entry(key.clone()).or_insert_with(|| {
            order.push(key);
            GroupSeries::default()
        });

        if invite_sent {
            summary.invites_sent += 1;
            if let Some(date) = invite_date {
                bump(&mut series.sent, date);
            }
        }
        if accepted {
            summary.connections_accepted += 1;
            if let Some(date) = accepted_date {
                bump(&mut series.accepted, date);
            }
        }
        for (slot, block) in blocks.iter().enumerate() {
            if block.sent {
                summary.follow_ups_sent[slot] += 1;
                if let Some(date) = block.send_date {
                    bump(&mut series.follow_ups[slot], date);
                }
            }
        }

        let mut lead = Lead::new(campaign, name);
        lead.linkedin = non_empty(cell(row, col(ColumnRole::LinkedIn)));
        lead.company = non_empty(cell(row, col(ColumnRole::Company)));
        lead.position = non_empty(cell(row, col(ColumnRole::Position)));
        lead.observations = non_empty(cell(row, col(ColumnRole::Observations)));
        lead.invite_sent = invite_sent;
        lead.connection_accepted = accepted;
        lead.connection_date = if accepted { accepted_date } else { None };
        for (slot, block) in blocks.into_iter().enumerate() {
            lead.follow_ups[slot] = FollowUp {
                date: block.send_date,
                comments: block.response_text,
            };
        }

        match overall {
            Some((ResponseClass::Positive, date)) => {
                lead.status = LeadStatus::Positive;
                lead.positive_response_date = date;
                summary.positive_responses += 1;
                if let Some(date) = date {
                    bump(&mut series.positive, date);
                }
            }
            Some((ResponseClass::Negative, date)) => {
                lead.status = LeadStatus::Negative;
                lead.negative_response_date = date;
                summary.negative_responses += 1;
                if let Some(date) = date {
                    bump(&mut series.negative, date);
                }
            }
            _ => {
                lead.status = LeadStatus::Pending;
                summary.pending += 1;
            }
        }

        leads.push(lead);
    }

    summary.total_leads = leads.len();
    summary.acceptance_rate = percentage(summary.connections_accepted, summary.invites_sent, 2);

    let metrics = order
        .into_iter()
        .filter_map(|key| {
            let series = groups.remove(&key)?;
            Some(series.into_metrics(&key.0, &key.1))
        })
        .flatten()
        .collect();

    Ok(HybridImport {
        leads,
        metrics,
        summary,
        report,
    })
}

#[allow(clippy::cast_precision_loss)]
fn percentage(part: usize, whole: usize, places: u32) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    round_to(part as f64 / whole as f64 * 100.0, places)
}

#[cfg(test)]
#[path = "hybrid_test.rs"]
mod tests;
