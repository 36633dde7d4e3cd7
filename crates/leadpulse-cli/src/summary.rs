//! `summary` command: canonical totals and rates, overall and per campaign.

use std::path::PathBuf;

use chrono::NaiveDate;
use leadpulse_core::{CampaignMetric, ImportPolicy, Vocabulary};
use leadpulse_db::MergeEngine;
use leadpulse_ingest::{import_path, CampaignSummary, DateRange, ImportContext, MetricsAggregator};
use serde_json::json;

const LOCAL_USER: &str = "local";

pub(crate) fn date_range(
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> anyhow::Result<Option<DateRange>> {
    if let (Some(from), Some(to)) = (from, to) {
        if from > to {
            anyhow::bail!("--from {from} is after --to {to}");
        }
    }
    Ok(DateRange::from_bounds(from, to))
}

/// Parses and merges files in memory, accumulating everything.
pub(crate) fn metrics_from_files(
    files: &[PathBuf],
    vocab: &Vocabulary,
    strict_layout: bool,
) -> anyhow::Result<Vec<CampaignMetric>> {
    let mut engine = MergeEngine::new(ImportPolicy::Accumulate);
    let mut failed = 0;

    for path in files {
        let ctx = ImportContext::from_path(path).with_strict_layout(strict_layout);
        match import_path(path, &ctx, vocab) {
            Ok(file_import) => {
                let (leads, metrics) = file_import.parsed.into_parts();
                engine.apply(LOCAL_USER, &[], leads, &metrics);
            }
            Err(e) => {
                tracing::warn!(file = %e.file(), error = %e, "import failed");
                eprintln!("error: {e}");
                failed += 1;
            }
        }
    }

    if failed == files.len() {
        anyhow::bail!("none of the {} file(s) could be imported", files.len());
    }
    Ok(engine.metrics(LOCAL_USER))
}

fn print_row(label: &str, s: &CampaignSummary) {
    println!(
        "{label:<28} {:>8} {:>8} {:>7.1}% {:>8} {:>6} {:>6} {:>7.1}% {:>10}",
        s.invitations,
        s.connections,
        s.acceptance_rate,
        s.messages,
        s.positive_responses,
        s.negative_responses,
        s.response_rate,
        s.total_activities,
    );
}

pub(crate) fn print_summary(
    vocab: &Vocabulary,
    metrics: &[CampaignMetric],
    range: Option<&DateRange>,
    as_json: bool,
) -> anyhow::Result<()> {
    let aggregator = MetricsAggregator::new(vocab);
    let overall = aggregator.summarize(metrics, range);
    let campaigns = aggregator.summarize_by_campaign(metrics, range);

    if as_json {
        let output = json!({
            "from": range.map(|r| r.start.to_string()),
            "to": range.map(|r| r.end.to_string()),
            "overall": overall,
            "campaigns": campaigns,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!(
        "{:<28} {:>8} {:>8} {:>8} {:>8} {:>6} {:>6} {:>8} {:>10}",
        "campaign", "invites", "accepted", "rate", "messages", "pos", "neg", "resp", "activities"
    );
    for campaign in &campaigns {
        print_row(&campaign.campaign_name, &campaign.summary);
    }
    print_row("TOTAL", &overall);
    Ok(())
}
