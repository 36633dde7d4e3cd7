use leadpulse_core::{DailySeries, LeadStatus};

use super::*;

fn metric(campaign: &str, event: &str, days: &[(&str, i64)]) -> CampaignMetric {
    let daily: DailySeries = days.iter().map(|(d, n)| ((*d).to_string(), *n)).collect();
    CampaignMetric::from_daily(campaign, "P1", event, daily)
}

fn lead(campaign: &str, name: &str, company: &str) -> Lead {
    let mut lead = Lead::new(campaign, name);
    lead.company = Some(company.to_string());
    lead
}

#[test]
fn later_duplicate_lead_replaces_earlier_in_place() {
    let mut second = lead("C1", "Ana", "Globex");
    second.status = LeadStatus::Positive;
    let leads = vec![lead("C1", "Ana", "Acme"), lead("C1", "Bia", "Initech"), second];

    let unique = dedup_leads(leads);
    assert_eq!(unique.len(), 2);
    assert_eq!(unique[0].name, "Ana");
    assert_eq!(unique[0].company.as_deref(), Some("Globex"));
    assert_eq!(unique[0].status, LeadStatus::Positive);
    assert_eq!(unique[1].name, "Bia");
}

#[test]
fn same_name_in_different_campaigns_is_kept() {
    let unique = dedup_leads(vec![lead("C1", "Ana", "Acme"), lead("C2", "Ana", "Acme")]);
    assert_eq!(unique.len(), 2);
}

#[test]
fn merge_adds_overlapping_dates() {
    let a = metric("C1", "Messages Sent", &[("2025-01-01", 2), ("2025-01-02", 1)]);
    let b = metric("C1", "Messages Sent", &[("2025-01-02", 3), ("2025-01-03", 4)]);

    let merged = merge_metric(&a, &b);
    assert_eq!(merged.daily_data.get("2025-01-01"), Some(&2));
    assert_eq!(merged.daily_data.get("2025-01-02"), Some(&4));
    assert_eq!(merged.daily_data.get("2025-01-03"), Some(&4));
    assert_eq!(merged.total_count, 10);
}

#[test]
fn merge_of_undated_series_sums_totals() {
    let mut a = metric("C1", "Messages Sent", &[]);
    a.total_count = 5;
    let mut b = metric("C1", "Messages Sent", &[]);
    b.total_count = 7;
    assert_eq!(merge_metric(&a, &b).total_count, 12);
}

#[test]
fn batch_keys() {
    assert!(BatchKey::shared().is_shared());
    assert_eq!(BatchKey::for_policy(ImportPolicy::Accumulate, b"abc"), BatchKey::shared());

    let key = BatchKey::for_policy(ImportPolicy::ReplaceBatch, b"abc");
    assert_eq!(
        key.as_str(),
        "sha256:ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
    assert_ne!(key, BatchKey::for_content(b"abd"));
}

#[test]
fn accumulate_policy_double_counts_reimports() {
    let mut engine = MergeEngine::new(ImportPolicy::Accumulate);
    let file = b"same bytes";
    let metrics = vec![metric("C1", "Messages Sent", &[("2025-01-01", 3)])];

    engine.apply("u1", file, Vec::new(), &metrics);
    engine.apply("u1", file, Vec::new(), &metrics);

    let stored = engine.metrics("u1");
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].daily_data.get("2025-01-01"), Some(&6));
    assert_eq!(stored[0].total_count, 6);
}

#[test]
fn replace_batch_policy_is_idempotent_per_file() {
    let mut engine = MergeEngine::new(ImportPolicy::ReplaceBatch);
    let metrics = vec![metric("C1", "Messages Sent", &[("2025-01-01", 3)])];

    engine.apply("u1", b"file one", Vec::new(), &metrics);
    let outcome = engine.apply("u1", b"file one", Vec::new(), &metrics);
    assert_eq!(outcome.metrics_replaced, 1);
    assert_eq!(engine.metrics("u1")[0].total_count, 3);

    engine.apply("u1", b"file two", Vec::new(), &metrics);
    let stored = engine.metrics("u1");
    assert_eq!(stored[0].daily_data.get("2025-01-01"), Some(&6));
}

#[test]
fn separate_files_sum_on_the_same_date() {
    let mut engine = MergeEngine::new(ImportPolicy::default());
    engine.apply(
        "u1",
        b"a",
        Vec::new(),
        &[metric("C1", "Messages Sent", &[("2025-01-01", 2)])],
    );
    engine.apply(
        "u1",
        b"b",
        Vec::new(),
        &[metric("C1", "Messages Sent", &[("2025-01-01", 5)])],
    );
    assert_eq!(engine.metrics("u1")[0].daily_data.get("2025-01-01"), Some(&7));
}

#[test]
fn leads_overwrite_across_imports_and_stay_per_user() {
    let mut engine = MergeEngine::new(ImportPolicy::Accumulate);
    engine.apply("u1", b"a", vec![lead("C1", "Ana", "Acme")], &[]);
    engine.apply("u1", b"b", vec![lead("C1", "Ana", "Globex")], &[]);
    engine.apply("u2", b"a", vec![lead("C1", "Ana", "Acme")], &[]);

    let leads = engine.leads("u1");
    assert_eq!(leads.len(), 1);
    assert_eq!(leads[0].company.as_deref(), Some("Globex"));
    assert_eq!(engine.leads("u2").len(), 1);
    assert!(engine.metrics("u1").is_empty());
}
