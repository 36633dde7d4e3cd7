use super::*;

fn parse(text: &str) -> Result<CampaignImport, IngestError> {
    let table = CsvTable::parse("campaign.csv", text).unwrap();
    parse_campaign_metrics("campaign.csv", &table, &Vocabulary::builtin())
}

const HEADER: &str = "Campaign Name,Event Type,Profile Name,Total Count,2025-01-01,2025-01-02";

#[test]
fn single_row_parses_to_one_group_and_metric() {
    let text = format!("{HEADER}\nC1,Connection Requests Sent,P1,10,4,6\n");
    let import = parse(&text).unwrap();

    assert_eq!(import.groups.len(), 1);
    let group = &import.groups[0];
    assert_eq!(group.campaign_name, "C1");
    assert_eq!(group.profile_name, "P1");
    assert_eq!(group.metrics.len(), 1);

    let metric = &group.metrics[0];
    assert_eq!(metric.event_type, "Connection Requests Sent");
    assert_eq!(metric.daily_data.values().sum::<i64>(), 10);
    assert_eq!(metric.total_count, 10);
    assert_eq!(metric.daily_data.get("2025-01-01"), Some(&4));
    assert_eq!(metric.daily_data.get("2025-01-02"), Some(&6));
}

#[test]
fn excluded_campaign_row_is_dropped() {
    let text = format!(
        "{HEADER}\nCampaign 0,Connection Requests Sent,P1,10,4,6\nC1,Messages Sent,P1,1,1,0\n"
    );
    let import = parse(&text).unwrap();
    assert_eq!(import.groups.len(), 1);
    assert_eq!(import.groups[0].campaign_name, "C1");
    assert_eq!(import.report.rows_excluded, 1);
    assert_eq!(import.report.rows_skipped, 0);
}

#[test]
fn rows_missing_required_values_are_skipped() {
    let text = format!("{HEADER}\n ,Messages Sent,P1,1,1,0\nC1,,P1,1,1,0\nC1,Messages Sent,  ,1,1,0\n");
    let import = parse(&text).unwrap();
    assert!(import.groups.is_empty());
    assert_eq!(import.report.rows_read, 3);
    assert_eq!(import.report.rows_skipped, 3);
}

#[test]
fn groups_by_profile_and_campaign_with_one_metric_per_event() {
    let text = format!(
        "{HEADER}\n\
         C1,Connection Requests Sent,P1,3,1,2\n\
         C1,Connection Requests Accepted,P1,1,0,1\n\
         C1,Connection Requests Sent,P2,5,5,0\n\
         C2,Messages Sent,P1,2,1,1\n"
    );
    let import = parse(&text).unwrap();
    let keys: Vec<(&str, &str, usize)> = import
        .groups
        .iter()
        .map(|g| (g.profile_name.as_str(), g.campaign_name.as_str(), g.metrics.len()))
        .collect();
    assert_eq!(keys, vec![("P1", "C1", 2), ("P2", "C1", 1), ("P1", "C2", 1)]);
}

#[test]
fn locale_labels_are_canonicalized_and_merged() {
    let text = format!(
        "{HEADER}\n\
         C1,Conexões Realizadas,P1,2,1,1\n\
         C1,Connections Made,P1,3,3,0\n"
    );
    let import = parse(&text).unwrap();
    let metrics = &import.groups[0].metrics;
    assert_eq!(metrics.len(), 1);
    assert_eq!(metrics[0].event_type, "Connection Requests Accepted");
    assert_eq!(metrics[0].daily_data.get("2025-01-01"), Some(&4));
    assert_eq!(metrics[0].daily_data.get("2025-01-02"), Some(&1));
    assert_eq!(metrics[0].total_count, 5);
}

#[test]
fn unknown_event_type_is_kept_verbatim() {
    let text = format!("{HEADER}\nC1,InMails Sent,P1,2,1,1\n");
    let import = parse(&text).unwrap();
    assert_eq!(import.groups[0].metrics[0].event_type, "InMails Sent");
}

#[test]
fn daily_sum_is_authoritative_over_total_count() {
    let text = format!("{HEADER}\nC1,Profile Visits,P1,99,2,3\n");
    let import = parse(&text).unwrap();
    assert_eq!(import.groups[0].metrics[0].total_count, 5);
}

#[test]
fn total_count_is_fallback_when_no_daily_values() {
    let text = format!("{HEADER}\nC1,Profile Visits,P1,7,,\n");
    let import = parse(&text).unwrap();
    let metric = &import.groups[0].metrics[0];
    assert!(metric.daily_data.is_empty());
    assert_eq!(metric.total_count, 7);
}

#[test]
fn non_numeric_daily_cells_are_absent_not_zero() {
    let text = format!("{HEADER}\nC1,Post Likes,P1,3,abc,3\n");
    let import = parse(&text).unwrap();
    let metric = &import.groups[0].metrics[0];
    assert!(!metric.daily_data.contains_key("2025-01-01"));
    assert_eq!(metric.daily_data.get("2025-01-02"), Some(&3));
}

#[test]
fn active_days_span_every_date_column_in_header() {
    let text = "Campaign Name,Event Type,Profile Name,Total Count,2025-01-01,2025-01-02,2025-01-03\n\
                C1,Messages Sent,P1,4,4,,\n";
    let import = parse(text).unwrap();
    let group = &import.groups[0];
    assert_eq!(group.active_days, 3);
    assert_eq!(group.start_date.unwrap().to_string(), "2025-01-01");
    assert_eq!(group.end_date.unwrap().to_string(), "2025-01-03");
    assert_eq!(group.metrics[0].daily_data.len(), 1);
}

#[test]
fn active_days_is_the_same_for_every_group() {
    let text = "Campaign Name,Event Type,Profile Name,Total Count,2025-01-01,2025-01-02,2025-01-05\n\
                C1,Messages Sent,P1,1,0,1,\n\
                C2,Messages Sent,P1,0,,,\n";
    let import = parse(text).unwrap();
    for group in &import.groups {
        assert_eq!(group.active_days, 3);
        assert_eq!(group.end_date.unwrap().to_string(), "2025-01-05");
    }
}

#[test]
fn no_date_columns_leaves_span_empty() {
    let text = "Campaign Name,Event Type,Profile Name,Total Count\nC1,Messages Sent,P1,7\n";
    let import = parse(text).unwrap();
    let group = &import.groups[0];
    assert_eq!(group.active_days, 0);
    assert!(group.start_date.is_none());
    assert!(group.end_date.is_none());
}

#[test]
fn non_date_extra_columns_are_ignored() {
    let text = "Campaign Name,Event Type,Profile Name,Total Count,Notes,2025-1-3,2025-01-03\n\
                C1,Messages Sent,P1,4,hello,9,4\n";
    let import = parse(text).unwrap();
    let metric = &import.groups[0].metrics[0];
    assert_eq!(metric.daily_data.len(), 1);
    assert_eq!(metric.total_count, 4);
}

#[test]
fn missing_total_count_column_is_reported() {
    let text = "Campaign Name,Event Type,Profile Name,2025-01-01\nC1,Messages Sent,P1,1\n";
    let err = parse(text).unwrap_err();
    assert!(
        matches!(err, IngestError::MissingRequiredColumns { ref columns, .. } if columns == &vec!["Total Count".to_string()])
    );
}

#[test]
fn into_metrics_flattens_groups() {
    let text = format!(
        "{HEADER}\nC1,Messages Sent,P1,1,1,0\nC2,Messages Sent,P1,1,0,1\n"
    );
    let import = parse(&text).unwrap();
    assert_eq!(import.metrics().count(), 2);
    assert_eq!(import.into_metrics().len(), 2);
}
