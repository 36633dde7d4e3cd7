//! Metric persistence with atomic per-date increments, and the transactional
//! import that writes a parsed file's leads and metrics together.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use leadpulse_core::{CampaignMetric, FileFormat, ImportPolicy, Lead};
use serde::Serialize;
use sqlx::{PgConnection, PgPool};

use crate::import_batches::{create_import_batch, finish_import_batch, NewImportBatch};
use crate::leads::upsert_lead;
use crate::merge::{dedup_leads, BatchKey};
use crate::DbError;

#[derive(Debug, sqlx::FromRow)]
struct MetricDayRow {
    campaign_name: String,
    event_type: String,
    profile_name: String,
    metric_date: NaiveDate,
    count: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct MetricTotalRow {
    campaign_name: String,
    event_type: String,
    profile_name: String,
    total_count: i64,
}

/// One parsed file ready to be written.
#[derive(Debug, Clone, Copy)]
pub struct ImportPayload<'a> {
    pub user_id: &'a str,
    pub file_name: &'a str,
    pub file_format: FileFormat,
    /// Raw file bytes; hashed into the batch key under replace-batch.
    pub content: &'a [u8],
    pub leads: &'a [Lead],
    pub metrics: &'a [CampaignMetric],
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersistedImport {
    pub batch_id: i64,
    pub batch_key: String,
    pub leads_written: usize,
    pub metric_rows_written: usize,
    /// Day and total rows deleted because the batch had been imported before.
    pub rows_replaced: u64,
}

/// Adds one series into the store under `batch`.
///
/// Dated entries increment `campaign_metric_days` atomically; a series with
/// no dated entries increments `campaign_metric_totals` instead. Keys that
/// are not ISO dates are skipped. Returns the number of rows touched.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any statement fails.
pub async fn write_metric(
    conn: &mut PgConnection,
    user_id: &str,
    batch: &BatchKey,
    metric: &CampaignMetric,
) -> Result<usize, DbError> {
    if metric.daily_data.is_empty() {
        sqlx::query(
            "INSERT INTO campaign_metric_totals \
                 (user_id, campaign_name, event_type, profile_name, batch_key, total_count) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT (user_id, campaign_name, event_type, profile_name, batch_key) DO UPDATE SET \
                 total_count = campaign_metric_totals.total_count + EXCLUDED.total_count, \
                 updated_at  = NOW()",
        )
        .bind(user_id)
        .bind(&metric.campaign_name)
        .bind(&metric.event_type)
        .bind(&metric.profile_name)
        .bind(batch.as_str())
        .bind(metric.total_count)
        .execute(&mut *conn)
        .await?;
        return Ok(1);
    }

    let mut written = 0;
    for (key, count) in &metric.daily_data {
        let Ok(date) = NaiveDate::parse_from_str(key, "%Y-%m-%d") else {
            tracing::warn!(
                campaign = %metric.campaign_name,
                event_type = %metric.event_type,
                key = %key,
                "skipping metric entry with a malformed date key"
            );
            continue;
        };

        sqlx::query(
            "INSERT INTO campaign_metric_days \
                 (user_id, campaign_name, event_type, profile_name, batch_key, metric_date, count) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             ON CONFLICT (user_id, campaign_name, event_type, profile_name, batch_key, metric_date) \
             DO UPDATE SET \
                 count      = campaign_metric_days.count + EXCLUDED.count, \
                 updated_at = NOW()",
        )
        .bind(user_id)
        .bind(&metric.campaign_name)
        .bind(&metric.event_type)
        .bind(&metric.profile_name)
        .bind(batch.as_str())
        .bind(date)
        .bind(*count)
        .execute(&mut *conn)
        .await?;
        written += 1;
    }
    Ok(written)
}

async fn delete_batch(
    conn: &mut PgConnection,
    user_id: &str,
    batch: &BatchKey,
) -> Result<u64, DbError> {
    let days = sqlx::query("DELETE FROM campaign_metric_days WHERE user_id = $1 AND batch_key = $2")
        .bind(user_id)
        .bind(batch.as_str())
        .execute(&mut *conn)
        .await?;
    let totals =
        sqlx::query("DELETE FROM campaign_metric_totals WHERE user_id = $1 AND batch_key = $2")
            .bind(user_id)
            .bind(batch.as_str())
            .execute(&mut *conn)
            .await?;
    Ok(days.rows_affected() + totals.rows_affected())
}

/// Writes one parsed file in a single transaction.
///
/// Under [`ImportPolicy::ReplaceBatch`] the earlier contributions of the same
/// file content are deleted first, so re-importing identical bytes leaves the
/// stored metrics unchanged. Leads are deduplicated before upserting.
///
/// # Errors
///
/// Returns [`DbError`] if any statement fails; the transaction is rolled back.
pub async fn persist_import(
    pool: &PgPool,
    policy: ImportPolicy,
    payload: &ImportPayload<'_>,
) -> Result<PersistedImport, DbError> {
    let batch = BatchKey::for_policy(policy, payload.content);
    let mut tx = pool.begin().await?;

    let rows_replaced = if batch.is_shared() {
        0
    } else {
        delete_batch(&mut *tx, payload.user_id, &batch).await?
    };

    let format = payload.file_format.to_string();
    let policy_name = policy.to_string();
    let batch_row = create_import_batch(
        &mut *tx,
        &NewImportBatch {
            user_id: payload.user_id,
            batch_key: batch.as_str(),
            file_name: payload.file_name,
            file_format: &format,
            import_policy: &policy_name,
        },
    )
    .await?;

    let leads = dedup_leads(payload.leads.to_vec());
    for lead in &leads {
        upsert_lead(&mut *tx, payload.user_id, lead, Some(batch_row.id)).await?;
    }

    let mut metric_rows_written = 0;
    for metric in payload.metrics {
        metric_rows_written += write_metric(&mut *tx, payload.user_id, &batch, metric).await?;
    }

    finish_import_batch(
        &mut *tx,
        batch_row.id,
        i32::try_from(leads.len()).unwrap_or(i32::MAX),
        i32::try_from(payload.metrics.len()).unwrap_or(i32::MAX),
    )
    .await?;

    tx.commit().await?;

    tracing::info!(
        user_id = payload.user_id,
        file = payload.file_name,
        batch = %batch,
        leads = leads.len(),
        metric_rows = metric_rows_written,
        replaced = rows_replaced,
        "persisted import"
    );

    Ok(PersistedImport {
        batch_id: batch_row.id,
        batch_key: batch.as_str().to_string(),
        leads_written: leads.len(),
        metric_rows_written,
        rows_replaced,
    })
}

/// A user's stored metrics with every batch folded together.
///
/// A series with dated entries totals to the sum of its days; a series with
/// none carries the sum of its stored totals. Ordered by campaign, event
/// type, then profile.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if either query fails.
pub async fn list_campaign_metrics(
    pool: &PgPool,
    user_id: &str,
) -> Result<Vec<CampaignMetric>, DbError> {
    let days = sqlx::query_as::<_, MetricDayRow>(
        "SELECT campaign_name, event_type, profile_name, metric_date, \
                SUM(count)::BIGINT AS count \
         FROM campaign_metric_days \
         WHERE user_id = $1 \
         GROUP BY campaign_name, event_type, profile_name, metric_date",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    let totals = sqlx::query_as::<_, MetricTotalRow>(
        "SELECT campaign_name, event_type, profile_name, \
                SUM(total_count)::BIGINT AS total_count \
         FROM campaign_metric_totals \
         WHERE user_id = $1 \
         GROUP BY campaign_name, event_type, profile_name",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(fold_metric_rows(days, totals))
}

fn fold_metric_rows(days: Vec<MetricDayRow>, totals: Vec<MetricTotalRow>) -> Vec<CampaignMetric> {
    let mut series: BTreeMap<(String, String, String), CampaignMetric> = BTreeMap::new();

    for row in days {
        let key = (row.campaign_name, row.event_type, row.profile_name);
        let metric = series.entry(key.clone()).or_insert_with(|| {
            CampaignMetric::from_daily(key.0, key.2, key.1, BTreeMap::new())
        });
        *metric
            .daily_data
            .entry(row.metric_date.format("%Y-%m-%d").to_string())
            .or_insert(0) += row.count;
    }
    for metric in series.values_mut() {
        metric.total_count = metric.daily_data.values().sum();
    }

    for row in totals {
        let key = (row.campaign_name, row.event_type, row.profile_name);
        series.entry(key.clone()).or_insert_with(|| CampaignMetric {
            campaign_name: key.0,
            profile_name: key.2,
            event_type: key.1,
            total_count: row.total_count,
            daily_data: BTreeMap::new(),
        });
    }

    series.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(campaign: &str, event: &str, date: &str, count: i64) -> MetricDayRow {
        MetricDayRow {
            campaign_name: campaign.to_string(),
            event_type: event.to_string(),
            profile_name: "P1".to_string(),
            metric_date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            count,
        }
    }

    fn total(campaign: &str, event: &str, total_count: i64) -> MetricTotalRow {
        MetricTotalRow {
            campaign_name: campaign.to_string(),
            event_type: event.to_string(),
            profile_name: "P1".to_string(),
            total_count,
        }
    }

    #[test]
    fn dated_rows_fold_into_one_series_per_key() {
        let metrics = fold_metric_rows(
            vec![
                day("C1", "Messages Sent", "2025-01-02", 3),
                day("C1", "Messages Sent", "2025-01-01", 2),
                day("C1", "Connection Requests Sent", "2025-01-01", 5),
            ],
            Vec::new(),
        );

        assert_eq!(metrics.len(), 2);
        assert_eq!(metrics[0].event_type, "Connection Requests Sent");
        let messages = &metrics[1];
        assert_eq!(messages.campaign_name, "C1");
        assert_eq!(messages.profile_name, "P1");
        assert_eq!(messages.total_count, 5);
        assert_eq!(messages.daily_data.get("2025-01-01"), Some(&2));
    }

    #[test]
    fn totals_only_apply_to_series_without_days() {
        let metrics = fold_metric_rows(
            vec![day("C1", "Messages Sent", "2025-01-01", 2)],
            vec![total("C1", "Messages Sent", 40), total("C1", "Profile Visits", 9)],
        );

        assert_eq!(metrics.len(), 2);
        assert_eq!(metrics[0].event_type, "Messages Sent");
        assert_eq!(metrics[0].total_count, 2);
        assert_eq!(metrics[1].event_type, "Profile Visits");
        assert_eq!(metrics[1].total_count, 9);
        assert!(metrics[1].daily_data.is_empty());
    }
}
