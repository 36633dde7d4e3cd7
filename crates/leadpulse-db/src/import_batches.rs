//! Database operations for `import_batches`.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::DbError;

/// A row from the `import_batches` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ImportBatchRow {
    pub id: i64,
    pub public_id: Uuid,
    pub user_id: String,
    /// `shared`, or `sha256:<hex>` under the replace-batch policy.
    pub batch_key: String,
    pub file_name: String,
    pub file_format: String,
    pub import_policy: String,
    pub leads_written: i32,
    pub metrics_written: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewImportBatch<'a> {
    pub user_id: &'a str,
    pub batch_key: &'a str,
    pub file_name: &'a str,
    pub file_format: &'a str,
    pub import_policy: &'a str,
}

/// Records an import batch and returns the new row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn create_import_batch(
    conn: &mut PgConnection,
    batch: &NewImportBatch<'_>,
) -> Result<ImportBatchRow, DbError> {
    let row = sqlx::query_as::<_, ImportBatchRow>(
        "INSERT INTO import_batches \
             (public_id, user_id, batch_key, file_name, file_format, import_policy) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         RETURNING id, public_id, user_id, batch_key, file_name, file_format, \
                   import_policy, leads_written, metrics_written, created_at",
    )
    .bind(Uuid::new_v4())
    .bind(batch.user_id)
    .bind(batch.batch_key)
    .bind(batch.file_name)
    .bind(batch.file_format)
    .bind(batch.import_policy)
    .fetch_one(conn)
    .await?;

    Ok(row)
}

/// Stores the written counts on a batch.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no batch has this id, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn finish_import_batch(
    conn: &mut PgConnection,
    id: i64,
    leads_written: i32,
    metrics_written: i32,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE import_batches SET leads_written = $1, metrics_written = $2 WHERE id = $3",
    )
    .bind(leads_written)
    .bind(metrics_written)
    .bind(id)
    .execute(conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}

/// Most recent batches for a user, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_import_batches(
    pool: &PgPool,
    user_id: &str,
    limit: i64,
) -> Result<Vec<ImportBatchRow>, DbError> {
    let rows = sqlx::query_as::<_, ImportBatchRow>(
        "SELECT id, public_id, user_id, batch_key, file_name, file_format, \
                import_policy, leads_written, metrics_written, created_at \
         FROM import_batches \
         WHERE user_id = $1 \
         ORDER BY created_at DESC, id DESC \
         LIMIT $2",
    )
    .bind(user_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
