//! Database operations for `leads`.

use chrono::{DateTime, NaiveDate, Utc};
use leadpulse_core::Lead;
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::DbError;

/// A row from the `leads` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LeadRow {
    pub id: i64,
    pub public_id: Uuid,
    pub user_id: String,
    pub campaign_name: String,
    pub lead_name: String,
    pub linkedin: Option<String>,
    pub company: Option<String>,
    pub position: Option<String>,
    pub status: String,
    pub connection_date: Option<NaiveDate>,
    pub positive_response_date: Option<NaiveDate>,
    pub negative_response_date: Option<NaiveDate>,
    /// JSON array of `{date, comments}` objects, one per follow-up slot.
    pub follow_ups: serde_json::Value,
    pub proposal_value: Option<Decimal>,
    pub sale_value: Option<Decimal>,
    pub invite_sent: bool,
    pub connection_accepted: bool,
    pub import_batch_id: Option<i64>,
    pub updated_at: DateTime<Utc>,
}

/// Upserts a lead on `(user_id, campaign_name, lead_name)`.
///
/// A conflicting row is overwritten field by field with the incoming lead;
/// only `public_id` and `created_at` survive. Returns the row id.
///
/// # Errors
///
/// Returns [`DbError::LeadEncoding`] if the follow-ups cannot be encoded, or
/// [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_lead(
    conn: &mut PgConnection,
    user_id: &str,
    lead: &Lead,
    import_batch_id: Option<i64>,
) -> Result<i64, DbError> {
    let follow_ups = serde_json::to_value(&lead.follow_ups).map_err(|source| DbError::LeadEncoding {
        campaign_name: lead.campaign.clone(),
        lead_name: lead.name.clone(),
        source,
    })?;

    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO leads \
             (public_id, user_id, campaign_name, lead_name, linkedin, company, position, \
              status, source, connection_date, positive_response_date, negative_response_date, \
              follow_ups, meeting_date, proposal_date, proposal_value, sale_date, sale_value, \
              observations, attended_webinar, invite_sent, connection_accepted, import_batch_id) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, \
                 $8, $9, $10, $11, $12, \
                 $13::jsonb, $14, $15, $16, $17, $18, \
                 $19, $20, $21, $22, $23) \
         ON CONFLICT (user_id, campaign_name, lead_name) DO UPDATE SET \
             linkedin               = EXCLUDED.linkedin, \
             company                = EXCLUDED.company, \
             position               = EXCLUDED.position, \
             status                 = EXCLUDED.status, \
             source                 = EXCLUDED.source, \
             connection_date        = EXCLUDED.connection_date, \
             positive_response_date = EXCLUDED.positive_response_date, \
             negative_response_date = EXCLUDED.negative_response_date, \
             follow_ups             = EXCLUDED.follow_ups, \
             meeting_date           = EXCLUDED.meeting_date, \
             proposal_date          = EXCLUDED.proposal_date, \
             proposal_value         = EXCLUDED.proposal_value, \
             sale_date              = EXCLUDED.sale_date, \
             sale_value             = EXCLUDED.sale_value, \
             observations           = EXCLUDED.observations, \
             attended_webinar       = EXCLUDED.attended_webinar, \
             invite_sent            = EXCLUDED.invite_sent, \
             connection_accepted    = EXCLUDED.connection_accepted, \
             import_batch_id        = EXCLUDED.import_batch_id, \
             updated_at             = NOW() \
         RETURNING id",
    )
    .bind(lead.id)
    .bind(user_id)
    .bind(&lead.campaign)
    .bind(&lead.name)
    .bind(&lead.linkedin)
    .bind(&lead.company)
    .bind(&lead.position)
    .bind(lead.status.as_str())
    .bind(&lead.source)
    .bind(lead.connection_date)
    .bind(lead.positive_response_date)
    .bind(lead.negative_response_date)
    .bind(follow_ups)
    .bind(lead.meeting_date)
    .bind(lead.proposal_date)
    .bind(lead.proposal_value)
    .bind(lead.sale_date)
    .bind(lead.sale_value)
    .bind(&lead.observations)
    .bind(lead.attended_webinar)
    .bind(lead.invite_sent)
    .bind(lead.connection_accepted)
    .bind(import_batch_id)
    .fetch_one(conn)
    .await?;

    Ok(id)
}

/// A user's leads ordered by campaign then name.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_leads(pool: &PgPool, user_id: &str) -> Result<Vec<LeadRow>, DbError> {
    let rows = sqlx::query_as::<_, LeadRow>(
        "SELECT id, public_id, user_id, campaign_name, lead_name, linkedin, company, position, \
                status, connection_date, positive_response_date, negative_response_date, \
                follow_ups, proposal_value, sale_value, invite_sent, connection_accepted, \
                import_batch_id, updated_at \
         FROM leads \
         WHERE user_id = $1 \
         ORDER BY campaign_name, lead_name",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
