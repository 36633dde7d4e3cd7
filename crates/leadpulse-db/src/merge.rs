//! Merge rules applied when parsed files are folded into a user's data.
//!
//! Leads deduplicate on `(user, campaign, name)` with full overwrite by the
//! later record. Metrics at the same `(user, campaign, event type, profile)`
//! key accumulate per date. How repeated imports of one file interact with
//! that accumulation is decided by [`ImportPolicy`]:
//!
//! - [`ImportPolicy::Accumulate`]: every import adds into one shared bucket.
//! - [`ImportPolicy::ReplaceBatch`]: contributions are bucketed by the file's
//!   content hash and re-importing the same bytes replaces that bucket.

use std::collections::{BTreeMap, HashMap};

use leadpulse_core::{CampaignMetric, ImportPolicy, Lead};
use serde::Serialize;
use sha2::{Digest, Sha256};

const SHARED_BATCH: &str = "shared";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LeadKey {
    pub user_id: String,
    pub campaign_name: String,
    pub lead_name: String,
}

impl LeadKey {
    #[must_use]
    pub fn for_lead(user_id: &str, lead: &Lead) -> Self {
        Self {
            user_id: user_id.to_string(),
            campaign_name: lead.campaign.clone(),
            lead_name: lead.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MetricKey {
    pub user_id: String,
    pub campaign_name: String,
    pub event_type: String,
    pub profile_name: String,
}

impl MetricKey {
    #[must_use]
    pub fn for_metric(user_id: &str, metric: &CampaignMetric) -> Self {
        Self {
            user_id: user_id.to_string(),
            campaign_name: metric.campaign_name.clone(),
            event_type: metric.event_type.clone(),
            profile_name: metric.profile_name.clone(),
        }
    }
}

/// Identifies which bucket an import's metric contributions land in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct BatchKey(String);

impl BatchKey {
    #[must_use]
    pub fn shared() -> Self {
        Self(SHARED_BATCH.to_string())
    }

    /// Content-addressed key: `sha256:<hex digest of the file bytes>`.
    #[must_use]
    pub fn for_content(bytes: &[u8]) -> Self {
        Self(format!("sha256:{:x}", Sha256::digest(bytes)))
    }

    #[must_use]
    pub fn for_policy(policy: ImportPolicy, bytes: &[u8]) -> Self {
        match policy {
            ImportPolicy::Accumulate => Self::shared(),
            ImportPolicy::ReplaceBatch => Self::for_content(bytes),
        }
    }

    #[must_use]
    pub fn is_shared(&self) -> bool {
        self.0 == SHARED_BATCH
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BatchKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Collapses leads sharing `(campaign, name)`: the later record replaces the
/// earlier one wholesale and takes its position.
#[must_use]
pub fn dedup_leads(leads: Vec<Lead>) -> Vec<Lead> {
    let mut positions: HashMap<(String, String), usize> = HashMap::new();
    let mut unique: Vec<Lead> = Vec::with_capacity(leads.len());
    for lead in leads {
        let key = (lead.campaign.clone(), lead.name.clone());
        if let Some(&pos) = positions.get(&key) {
            unique[pos] = lead;
        } else {
            positions.insert(key, unique.len());
            unique.push(lead);
        }
    }
    unique
}

/// Adds `incoming` into `existing` per date.
///
/// The merged `total_count` is the sum of the merged daily map; when neither
/// side has dated entries it is the sum of both totals.
#[must_use]
pub fn merge_metric(existing: &CampaignMetric, incoming: &CampaignMetric) -> CampaignMetric {
    let mut daily = existing.daily_data.clone();
    for (date, count) in &incoming.daily_data {
        *daily.entry(date.clone()).or_insert(0) += count;
    }

    let total_count = if daily.is_empty() {
        existing.total_count + incoming.total_count
    } else {
        daily.values().sum()
    };

    CampaignMetric {
        campaign_name: existing.campaign_name.clone(),
        profile_name: existing.profile_name.clone(),
        event_type: existing.event_type.clone(),
        total_count,
        daily_data: daily,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MergeOutcome {
    pub leads_written: usize,
    pub metrics_written: usize,
    /// Metric series removed because the batch was imported before.
    pub metrics_replaced: usize,
}

/// In-memory store applying the merge rules; the Postgres layer mirrors it.
#[derive(Debug, Default)]
pub struct MergeEngine {
    policy: ImportPolicy,
    leads: BTreeMap<LeadKey, Lead>,
    metrics: BTreeMap<MetricKey, BTreeMap<BatchKey, CampaignMetric>>,
}

impl MergeEngine {
    #[must_use]
    pub fn new(policy: ImportPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn policy(&self) -> ImportPolicy {
        self.policy
    }

    /// Folds one parsed file into the store.
    ///
    /// `content` is the raw file bytes and only matters under
    /// [`ImportPolicy::ReplaceBatch`].
    pub fn apply(
        &mut self,
        user_id: &str,
        content: &[u8],
        leads: Vec<Lead>,
        metrics: &[CampaignMetric],
    ) -> MergeOutcome {
        let batch = BatchKey::for_policy(self.policy, content);
        let mut outcome = MergeOutcome::default();

        if !batch.is_shared() {
            outcome.metrics_replaced = self.remove_batch(user_id, &batch);
        }

        for lead in dedup_leads(leads) {
            self.leads.insert(LeadKey::for_lead(user_id, &lead), lead);
            outcome.leads_written += 1;
        }

        for metric in metrics {
            let slots = self
                .metrics
                .entry(MetricKey::for_metric(user_id, metric))
                .or_default();
            let merged = match slots.get(&batch) {
                Some(existing) => merge_metric(existing, metric),
                None => metric.clone(),
            };
            slots.insert(batch.clone(), merged);
            outcome.metrics_written += 1;
        }

        tracing::debug!(
            user_id,
            batch = %batch,
            leads = outcome.leads_written,
            metrics = outcome.metrics_written,
            replaced = outcome.metrics_replaced,
            "merged import"
        );
        outcome
    }

    fn remove_batch(&mut self, user_id: &str, batch: &BatchKey) -> usize {
        let mut removed = 0;
        for (key, slots) in &mut self.metrics {
            if key.user_id == user_id && slots.remove(batch).is_some() {
                removed += 1;
            }
        }
        self.metrics.retain(|_, slots| !slots.is_empty());
        removed
    }

    /// A user's leads ordered by `(campaign, name)`.
    #[must_use]
    pub fn leads(&self, user_id: &str) -> Vec<&Lead> {
        self.leads
            .iter()
            .filter(|(key, _)| key.user_id == user_id)
            .map(|(_, lead)| lead)
            .collect()
    }

    /// A user's metrics with every batch folded together.
    #[must_use]
    pub fn metrics(&self, user_id: &str) -> Vec<CampaignMetric> {
        self.metrics
            .iter()
            .filter(|(key, _)| key.user_id == user_id)
            .filter_map(|(_, slots)| {
                let mut batches = slots.values();
                let first = batches.next()?.clone();
                Some(batches.fold(first, |acc, next| merge_metric(&acc, next)))
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "merge_test.rs"]
mod tests;
