//! Canonical metric names and the locale-specific event-type labels that map
//! onto them, plus the list of campaign names that are source-system noise.
//!
//! A [`Vocabulary`] is built once (from [`Vocabulary::builtin`] or a YAML file
//! via [`load_vocabulary`]) and passed by reference to every parser and to
//! the aggregator. Adding a new locale label is a data change only.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::text::fold_label;
use crate::ConfigError;

/// Canonical engagement metrics understood by the aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MetricKind {
    #[serde(rename = "invitations")]
    Invitations,
    #[serde(rename = "connections")]
    Connections,
    #[serde(rename = "messages")]
    Messages,
    #[serde(rename = "follow-up-1")]
    FollowUp1,
    #[serde(rename = "follow-up-2")]
    FollowUp2,
    #[serde(rename = "follow-up-3")]
    FollowUp3,
    #[serde(rename = "profile-visits")]
    ProfileVisits,
    #[serde(rename = "post-likes")]
    PostLikes,
    #[serde(rename = "comments")]
    Comments,
    #[serde(rename = "positive-responses")]
    PositiveResponses,
    #[serde(rename = "negative-responses")]
    NegativeResponses,
    #[serde(rename = "meetings")]
    Meetings,
}

impl MetricKind {
    pub const ALL: [MetricKind; 12] = [
        MetricKind::Invitations,
        MetricKind::Connections,
        MetricKind::Messages,
        MetricKind::FollowUp1,
        MetricKind::FollowUp2,
        MetricKind::FollowUp3,
        MetricKind::ProfileVisits,
        MetricKind::PostLikes,
        MetricKind::Comments,
        MetricKind::PositiveResponses,
        MetricKind::NegativeResponses,
        MetricKind::Meetings,
    ];

    /// The label every synonym of this kind canonicalizes to.
    #[must_use]
    pub fn canonical_label(self) -> &'static str {
        match self {
            MetricKind::Invitations => "Connection Requests Sent",
            MetricKind::Connections => "Connection Requests Accepted",
            MetricKind::Messages => "Messages Sent",
            MetricKind::FollowUp1 => "Follow-Ups 1",
            MetricKind::FollowUp2 => "Follow-Ups 2",
            MetricKind::FollowUp3 => "Follow-Ups 3",
            MetricKind::ProfileVisits => "Profile Visits",
            MetricKind::PostLikes => "Post Likes",
            MetricKind::Comments => "Comments Done",
            MetricKind::PositiveResponses => "Positive Responses",
            MetricKind::NegativeResponses => "Negative Responses",
            MetricKind::Meetings => "Meetings Booked",
        }
    }

    /// Follow-up kind for a 1-based follow-up number.
    #[must_use]
    pub fn follow_up(number: usize) -> Option<Self> {
        match number {
            1 => Some(MetricKind::FollowUp1),
            2 => Some(MetricKind::FollowUp2),
            3 => Some(MetricKind::FollowUp3),
            _ => None,
        }
    }
}

impl std::fmt::Display for MetricKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.canonical_label())
    }
}

/// The literal labels that mean `kind`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricSynonyms {
    pub kind: MetricKind,
    pub labels: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct VocabularyFile {
    version: u32,
    metrics: Vec<MetricSynonyms>,
    #[serde(default)]
    excluded_campaigns: Vec<String>,
}

/// Immutable synonym table and campaign exclusion list.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    version: u32,
    metrics: Vec<MetricSynonyms>,
    excluded_campaigns: Vec<String>,
    by_label: HashMap<String, MetricKind>,
    excluded: HashSet<String>,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Vocabulary {
    /// The PT/EN vocabulary shipped with the importer.
    #[must_use]
    pub fn builtin() -> Self {
        let table: &[(MetricKind, &[&str])] = &[
            (
                MetricKind::Invitations,
                &[
                    "Connection Requests Sent",
                    "Convites Enviados",
                    "Solicitações de Conexão Enviadas",
                    "Invitations Sent",
                    "Invites Sent",
                ],
            ),
            (
                MetricKind::Connections,
                &[
                    "Connection Requests Accepted",
                    "Conexões Realizadas",
                    "Connections Made",
                    "Convites Aceitos",
                ],
            ),
            (
                MetricKind::Messages,
                &["Messages Sent", "Mensagens Enviadas"],
            ),
            (
                MetricKind::FollowUp1,
                &["Follow-Ups 1", "Follow-Up 1", "Follow Up 1", "FU1"],
            ),
            (
                MetricKind::FollowUp2,
                &["Follow-Ups 2", "Follow-Up 2", "Follow Up 2", "FU2"],
            ),
            (
                MetricKind::FollowUp3,
                &["Follow-Ups 3", "Follow-Up 3", "Follow Up 3", "FU3"],
            ),
            (
                MetricKind::ProfileVisits,
                &["Profile Visits", "Visitas ao Perfil", "Visitas de Perfil"],
            ),
            (
                MetricKind::PostLikes,
                &["Post Likes", "Curtidas", "Curtidas em Posts", "Likes"],
            ),
            (
                MetricKind::Comments,
                &["Comments Done", "Comentários", "Comentários Feitos", "Comments"],
            ),
            (
                MetricKind::PositiveResponses,
                &["Positive Responses", "Respostas Positivas"],
            ),
            (
                MetricKind::NegativeResponses,
                &["Negative Responses", "Respostas Negativas"],
            ),
            (
                MetricKind::Meetings,
                &["Meetings Booked", "Reuniões Agendadas", "Meetings"],
            ),
        ];

        let metrics = table
            .iter()
            .map(|(kind, labels)| MetricSynonyms {
                kind: *kind,
                labels: labels.iter().map(|l| (*l).to_string()).collect(),
            })
            .collect();

        let excluded_campaigns = [
            "Campaign 0",
            "Campaign Sent manually",
            "Sent manually",
            "Manual",
        ]
        .iter()
        .map(|c| (*c).to_string())
        .collect();

        Self::assemble(1, metrics, excluded_campaigns)
    }

    /// Builds a vocabulary from explicit parts, validating it first.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if the version is 0, a label is
    /// blank, or one label is claimed by two different kinds.
    pub fn from_parts(
        version: u32,
        metrics: Vec<MetricSynonyms>,
        excluded_campaigns: Vec<String>,
    ) -> Result<Self, ConfigError> {
        validate(version, &metrics, &excluded_campaigns)?;
        Ok(Self::assemble(version, metrics, excluded_campaigns))
    }

    fn assemble(
        version: u32,
        metrics: Vec<MetricSynonyms>,
        excluded_campaigns: Vec<String>,
    ) -> Self {
        let mut by_label = HashMap::new();
        for kind in MetricKind::ALL {
            by_label.insert(fold_label(kind.canonical_label()), kind);
        }
        for entry in &metrics {
            for label in &entry.labels {
                by_label.entry(fold_label(label)).or_insert(entry.kind);
            }
        }

        let excluded = excluded_campaigns.iter().map(|c| fold_label(c)).collect();

        Self {
            version,
            metrics,
            excluded_campaigns,
            by_label,
            excluded,
        }
    }

    #[must_use]
    pub fn version(&self) -> u32 {
        self.version
    }

    #[must_use]
    pub fn excluded_campaigns(&self) -> &[String] {
        &self.excluded_campaigns
    }

    /// The canonical kind a literal event-type label belongs to, if any.
    #[must_use]
    pub fn kind_of(&self, label: &str) -> Option<MetricKind> {
        self.by_label.get(&fold_label(label)).copied()
    }

    /// Maps a literal label to its canonical label. Unknown labels come back
    /// trimmed but otherwise untouched, so the function is idempotent.
    #[must_use]
    pub fn canonicalize(&self, label: &str) -> String {
        match self.kind_of(label) {
            Some(kind) => kind.canonical_label().to_string(),
            None => label.trim().to_string(),
        }
    }

    /// Whether `label` is one of `kind`'s synonyms (or its canonical label).
    #[must_use]
    pub fn matches(&self, label: &str, kind: MetricKind) -> bool {
        self.kind_of(label) == Some(kind)
    }

    /// Every configured literal label for `kind`, canonical label first.
    #[must_use]
    pub fn labels_for(&self, kind: MetricKind) -> Vec<&str> {
        let mut labels = vec![kind.canonical_label()];
        labels.extend(
            self.metrics
                .iter()
                .filter(|m| m.kind == kind)
                .flat_map(|m| m.labels.iter().map(String::as_str))
                .filter(|l| fold_label(l) != fold_label(kind.canonical_label())),
        );
        labels
    }

    /// Whether a campaign name is on the exclusion list (trimmed, case-insensitive).
    #[must_use]
    pub fn is_excluded_campaign(&self, campaign_name: &str) -> bool {
        self.excluded.contains(&fold_label(campaign_name))
    }
}

/// Load and validate a vocabulary from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_vocabulary(path: &Path) -> Result<Vocabulary, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::VocabularyFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_vocabulary(&content)
}

fn parse_vocabulary(content: &str) -> Result<Vocabulary, ConfigError> {
    let file: VocabularyFile = serde_yaml::from_str(content)?;
    Vocabulary::from_parts(file.version, file.metrics, file.excluded_campaigns)
}

fn validate(
    version: u32,
    metrics: &[MetricSynonyms],
    excluded_campaigns: &[String],
) -> Result<(), ConfigError> {
    if version == 0 {
        return Err(ConfigError::Validation(
            "vocabulary version must be at least 1".to_string(),
        ));
    }

    let mut owners: HashMap<String, MetricKind> = MetricKind::ALL
        .iter()
        .map(|k| (fold_label(k.canonical_label()), *k))
        .collect();

    for entry in metrics {
        for label in &entry.labels {
            let folded = fold_label(label);
            if folded.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "blank label listed under '{}'",
                    entry.kind
                )));
            }
            if let Some(owner) = owners.get(&folded) {
                if *owner != entry.kind {
                    return Err(ConfigError::Validation(format!(
                        "label '{label}' is mapped to both '{owner}' and '{}'",
                        entry.kind
                    )));
                }
            }
            owners.insert(folded, entry.kind);
        }
    }

    if excluded_campaigns.iter().any(|c| c.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "excluded campaign names must be non-empty".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
#[path = "vocabulary_test.rs"]
mod tests;
