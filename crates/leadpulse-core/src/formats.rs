use serde::{Deserialize, Serialize};

/// The structural family a CSV export belongs to, decided from its header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FileFormat {
    /// One row per `(campaign, profile, event type)` with one column per day.
    CampaignInput,
    /// One row per lead from a positive- or negative-response report.
    Leads,
    /// One row per lead with repeated follow-up column blocks.
    Hybrid,
    Unrecognized,
}

impl std::fmt::Display for FileFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileFormat::CampaignInput => write!(f, "campaign-input"),
            FileFormat::Leads => write!(f, "leads"),
            FileFormat::Hybrid => write!(f, "hybrid"),
            FileFormat::Unrecognized => write!(f, "unrecognized"),
        }
    }
}

/// How sure the detector is about a [`FileFormat`]. Ordered: `None < Low < Medium < High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    None,
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionResult {
    pub format: FileFormat,
    pub confidence: Confidence,
}

impl DetectionResult {
    #[must_use]
    pub fn new(format: FileFormat, confidence: Confidence) -> Self {
        Self { format, confidence }
    }

    #[must_use]
    pub fn unrecognized() -> Self {
        Self::new(FileFormat::Unrecognized, Confidence::None)
    }

    #[must_use]
    pub fn is_recognized(&self) -> bool {
        self.format != FileFormat::Unrecognized
    }
}
