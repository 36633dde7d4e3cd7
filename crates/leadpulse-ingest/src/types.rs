use std::path::Path;

use serde::Serialize;

/// Profile name used for hybrid metrics when neither the file nor the caller
/// names the sending profile.
pub const DEFAULT_PROFILE: &str = "default";

/// Row-level diagnostics for one parsed file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ParseReport {
    /// Data rows seen (blank rows excluded).
    pub rows_read: usize,
    /// Rows dropped for a missing required value.
    pub rows_skipped: usize,
    /// Rows dropped because their campaign is on the exclusion list.
    pub rows_excluded: usize,
}

impl ParseReport {
    #[must_use]
    pub fn rows_used(&self) -> usize {
        self.rows_read - self.rows_skipped - self.rows_excluded
    }

    pub(crate) fn skip(&mut self, file: &str, row_number: usize, reason: &str) {
        self.rows_skipped += 1;
        tracing::debug!(file, row = row_number, reason, "skipping row");
    }
}

/// Caller-supplied facts about a file that the file itself may not carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportContext {
    pub file_name: String,
    /// Campaign assigned to hybrid rows without a campaign column.
    pub campaign: Option<String>,
    /// Sending profile assigned to hybrid metrics without a profile column.
    pub profile: Option<String>,
    /// Demand the full three-follow-up hybrid layout.
    pub strict_layout: bool,
}

impl ImportContext {
    #[must_use]
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            campaign: None,
            profile: None,
            strict_layout: false,
        }
    }

    /// Context for a file on disk; the fallback campaign is the file stem.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        let file_name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
        let campaign = path
            .file_stem()
            .map(|s| s.to_string_lossy().trim().to_string())
            .filter(|s| !s.is_empty());
        Self {
            campaign,
            ..Self::new(file_name)
        }
    }

    #[must_use]
    pub fn with_campaign(mut self, campaign: impl Into<String>) -> Self {
        self.campaign = Some(campaign.into());
        self
    }

    #[must_use]
    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    #[must_use]
    pub fn with_strict_layout(mut self, strict: bool) -> Self {
        self.strict_layout = strict;
        self
    }
}
