//! Header-based classification of an export into a [`FileFormat`].

use std::sync::LazyLock;

use leadpulse_core::{Confidence, DetectionResult, FileFormat};
use regex::Regex;

use crate::columns::HeaderIndex;

pub(crate) const CAMPAIGN_NAME: &[&str] = &["Campaign Name"];
pub(crate) const EVENT_TYPE: &[&str] = &["Event Type"];
pub(crate) const PROFILE_NAME: &[&str] = &["Profile Name"];
pub(crate) const TOTAL_COUNT: &[&str] = &["Total Count"];

pub(crate) const LEAD_NAME: &[&str] = &["Nome", "Name"];
pub(crate) const LINKEDIN: &[&str] = &["LinkedIn", "LinkedIn URL", "Perfil LinkedIn"];
pub(crate) const CAMPAIGN: &[&str] = &["Campanha", "Campaign"];
pub(crate) const POSITIVE_RESPONSE_DATE: &[&str] =
    &["Data Resposta Positiva", "Positive Response Date"];
pub(crate) const NEGATIVE_RESPONSE_DATE: &[&str] =
    &["Data Resposta Negativa", "Negative Response Date"];

const HYBRID_FLAGS: &[&str] = &["invite", "convite", "aceito", "accepted"];

static FOLLOW_UP_FLAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^fu[ _-]?([1-3])$").expect("valid follow-up flag regex"));

/// The follow-up number a header like `FU1`, `FU_2` or `fu 3` names.
pub(crate) fn follow_up_flag_number(folded_header: &str) -> Option<u8> {
    FOLLOW_UP_FLAG
        .captures(folded_header)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

fn is_hybrid_marker(folded_header: &str) -> bool {
    HYBRID_FLAGS.contains(&folded_header) || follow_up_flag_number(folded_header).is_some()
}

/// Two or more markers are conclusive. A lone invite/accept flag is a strong
/// hint; a lone `FUn` header is weak on its own.
fn hybrid_confidence(folded: &[String]) -> Option<Confidence> {
    let markers: Vec<&str> = folded
        .iter()
        .map(String::as_str)
        .filter(|h| is_hybrid_marker(h))
        .collect();
    match markers.as_slice() {
        [] => None,
        [only] if HYBRID_FLAGS.contains(only) => Some(Confidence::Medium),
        [_] => Some(Confidence::Low),
        _ => Some(Confidence::High),
    }
}

/// Classifies a header row. Total and pure: any input yields one of the
/// four formats.
///
/// Rules, first match wins:
/// 1. `Campaign Name` + `Event Type` + `Profile Name` → campaign-input.
/// 2. name + `LinkedIn` + any invite/accept/follow-up flag → hybrid.
/// 3. name + `LinkedIn` + campaign + a response-date column → leads.
#[must_use]
pub fn detect<S: AsRef<str>>(headers: &[S]) -> DetectionResult {
    let index = HeaderIndex::new(headers);

    if index.contains_any(CAMPAIGN_NAME)
        && index.contains_any(EVENT_TYPE)
        && index.contains_any(PROFILE_NAME)
    {
        return DetectionResult::new(FileFormat::CampaignInput, Confidence::High);
    }

    let has_identity = index.contains_any(LEAD_NAME) && index.contains_any(LINKEDIN);
    if !has_identity {
        return DetectionResult::unrecognized();
    }

    if let Some(confidence) = hybrid_confidence(index.folded()) {
        return DetectionResult::new(FileFormat::Hybrid, confidence);
    }

    if index.contains_any(CAMPAIGN)
        && (index.contains_any(POSITIVE_RESPONSE_DATE) || index.contains_any(NEGATIVE_RESPONSE_DATE))
    {
        return DetectionResult::new(FileFormat::Leads, Confidence::High);
    }

    DetectionResult::unrecognized()
}
