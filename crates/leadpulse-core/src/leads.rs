use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::text::fold_label;

/// Number of follow-up slots carried on a [`Lead`].
pub const FOLLOW_UP_SLOTS: usize = 4;

/// Pipeline stage of a lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LeadStatus {
    #[default]
    Pending,
    Positive,
    Negative,
    FollowUp,
    RetomarContato,
    EmNegociacao,
    SemInteresse,
    SemFit,
}

impl LeadStatus {
    /// Stable identifier used for storage, e.g. `"retomar-contato"`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            LeadStatus::Pending => "pending",
            LeadStatus::Positive => "positive",
            LeadStatus::Negative => "negative",
            LeadStatus::FollowUp => "follow-up",
            LeadStatus::RetomarContato => "retomar-contato",
            LeadStatus::EmNegociacao => "em-negociacao",
            LeadStatus::SemInteresse => "sem-interesse",
            LeadStatus::SemFit => "sem-fit",
        }
    }

    /// Parses a status cell as exported by the CRM, in Portuguese or English.
    ///
    /// Returns `None` for empty or unknown labels so callers can keep their
    /// own default.
    #[must_use]
    pub fn from_label(raw: &str) -> Option<Self> {
        let folded = fold_label(raw).replace(['_', ' '], "-");
        let status = match folded.as_str() {
            "pending" | "pendente" => LeadStatus::Pending,
            "positive" | "positivo" | "positiva" => LeadStatus::Positive,
            "negative" | "negativo" | "negativa" => LeadStatus::Negative,
            "follow-up" | "followup" => LeadStatus::FollowUp,
            "retomar-contato" => LeadStatus::RetomarContato,
            "em-negociacao" | "negotiating" => LeadStatus::EmNegociacao,
            "sem-interesse" | "not-interested" => LeadStatus::SemInteresse,
            "sem-fit" | "no-fit" => LeadStatus::SemFit,
            _ => return None,
        };
        Some(status)
    }
}

impl std::fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One follow-up touchpoint: when it was sent and what came back.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowUp {
    pub date: Option<NaiveDate>,
    pub comments: Option<String>,
}

impl FollowUp {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.date.is_none() && self.comments.is_none()
    }
}

/// A prospect as reported by a leads or hybrid export.
///
/// The merge key is `(user, campaign, name)`; see `leadpulse_db::merge`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    pub id: Uuid,
    pub campaign: String,
    pub name: String,
    pub linkedin: Option<String>,
    pub company: Option<String>,
    pub position: Option<String>,
    pub status: LeadStatus,
    /// Where the lead came from, e.g. `"LinkedIn"` or `"Webinar"`.
    pub source: Option<String>,
    pub connection_date: Option<NaiveDate>,
    pub positive_response_date: Option<NaiveDate>,
    pub negative_response_date: Option<NaiveDate>,
    pub follow_ups: [FollowUp; FOLLOW_UP_SLOTS],
    pub meeting_date: Option<NaiveDate>,
    pub proposal_date: Option<NaiveDate>,
    /// Absent when the cell is empty or not a number; never coerced to zero.
    pub proposal_value: Option<Decimal>,
    pub sale_date: Option<NaiveDate>,
    pub sale_value: Option<Decimal>,
    pub observations: Option<String>,
    pub attended_webinar: bool,
    pub invite_sent: bool,
    pub connection_accepted: bool,
}

impl Lead {
    /// Creates a pending lead with every optional field absent.
    #[must_use]
    pub fn new(campaign: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            campaign: campaign.into(),
            name: name.into(),
            linkedin: None,
            company: None,
            position: None,
            status: LeadStatus::Pending,
            source: None,
            connection_date: None,
            positive_response_date: None,
            negative_response_date: None,
            follow_ups: Default::default(),
            meeting_date: None,
            proposal_date: None,
            proposal_value: None,
            sale_date: None,
            sale_value: None,
            observations: None,
            attended_webinar: false,
            invite_sent: false,
            connection_accepted: false,
        }
    }

    /// Number of follow-up slots that carry a date or a comment.
    #[must_use]
    pub fn follow_up_count(&self) -> usize {
        self.follow_ups.iter().filter(|f| !f.is_empty()).count()
    }
}
