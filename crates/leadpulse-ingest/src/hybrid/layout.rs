//! Column-role resolution for hybrid exports.
//!
//! Hybrid files repeat the follow-up block headers verbatim (`Data de envio`,
//! `Resposta`, `Data da resposta`), so columns are resolved by occurrence
//! order rather than by name. The result is a fixed role → index table that
//! the row decoder consumes.

use std::collections::HashMap;

use leadpulse_core::fold_label;

use crate::detect::follow_up_flag_number;
use crate::error::IngestError;

/// Number of follow-up blocks a hybrid export can carry.
pub const FOLLOW_UP_BLOCKS: u8 = 3;

const SEND_DATE_LABEL: &str = "Data de envio";
const RESPONSE_LABEL: &str = "Resposta";
const RESPONSE_DATE_LABEL: &str = "Data da resposta";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnRole {
    Name,
    LinkedIn,
    Campaign,
    Profile,
    Company,
    Position,
    Observations,
    InviteFlag,
    /// First `Data de envio`.
    InviteDate,
    AcceptedFlag,
    AcceptedDate,
    /// `FU1`..`FU3`.
    FollowUpFlag(u8),
    /// `Data de envio` occurrences 2..=4 map to follow-ups 1..=3.
    FollowUpDate(u8),
    /// `Resposta` occurrences 1..=3.
    Response(u8),
    /// `Data da resposta` occurrences 1..=3.
    ResponseDate(u8),
}

#[derive(Debug, Clone, Default)]
pub struct HybridLayout {
    roles: HashMap<ColumnRole, usize>,
}

impl HybridLayout {
    #[must_use]
    pub fn get(&self, role: ColumnRole) -> Option<usize> {
        self.roles.get(&role).copied()
    }

    #[must_use]
    pub fn has(&self, role: ColumnRole) -> bool {
        self.roles.contains_key(&role)
    }

    fn assign(&mut self, role: ColumnRole, idx: usize) {
        self.roles.entry(role).or_insert(idx);
    }
}

#[derive(Debug, Default)]
struct OccurrenceCounts {
    send_date: usize,
    response: usize,
    response_date: usize,
}

/// Scans headers left to right and assigns each a role.
///
/// # Errors
///
/// Returns [`IngestError::MissingRequiredColumns`] when the name or
/// `LinkedIn` column is absent, and [`IngestError::UnexpectedColumnLayout`]
/// when a repeated label occurs more often than there are slots for it, when
/// responses and response dates are unpaired, or (in strict mode) when the
/// full three-block layout is not present.
pub fn resolve_layout<S: AsRef<str>>(
    file: &str,
    headers: &[S],
    strict: bool,
) -> Result<HybridLayout, IngestError> {
    let mut layout = HybridLayout::default();
    let mut counts = OccurrenceCounts::default();

    for (idx, header) in headers.iter().enumerate() {
        let folded = fold_label(header.as_ref());
        match folded.as_str() {
            "nome" | "name" => layout.assign(ColumnRole::Name, idx),
            "linkedin" | "linkedin url" | "perfil linkedin" => {
                layout.assign(ColumnRole::LinkedIn, idx);
            }
            "campanha" | "campaign" => layout.assign(ColumnRole::Campaign, idx),
            "perfil" | "profile" | "profile name" => layout.assign(ColumnRole::Profile, idx),
            "empresa" | "company" => layout.assign(ColumnRole::Company, idx),
            "cargo" | "position" => layout.assign(ColumnRole::Position, idx),
            "observacoes" | "observacao" | "observations" | "notes" => {
                layout.assign(ColumnRole::Observations, idx);
            }
            "invite" | "convite" => layout.assign(ColumnRole::InviteFlag, idx),
            "aceito" | "accepted" => layout.assign(ColumnRole::AcceptedFlag, idx),
            "data de aceite" | "data aceite" | "accepted date" => {
                layout.assign(ColumnRole::AcceptedDate, idx);
            }
            "data de envio" | "send date" | "sent date" => {
                counts.send_date += 1;
                match counts.send_date {
                    1 => layout.assign(ColumnRole::InviteDate, idx),
                    n @ 2..=4 => layout.assign(ColumnRole::FollowUpDate(block(n - 1)), idx),
                    _ => {}
                }
            }
            "resposta" | "response" => {
                counts.response += 1;
                if let n @ 1..=3 = counts.response {
                    layout.assign(ColumnRole::Response(block(n)), idx);
                }
            }
            "data da resposta" | "data resposta" | "response date" => {
                counts.response_date += 1;
                if let n @ 1..=3 = counts.response_date {
                    layout.assign(ColumnRole::ResponseDate(block(n)), idx);
                }
            }
            other => {
                if let Some(n) = follow_up_flag_number(other) {
                    layout.assign(ColumnRole::FollowUpFlag(n), idx);
                }
            }
        }
    }

    let mut missing = Vec::new();
    if !layout.has(ColumnRole::Name) {
        missing.push("Nome".to_string());
    }
    if !layout.has(ColumnRole::LinkedIn) {
        missing.push("LinkedIn".to_string());
    }
    if !missing.is_empty() {
        return Err(IngestError::MissingRequiredColumns {
            file: file.to_string(),
            columns: missing,
        });
    }

    validate_counts(file, &layout, &counts, strict)?;
    Ok(layout)
}

fn block(n: usize) -> u8 {
    u8::try_from(n).unwrap_or(u8::MAX)
}

fn validate_counts(
    file: &str,
    layout: &HybridLayout,
    counts: &OccurrenceCounts,
    strict: bool,
) -> Result<(), IngestError> {
    let blocks = usize::from(FOLLOW_UP_BLOCKS);
    let unexpected = |label: &str, expected: String, found: usize| IngestError::UnexpectedColumnLayout {
        file: file.to_string(),
        label: label.to_string(),
        expected,
        found,
    };

    if counts.send_date > blocks + 1 {
        return Err(unexpected(
            SEND_DATE_LABEL,
            format!("at most {}", blocks + 1),
            counts.send_date,
        ));
    }
    if counts.response > blocks {
        return Err(unexpected(
            RESPONSE_LABEL,
            format!("at most {blocks}"),
            counts.response,
        ));
    }
    if counts.response_date != counts.response {
        return Err(unexpected(
            RESPONSE_DATE_LABEL,
            format!("{} (one per \"{RESPONSE_LABEL}\")", counts.response),
            counts.response_date,
        ));
    }

    if strict {
        if counts.send_date != blocks + 1 {
            return Err(unexpected(
                SEND_DATE_LABEL,
                format!("exactly {}", blocks + 1),
                counts.send_date,
            ));
        }
        if counts.response != blocks {
            return Err(unexpected(
                RESPONSE_LABEL,
                format!("exactly {blocks}"),
                counts.response,
            ));
        }
        let flags = (1..=FOLLOW_UP_BLOCKS)
            .filter(|n| layout.has(ColumnRole::FollowUpFlag(*n)))
            .count();
        if flags != blocks {
            return Err(unexpected("FU1..FU3", format!("exactly {blocks}"), flags));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(list: &[&str]) -> Vec<String> {
        list.iter().map(|h| (*h).to_string()).collect()
    }

    fn full_layout() -> Vec<String> {
        headers(&[
            "Nome",
            "LinkedIn",
            "Invite",
            "Data de envio",
            "Aceito",
            "FU1",
            "Data de envio",
            "Resposta",
            "Data da resposta",
            "FU2",
            "Data de envio",
            "Resposta",
            "Data da resposta",
            "FU3",
            "Data de envio",
            "Resposta",
            "Data da resposta",
        ])
    }

    #[test]
    fn send_dates_resolve_by_occurrence() {
        let layout = resolve_layout("h.csv", &full_layout(), true).unwrap();
        assert_eq!(layout.get(ColumnRole::InviteDate), Some(3));
        assert_eq!(layout.get(ColumnRole::FollowUpDate(1)), Some(6));
        assert_eq!(layout.get(ColumnRole::FollowUpDate(2)), Some(10));
        assert_eq!(layout.get(ColumnRole::FollowUpDate(3)), Some(14));
    }

    #[test]
    fn responses_resolve_by_occurrence() {
        let layout = resolve_layout("h.csv", &full_layout(), false).unwrap();
        assert_eq!(layout.get(ColumnRole::Response(1)), Some(7));
        assert_eq!(layout.get(ColumnRole::ResponseDate(1)), Some(8));
        assert_eq!(layout.get(ColumnRole::Response(3)), Some(15));
        assert_eq!(layout.get(ColumnRole::ResponseDate(3)), Some(16));
        assert_eq!(layout.get(ColumnRole::FollowUpFlag(2)), Some(9));
    }

    #[test]
    fn second_send_date_belongs_to_first_follow_up() {
        let h = headers(&[
            "Nome",
            "LinkedIn",
            "Invite",
            "Data de envio",
            "Aceito",
            "Data de envio",
            "FU1",
            "Data de envio",
            "Resposta",
            "Data da resposta",
        ]);
        let layout = resolve_layout("h.csv", &h, false).unwrap();
        assert_eq!(layout.get(ColumnRole::FollowUpDate(1)), Some(5));
        assert_eq!(layout.get(ColumnRole::FollowUpDate(2)), Some(7));
    }

    #[test]
    fn fifth_send_date_is_rejected() {
        let mut h = full_layout();
        h.push("Data de envio".to_string());
        let err = resolve_layout("h.csv", &h, false).unwrap_err();
        assert!(matches!(
            err,
            IngestError::UnexpectedColumnLayout { ref label, found: 5, .. } if label == "Data de envio"
        ));
    }

    #[test]
    fn unpaired_response_date_is_rejected() {
        let h = headers(&["Nome", "LinkedIn", "FU1", "Resposta", "Resposta", "Data da resposta"]);
        let err = resolve_layout("h.csv", &h, false).unwrap_err();
        assert!(matches!(
            err,
            IngestError::UnexpectedColumnLayout { ref label, found: 1, .. } if label == "Data da resposta"
        ));
    }

    #[test]
    fn strict_mode_requires_three_blocks() {
        let h = headers(&[
            "Nome",
            "LinkedIn",
            "Invite",
            "Data de envio",
            "FU1",
            "Data de envio",
            "Resposta",
            "Data da resposta",
        ]);
        assert!(resolve_layout("h.csv", &h, false).is_ok());
        let err = resolve_layout("h.csv", &h, true).unwrap_err();
        assert!(matches!(err, IngestError::UnexpectedColumnLayout { .. }));
    }

    #[test]
    fn missing_identity_columns_are_reported() {
        let h = headers(&["Nome", "Invite"]);
        let err = resolve_layout("h.csv", &h, false).unwrap_err();
        assert!(matches!(
            err,
            IngestError::MissingRequiredColumns { ref columns, .. } if columns == &vec!["LinkedIn".to_string()]
        ));
    }
}
