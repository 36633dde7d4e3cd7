//! Parser for one-row-per-lead positive/negative response reports.

use leadpulse_core::{FollowUp, Lead, LeadStatus, FOLLOW_UP_SLOTS};
use serde::Serialize;

use crate::columns::HeaderIndex;
use crate::detect::{CAMPAIGN, LEAD_NAME, LINKEDIN, NEGATIVE_RESPONSE_DATE, POSITIVE_RESPONSE_DATE};
use crate::error::IngestError;
use crate::parse_helpers::{non_empty, parse_amount, parse_date};
use crate::table::{cell, CsvTable};
use crate::types::ParseReport;

/// Which response report a leads file is. Decided once per file from its
/// headers, never per row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseBranch {
    Positive,
    Negative,
}

impl ResponseBranch {
    fn default_status(self) -> LeadStatus {
        match self {
            ResponseBranch::Positive => LeadStatus::Positive,
            ResponseBranch::Negative => LeadStatus::Negative,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeadsImport {
    pub branch: ResponseBranch,
    pub leads: Vec<Lead>,
    pub report: ParseReport,
}

/// Column indices resolved once per file.
struct LeadColumns {
    name: Option<usize>,
    campaign: Option<usize>,
    linkedin: Option<usize>,
    company: Option<usize>,
    position: Option<usize>,
    status: Option<usize>,
    source: Option<usize>,
    connection_date: Option<usize>,
    positive_date: Option<usize>,
    negative_date: Option<usize>,
    follow_up_dates: [Option<usize>; FOLLOW_UP_SLOTS],
    follow_up_comments: [Option<usize>; FOLLOW_UP_SLOTS],
    meeting_date: Option<usize>,
    proposal_date: Option<usize>,
    proposal_value: Option<usize>,
    sale_date: Option<usize>,
    sale_value: Option<usize>,
    observations: Option<usize>,
    webinar: Option<usize>,
}

impl LeadColumns {
    fn resolve(index: &HeaderIndex) -> Self {
        let slot = |n: usize, templates: &[&str]| -> Option<usize> {
            let aliases: Vec<String> = templates.iter().map(|t| t.replace('#', &n.to_string())).collect();
            let refs: Vec<&str> = aliases.iter().map(String::as_str).collect();
            index.find(&refs)
        };

        let mut follow_up_dates = [None; FOLLOW_UP_SLOTS];
        let mut follow_up_comments = [None; FOLLOW_UP_SLOTS];
        for n in 1..=FOLLOW_UP_SLOTS {
            follow_up_dates[n - 1] = slot(
                n,
                &[
                    "Data Follow-up #",
                    "Data Follow up #",
                    "Data FU#",
                    "Data do Follow-up #",
                    "Follow-up # Date",
                ],
            );
            follow_up_comments[n - 1] = slot(
                n,
                &[
                    "Comentários Follow-up #",
                    "Comentário Follow-up #",
                    "Comentarios Follow up #",
                    "Comentários FU#",
                    "Follow-up # Comments",
                ],
            );
        }

        Self {
            name: index.find(LEAD_NAME),
            campaign: index.find(CAMPAIGN),
            linkedin: index.find(LINKEDIN),
            company: index.find(&["Empresa", "Company"]),
            position: index.find(&["Cargo", "Position", "Title"]),
            status: index.find(&["Status"]),
            source: index.find(&["Origem", "Fonte", "Source"]),
            connection_date: index.find(&["Data de Conexão", "Data Conexão", "Connection Date"]),
            positive_date: index.find(POSITIVE_RESPONSE_DATE),
            negative_date: index.find(NEGATIVE_RESPONSE_DATE),
            follow_up_dates,
            follow_up_comments,
            meeting_date: index.find(&["Data da Reunião", "Data Reunião", "Meeting Date"]),
            proposal_date: index.find(&["Data da Proposta", "Data Proposta", "Proposal Date"]),
            proposal_value: index.find(&["Valor da Proposta", "Valor Proposta", "Proposal Value"]),
            sale_date: index.find(&["Data da Venda", "Data Venda", "Sale Date"]),
            sale_value: index.find(&["Valor da Venda", "Valor Venda", "Sale Value"]),
            observations: index.find(&["Observações", "Observação", "Observations", "Notes"]),
            webinar: index.find(&["Participou do Webinar", "Attended Webinar"]),
        }
    }
}

/// Parses a leads table into [`Lead`] records.
///
/// Rows without a name or campaign are skipped and counted. Unrecognized
/// columns are ignored. Numeric and date cells that fail to parse leave the
/// field absent.
///
/// # Errors
///
/// Returns [`IngestError::MissingRequiredColumns`] if the name, `LinkedIn`,
/// campaign, or both response-date columns are absent.
pub fn parse_leads(file: &str, table: &CsvTable) -> Result<LeadsImport, IngestError> {
    let index = HeaderIndex::new(table.headers());
    let columns = LeadColumns::resolve(&index);

    let mut missing = Vec::new();
    if columns.name.is_none() {
        missing.push("Nome".to_string());
    }
    if columns.linkedin.is_none() {
        missing.push("LinkedIn".to_string());
    }
    if columns.campaign.is_none() {
        missing.push("Campanha".to_string());
    }
    if columns.positive_date.is_none() && columns.negative_date.is_none() {
        missing.push("Data Resposta Positiva | Data Resposta Negativa".to_string());
    }
    if !missing.is_empty() {
        return Err(IngestError::MissingRequiredColumns {
            file: file.to_string(),
            columns: missing,
        });
    }

    let branch = if columns.positive_date.is_some() {
        ResponseBranch::Positive
    } else {
        ResponseBranch::Negative
    };

    let mut report = ParseReport::default();
    let mut leads = Vec::new();

    for (row_idx, row) in table.rows().iter().enumerate() {
        let row_number = row_idx + 1;
        report.rows_read += 1;

        let name = cell(row, columns.name);
        let campaign = cell(row, columns.campaign);
        if name.is_empty() || campaign.is_empty() {
            report.skip(file, row_number, "missing lead name or campaign");
            continue;
        }

        leads.push(decode_lead(row, &columns, branch, campaign, name));
    }

    tracing::debug!(file, ?branch, leads = leads.len(), "parsed leads file");
    Ok(LeadsImport {
        branch,
        leads,
        report,
    })
}

fn decode_lead(
    row: &[String],
    columns: &LeadColumns,
    branch: ResponseBranch,
    campaign: &str,
    name: &str,
) -> Lead {
    let text = |idx: Option<usize>| non_empty(cell(row, idx));
    let date = |idx: Option<usize>| parse_date(cell(row, idx));

    let mut lead = Lead::new(campaign, name);
    lead.linkedin = text(columns.linkedin);
    lead.company = text(columns.company);
    lead.position = text(columns.position);
    lead.status = LeadStatus::from_label(cell(row, columns.status))
        .unwrap_or_else(|| branch.default_status());
    lead.source = text(columns.source);
    lead.connection_date = date(columns.connection_date);
    lead.positive_response_date = date(columns.positive_date);
    lead.negative_response_date = date(columns.negative_date);

    for slot in 0..FOLLOW_UP_SLOTS {
        lead.follow_ups[slot] = FollowUp {
            date: date(columns.follow_up_dates[slot]),
            comments: text(columns.follow_up_comments[slot]),
        };
    }

    lead.meeting_date = date(columns.meeting_date);
    lead.proposal_date = date(columns.proposal_date);
    lead.proposal_value = parse_amount(cell(row, columns.proposal_value));
    lead.sale_date = date(columns.sale_date);
    lead.sale_value = parse_amount(cell(row, columns.sale_value));
    lead.observations = text(columns.observations);
    lead.attended_webinar = cell(row, columns.webinar) == "Sim";
    lead
}

#[cfg(test)]
#[path = "leads_test.rs"]
mod tests;
