//! Per-file import: decode, detect, dispatch to the matching parser.

use std::path::Path;

use leadpulse_core::{CampaignMetric, DetectionResult, FileFormat, Lead, Vocabulary};

use crate::campaign::{parse_campaign_metrics, CampaignImport};
use crate::decode::decode_bytes;
use crate::detect::detect;
use crate::error::IngestError;
use crate::hybrid::{parse_hybrid, HybridImport};
use crate::leads::{parse_leads, LeadsImport};
use crate::table::CsvTable;
use crate::types::{ImportContext, ParseReport};

#[derive(Debug, Clone, PartialEq)]
pub enum ParsedFile {
    Campaign(CampaignImport),
    Leads(LeadsImport),
    Hybrid(HybridImport),
}

impl ParsedFile {
    #[must_use]
    pub fn format(&self) -> FileFormat {
        match self {
            ParsedFile::Campaign(_) => FileFormat::CampaignInput,
            ParsedFile::Leads(_) => FileFormat::Leads,
            ParsedFile::Hybrid(_) => FileFormat::Hybrid,
        }
    }

    #[must_use]
    pub fn leads(&self) -> &[Lead] {
        match self {
            ParsedFile::Campaign(_) => &[],
            ParsedFile::Leads(import) => &import.leads,
            ParsedFile::Hybrid(import) => &import.leads,
        }
    }

    #[must_use]
    pub fn metrics(&self) -> Vec<&CampaignMetric> {
        match self {
            ParsedFile::Campaign(import) => import.metrics().collect(),
            ParsedFile::Leads(_) => Vec::new(),
            ParsedFile::Hybrid(import) => import.metrics.iter().collect(),
        }
    }

    #[must_use]
    pub fn report(&self) -> ParseReport {
        match self {
            ParsedFile::Campaign(import) => import.report,
            ParsedFile::Leads(import) => import.report,
            ParsedFile::Hybrid(import) => import.report,
        }
    }

    /// Splits the parse result into what the merge step persists.
    #[must_use]
    pub fn into_parts(self) -> (Vec<Lead>, Vec<CampaignMetric>) {
        match self {
            ParsedFile::Campaign(import) => (Vec::new(), import.into_metrics()),
            ParsedFile::Leads(import) => (import.leads, Vec::new()),
            ParsedFile::Hybrid(import) => (import.leads, import.metrics),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FileImport {
    pub file_name: String,
    pub detection: DetectionResult,
    pub parsed: ParsedFile,
}

/// Parses already-decoded CSV text.
///
/// # Errors
///
/// Returns [`IngestError::UnrecognizedFormat`] when the header row matches
/// no known format, and propagates CSV and column errors from the parsers.
pub fn import_text(
    text: &str,
    ctx: &ImportContext,
    vocab: &Vocabulary,
) -> Result<FileImport, IngestError> {
    let file = ctx.file_name.as_str();
    let table = CsvTable::parse(file, text)?;
    let detection = detect(table.headers());
    tracing::info!(
        file,
        format = %detection.format,
        confidence = ?detection.confidence,
        "detected file format"
    );

    let parsed = match detection.format {
        FileFormat::CampaignInput => {
            ParsedFile::Campaign(parse_campaign_metrics(file, &table, vocab)?)
        }
        FileFormat::Leads => ParsedFile::Leads(parse_leads(file, &table)?),
        FileFormat::Hybrid => ParsedFile::Hybrid(parse_hybrid(&table, ctx)?),
        FileFormat::Unrecognized => {
            return Err(IngestError::UnrecognizedFormat {
                file: file.to_string(),
            });
        }
    };

    let report = parsed.report();
    tracing::info!(
        file,
        leads = parsed.leads().len(),
        metrics = parsed.metrics().len(),
        rows_read = report.rows_read,
        rows_skipped = report.rows_skipped,
        rows_excluded = report.rows_excluded,
        "parsed file"
    );

    Ok(FileImport {
        file_name: file.to_string(),
        detection,
        parsed,
    })
}

/// Decodes raw bytes (UTF-8 with optional BOM, or Windows-1252) and imports them.
///
/// # Errors
///
/// See [`import_text`].
pub fn import_bytes(
    bytes: &[u8],
    ctx: &ImportContext,
    vocab: &Vocabulary,
) -> Result<FileImport, IngestError> {
    import_text(&decode_bytes(bytes), ctx, vocab)
}

/// Reads and imports a file from disk.
///
/// # Errors
///
/// Returns [`IngestError::Io`] when the file cannot be read; otherwise see
/// [`import_text`].
pub fn import_path(
    path: &Path,
    ctx: &ImportContext,
    vocab: &Vocabulary,
) -> Result<FileImport, IngestError> {
    let bytes = std::fs::read(path).map_err(|source| IngestError::Io {
        file: ctx.file_name.clone(),
        source,
    })?;
    import_bytes(&bytes, ctx, vocab)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> ImportContext {
        ImportContext::new("upload.csv").with_campaign("Upload")
    }

    #[test]
    fn dispatches_campaign_input() {
        let text = "Campaign Name,Event Type,Profile Name,Total Count,2025-01-01\nC1,Messages Sent,P1,2,2\n";
        let import = import_text(text, &ctx(), &Vocabulary::builtin()).unwrap();
        assert_eq!(import.parsed.format(), FileFormat::CampaignInput);
        assert_eq!(import.parsed.metrics().len(), 1);
        assert!(import.parsed.leads().is_empty());
    }

    #[test]
    fn dispatches_hybrid() {
        let text = "Nome,LinkedIn,Invite,Data de envio\nAna,in/ana,Sim,01/01/2025\n";
        let import = import_text(text, &ctx(), &Vocabulary::builtin()).unwrap();
        assert_eq!(import.detection.format, FileFormat::Hybrid);
        let (leads, metrics) = import.parsed.into_parts();
        assert_eq!(leads.len(), 1);
        assert_eq!(metrics.len(), 8);
    }

    #[test]
    fn unrecognized_headers_are_a_file_error() {
        let err = import_text("foo,bar\n1,2\n", &ctx(), &Vocabulary::builtin()).unwrap_err();
        assert!(matches!(err, IngestError::UnrecognizedFormat { ref file } if file == "upload.csv"));
    }

    #[test]
    fn bom_prefixed_bytes_are_detected() {
        let bytes = b"\xEF\xBB\xBFNome,LinkedIn,Campanha,Data Resposta Positiva\nAna,in/ana,Q1,05/01/2025\n";
        let import = import_bytes(bytes, &ctx(), &Vocabulary::builtin()).unwrap();
        assert_eq!(import.parsed.format(), FileFormat::Leads);
        assert_eq!(import.parsed.report().rows_used(), 1);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let path = Path::new("/definitely/not/here.csv");
        let ctx = ImportContext::from_path(path);
        let err = import_path(path, &ctx, &Vocabulary::builtin()).unwrap_err();
        assert!(matches!(err, IngestError::Io { .. }));
        assert_eq!(err.file(), "here.csv");
    }
}
