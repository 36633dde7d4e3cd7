pub mod aggregate;
pub mod campaign;
mod columns;
pub mod decode;
pub mod detect;
pub mod error;
pub mod hybrid;
pub mod leads;
pub mod parse_helpers;
pub mod pipeline;
pub mod table;
pub mod types;

pub use aggregate::{
    acceptance_rate, metric_total, CampaignBreakdown, CampaignSummary, DateRange, MetricsAggregator,
};
pub use campaign::{parse_campaign_metrics, CampaignGroup, CampaignImport};
pub use decode::decode_bytes;
pub use detect::detect;
pub use error::IngestError;
pub use hybrid::{classify_response, parse_hybrid, HybridImport, HybridSummary, ResponseClass};
pub use leads::{parse_leads, LeadsImport, ResponseBranch};
pub use parse_helpers::{is_yes, normalize_date, parse_date};
pub use pipeline::{import_bytes, import_path, import_text, FileImport, ParsedFile};
pub use table::CsvTable;
pub use types::{ImportContext, ParseReport, DEFAULT_PROFILE};
