pub mod app_config;
pub mod config;
pub mod formats;
pub mod leads;
pub mod metrics;
pub mod text;
pub mod vocabulary;

pub use app_config::{AppConfig, Environment, ImportPolicy};
pub use config::{load_app_config, load_app_config_from_env};
pub use formats::{Confidence, DetectionResult, FileFormat};
pub use leads::{FollowUp, Lead, LeadStatus, FOLLOW_UP_SLOTS};
pub use metrics::{CampaignMetric, DailySeries};
pub use text::fold_label;
pub use vocabulary::{load_vocabulary, MetricKind, MetricSynonyms, Vocabulary};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read vocabulary file {path}: {source}")]
    VocabularyFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse vocabulary file: {0}")]
    VocabularyFileParse(#[from] serde_yaml::Error),

    #[error("vocabulary validation failed: {0}")]
    Validation(String),
}
