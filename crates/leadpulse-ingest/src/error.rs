use thiserror::Error;

/// File-level import failures. Every variant names the originating file so
/// callers can report per file and keep going with the rest.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("{file}: missing required columns: {}", .columns.join(", "))]
    MissingRequiredColumns { file: String, columns: Vec<String> },

    #[error("{file}: unrecognized CSV format")]
    UnrecognizedFormat { file: String },

    #[error("{file}: malformed CSV: {reason}")]
    MalformedCsv { file: String, reason: String },

    #[error("{file}: unexpected column layout: expected {expected} \"{label}\" column(s), found {found}")]
    UnexpectedColumnLayout {
        file: String,
        label: String,
        expected: String,
        found: usize,
    },

    #[error("{file}: failed to read file: {source}")]
    Io {
        file: String,
        #[source]
        source: std::io::Error,
    },
}

impl IngestError {
    /// Name of the file the error originated from.
    #[must_use]
    pub fn file(&self) -> &str {
        match self {
            IngestError::MissingRequiredColumns { file, .. }
            | IngestError::UnrecognizedFormat { file }
            | IngestError::MalformedCsv { file, .. }
            | IngestError::UnexpectedColumnLayout { file, .. }
            | IngestError::Io { file, .. } => file,
        }
    }
}
