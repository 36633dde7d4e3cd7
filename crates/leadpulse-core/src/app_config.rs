use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// How metric contributions from a re-imported file are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImportPolicy {
    /// Every import adds into the shared per-date counters. Importing the
    /// same file twice counts it twice.
    #[default]
    Accumulate,
    /// Contributions are keyed by the file's content hash; importing identical
    /// bytes again replaces that batch's earlier contributions.
    ReplaceBatch,
}

impl std::fmt::Display for ImportPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImportPolicy::Accumulate => write!(f, "accumulate"),
            ImportPolicy::ReplaceBatch => write!(f, "replace-batch"),
        }
    }
}

impl std::str::FromStr for ImportPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "accumulate" => Ok(ImportPolicy::Accumulate),
            "replace-batch" | "replace_batch" => Ok(ImportPolicy::ReplaceBatch),
            other => Err(format!(
                "unknown import policy '{other}'; expected 'accumulate' or 'replace-batch'"
            )),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: Option<String>,
    pub env: Environment,
    pub log_level: String,
    pub vocabulary_path: Option<PathBuf>,
    pub import_policy: ImportPolicy,
    pub strict_layout: bool,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field(
                "database_url",
                &self.database_url.as_ref().map(|_| "[redacted]"),
            )
            .field("vocabulary_path", &self.vocabulary_path)
            .field("import_policy", &self.import_policy)
            .field("strict_layout", &self.strict_layout)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .finish()
    }
}
