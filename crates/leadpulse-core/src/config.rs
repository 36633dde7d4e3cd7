use crate::app_config::{AppConfig, Environment, ImportPolicy};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is present but holds an invalid value.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is present but holds an invalid value.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let database_url = lookup("DATABASE_URL").ok().filter(|v| !v.trim().is_empty());
    let env = parse_environment(&or_default("LEADPULSE_ENV", "development"))?;
    let log_level = or_default("LEADPULSE_LOG_LEVEL", "info");
    let vocabulary_path = lookup("LEADPULSE_VOCABULARY_PATH")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from);

    let import_policy = or_default("LEADPULSE_IMPORT_POLICY", "accumulate")
        .parse::<ImportPolicy>()
        .map_err(|reason| invalid("LEADPULSE_IMPORT_POLICY", reason))?;

    let strict_layout = parse_bool(&or_default("LEADPULSE_STRICT_LAYOUT", "false"))
        .ok_or_else(|| {
            invalid(
                "LEADPULSE_STRICT_LAYOUT",
                "expected 'true' or 'false'".to_string(),
            )
        })?;

    let db_max_connections = parse_u32("LEADPULSE_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("LEADPULSE_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("LEADPULSE_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    if db_min_connections > db_max_connections {
        return Err(invalid(
            "LEADPULSE_DB_MIN_CONNECTIONS",
            format!("{db_min_connections} exceeds LEADPULSE_DB_MAX_CONNECTIONS ({db_max_connections})"),
        ));
    }

    Ok(AppConfig {
        database_url,
        env,
        log_level,
        vocabulary_path,
        import_policy,
        strict_layout,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s.trim() {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "LEADPULSE_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
