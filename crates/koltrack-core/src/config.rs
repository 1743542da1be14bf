use crate::app_config::{AppConfig, DataSourceKind, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is invalid, or if the remote data source is
/// forced without a `DATABASE_URL`.
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
/// Returns `ConfigError` if a value is invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can drive it with a `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

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
    let env = parse_environment(&or_default("KOLTRACK_ENV", "development"))?;

    let bind_addr = or_default("KOLTRACK_BIND_ADDR", "0.0.0.0:3000")
        .parse::<SocketAddr>()
        .map_err(|e| invalid("KOLTRACK_BIND_ADDR", e.to_string()))?;
    let log_level = or_default("KOLTRACK_LOG_LEVEL", "info");
    let data_source = parse_data_source(&or_default("KOLTRACK_DATA_SOURCE", "auto"))?;

    let top_performers = or_default("KOLTRACK_TOP_PERFORMERS", "5")
        .parse::<usize>()
        .map_err(|e| invalid("KOLTRACK_TOP_PERFORMERS", e.to_string()))?;

    let api_key_hash_salt = lookup("KOLTRACK_API_KEY_HASH_SALT").ok();

    let db_max_connections = parse_u32("KOLTRACK_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("KOLTRACK_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("KOLTRACK_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    if data_source == DataSourceKind::Remote && database_url.is_none() {
        return Err(ConfigError::MissingEnvVar("DATABASE_URL".to_string()));
    }

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        data_source,
        top_performers,
        api_key_hash_salt,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "KOLTRACK_ENV".to_string(),
            reason: format!("expected development, test, or production; got '{other}'"),
        }),
    }
}

fn parse_data_source(s: &str) -> Result<DataSourceKind, ConfigError> {
    match s {
        "auto" => Ok(DataSourceKind::Auto),
        "static" | "demo" => Ok(DataSourceKind::Static),
        "remote" => Ok(DataSourceKind::Remote),
        other => Err(ConfigError::InvalidEnvVar {
            var: "KOLTRACK_DATA_SOURCE".to_string(),
            reason: format!("expected auto, static, or remote; got '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
