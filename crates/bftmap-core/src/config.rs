use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does not read `.env`; the caller owns the
/// environment.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Parsing and validation are decoupled from the real environment so tests can
/// drive them with a plain `HashMap`.
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

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        or_default(var, default)
            .parse::<SocketAddr>()
            .map_err(|e| invalid(var, e.to_string()))
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

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_positive_f64 = |var: &str, default: &str| -> Result<f64, ConfigError> {
        let value = or_default(var, default)
            .parse::<f64>()
            .map_err(|e| invalid(var, e.to_string()))?;
        if !value.is_finite() || value <= 0.0 {
            return Err(invalid(var, format!("expected a positive number, got {value}")));
        }
        Ok(value)
    };

    let parse_bool = |var: &str, default: &str| -> Result<bool, ConfigError> {
        let raw = or_default(var, default);
        match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            other => Err(invalid(var, format!("expected a boolean, got \"{other}\""))),
        }
    };

    let env = parse_environment(&or_default("BFTMAP_ENV", "development"))?;

    let bind_addr = parse_addr("BFTMAP_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("BFTMAP_LOG_LEVEL", "info");
    let data_base = or_default("BFTMAP_DATA_BASE", ".");
    if data_base.trim().is_empty() {
        return Err(invalid("BFTMAP_DATA_BASE", "must not be empty".to_string()));
    }

    let fetch_timeout_secs = parse_u64("BFTMAP_FETCH_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("BFTMAP_USER_AGENT", "bftmap/0.1 (facility-resolver)");
    let fetch_max_retries = parse_u32("BFTMAP_FETCH_MAX_RETRIES", "2")?;
    let fetch_retry_backoff_base_ms = parse_u64("BFTMAP_FETCH_RETRY_BACKOFF_BASE_MS", "500")?;
    let fetch_concurrency = parse_usize("BFTMAP_FETCH_CONCURRENCY", "4")?.max(1);

    let default_radius_meters = parse_positive_f64("BFTMAP_DEFAULT_RADIUS_METERS", "1000")?;
    let default_max_count = parse_usize("BFTMAP_DEFAULT_MAX_COUNT", "50")?;
    let duplicate_tolerance_deg = parse_positive_f64("BFTMAP_DUPLICATE_TOLERANCE_DEG", "0.0001")?;
    let preload_enabled = parse_bool("BFTMAP_PRELOAD_ENABLED", "true")?;

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        data_base,
        fetch_timeout_secs,
        user_agent,
        fetch_max_retries,
        fetch_retry_backoff_base_ms,
        fetch_concurrency,
        default_radius_meters,
        default_max_count,
        duplicate_tolerance_deg,
        preload_enabled,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "BFTMAP_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
