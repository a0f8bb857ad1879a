use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from the current process environment only.
///
/// Skips `.env` loading; for callers that manage the environment themselves.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Parsing and validation are decoupled from the real environment so tests can
/// drive this with a plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let api_base_url = require("FIELDOPS_API_URL")?;
    let auth_token = lookup("FIELDOPS_AUTH_TOKEN")
        .ok()
        .filter(|t| !t.trim().is_empty());

    let env = parse_environment(&or_default("FIELDOPS_ENV", "development"))?;
    let log_level = or_default("FIELDOPS_LOG_LEVEL", "info");
    let app_version = or_default("FIELDOPS_APP_VERSION", "1.0.0");

    let request_timeout_secs = parse_u64("FIELDOPS_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("FIELDOPS_USER_AGENT", "fieldops/0.1 (field-operations)");
    let max_retries = parse_u32("FIELDOPS_MAX_RETRIES", "2")?;
    let retry_backoff_base_ms = parse_u64("FIELDOPS_RETRY_BACKOFF_BASE_MS", "500")?;

    let page_size = parse_u32("FIELDOPS_PAGE_SIZE", "10")?;
    if page_size == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "FIELDOPS_PAGE_SIZE".to_string(),
            reason: "page size must be greater than zero".to_string(),
        });
    }
    let debounce_ms = parse_u64("FIELDOPS_DEBOUNCE_MS", "500")?;

    let pincode_api_url = or_default("FIELDOPS_PINCODE_API_URL", "https://api.postalpincode.in");
    let places_api_url = or_default(
        "FIELDOPS_PLACES_API_URL",
        "https://nominatim.openstreetmap.org",
    );
    let places_country = or_default("FIELDOPS_PLACES_COUNTRY", "in");
    let city_catalog_path = lookup("FIELDOPS_CITY_CATALOG_PATH")
        .ok()
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from);

    Ok(AppConfig {
        env,
        log_level,
        api_base_url,
        auth_token,
        app_version,
        request_timeout_secs,
        user_agent,
        max_retries,
        retry_backoff_base_ms,
        page_size,
        debounce_ms,
        pincode_api_url,
        places_api_url,
        places_country,
        city_catalog_path,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "FIELDOPS_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
