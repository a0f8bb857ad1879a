use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

/// Returns a map with all required env vars populated with valid defaults.
fn full_env<'a>() -> HashMap<&'a str, &'a str> {
    let mut m = HashMap::new();
    m.insert("FIELDOPS_API_URL", "https://api.example.test/v1");
    m
}

#[test]
fn parse_environment_known_values() {
    assert_eq!(
        parse_environment("development").unwrap(),
        Environment::Development
    );
    assert_eq!(parse_environment("test").unwrap(), Environment::Test);
    assert_eq!(
        parse_environment("production").unwrap(),
        Environment::Production
    );
}

#[test]
fn parse_environment_unknown_fails() {
    let err = parse_environment("staging").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "FIELDOPS_ENV"));
}

#[test]
fn build_app_config_fails_without_api_url() {
    let map: HashMap<&str, &str> = HashMap::new();
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "FIELDOPS_API_URL"),
        "expected MissingEnvVar(FIELDOPS_API_URL), got: {result:?}"
    );
}

#[test]
fn build_app_config_treats_blank_api_url_as_missing() {
    let mut map = HashMap::new();
    map.insert("FIELDOPS_API_URL", "   ");
    let result = build_app_config(lookup_from_map(&map));
    assert!(matches!(result, Err(ConfigError::MissingEnvVar(_))));
}

#[test]
fn build_app_config_succeeds_with_defaults() {
    let map = full_env();
    let result = build_app_config(lookup_from_map(&map));
    assert!(result.is_ok(), "expected Ok, got: {result:?}");
    let cfg = result.unwrap();
    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.api_base_url, "https://api.example.test/v1");
    assert!(cfg.auth_token.is_none());
    assert_eq!(cfg.app_version, "1.0.0");
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.request_timeout_secs, 30);
    assert_eq!(cfg.user_agent, "fieldops/0.1 (field-operations)");
    assert_eq!(cfg.max_retries, 2);
    assert_eq!(cfg.retry_backoff_base_ms, 500);
    assert_eq!(cfg.page_size, 10);
    assert_eq!(cfg.debounce_ms, 500);
    assert_eq!(cfg.debounce(), std::time::Duration::from_millis(500));
    assert_eq!(cfg.pincode_api_url, "https://api.postalpincode.in");
    assert_eq!(cfg.places_api_url, "https://nominatim.openstreetmap.org");
    assert_eq!(cfg.places_country, "in");
    assert!(cfg.city_catalog_path.is_none());
}

#[test]
fn build_app_config_reads_overrides() {
    let mut map = full_env();
    map.insert("FIELDOPS_AUTH_TOKEN", "tok-123");
    map.insert("FIELDOPS_ENV", "production");
    map.insert("FIELDOPS_PAGE_SIZE", "25");
    map.insert("FIELDOPS_DEBOUNCE_MS", "300");
    map.insert("FIELDOPS_CITY_CATALOG_PATH", "./config/cities.yaml");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.auth_token.as_deref(), Some("tok-123"));
    assert_eq!(cfg.env, Environment::Production);
    assert_eq!(cfg.page_size, 25);
    assert_eq!(cfg.debounce_ms, 300);
    assert_eq!(
        cfg.city_catalog_path.as_deref(),
        Some(std::path::Path::new("./config/cities.yaml"))
    );
}

#[test]
fn build_app_config_rejects_zero_page_size() {
    let mut map = full_env();
    map.insert("FIELDOPS_PAGE_SIZE", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "FIELDOPS_PAGE_SIZE"),
        "expected InvalidEnvVar(FIELDOPS_PAGE_SIZE), got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_non_numeric_timeout() {
    let mut map = full_env();
    map.insert("FIELDOPS_REQUEST_TIMEOUT_SECS", "soon");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "FIELDOPS_REQUEST_TIMEOUT_SECS"),
        "expected InvalidEnvVar(FIELDOPS_REQUEST_TIMEOUT_SECS), got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_non_numeric_retries() {
    let mut map = full_env();
    map.insert("FIELDOPS_MAX_RETRIES", "-1");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "FIELDOPS_MAX_RETRIES"),
        "expected InvalidEnvVar(FIELDOPS_MAX_RETRIES), got: {result:?}"
    );
}

#[test]
fn debug_output_redacts_auth_token() {
    let mut map = full_env();
    map.insert("FIELDOPS_AUTH_TOKEN", "super-secret");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let rendered = format!("{cfg:?}");
    assert!(!rendered.contains("super-secret"));
    assert!(rendered.contains("[redacted]"));
}
