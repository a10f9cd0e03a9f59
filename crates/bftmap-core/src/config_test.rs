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

fn config_with(pairs: &[(&'static str, &'static str)]) -> Result<AppConfig, ConfigError> {
    let map: HashMap<&str, &str> = pairs.iter().copied().collect();
    build_app_config(lookup_from_map(&map))
}

#[test]
fn parse_environment_development() {
    assert_eq!(
        parse_environment("development").unwrap(),
        Environment::Development
    );
}

#[test]
fn parse_environment_test() {
    assert_eq!(parse_environment("test").unwrap(), Environment::Test);
}

#[test]
fn parse_environment_production() {
    assert_eq!(
        parse_environment("production").unwrap(),
        Environment::Production
    );
}

#[test]
fn parse_environment_unknown_fails() {
    let err = parse_environment("unknown").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "BFTMAP_ENV"));
}

#[test]
fn build_app_config_succeeds_with_empty_environment() {
    let result = config_with(&[]);
    assert!(result.is_ok(), "expected Ok, got: {result:?}");
    let cfg = result.unwrap();
    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.bind_addr.to_string(), "0.0.0.0:3000");
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.data_base, ".");
    assert!(!cfg.data_base_is_remote());
    assert_eq!(cfg.fetch_timeout_secs, 30);
    assert_eq!(cfg.user_agent, "bftmap/0.1 (facility-resolver)");
    assert_eq!(cfg.fetch_max_retries, 2);
    assert_eq!(cfg.fetch_retry_backoff_base_ms, 500);
    assert_eq!(cfg.fetch_concurrency, 4);
    assert!((cfg.default_radius_meters - 1000.0).abs() < f64::EPSILON);
    assert_eq!(cfg.default_max_count, 50);
    assert!((cfg.duplicate_tolerance_deg - 0.0001).abs() < f64::EPSILON);
    assert!(cfg.preload_enabled);
}

#[test]
fn build_app_config_fails_with_invalid_bind_addr() {
    let result = config_with(&[("BFTMAP_BIND_ADDR", "not-a-socket-addr")]);
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "BFTMAP_BIND_ADDR"),
        "expected InvalidEnvVar(BFTMAP_BIND_ADDR), got: {result:?}"
    );
}

#[test]
fn remote_data_base_is_detected() {
    let cfg = config_with(&[("BFTMAP_DATA_BASE", "https://toilets.example.jp/")]).unwrap();
    assert!(cfg.data_base_is_remote());
}

#[test]
fn empty_data_base_is_rejected() {
    let result = config_with(&[("BFTMAP_DATA_BASE", "  ")]);
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "BFTMAP_DATA_BASE"),
        "expected InvalidEnvVar(BFTMAP_DATA_BASE), got: {result:?}"
    );
}

#[test]
fn fetch_max_retries_override() {
    let cfg = config_with(&[("BFTMAP_FETCH_MAX_RETRIES", "5")]).unwrap();
    assert_eq!(cfg.fetch_max_retries, 5);
}

#[test]
fn fetch_max_retries_invalid() {
    let result = config_with(&[("BFTMAP_FETCH_MAX_RETRIES", "not-a-number")]);
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "BFTMAP_FETCH_MAX_RETRIES"),
        "expected InvalidEnvVar(BFTMAP_FETCH_MAX_RETRIES), got: {result:?}"
    );
}

#[test]
fn fetch_concurrency_zero_is_clamped_to_one() {
    let cfg = config_with(&[("BFTMAP_FETCH_CONCURRENCY", "0")]).unwrap();
    assert_eq!(cfg.fetch_concurrency, 1);
}

#[test]
fn default_radius_must_be_positive() {
    let result = config_with(&[("BFTMAP_DEFAULT_RADIUS_METERS", "-5")]);
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "BFTMAP_DEFAULT_RADIUS_METERS"),
        "expected InvalidEnvVar(BFTMAP_DEFAULT_RADIUS_METERS), got: {result:?}"
    );
}

#[test]
fn duplicate_tolerance_override() {
    let cfg = config_with(&[("BFTMAP_DUPLICATE_TOLERANCE_DEG", "0.0005")]).unwrap();
    assert!((cfg.duplicate_tolerance_deg - 0.0005).abs() < f64::EPSILON);
}

#[test]
fn preload_flag_accepts_common_spellings() {
    for raw in ["false", "0", "no", "OFF"] {
        let map: HashMap<&str, &str> = HashMap::from([("BFTMAP_PRELOAD_ENABLED", raw)]);
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert!(!cfg.preload_enabled, "{raw} should disable preloading");
    }
}

#[test]
fn preload_flag_rejects_garbage() {
    let result = config_with(&[("BFTMAP_PRELOAD_ENABLED", "maybe")]);
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "BFTMAP_PRELOAD_ENABLED"),
        "expected InvalidEnvVar(BFTMAP_PRELOAD_ENABLED), got: {result:?}"
    );
}
