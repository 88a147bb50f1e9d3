//! Config Validation Tests
//!
//! Typo detection, range validation, and cycle resolution for
//! `hos_config.toml`, exercised through the public config API.

use std::io::Write;

use hos_engine::config::validation::{
    known_config_keys, suggest_correction, validate_ranges, validate_unknown_keys,
};
use hos_engine::config::{ConfigError, HosConfig};
use hos_engine::hos::HosError;
use hos_engine::WeeklyCycle;

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

// ============================================================================
// Typo Detection
// ============================================================================

#[test]
fn typo_in_limits_warns_with_suggestion() {
    let toml_str = r#"
[limits]
drivng_hours = 11.0
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert_eq!(warnings.len(), 1, "Expected exactly 1 warning");
    assert!(warnings[0].field.contains("drivng_hours"));
    assert_eq!(warnings[0].suggestion.as_deref(), Some("limits.driving_hours"));
}

#[test]
fn typo_in_carrier_section_warns() {
    let toml_str = r#"
[carrier]
time_zon = "America/Chicago"
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].suggestion.as_deref(), Some("carrier.time_zone"));
}

#[test]
fn unrelated_key_warns_without_suggestion() {
    let toml_str = r#"
[telemetry]
endpoint = "http://localhost:4317"
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert!(!warnings.is_empty());
    assert!(warnings.iter().all(|w| w.suggestion.is_none()));
}

#[test]
fn valid_config_produces_zero_warnings() {
    let toml_str = r#"
[carrier]
name = "Prairie Freight"
time_zone = "America/Chicago"

[weekly]
cycle_60_7 = false
cycle_70_8 = true

[limits]
weekly_70_hours = 70.0
driving_hours = 11.0
on_duty_hours = 14.0
restart_hours = 34.0

[thresholds]
weekly_critical_margin_hours = 5.0
break_warning_hours = 7.5

[fleet]
limited_weekly_hours = 20.0

[server]
addr = "127.0.0.1:9090"
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert!(warnings.is_empty(), "Unexpected warnings: {warnings:?}");
}

#[test]
fn invalid_toml_yields_no_key_warnings() {
    assert!(validate_unknown_keys("[limits\ndriving_hours = ").is_empty());
}

#[test]
fn every_section_key_is_known() {
    let known = known_config_keys();
    for key in [
        "carrier.time_zone",
        "weekly.precedence",
        "limits.restart_nights_required",
        "thresholds.at_risk_on_duty_hours",
        "fleet.rest_required_driving_hours",
        "server.addr",
    ] {
        assert!(known.contains(key), "{key} should be a known key");
    }
}

#[test]
fn suggestion_requires_close_match() {
    let known = known_config_keys();
    assert_eq!(
        suggest_correction("limits.restrat_hours", &known).as_deref(),
        Some("limits.restart_hours")
    );
    assert!(suggest_correction("completely.unrelated.key", &known).is_none());
}

// ============================================================================
// Range Validation
// ============================================================================

#[test]
fn default_config_has_no_range_errors() {
    let (errors, warnings) = validate_ranges(&HosConfig::default());
    assert!(errors.is_empty(), "{errors:?}");
    assert!(warnings.is_empty(), "{warnings:?}");
}

#[test]
fn inverted_night_window_is_an_error() {
    let mut config = HosConfig::default();
    config.limits.restart_night_start_hour = 5;
    config.limits.restart_night_end_hour = 1;
    let (errors, _) = validate_ranges(&config);
    assert!(errors.iter().any(|e| e.contains("restart_night_start_hour")));
}

#[test]
fn zero_nights_is_an_error() {
    let mut config = HosConfig::default();
    config.limits.restart_nights_required = 0;
    assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
}

#[test]
fn bad_server_addr_is_an_error() {
    let mut config = HosConfig::default();
    config.server.addr = "not-an-address".to_string();
    let (errors, _) = validate_ranges(&config);
    assert!(errors.iter().any(|e| e.contains("server.addr")));
}

#[test]
fn limits_above_federal_values_only_warn() {
    let mut config = HosConfig::default();
    config.limits.driving_hours = 12.0;
    let (errors, warnings) = validate_ranges(&config);
    assert!(errors.is_empty());
    assert!(warnings.iter().any(|w| w.field == "limits.driving_hours"));
    assert!(config.validate().is_ok());
}

#[test]
fn negative_limit_fails_validation() {
    let mut config = HosConfig::default();
    config.limits.on_duty_hours = -1.0;
    match config.validate() {
        Err(ConfigError::Validation(errors)) => {
            assert!(errors.iter().any(|e| e.contains("limits.on_duty_hours")));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

// ============================================================================
// Loading From Disk
// ============================================================================

#[test]
fn load_from_file_resolves_seventy_eight_policy() {
    let file = write_config(
        r#"
[carrier]
name = "Prairie Freight"
time_zone = "America/Chicago"

[weekly]
cycle_60_7 = false
cycle_70_8 = true
"#,
    );
    let config = HosConfig::load_from_file(file.path()).unwrap();
    assert_eq!(config.carrier.name, "Prairie Freight");

    let policy = config.policy().unwrap();
    assert_eq!(policy.weekly_cycle, WeeklyCycle::Seventy8);
    assert_eq!(policy.weekly_limit_minutes, 70 * 60);
    assert_eq!(policy.time_zone, chrono_tz::America::Chicago);
}

#[test]
fn both_cycles_without_precedence_is_invalid_policy() {
    let file = write_config(
        r#"
[weekly]
cycle_60_7 = true
cycle_70_8 = true
"#,
    );
    match HosConfig::load_from_file(file.path()) {
        Err(ConfigError::Policy(HosError::InvalidPolicy(msg))) => {
            assert!(msg.contains("precedence"));
        }
        other => panic!("expected InvalidPolicy, got {other:?}"),
    }
}

#[test]
fn unknown_time_zone_is_invalid_policy() {
    let file = write_config(
        r#"
[carrier]
time_zone = "Mars/Olympus_Mons"
"#,
    );
    let err = HosConfig::load_from_file(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Policy(HosError::InvalidPolicy(_))));
    assert!(err.to_string().contains("Mars/Olympus_Mons"));
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = HosConfig::load_from_file(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io(_, _)));
}

#[test]
fn malformed_toml_is_parse_error() {
    let file = write_config("[limits]\ndriving_hours = \"eleven\"\n");
    let err = HosConfig::load_from_file(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_, _)));
}

#[test]
fn save_then_load_keeps_carrier_settings() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hos_config.toml");

    let mut config = HosConfig::default();
    config.carrier.name = "Coastal Haulers".to_string();
    config.carrier.time_zone = "America/Los_Angeles".to_string();
    config.save_to_file(&path).unwrap();

    let loaded = HosConfig::load_from_file(&path).unwrap();
    assert_eq!(loaded.carrier.name, "Coastal Haulers");
    assert_eq!(loaded.policy().unwrap().time_zone, chrono_tz::America::Los_Angeles);
}

#[test]
fn provenance_tracks_explicit_keys() {
    let file = write_config(
        r#"
[limits]
driving_hours = 10.0
"#,
    );
    let (config, provenance) = HosConfig::load_from_file_with_provenance(file.path()).unwrap();
    assert!((config.limits.driving_hours - 10.0).abs() < 1e-9);
    assert!(provenance.is_user_set("limits.driving_hours"));
    assert!(!provenance.is_user_set("limits.on_duty_hours"));
}

// ============================================================================
// Search Order
// ============================================================================

#[test]
fn existing_config_with_ambiguous_cycle_is_not_replaced_by_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hos_config.toml");
    std::fs::write(&path, "[weekly]\ncycle_60_7 = true\ncycle_70_8 = true\n").unwrap();

    match HosConfig::load_first_existing(&[path]) {
        Err(ConfigError::Policy(HosError::InvalidPolicy(msg))) => {
            assert!(msg.contains("precedence"));
        }
        other => panic!("expected InvalidPolicy, got {other:?}"),
    }
}

#[test]
fn existing_config_that_fails_to_parse_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hos_config.toml");
    std::fs::write(&path, "[limits]\ndriving_hours = \"eleven\"\n").unwrap();
    assert!(matches!(
        HosConfig::load_first_existing(&[path]),
        Err(ConfigError::Parse(_, _))
    ));
}

#[test]
fn missing_candidates_fall_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let candidates = [dir.path().join("env.toml"), dir.path().join("hos_config.toml")];
    let (config, provenance) = HosConfig::load_first_existing(&candidates).unwrap();
    assert_eq!(config.policy().unwrap().weekly_cycle, WeeklyCycle::Sixty7);
    assert!(provenance.explicit_keys.is_empty());
}

#[test]
fn first_existing_candidate_wins() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("env.toml");
    let local = dir.path().join("hos_config.toml");
    std::fs::write(&local, "[weekly]\ncycle_60_7 = false\ncycle_70_8 = true\n").unwrap();

    let (config, _) = HosConfig::load_first_existing(&[missing, local]).unwrap();
    assert_eq!(config.weekly_cycle().unwrap(), WeeklyCycle::Seventy8);
}
