//! Tests for TOML configuration loading and validation.

use std::io::Write;

use availability_engine::{AvailabilityError, DstPolicy, EngineConfig, SyncConfig, Trimester};
use chrono::NaiveDate;

#[test]
fn empty_file_uses_defaults() {
    let config = EngineConfig::from_toml_str("").unwrap();
    assert_eq!(config, EngineConfig::default());
    assert_eq!(config.sync.horizon_days, 14);
    assert_eq!(config.api.timeout_seconds, 30);
    assert_eq!(config.api.base_url, None);
    assert_eq!(config.localize.dst_policy, DstPolicy::WallClock);
}

#[test]
fn full_file_parses() {
    let config = EngineConfig::from_toml_str(
        r#"
        [trimesters]
        summer_start = 6
        fall_start = 8

        [sync]
        horizon_days = 7

        [api]
        base_url = "https://api.example.com/v1"
        timeout_seconds = 5
        token = "abc"

        [localize]
        dst_policy = "shift_forward"
        "#,
    )
    .unwrap();

    assert_eq!(config.sync.horizon_days, 7);
    assert_eq!(config.api.token.as_deref(), Some("abc"));
    assert_eq!(config.localize.dst_policy, DstPolicy::ShiftForward);
    let july = NaiveDate::from_ymd_opt(2026, 7, 1).unwrap();
    assert_eq!(config.trimesters.resolve(july), Trimester::Summer);
    let august = NaiveDate::from_ymd_opt(2026, 8, 1).unwrap();
    assert_eq!(config.trimesters.resolve(august), Trimester::Fall);
}

#[test]
fn partial_trimester_section_keeps_other_default() {
    let config = EngineConfig::from_toml_str("[trimesters]\nfall_start = 10\n").unwrap();
    let september = NaiveDate::from_ymd_opt(2026, 9, 15).unwrap();
    assert_eq!(config.trimesters.resolve(september), Trimester::Summer);
    let may = NaiveDate::from_ymd_opt(2026, 5, 1).unwrap();
    assert_eq!(config.trimesters.resolve(may), Trimester::Summer);
}

#[test]
fn bad_trimester_cutovers_fail_to_parse() {
    let result = EngineConfig::from_toml_str("[trimesters]\nsummer_start = 10\nfall_start = 4\n");
    assert!(matches!(result, Err(AvailabilityError::Config(_))));
}

#[test]
fn semantic_errors_are_invalid_config() {
    for toml in [
        "[sync]\nhorizon_days = 0\n",
        "[api]\ntimeout_seconds = 0\n",
        "[api]\nbase_url = \"not a url\"\n",
        "[api]\nbase_url = \"mailto:ops@example.com\"\n",
    ] {
        assert!(
            matches!(
                EngineConfig::from_toml_str(toml),
                Err(AvailabilityError::InvalidConfig(_))
            ),
            "{:?} should be rejected",
            toml
        );
    }
}

#[test]
fn oversized_horizon_is_rejected() {
    for days in [SyncConfig::MAX_HORIZON_DAYS + 1, 1_000_000_000, i64::MAX] {
        let toml = format!("[sync]\nhorizon_days = {}\n", days);
        assert!(
            matches!(
                EngineConfig::from_toml_str(&toml),
                Err(AvailabilityError::InvalidConfig(_))
            ),
            "horizon of {} days should be rejected",
            days
        );
    }

    let toml = format!("[sync]\nhorizon_days = {}\n", SyncConfig::MAX_HORIZON_DAYS);
    let config = EngineConfig::from_toml_str(&toml).unwrap();
    assert_eq!(config.sync.horizon_days, SyncConfig::MAX_HORIZON_DAYS);
}

#[test]
fn unknown_dst_policy_is_a_parse_error() {
    let result = EngineConfig::from_toml_str("[localize]\ndst_policy = \"sometimes\"\n");
    assert!(matches!(result, Err(AvailabilityError::Config(_))));
}

#[test]
fn loads_from_file() {
    let path = std::env::temp_dir().join(format!("availability-config-{}.toml", std::process::id()));
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "[sync]\nhorizon_days = 21").unwrap();
    drop(file);

    let config = EngineConfig::from_file(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(config.sync.horizon_days, 21);
}

#[test]
fn missing_file_is_io_error() {
    let result = EngineConfig::from_file("/nonexistent/availability.toml");
    assert!(matches!(result, Err(AvailabilityError::Io(_))));
}
