//! Validation of whole configuration documents
//!
//! Each case breaks one rule on an otherwise factory document and checks the
//! error lands on the right field. Derivation scenarios for the tank close
//! the file.

use growit_console::{
    validate, water_level_percentage, Configuration, DeriveError, DraftConfig, ValidationError,
    ValidationResult,
};

fn errors_for(config: Configuration) -> Vec<ValidationError> {
    match validate(DraftConfig::new(config, 0)) {
        ValidationResult::Valid(_) => Vec::new(),
        ValidationResult::Invalid(errors) => errors,
    }
}

fn assert_error_on(config: Configuration, field: &str) {
    let errors = errors_for(config);
    assert!(
        errors.iter().any(|e| e.field == field),
        "expected an error on {}, got {:?}",
        field,
        errors
    );
}

#[test]
fn test_factory_configuration_is_valid() {
    let result = validate(DraftConfig::new(Configuration::factory(), 0));
    assert!(result.is_valid(), "factory errors: {:?}", result.errors());
}

#[test]
fn test_empty_system_name() {
    let mut config = Configuration::factory();
    config.system.name = String::new();
    assert_error_on(config, "system.name");
}

#[test]
fn test_wifi_ssid_without_password() {
    let mut config = Configuration::factory();
    config.network.wifi.ssid = "GreenHouse".to_string();
    config.network.wifi.password = String::new();
    assert_error_on(config, "network.wifi.password");
}

#[test]
fn test_ap_fallback_with_seven_character_password() {
    let mut config = Configuration::factory();
    config.network.ap_fallback.enabled = true;
    config.network.ap_fallback.password = "1234567".to_string();
    assert_error_on(config, "network.ap_fallback.password");
}

#[test]
fn test_ap_password_ignored_when_fallback_disabled() {
    let mut config = Configuration::factory();
    config.network.ap_fallback.enabled = false;
    config.network.ap_fallback.password = String::new();
    assert!(errors_for(config).is_empty());
}

#[test]
fn test_water_level_above_capacity() {
    let mut config = Configuration::factory();
    config.irrigation.water_storage.capacity_liters = 10.0;
    config.irrigation.water_storage.current_level_liters = 10.5;
    assert_error_on(config, "irrigation.water_storage.current_level_liters");
}

#[test]
fn test_soil_moisture_bounds_inverted() {
    let mut config = Configuration::factory();
    config.irrigation.threshold.soil_moisture_min = 60;
    config.irrigation.threshold.soil_moisture_max = 60;
    assert_error_on(config, "irrigation.threshold.soil_moisture_min");
}

#[test]
fn test_temperature_alerts_inverted() {
    let mut config = Configuration::factory();
    config.notifications.alerts.temperature_low = 32.0;
    config.notifications.alerts.temperature_high = 32.0;
    assert_error_on(config, "notifications.alerts.temperature_low");
}

#[test]
fn test_all_problems_reported_together() {
    let mut config = Configuration::factory();
    config.system.name = String::new();
    config.network.wifi.ssid = "GreenHouse".to_string();
    config.network.ap_fallback.password = "1234567".to_string();
    config.irrigation.water_storage.current_level_liters = 99.0;
    config.irrigation.threshold.soil_moisture_min = 80;
    config.notifications.alerts.temperature_low = 40.0;

    let errors = errors_for(config);

    for field in [
        "system.name",
        "network.wifi.password",
        "network.ap_fallback.password",
        "irrigation.water_storage.current_level_liters",
        "irrigation.threshold.soil_moisture_min",
        "notifications.alerts.temperature_low",
    ] {
        assert!(
            errors.iter().any(|e| e.field == field),
            "missing error on {} in {:?}",
            field,
            errors
        );
    }
}

#[test]
fn test_invalid_schedule_time_names_slot() {
    let mut config = Configuration::factory();
    config.irrigation.schedule[2].time = "25:00".to_string();
    assert_error_on(config, "irrigation.schedule.2.time");
}

#[test]
fn test_non_finite_number_rejected() {
    let mut config = Configuration::factory();
    config.irrigation.water_storage.capacity_liters = f64::NAN;
    assert_error_on(config, "irrigation.water_storage.capacity_liters");
}

#[test]
fn test_empty_tank_percentage() {
    assert_eq!(water_level_percentage(0.0, 10.0), Ok(0.0));
}

#[test]
fn test_zero_capacity_percentage() {
    assert_eq!(
        water_level_percentage(10.0, 0.0),
        Err(DeriveError::DivisionByZero)
    );
}
