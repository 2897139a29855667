//! Shared generators for property tests
//!
//! Each integration test file pulls this in with `mod common;` and uses
//! only the generators it needs.

#![allow(dead_code)]

pub mod generators {
    use growit_console::{
        Configuration, GrowthPhase, IrrigationMode, LightingScheduleMode, VentilationConfig,
        WateringScheduleEditor, SCHEDULE_SLOTS,
    };
    use proptest::prelude::*;

    /// A valid HH:MM time
    pub fn time_hhmm() -> impl Strategy<Value = String> {
        (0u32..24, 0u32..60).prop_map(|(h, m)| format!("{:02}:{:02}", h, m))
    }

    /// Strings that are not HH:MM
    pub fn invalid_time() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("24:00".to_string()),
            Just("7:30".to_string()),
            Just("12:60".to_string()),
            Just("noon".to_string()),
            Just("12-30".to_string()),
            (24u32..100, 0u32..60).prop_map(|(h, m)| format!("{}:{:02}", h, m)),
        ]
    }

    /// (time, amount_ml, enabled) rows for the watering schedule editor
    pub fn schedule_rows(max: usize) -> impl Strategy<Value = Vec<(String, u32, bool)>> {
        prop::collection::vec((time_hhmm(), 1u32..=1000, any::<bool>()), 0..=max)
    }

    /// Exactly enough rows to fill every slot
    pub fn full_schedule_rows() -> impl Strategy<Value = Vec<(String, u32, bool)>> {
        prop::collection::vec((time_hhmm(), 1u32..=1000, any::<bool>()), SCHEDULE_SLOTS)
    }

    /// Ventilation settings that pass validation, temperature control on
    pub fn ventilation() -> impl Strategy<Value = VentilationConfig> {
        (
            0u32..2000,
            1u32..5000,
            0.0f64..=1.0,
            -20.0f64..20.0,
            0.5f64..40.0,
        )
            .prop_map(|(min_rpm, span, default_frac, min_temp, temp_span)| {
                let mut ventilation = VentilationConfig::default();
                ventilation.fan.min_rpm = min_rpm;
                ventilation.fan.max_rpm = min_rpm + span;
                ventilation.fan.default_rpm = min_rpm + (span as f64 * default_frac) as u32;
                ventilation.temperature_control.enabled = true;
                ventilation.temperature_control.min_temp_c = min_temp;
                ventilation.temperature_control.max_temp_c = min_temp + temp_span;
                ventilation.temperature_control.optimal_temp_c = min_temp + temp_span / 2.0;
                ventilation
            })
    }

    /// Any temperature a sensor could plausibly report, and then some
    pub fn temperature() -> impl Strategy<Value = f64> {
        -100.0f64..150.0
    }

    fn system_name() -> impl Strategy<Value = String> {
        "[A-Za-z0-9][A-Za-z0-9 ]{0,30}"
    }

    fn hostname() -> impl Strategy<Value = String> {
        "[a-z][a-z0-9]{0,15}"
    }

    /// A configuration document that passes validation
    pub fn valid_configuration() -> impl Strategy<Value = Configuration> {
        let identity = (system_name(), hostname(), any::<bool>(), any::<bool>());
        let storage = (1.0f64..500.0, 0.0f64..=1.0, 0.0f64..=1.0);
        let irrigation = (0u8..99, 1u8..=100, any::<bool>(), schedule_rows(10));
        let climate = (ventilation(), -10.0f64..25.0, 1.0f64..40.0, 0.0f64..50.0, 1.0f64..50.0);

        (identity, storage, irrigation, climate).prop_map(
            |(
                (name, host, threshold_mode, flowering),
                (capacity, level_frac, critical_frac),
                (soil_min, soil_gap, irrigation_on, rows),
                (ventilation, temp_low, temp_gap, humidity_low, humidity_gap),
            )| {
                let mut config = Configuration::factory();
                config.system.name = name;
                config.network.hostname = host;

                let storage = &mut config.irrigation.water_storage;
                storage.capacity_liters = capacity;
                storage.current_level_liters = capacity * level_frac;
                storage.critical_level_liters = capacity * critical_frac;

                config.irrigation.enabled = irrigation_on;
                config.irrigation.mode = if threshold_mode {
                    IrrigationMode::Threshold
                } else {
                    IrrigationMode::Schedule
                };
                config.irrigation.threshold.soil_moisture_min = soil_min;
                config.irrigation.threshold.soil_moisture_max =
                    soil_min.saturating_add(soil_gap).min(100);

                let mut editor = WateringScheduleEditor::new();
                for (time, amount_ml, enabled) in rows {
                    editor
                        .add_entry(&time, amount_ml, enabled)
                        .expect("generated rows fit the schedule");
                }
                config.irrigation.schedule = editor.to_ordered_list();

                config.lighting.current_phase = if flowering {
                    GrowthPhase::Flowering
                } else {
                    GrowthPhase::Vegetative
                };
                config.lighting.schedule.mode = if flowering {
                    LightingScheduleMode::Advanced
                } else {
                    LightingScheduleMode::Daily
                };

                config.ventilation = ventilation;

                let alerts = &mut config.notifications.alerts;
                alerts.temperature_low = temp_low;
                alerts.temperature_high = temp_low + temp_gap;
                alerts.humidity_low = humidity_low;
                alerts.humidity_high = humidity_low + humidity_gap;

                config
            },
        )
    }
}
