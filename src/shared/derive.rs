//! Values computed from the configuration and live readings for display.
//!
//! Everything here is a pure function: no I/O, no clock access. Callers pass
//! the time of day explicitly.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{
    Configuration, FanConfig, GrowthPhase, IrrigationMode, LightWindow, LightingConfig,
    LightingScheduleMode, ScheduleControl, ThresholdConfig, VentilationConfig,
};
use crate::schedule::WateringScheduleEntry;
use crate::sensor_validation::{usable, validate_readings, LiveReadings, ReadingStatuses};
use crate::time::{minutes_of_day, parse_hhmm};

const MINUTES_PER_DAY: u32 = 24 * 60;

/// Soil moisture percentage points assumed lost per hour when estimating the next watering
const SOIL_MOISTURE_LOSS_PER_HOUR: f64 = 5.0;

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum DeriveError {
    #[error("Division by zero: the divisor in the configuration is zero")]
    DivisionByZero,
}

// ============================================================================
// Ventilation
// ============================================================================

/// What is currently deciding the fan speed
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FanControlMode {
    Off,
    Manual,
    Schedule,
    Temperature,
    Default,
}

impl FanControlMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FanControlMode::Off => "off",
            FanControlMode::Manual => "manual",
            FanControlMode::Schedule => "schedule",
            FanControlMode::Temperature => "temperature",
            FanControlMode::Default => "default",
        }
    }
}

fn rpm_bounds(fan: &FanConfig) -> (u32, u32) {
    (fan.min_rpm.min(fan.max_rpm), fan.min_rpm.max(fan.max_rpm))
}

/// Fan speed for a temperature: `min_rpm` at or below `min_temp_c`,
/// `max_rpm` at or above `max_temp_c`, linear in between.
///
/// A NaN temperature yields `min_rpm`. When `max_temp_c <= min_temp_c` the
/// curve is a step at `min_temp_c`.
pub fn fan_rpm_from_temperature(temp_c: f64, ventilation: &VentilationConfig) -> u32 {
    let (min_rpm, max_rpm) = rpm_bounds(&ventilation.fan);
    let min_temp = ventilation.temperature_control.min_temp_c;
    let max_temp = ventilation.temperature_control.max_temp_c;

    if temp_c.is_nan() {
        return min_rpm;
    }
    if !(max_temp > min_temp) {
        return if temp_c < min_temp { min_rpm } else { max_rpm };
    }
    if temp_c <= min_temp {
        return min_rpm;
    }
    if temp_c >= max_temp {
        return max_rpm;
    }

    let fraction = (temp_c - min_temp) / (max_temp - min_temp);
    if !fraction.is_finite() {
        return min_rpm;
    }
    let rpm = min_rpm as f64 + fraction * (max_rpm - min_rpm) as f64;
    (rpm.round() as u32).clamp(min_rpm, max_rpm)
}

/// Position of `rpm` within the fan's range, 0-100
pub fn fan_speed_percentage(rpm: u32, fan: &FanConfig) -> u8 {
    let (min_rpm, max_rpm) = rpm_bounds(fan);
    if max_rpm == min_rpm {
        return if rpm >= max_rpm { 100 } else { 0 };
    }

    let pct = (rpm as f64 - min_rpm as f64) / (max_rpm - min_rpm) as f64 * 100.0;
    pct.round().clamp(0.0, 100.0) as u8
}

/// Speed from the fan schedule: the last entry at or before `now`,
/// wrapping to the previous day's last entry before the first one.
///
/// `None` when schedule control is off or has no usable entries.
pub fn scheduled_fan_rpm(now: NaiveTime, schedule: &ScheduleControl) -> Option<u32> {
    if !schedule.enabled {
        return None;
    }

    let now_minutes = minutes_of_day(now);
    let entries: Vec<(u32, u32)> = schedule
        .schedule
        .iter()
        .filter_map(|entry| parse_hhmm(&entry.time).map(|t| (minutes_of_day(t), entry.rpm)))
        .collect();

    let today = entries
        .iter()
        .filter(|(minutes, _)| *minutes <= now_minutes)
        .max_by_key(|(minutes, _)| *minutes);
    let latest = entries.iter().max_by_key(|(minutes, _)| *minutes);

    today.or(latest).map(|(_, rpm)| *rpm)
}

/// Whether the fan schedule reached one of its entries in the
/// `elapsed_minutes` after `since`. A manual speed set at `since` gives way
/// to the schedule at that point.
pub fn fan_schedule_changed_since(
    since: NaiveTime,
    elapsed_minutes: i64,
    schedule: &ScheduleControl,
) -> bool {
    if !schedule.enabled || elapsed_minutes <= 0 {
        return false;
    }

    let day = i64::from(MINUTES_PER_DAY);
    let since_minutes = i64::from(minutes_of_day(since));
    schedule
        .schedule
        .iter()
        .filter_map(|entry| parse_hhmm(&entry.time))
        .any(|time| {
            // An entry at `since` itself next fires a day later
            let until = (i64::from(minutes_of_day(time)) - since_minutes).rem_euclid(day);
            let until = if until == 0 { day } else { until };
            until <= elapsed_minutes
        })
}

/// Fan speed and the source deciding it.
///
/// Priority: manual override, then the fan schedule, then temperature
/// control, then the default speed. Ventilation switched off means 0 rpm.
pub fn resolve_fan(
    temp_c: Option<f64>,
    now: NaiveTime,
    ventilation: &VentilationConfig,
    manual_override: Option<u32>,
) -> (u32, FanControlMode) {
    if !ventilation.enabled {
        return (0, FanControlMode::Off);
    }

    let (min_rpm, max_rpm) = rpm_bounds(&ventilation.fan);
    if let Some(rpm) = manual_override {
        return (rpm.clamp(min_rpm, max_rpm), FanControlMode::Manual);
    }
    if let Some(rpm) = scheduled_fan_rpm(now, &ventilation.schedule_control) {
        return (rpm.clamp(min_rpm, max_rpm), FanControlMode::Schedule);
    }
    if ventilation.temperature_control.enabled {
        if let Some(temp) = temp_c.filter(|t| t.is_finite()) {
            return (
                fan_rpm_from_temperature(temp, ventilation),
                FanControlMode::Temperature,
            );
        }
    }

    (
        ventilation.fan.default_rpm.clamp(min_rpm, max_rpm),
        FanControlMode::Default,
    )
}

pub fn effective_fan_rpm(
    temp_c: Option<f64>,
    now: NaiveTime,
    ventilation: &VentilationConfig,
    manual_override: Option<u32>,
) -> u32 {
    resolve_fan(temp_c, now, ventilation, manual_override).0
}

pub fn fan_control_mode(
    temp_c: Option<f64>,
    now: NaiveTime,
    ventilation: &VentilationConfig,
    manual_override: Option<u32>,
) -> FanControlMode {
    resolve_fan(temp_c, now, ventilation, manual_override).1
}

// ============================================================================
// Lighting
// ============================================================================

/// The on/off window currently in force
pub fn active_light_window(lighting: &LightingConfig) -> &LightWindow {
    match lighting.schedule.mode {
        LightingScheduleMode::Daily => &lighting.schedule.daily,
        LightingScheduleMode::Advanced => match lighting.current_phase {
            GrowthPhase::Vegetative => &lighting.schedule.advanced.vegetative,
            GrowthPhase::Flowering => &lighting.schedule.advanced.flowering,
        },
    }
}

/// Whether the lights should be on at `now`.
///
/// A window whose off time is earlier than its on time runs past midnight.
/// Equal on and off times, or unparseable times, mean the lights stay off.
pub fn lights_on_at(now: NaiveTime, lighting: &LightingConfig) -> bool {
    if !lighting.enabled {
        return false;
    }

    let window = active_light_window(lighting);
    let (Some(on), Some(off)) = (parse_hhmm(&window.on_time), parse_hhmm(&window.off_time)) else {
        return false;
    };
    let (on, off, now) = (minutes_of_day(on), minutes_of_day(off), minutes_of_day(now));

    if on < off {
        on <= now && now < off
    } else if on > off {
        now >= on || now < off
    } else {
        false
    }
}

// ============================================================================
// Irrigation
// ============================================================================

/// Hours until threshold irrigation is expected to trigger, never below 1.
///
/// Non-finite moisture readings give 1.
pub fn next_watering_estimate_hours(soil_moisture: f64, threshold: &ThresholdConfig) -> u32 {
    if !soil_moisture.is_finite() {
        return 1;
    }

    let deficit = threshold.soil_moisture_max as f64 - soil_moisture;
    let hours = (deficit / SOIL_MOISTURE_LOSS_PER_HOUR).floor();
    if hours < 1.0 {
        1
    } else {
        hours as u32
    }
}

/// Tank fill level as a percentage of capacity, clamped to 0-100
pub fn water_level_percentage(
    current_liters: f64,
    capacity_liters: f64,
) -> Result<f64, DeriveError> {
    if !(capacity_liters.is_finite() && capacity_liters > 0.0) {
        return Err(DeriveError::DivisionByZero);
    }
    if current_liters.is_nan() {
        return Ok(0.0);
    }

    Ok((current_liters / capacity_liters * 100.0).clamp(0.0, 100.0))
}

/// Tank level after dispensing `amount_ml`, never below zero
pub fn water_after_manual_watering(current_liters: f64, amount_ml: u32) -> f64 {
    (current_liters - amount_ml as f64 / 1000.0).max(0.0)
}

/// Full waterings of `amount_ml` left before the tank reaches its critical level
pub fn watering_sessions_remaining(
    current_liters: f64,
    critical_liters: f64,
    amount_ml: u32,
) -> Result<u32, DeriveError> {
    if amount_ml == 0 {
        return Err(DeriveError::DivisionByZero);
    }

    let usable_ml = (current_liters - critical_liters) * 1000.0;
    if !usable_ml.is_finite() || usable_ml <= 0.0 {
        return Ok(0);
    }
    Ok((usable_ml / amount_ml as f64).floor() as u32)
}

/// Upcoming slot of the watering schedule
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScheduledWatering {
    /// Slot position in the stored schedule
    pub slot: usize,
    pub time: String,
    pub amount_ml: u32,
    /// 0 when the slot fires at `now`
    pub minutes_until: u32,
}

/// Next enabled, non-zero schedule slot at or after `now`, wrapping past midnight
pub fn next_scheduled_watering(
    now: NaiveTime,
    schedule: &[WateringScheduleEntry],
) -> Option<ScheduledWatering> {
    let now_minutes = minutes_of_day(now);

    schedule
        .iter()
        .enumerate()
        .filter(|(_, entry)| entry.enabled && entry.amount_ml > 0)
        .filter_map(|(slot, entry)| {
            let at = minutes_of_day(parse_hhmm(&entry.time)?);
            Some(ScheduledWatering {
                slot,
                time: entry.time.clone(),
                amount_ml: entry.amount_ml,
                minutes_until: (at + MINUTES_PER_DAY - now_minutes) % MINUTES_PER_DAY,
            })
        })
        // min_by_key keeps the first of equal keys, so earlier slots win ties
        .min_by_key(|next| next.minutes_until)
}

// ============================================================================
// Dashboard
// ============================================================================

/// Conditions crossing a configured alert threshold
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Alert {
    TemperatureHigh,
    TemperatureLow,
    HumidityHigh,
    HumidityLow,
    SoilMoistureLow,
    WaterLevelCritical,
    WateringSessionsLow,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DashboardValues {
    pub readings: ReadingStatuses,
    pub fan_rpm: u32,
    pub fan_mode: FanControlMode,
    pub fan_speed_pct: u8,
    pub lights_on: bool,
    pub light_window: LightWindow,
    pub growth_phase: GrowthPhase,
    pub irrigation_mode: IrrigationMode,
    pub water_level_liters: f64,
    /// `None` when the tank capacity is not positive
    pub water_level_pct: Option<f64>,
    /// Threshold mode with a usable soil reading only
    pub next_watering_estimate_hours: Option<u32>,
    /// Schedule mode only
    pub next_scheduled_watering: Option<ScheduledWatering>,
    pub watering_sessions_remaining: Option<u32>,
    pub alerts: Vec<Alert>,
}

/// Everything the dashboard shows, from one configuration snapshot and the
/// latest readings. Readings outside their valid range are ignored.
pub fn derive_dashboard(
    config: &Configuration,
    readings: &LiveReadings,
    now: NaiveTime,
    manual_fan_rpm: Option<u32>,
) -> DashboardValues {
    let statuses = validate_readings(readings);
    let temperature = usable(readings.temperature_c, statuses.temperature);
    let humidity = usable(readings.humidity_pct, statuses.humidity);
    let soil_moisture = usable(readings.soil_moisture_pct, statuses.soil_moisture);

    let ventilation = &config.ventilation;
    let (fan_rpm, fan_mode) = resolve_fan(temperature, now, ventilation, manual_fan_rpm);

    let irrigation = &config.irrigation;
    let storage = &irrigation.water_storage;
    let water_level_liters = usable(readings.water_level_liters, statuses.water_level)
        .unwrap_or(storage.current_level_liters);
    let water_level_pct = water_level_percentage(water_level_liters, storage.capacity_liters).ok();
    let watering_sessions = watering_sessions_remaining(
        water_level_liters,
        storage.critical_level_liters,
        irrigation.threshold.watering_amount_ml,
    )
    .ok();

    let next_watering_estimate_hours = match irrigation.mode {
        IrrigationMode::Threshold => soil_moisture
            .map(|moisture| next_watering_estimate_hours(moisture, &irrigation.threshold)),
        IrrigationMode::Schedule => None,
    };
    let next_scheduled = match irrigation.mode {
        IrrigationMode::Schedule => next_scheduled_watering(now, &irrigation.schedule),
        IrrigationMode::Threshold => None,
    };

    let thresholds = &config.notifications.alerts;
    let mut alerts = Vec::new();
    if let Some(t) = temperature {
        if t > thresholds.temperature_high {
            alerts.push(Alert::TemperatureHigh);
        }
        if t < thresholds.temperature_low {
            alerts.push(Alert::TemperatureLow);
        }
    }
    if let Some(h) = humidity {
        if h > thresholds.humidity_high {
            alerts.push(Alert::HumidityHigh);
        }
        if h < thresholds.humidity_low {
            alerts.push(Alert::HumidityLow);
        }
    }
    if soil_moisture.is_some_and(|m| m < thresholds.soil_moisture_low) {
        alerts.push(Alert::SoilMoistureLow);
    }
    if thresholds.water_level_low
        && water_level_pct.is_some_and(|pct| pct <= thresholds.water_level_critical as f64)
    {
        alerts.push(Alert::WaterLevelCritical);
    }
    if irrigation.enabled
        && watering_sessions
            .is_some_and(|left| left <= thresholds.estimated_watering_sessions_remaining)
    {
        alerts.push(Alert::WateringSessionsLow);
    }

    DashboardValues {
        readings: statuses,
        fan_rpm,
        fan_mode,
        fan_speed_pct: if fan_mode == FanControlMode::Off {
            0
        } else {
            fan_speed_percentage(fan_rpm, &ventilation.fan)
        },
        lights_on: lights_on_at(now, &config.lighting),
        light_window: active_light_window(&config.lighting).clone(),
        growth_phase: config.lighting.current_phase,
        irrigation_mode: irrigation.mode,
        water_level_liters,
        water_level_pct,
        next_watering_estimate_hours,
        next_scheduled_watering: next_scheduled,
        watering_sessions_remaining: watering_sessions,
        alerts,
    }
}
