use serde::{Deserialize, Serialize};

pub const TEMP_MIN_C: f64 = -40.0;
pub const TEMP_MAX_C: f64 = 85.0;
pub const HUMIDITY_MIN_PCT: f64 = 0.0;
pub const HUMIDITY_MAX_PCT: f64 = 100.0;
pub const SOIL_MOISTURE_MIN_PCT: f64 = 0.0;
pub const SOIL_MOISTURE_MAX_PCT: f64 = 100.0;
pub const PH_MIN: f64 = 0.0;
pub const PH_MAX: f64 = 14.0;
pub const LIGHT_MIN_PCT: f64 = 0.0;
pub const LIGHT_MAX_PCT: f64 = 100.0;

/// Latest sensor values shown on the dashboard. `None` means no reading.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LiveReadings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature_c: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub humidity_pct: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub soil_moisture_pct: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ph: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub light_intensity_pct: Option<f64>,
    /// Tank level in liters as reported by the controller
    #[serde(skip_serializing_if = "Option::is_none")]
    pub water_level_liters: Option<f64>,
}

/// Sensor status enum
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReadingStatus {
    Ok,
    Missing,
    OutOfRange,
}

impl ReadingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReadingStatus::Ok => "ok",
            ReadingStatus::Missing => "missing",
            ReadingStatus::OutOfRange => "out_of_range",
        }
    }

    pub fn is_ok(&self) -> bool {
        *self == ReadingStatus::Ok
    }
}

/// Per-reading status, serialized next to the derived dashboard values
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReadingStatuses {
    pub temperature: ReadingStatus,
    pub humidity: ReadingStatus,
    pub soil_moisture: ReadingStatus,
    pub ph: ReadingStatus,
    pub light_intensity: ReadingStatus,
    pub water_level: ReadingStatus,
}

fn status_in_range(value: Option<f64>, min: f64, max: f64) -> ReadingStatus {
    match value {
        None => ReadingStatus::Missing,
        // NaN fails both comparisons, so test the accepted range instead
        Some(v) if !(min..=max).contains(&v) => ReadingStatus::OutOfRange,
        Some(_) => ReadingStatus::Ok,
    }
}

pub fn validate_temperature(temp_c: Option<f64>) -> ReadingStatus {
    status_in_range(temp_c, TEMP_MIN_C, TEMP_MAX_C)
}

pub fn validate_humidity(humidity_pct: Option<f64>) -> ReadingStatus {
    status_in_range(humidity_pct, HUMIDITY_MIN_PCT, HUMIDITY_MAX_PCT)
}

pub fn validate_soil_moisture(soil_moisture_pct: Option<f64>) -> ReadingStatus {
    status_in_range(soil_moisture_pct, SOIL_MOISTURE_MIN_PCT, SOIL_MOISTURE_MAX_PCT)
}

pub fn validate_ph(ph: Option<f64>) -> ReadingStatus {
    status_in_range(ph, PH_MIN, PH_MAX)
}

pub fn validate_light_intensity(light_pct: Option<f64>) -> ReadingStatus {
    status_in_range(light_pct, LIGHT_MIN_PCT, LIGHT_MAX_PCT)
}

/// Water level has no upper bound here; the tank capacity lives in the configuration
pub fn validate_water_level(liters: Option<f64>) -> ReadingStatus {
    match liters {
        None => ReadingStatus::Missing,
        Some(l) if l.is_finite() && l >= 0.0 => ReadingStatus::Ok,
        Some(_) => ReadingStatus::OutOfRange,
    }
}

pub fn validate_readings(readings: &LiveReadings) -> ReadingStatuses {
    ReadingStatuses {
        temperature: validate_temperature(readings.temperature_c),
        humidity: validate_humidity(readings.humidity_pct),
        soil_moisture: validate_soil_moisture(readings.soil_moisture_pct),
        ph: validate_ph(readings.ph),
        light_intensity: validate_light_intensity(readings.light_intensity_pct),
        water_level: validate_water_level(readings.water_level_liters),
    }
}

/// The value when its status is `ok`, otherwise `None`
pub fn usable(value: Option<f64>, status: ReadingStatus) -> Option<f64> {
    if status.is_ok() {
        value
    } else {
        None
    }
}
