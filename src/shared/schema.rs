//! Field-level description of the configuration document.
//!
//! Each entry names a dotted path into the document (array positions are
//! written as `*`), the type and range of the value stored there and the
//! condition under which the field has to be filled in. The validator walks
//! this table; UI code can use [`lookup`] to render inputs with the same
//! limits.

/// Value type and constraints of a field
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    /// Free text, length in characters
    Text { min_len: usize, max_len: usize },
    /// Password or key, never echoed back in messages
    Secret { min_len: usize, max_len: usize },
    Integer { min: i64, max: i64 },
    Float { min: f64, max: f64 },
    Bool,
    /// One of a fixed set of wire names
    Enum(&'static [&'static str]),
    /// 24h wall-clock time, `HH:MM`
    Time,
    /// RFC 1123 host label
    Hostname,
}

/// When a field has to carry a non-empty value.
///
/// Constraints of a conditional field are only enforced while its condition
/// holds, so a disabled feature may keep blank or stale values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Optional,
    Always,
    /// Required while the bool at the path is true
    WhenTrue(&'static str),
    /// Required while the text at the path is non-empty
    WhenNonEmpty(&'static str),
    /// Required while every bool listed is true
    WhenAllTrue(&'static [&'static str]),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldDescriptor {
    pub path: &'static str,
    /// Human-readable name used in validation messages
    pub label: &'static str,
    pub kind: FieldKind,
    pub requirement: Requirement,
}

pub const IRRIGATION_MODES: &[&str] = &["threshold", "schedule"];
pub const LIGHTING_SCHEDULE_MODES: &[&str] = &["daily", "advanced"];
pub const GROWTH_PHASES: &[&str] = &["vegetative", "flowering"];
pub const FAN_CONTROL_TYPES: &[&str] = &["pwm", "relay"];
pub const FRAME_SIZES: &[&str] = &[
    "QQVGA", "QVGA", "CIF", "VGA", "SVGA", "XGA", "SXGA", "UXGA",
];

const GPIO: FieldKind = FieldKind::Integer { min: 0, max: 48 };
const READ_INTERVAL: FieldKind = FieldKind::Integer { min: 1, max: 86_400 };
const RPM: FieldKind = FieldKind::Integer { min: 0, max: 10_000 };
const LITERS: FieldKind = FieldKind::Float {
    min: 0.0,
    max: 10_000.0,
};
const PERCENT: FieldKind = FieldKind::Integer { min: 0, max: 100 };
const CAMERA_LEVEL: FieldKind = FieldKind::Integer { min: -2, max: 2 };
const RETENTION_DAYS: FieldKind = FieldKind::Integer { min: 1, max: 3650 };
const CONTROL_TEMP: FieldKind = FieldKind::Float {
    min: -20.0,
    max: 60.0,
};
const ALERT_TEMP: FieldKind = FieldKind::Float {
    min: -40.0,
    max: 85.0,
};
const ALERT_PERCENT: FieldKind = FieldKind::Float {
    min: 0.0,
    max: 100.0,
};

const TIMELAPSE_ACTIVE: &[&str] = &["camera.enabled", "camera.timelapse.enabled"];

const fn field(
    path: &'static str,
    label: &'static str,
    kind: FieldKind,
    requirement: Requirement,
) -> FieldDescriptor {
    FieldDescriptor {
        path,
        label,
        kind,
        requirement,
    }
}

const fn optional(path: &'static str, label: &'static str, kind: FieldKind) -> FieldDescriptor {
    field(path, label, kind, Requirement::Optional)
}

const fn required(path: &'static str, label: &'static str, kind: FieldKind) -> FieldDescriptor {
    field(path, label, kind, Requirement::Always)
}

static FIELDS: &[FieldDescriptor] = &[
    // System
    required(
        "system.name",
        "System name",
        FieldKind::Text {
            min_len: 1,
            max_len: 64,
        },
    ),
    required(
        "system.timezone",
        "Timezone",
        FieldKind::Text {
            min_len: 1,
            max_len: 64,
        },
    ),
    optional(
        "system.data_logging_interval",
        "Data logging interval",
        FieldKind::Integer {
            min: 10,
            max: 86_400,
        },
    ),
    // Network
    optional(
        "network.wifi.ssid",
        "WiFi SSID",
        FieldKind::Text {
            min_len: 0,
            max_len: 32,
        },
    ),
    field(
        "network.wifi.password",
        "WiFi password",
        FieldKind::Secret {
            min_len: 1,
            max_len: 64,
        },
        Requirement::WhenNonEmpty("network.wifi.ssid"),
    ),
    optional("network.ap_fallback.enabled", "AP fallback", FieldKind::Bool),
    field(
        "network.ap_fallback.ssid",
        "AP SSID",
        FieldKind::Text {
            min_len: 1,
            max_len: 32,
        },
        Requirement::WhenTrue("network.ap_fallback.enabled"),
    ),
    field(
        "network.ap_fallback.password",
        "AP password",
        FieldKind::Secret {
            min_len: 8,
            max_len: 63,
        },
        Requirement::WhenTrue("network.ap_fallback.enabled"),
    ),
    required("network.hostname", "Hostname", FieldKind::Hostname),
    // Security
    optional(
        "security.web_interface.enabled",
        "Web interface login",
        FieldKind::Bool,
    ),
    field(
        "security.web_interface.username",
        "Admin username",
        FieldKind::Text {
            min_len: 1,
            max_len: 32,
        },
        Requirement::WhenTrue("security.web_interface.enabled"),
    ),
    field(
        "security.web_interface.password",
        "Admin password",
        FieldKind::Secret {
            min_len: 1,
            max_len: 64,
        },
        Requirement::WhenTrue("security.web_interface.enabled"),
    ),
    // Irrigation
    optional("irrigation.enabled", "Irrigation", FieldKind::Bool),
    optional("irrigation.pump.pin", "Pump pin", GPIO),
    optional(
        "irrigation.pump.flow_rate_ml_per_second",
        "Pump flow rate",
        FieldKind::Float {
            min: 0.1,
            max: 100.0,
        },
    ),
    optional(
        "irrigation.water_storage.capacity_liters",
        "Tank capacity",
        LITERS,
    ),
    optional(
        "irrigation.water_storage.current_level_liters",
        "Current water level",
        LITERS,
    ),
    optional(
        "irrigation.water_storage.critical_level_liters",
        "Critical water level",
        LITERS,
    ),
    optional(
        "irrigation.water_storage.level_estimation.warn_at_percentage",
        "Water level warning percentage",
        PERCENT,
    ),
    required(
        "irrigation.mode",
        "Irrigation mode",
        FieldKind::Enum(IRRIGATION_MODES),
    ),
    optional(
        "irrigation.threshold.soil_moisture_min",
        "Minimum soil moisture",
        PERCENT,
    ),
    optional(
        "irrigation.threshold.soil_moisture_max",
        "Maximum soil moisture",
        PERCENT,
    ),
    optional(
        "irrigation.threshold.watering_amount_ml",
        "Watering amount",
        FieldKind::Integer {
            min: 0,
            max: 10_000,
        },
    ),
    optional(
        "irrigation.threshold.min_interval_seconds",
        "Minimum watering interval",
        FieldKind::Integer {
            min: 0,
            max: 604_800,
        },
    ),
    required(
        "irrigation.schedule.*.time",
        "Watering schedule time",
        FieldKind::Time,
    ),
    optional(
        "irrigation.schedule.*.amount_ml",
        "Watering schedule amount",
        FieldKind::Integer { min: 0, max: 1000 },
    ),
    // Lighting
    optional("lighting.relay_pin", "Light relay pin", GPIO),
    required(
        "lighting.schedule.mode",
        "Lighting schedule mode",
        FieldKind::Enum(LIGHTING_SCHEDULE_MODES),
    ),
    required("lighting.schedule.daily.on_time", "Light on time", FieldKind::Time),
    required(
        "lighting.schedule.daily.off_time",
        "Light off time",
        FieldKind::Time,
    ),
    required(
        "lighting.schedule.advanced.vegetative.on_time",
        "Vegetative on time",
        FieldKind::Time,
    ),
    required(
        "lighting.schedule.advanced.vegetative.off_time",
        "Vegetative off time",
        FieldKind::Time,
    ),
    required(
        "lighting.schedule.advanced.flowering.on_time",
        "Flowering on time",
        FieldKind::Time,
    ),
    required(
        "lighting.schedule.advanced.flowering.off_time",
        "Flowering off time",
        FieldKind::Time,
    ),
    required(
        "lighting.current_phase",
        "Growth phase",
        FieldKind::Enum(GROWTH_PHASES),
    ),
    optional(
        "lighting.dim_settings.morning_dim_minutes",
        "Morning dim duration",
        FieldKind::Integer { min: 0, max: 240 },
    ),
    optional(
        "lighting.dim_settings.evening_dim_minutes",
        "Evening dim duration",
        FieldKind::Integer { min: 0, max: 240 },
    ),
    // Ventilation
    optional("ventilation.enabled", "Ventilation", FieldKind::Bool),
    optional("ventilation.fan.pin", "Fan pin", GPIO),
    required(
        "ventilation.fan.control_type",
        "Fan control type",
        FieldKind::Enum(FAN_CONTROL_TYPES),
    ),
    optional("ventilation.fan.min_rpm", "Minimum fan speed", RPM),
    optional("ventilation.fan.max_rpm", "Maximum fan speed", RPM),
    optional("ventilation.fan.default_rpm", "Default fan speed", RPM),
    optional(
        "ventilation.temperature_control.min_temp_c",
        "Minimum temperature",
        CONTROL_TEMP,
    ),
    optional(
        "ventilation.temperature_control.optimal_temp_c",
        "Optimal temperature",
        CONTROL_TEMP,
    ),
    optional(
        "ventilation.temperature_control.max_temp_c",
        "Maximum temperature",
        CONTROL_TEMP,
    ),
    required(
        "ventilation.schedule_control.schedule.*.time",
        "Fan schedule time",
        FieldKind::Time,
    ),
    optional(
        "ventilation.schedule_control.schedule.*.rpm",
        "Fan schedule speed",
        RPM,
    ),
    // Sensors
    optional("sensors.dht22.pin", "DHT22 pin", GPIO),
    optional(
        "sensors.dht22.read_interval_seconds",
        "DHT22 read interval",
        READ_INTERVAL,
    ),
    optional("sensors.soil_moisture.pin", "Soil sensor pin", GPIO),
    optional(
        "sensors.soil_moisture.read_interval_seconds",
        "Soil sensor read interval",
        READ_INTERVAL,
    ),
    optional(
        "sensors.soil_moisture.calibration.dry_value",
        "Soil sensor dry value",
        FieldKind::Integer { min: 0, max: 4095 },
    ),
    optional(
        "sensors.soil_moisture.calibration.wet_value",
        "Soil sensor wet value",
        FieldKind::Integer { min: 0, max: 4095 },
    ),
    optional("sensors.ph_sensor.pin", "pH sensor pin", GPIO),
    optional(
        "sensors.ph_sensor.read_interval_seconds",
        "pH sensor read interval",
        READ_INTERVAL,
    ),
    optional(
        "sensors.ph_sensor.calibration.samples_per_reading",
        "pH samples per reading",
        FieldKind::Integer { min: 1, max: 100 },
    ),
    optional(
        "sensors.ph_sensor.calibration.points.*.ph",
        "pH calibration value",
        FieldKind::Float {
            min: 0.0,
            max: 14.0,
        },
    ),
    optional(
        "sensors.ph_sensor.calibration.points.*.voltage",
        "pH calibration voltage",
        FieldKind::Float { min: 0.0, max: 5.0 },
    ),
    optional("sensors.light_sensor.pin", "Light sensor pin", GPIO),
    // Camera
    optional("camera.enabled", "Camera", FieldKind::Bool),
    required(
        "camera.framesize",
        "Frame size",
        FieldKind::Enum(FRAME_SIZES),
    ),
    optional(
        "camera.quality",
        "JPEG quality",
        FieldKind::Integer { min: 0, max: 63 },
    ),
    optional("camera.brightness", "Brightness", CAMERA_LEVEL),
    optional("camera.contrast", "Contrast", CAMERA_LEVEL),
    optional("camera.saturation", "Saturation", CAMERA_LEVEL),
    optional(
        "camera.special_effect",
        "Special effect",
        FieldKind::Integer { min: 0, max: 6 },
    ),
    optional(
        "camera.wb_mode",
        "White balance mode",
        FieldKind::Integer { min: 0, max: 4 },
    ),
    optional("camera.timelapse.enabled", "Timelapse", FieldKind::Bool),
    optional(
        "camera.timelapse.interval_minutes",
        "Timelapse interval",
        FieldKind::Integer { min: 1, max: 1440 },
    ),
    field(
        "camera.timelapse.start_time",
        "Timelapse start time",
        FieldKind::Time,
        Requirement::WhenAllTrue(TIMELAPSE_ACTIVE),
    ),
    field(
        "camera.timelapse.end_time",
        "Timelapse end time",
        FieldKind::Time,
        Requirement::WhenAllTrue(TIMELAPSE_ACTIVE),
    ),
    // Storage
    optional("storage.sd_card.spi_cs_pin", "SD card CS pin", GPIO),
    optional(
        "storage.database.max_size_mb",
        "Database size limit",
        FieldKind::Integer { min: 1, max: 32_768 },
    ),
    optional(
        "storage.database.vacuum_interval_hours",
        "Vacuum interval",
        FieldKind::Integer { min: 1, max: 720 },
    ),
    optional(
        "storage.database.backup_interval_days",
        "Backup interval",
        FieldKind::Integer { min: 1, max: 365 },
    ),
    optional(
        "storage.retention.sensor_data_days",
        "Sensor data retention",
        RETENTION_DAYS,
    ),
    optional(
        "storage.retention.images_days",
        "Image retention",
        RETENTION_DAYS,
    ),
    optional(
        "storage.retention.timelapse_days",
        "Timelapse retention",
        RETENTION_DAYS,
    ),
    // Web interface
    optional(
        "web_interface.port",
        "Web interface port",
        FieldKind::Integer { min: 1, max: 65_535 },
    ),
    optional(
        "web_interface.refresh_interval_seconds",
        "Dashboard refresh interval",
        FieldKind::Integer { min: 1, max: 3600 },
    ),
    // Notifications
    optional(
        "notifications.alerts.temperature_high",
        "High temperature alert",
        ALERT_TEMP,
    ),
    optional(
        "notifications.alerts.temperature_low",
        "Low temperature alert",
        ALERT_TEMP,
    ),
    optional(
        "notifications.alerts.humidity_high",
        "High humidity alert",
        ALERT_PERCENT,
    ),
    optional(
        "notifications.alerts.humidity_low",
        "Low humidity alert",
        ALERT_PERCENT,
    ),
    optional(
        "notifications.alerts.soil_moisture_low",
        "Low soil moisture alert",
        ALERT_PERCENT,
    ),
    optional(
        "notifications.alerts.water_level_critical",
        "Critical water level alert",
        PERCENT,
    ),
    optional(
        "notifications.alerts.estimated_water_remaining_percentage",
        "Remaining water alert",
        PERCENT,
    ),
];

/// All described fields, in document order
pub fn fields() -> &'static [FieldDescriptor] {
    FIELDS
}

/// Find the descriptor for a dotted field path.
///
/// Numeric segments address array elements and match the `*` wildcard, so
/// `irrigation.schedule.3.time` resolves to `irrigation.schedule.*.time`.
pub fn lookup(path: &str) -> Option<&'static FieldDescriptor> {
    let normalized = normalize_path(path);
    FIELDS.iter().find(|descriptor| descriptor.path == normalized)
}

fn normalize_path(path: &str) -> String {
    path.split('.')
        .map(|segment| {
            if !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit()) {
                "*"
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join(".")
}
