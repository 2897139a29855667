use serde::{Deserialize, Serialize};

use crate::schedule::{self, WateringScheduleEntry, SCHEDULE_SLOTS};

// ============================================================================
// Configuration Document
// ============================================================================

/// Full settings document held by the controller.
///
/// Every section is always present. A document read from the device or from
/// an exported file that omits a field gets the factory value for it, so a
/// `Configuration` in memory is never partially populated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Configuration {
    pub system: SystemConfig,
    pub network: NetworkConfig,
    pub security: SecurityConfig,
    pub irrigation: IrrigationConfig,
    pub lighting: LightingConfig,
    pub ventilation: VentilationConfig,
    pub sensors: SensorsConfig,
    pub camera: CameraConfig,
    pub storage: StorageConfig,
    pub web_interface: WebInterfaceConfig,
    pub notifications: NotificationsConfig,
}

impl Configuration {
    /// Factory configuration, identical to what the device restores on reset
    pub fn factory() -> Self {
        Self::default()
    }
}

// ============================================================================
// System
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SystemConfig {
    pub name: String,
    pub version: f64,
    pub timezone: String,
    pub first_boot: bool,
    /// Seconds between persisted sensor samples
    pub data_logging_interval: u32,
    pub time_settings: TimeSettings,
    pub data_retention: DataRetention,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            name: "GrowIT Cannabis Controller".to_string(),
            version: 1.0,
            timezone: "UTC".to_string(),
            first_boot: false,
            data_logging_interval: 300,
            time_settings: TimeSettings::default(),
            data_retention: DataRetention::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TimeSettings {
    pub manual_time_enabled: bool,
    pub date: String,
    pub time: String,
}

impl Default for TimeSettings {
    fn default() -> Self {
        Self {
            manual_time_enabled: false,
            date: "2023-07-01".to_string(),
            time: "12:00:00".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DataRetention {
    pub retain_all_data: bool,
    pub auto_cleanup: bool,
}

impl Default for DataRetention {
    fn default() -> Self {
        Self {
            retain_all_data: false,
            auto_cleanup: true,
        }
    }
}

// ============================================================================
// Network & Security
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NetworkConfig {
    pub wifi: WifiConfig,
    pub ap_fallback: ApFallbackConfig,
    pub hostname: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            wifi: WifiConfig::default(),
            ap_fallback: ApFallbackConfig::default(),
            hostname: "growit".to_string(),
        }
    }
}

/// Station-mode credentials. An empty SSID means "not configured".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct WifiConfig {
    pub ssid: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ApFallbackConfig {
    pub enabled: bool,
    pub ssid: String,
    pub password: String,
}

impl Default for ApFallbackConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ssid: "GrowIT_AP".to_string(),
            password: "growit123".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct SecurityConfig {
    pub web_interface: WebCredentials,
    pub allow_internet_access: bool,
    pub ssl: SslConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WebCredentials {
    pub enabled: bool,
    pub username: String,
    pub password: String,
}

impl Default for WebCredentials {
    fn default() -> Self {
        Self {
            enabled: true,
            username: "admin".to_string(),
            password: "admin".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct SslConfig {
    pub enabled: bool,
}

// ============================================================================
// Irrigation
// ============================================================================

/// Irrigation trigger mode
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum IrrigationMode {
    #[default]
    Threshold,
    Schedule,
}

impl IrrigationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            IrrigationMode::Threshold => "threshold",
            IrrigationMode::Schedule => "schedule",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct IrrigationConfig {
    pub enabled: bool,
    pub pump: PumpConfig,
    pub water_storage: WaterStorage,
    pub mode: IrrigationMode,
    pub threshold: ThresholdConfig,
    #[serde(with = "schedule::slots")]
    pub schedule: [WateringScheduleEntry; SCHEDULE_SLOTS],
}

impl Default for IrrigationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            pump: PumpConfig::default(),
            water_storage: WaterStorage::default(),
            mode: IrrigationMode::Threshold,
            threshold: ThresholdConfig::default(),
            schedule: schedule::factory_schedule(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PumpConfig {
    pub pin: u8,
    pub flow_rate_ml_per_second: f64,
    pub calibration: PumpCalibration,
}

impl Default for PumpConfig {
    fn default() -> Self {
        Self {
            pin: 2,
            flow_rate_ml_per_second: 1.5,
            calibration: PumpCalibration::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PumpCalibration {
    pub enabled: bool,
    pub duration_seconds: u32,
}

impl Default for PumpCalibration {
    fn default() -> Self {
        Self {
            enabled: true,
            duration_seconds: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WaterStorage {
    pub capacity_liters: f64,
    pub current_level_liters: f64,
    pub critical_level_liters: f64,
    pub level_estimation: LevelEstimation,
}

impl Default for WaterStorage {
    fn default() -> Self {
        Self {
            capacity_liters: 10.0,
            current_level_liters: 10.0,
            critical_level_liters: 1.0,
            level_estimation: LevelEstimation::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LevelEstimation {
    pub enabled: bool,
    pub manual_refill_tracking: bool,
    pub last_refill_date: String,
    pub total_water_pumped_ml: u64,
    pub warn_at_percentage: u8,
}

impl Default for LevelEstimation {
    fn default() -> Self {
        Self {
            enabled: true,
            manual_refill_tracking: true,
            last_refill_date: String::new(),
            total_water_pumped_ml: 0,
            warn_at_percentage: 20,
        }
    }
}

/// Soil-moisture bounds for threshold mode (percent, `min < max`)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ThresholdConfig {
    pub soil_moisture_min: u8,
    pub soil_moisture_max: u8,
    pub watering_amount_ml: u32,
    pub min_interval_seconds: u32,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            soil_moisture_min: 30,
            soil_moisture_max: 60,
            watering_amount_ml: 100,
            min_interval_seconds: 3600,
        }
    }
}

// ============================================================================
// Lighting
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum LightingScheduleMode {
    #[default]
    Daily,
    Advanced,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum GrowthPhase {
    #[default]
    Vegetative,
    Flowering,
}

impl GrowthPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            GrowthPhase::Vegetative => "vegetative",
            GrowthPhase::Flowering => "flowering",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LightingConfig {
    pub enabled: bool,
    pub relay_pin: u8,
    pub schedule: LightingSchedule,
    pub current_phase: GrowthPhase,
    pub dim_settings: DimSettings,
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            relay_pin: 16,
            schedule: LightingSchedule::default(),
            current_phase: GrowthPhase::Vegetative,
            dim_settings: DimSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LightingSchedule {
    pub mode: LightingScheduleMode,
    pub daily: LightWindow,
    pub advanced: PhaseWindows,
}

impl Default for LightingSchedule {
    fn default() -> Self {
        Self {
            mode: LightingScheduleMode::Daily,
            daily: LightWindow::new("07:00", "19:00"),
            advanced: PhaseWindows::default(),
        }
    }
}

/// On/off times in `HH:MM`; `off_time` earlier than `on_time` spans midnight
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LightWindow {
    pub on_time: String,
    pub off_time: String,
}

impl LightWindow {
    pub fn new(on_time: &str, off_time: &str) -> Self {
        Self {
            on_time: on_time.to_string(),
            off_time: off_time.to_string(),
        }
    }
}

impl Default for LightWindow {
    fn default() -> Self {
        Self::new("07:00", "19:00")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PhaseWindows {
    pub vegetative: LightWindow,
    pub flowering: LightWindow,
}

impl Default for PhaseWindows {
    fn default() -> Self {
        Self {
            vegetative: LightWindow::new("06:00", "22:00"),
            flowering: LightWindow::new("08:00", "20:00"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DimSettings {
    pub enabled: bool,
    pub morning_dim_minutes: u32,
    pub evening_dim_minutes: u32,
}

impl Default for DimSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            morning_dim_minutes: 30,
            evening_dim_minutes: 30,
        }
    }
}

// ============================================================================
// Ventilation
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum FanControlType {
    #[default]
    Pwm,
    Relay,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct VentilationConfig {
    pub enabled: bool,
    pub fan: FanConfig,
    pub temperature_control: TemperatureControl,
    pub schedule_control: ScheduleControl,
}

impl Default for VentilationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            fan: FanConfig::default(),
            temperature_control: TemperatureControl::default(),
            schedule_control: ScheduleControl::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FanConfig {
    pub pin: u8,
    pub control_type: FanControlType,
    pub min_rpm: u32,
    pub max_rpm: u32,
    pub default_rpm: u32,
}

impl Default for FanConfig {
    fn default() -> Self {
        Self {
            pin: 3,
            control_type: FanControlType::Pwm,
            min_rpm: 500,
            max_rpm: 3000,
            default_rpm: 1500,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TemperatureControl {
    pub enabled: bool,
    pub min_temp_c: f64,
    pub optimal_temp_c: f64,
    pub max_temp_c: f64,
}

impl Default for TemperatureControl {
    fn default() -> Self {
        Self {
            enabled: true,
            min_temp_c: 18.0,
            optimal_temp_c: 24.0,
            max_temp_c: 30.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScheduleControl {
    pub enabled: bool,
    pub schedule: Vec<FanScheduleEntry>,
}

impl Default for ScheduleControl {
    fn default() -> Self {
        Self {
            enabled: false,
            schedule: vec![
                FanScheduleEntry::new("08:00", 2000),
                FanScheduleEntry::new("20:00", 1000),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FanScheduleEntry {
    pub time: String,
    pub rpm: u32,
}

impl FanScheduleEntry {
    pub fn new(time: &str, rpm: u32) -> Self {
        Self {
            time: time.to_string(),
            rpm,
        }
    }
}

// ============================================================================
// Sensors
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct SensorsConfig {
    pub dht22: Dht22Config,
    pub soil_moisture: SoilMoistureSensorConfig,
    pub ph_sensor: PhSensorConfig,
    pub light_sensor: LightSensorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Dht22Config {
    pub enabled: bool,
    pub pin: u8,
    pub read_interval_seconds: u32,
}

impl Default for Dht22Config {
    fn default() -> Self {
        Self {
            enabled: true,
            pin: 1,
            read_interval_seconds: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SoilMoistureSensorConfig {
    pub enabled: bool,
    pub pin: u8,
    pub read_interval_seconds: u32,
    pub calibration: SoilCalibration,
}

impl Default for SoilMoistureSensorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            pin: 33,
            read_interval_seconds: 60,
            calibration: SoilCalibration::default(),
        }
    }
}

/// Raw ADC readings for a dry and a saturated probe
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SoilCalibration {
    pub dry_value: u16,
    pub wet_value: u16,
}

impl Default for SoilCalibration {
    fn default() -> Self {
        Self {
            dry_value: 3200,
            wet_value: 1200,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PhSensorConfig {
    pub enabled: bool,
    pub pin: u8,
    pub read_interval_seconds: u32,
    pub calibration: PhCalibration,
}

impl Default for PhSensorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            pin: 34,
            read_interval_seconds: 60,
            calibration: PhCalibration::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PhCalibration {
    pub points: Vec<PhCalibrationPoint>,
    pub samples_per_reading: u32,
    pub temperature_compensation: bool,
}

impl Default for PhCalibration {
    fn default() -> Self {
        Self {
            points: vec![
                PhCalibrationPoint { ph: 4.0, voltage: 3.1 },
                PhCalibrationPoint { ph: 7.0, voltage: 2.5 },
                PhCalibrationPoint { ph: 10.0, voltage: 1.9 },
            ],
            samples_per_reading: 10,
            temperature_compensation: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PhCalibrationPoint {
    pub ph: f64,
    pub voltage: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LightSensorConfig {
    pub enabled: bool,
    pub pin: u8,
}

impl Default for LightSensorConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            pin: 17,
        }
    }
}

// ============================================================================
// Camera
// ============================================================================

/// OV2640 frame sizes supported by the camera driver
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum FrameSize {
    Qqvga,
    Qvga,
    Cif,
    #[default]
    Vga,
    Svga,
    Xga,
    Sxga,
    Uxga,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    pub enabled: bool,
    pub framesize: FrameSize,
    pub quality: u8,
    pub brightness: i8,
    pub contrast: i8,
    pub saturation: i8,
    pub special_effect: u8,
    pub wb_mode: u8,
    pub timelapse: TimelapseConfig,
    pub stream: StreamConfig,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            framesize: FrameSize::Vga,
            quality: 12,
            brightness: 0,
            contrast: 0,
            saturation: 0,
            special_effect: 0,
            wb_mode: 0,
            timelapse: TimelapseConfig::default(),
            stream: StreamConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TimelapseConfig {
    pub enabled: bool,
    pub interval_minutes: u32,
    pub start_time: String,
    pub end_time: String,
}

impl Default for TimelapseConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_minutes: 60,
            start_time: "08:00".to_string(),
            end_time: "20:00".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StreamConfig {
    pub enabled: bool,
    pub authentication_required: bool,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            authentication_required: true,
        }
    }
}

// ============================================================================
// Storage
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct StorageConfig {
    pub sd_card: SdCardConfig,
    pub database: DatabaseConfig,
    pub directories: Directories,
    pub retention: RetentionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SdCardConfig {
    pub spi_cs_pin: u8,
}

impl Default for SdCardConfig {
    fn default() -> Self {
        Self { spi_cs_pin: 5 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DatabaseConfig {
    pub max_size_mb: u32,
    pub vacuum_interval_hours: u32,
    pub backup_interval_days: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            max_size_mb: 500,
            vacuum_interval_hours: 24,
            backup_interval_days: 7,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Directories {
    pub images: String,
    pub timelapse: String,
    pub backups: String,
    pub old_configs: String,
    pub new_configs: String,
    pub logs: String,
}

impl Default for Directories {
    fn default() -> Self {
        Self {
            images: "/images".to_string(),
            timelapse: "/timelapse".to_string(),
            backups: "/backups".to_string(),
            old_configs: "/oldconfigs".to_string(),
            new_configs: "/newconfigs".to_string(),
            logs: "/logs".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RetentionConfig {
    pub sensor_data_days: u32,
    pub images_days: u32,
    pub timelapse_days: u32,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            sensor_data_days: 30,
            images_days: 15,
            timelapse_days: 90,
        }
    }
}

// ============================================================================
// Web Interface
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WebInterfaceConfig {
    pub enabled: bool,
    pub port: u16,
    /// Dashboard polling period, also used by `growitctl watch`
    pub refresh_interval_seconds: u32,
    pub features: WebFeatures,
    pub api: ApiAccess,
}

impl Default for WebInterfaceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: 80,
            refresh_interval_seconds: 5,
            features: WebFeatures::default(),
            api: ApiAccess::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WebFeatures {
    pub live_camera: bool,
    pub charts: bool,
    pub control_panel: bool,
    pub timelapse_viewer: bool,
    pub data_export: bool,
    pub system_logs: bool,
}

impl Default for WebFeatures {
    fn default() -> Self {
        Self {
            live_camera: true,
            charts: true,
            control_panel: true,
            timelapse_viewer: true,
            data_export: true,
            system_logs: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ApiAccess {
    pub enabled: bool,
    pub token_based_auth: bool,
}

impl Default for ApiAccess {
    fn default() -> Self {
        Self {
            enabled: false,
            token_based_auth: true,
        }
    }
}

// ============================================================================
// Notifications
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct NotificationsConfig {
    pub alerts: AlertThresholds,
}

/// Alert limits. Each `_low`/`_high` pair must satisfy `low < high`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AlertThresholds {
    pub temperature_high: f64,
    pub temperature_low: f64,
    pub humidity_high: f64,
    pub humidity_low: f64,
    pub soil_moisture_low: f64,
    pub water_level_low: bool,
    pub water_level_critical: u8,
    pub estimated_days_remaining: u32,
    pub estimated_water_remaining_percentage: u8,
    pub estimated_watering_sessions_remaining: u32,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            temperature_high: 32.0,
            temperature_low: 15.0,
            humidity_high: 85.0,
            humidity_low: 30.0,
            soil_moisture_low: 20.0,
            water_level_low: true,
            water_level_critical: 15,
            estimated_days_remaining: 3,
            estimated_water_remaining_percentage: 15,
            estimated_watering_sessions_remaining: 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_defaults() {
        let config = Configuration::factory();

        assert_eq!(config.system.name, "GrowIT Cannabis Controller");
        assert_eq!(config.network.wifi.ssid, "");
        assert_eq!(config.network.ap_fallback.password, "growit123");
        assert_eq!(config.irrigation.mode, IrrigationMode::Threshold);
        assert_eq!(
            config.irrigation.water_storage.current_level_liters,
            config.irrigation.water_storage.capacity_liters
        );
        assert!(config.ventilation.enabled);
        assert_eq!(config.ventilation.fan.min_rpm, 500);
        assert_eq!(config.ventilation.fan.max_rpm, 3000);
        assert_eq!(config.notifications.alerts.temperature_high, 32.0);
        assert_eq!(config.irrigation.schedule.len(), SCHEDULE_SLOTS);
    }

    #[test]
    fn test_enum_wire_names() {
        let json = serde_json::to_value(Configuration::factory()).unwrap();

        assert_eq!(json["irrigation"]["mode"], "threshold");
        assert_eq!(json["lighting"]["schedule"]["mode"], "daily");
        assert_eq!(json["lighting"]["current_phase"], "vegetative");
        assert_eq!(json["ventilation"]["fan"]["control_type"], "pwm");
        assert_eq!(json["camera"]["framesize"], "VGA");
    }

    #[test]
    fn test_missing_fields_fall_back_to_factory_values() {
        let json = r#"{
            "system": { "name": "Tent 2" },
            "irrigation": { "mode": "schedule", "schedule": [] }
        }"#;

        let config: Configuration = serde_json::from_str(json).unwrap();

        assert_eq!(config.system.name, "Tent 2");
        assert_eq!(config.system.timezone, "UTC");
        assert_eq!(config.irrigation.mode, IrrigationMode::Schedule);
        assert_eq!(config.irrigation.threshold, ThresholdConfig::default());
        assert!(config.irrigation.schedule.iter().all(|e| !e.enabled));
        assert_eq!(config.camera, CameraConfig::default());
    }
}
