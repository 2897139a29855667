use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;
use tracing::debug;

use crate::domain::{Configuration, IrrigationMode};
use crate::schema::{self, FieldDescriptor, FieldKind, Requirement};
use crate::store::DraftConfig;

/// Validation error type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field, e.g. `network.ap_fallback.password`
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Validation error for field '{}': {}",
            self.field, self.message
        )
    }
}

impl std::error::Error for ValidationError {}

/// Validate a 24h wall-clock time (HH:MM)
pub fn validate_time_hhmm(time: &str) -> Result<(), ValidationError> {
    static TIME_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = TIME_REGEX.get_or_init(|| Regex::new(r"^([01][0-9]|2[0-3]):[0-5][0-9]$").unwrap());

    if regex.is_match(time) {
        Ok(())
    } else {
        Err(ValidationError::new(
            "time",
            "Time must be in 24h HH:MM format (e.g., 07:30)",
        ))
    }
}

/// Validate a single-label hostname (letters, digits, inner hyphens, max 63 chars)
pub fn validate_hostname(hostname: &str) -> Result<(), ValidationError> {
    static HOSTNAME_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = HOSTNAME_REGEX.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?$").unwrap()
    });

    if regex.is_match(hostname) {
        Ok(())
    } else {
        Err(ValidationError::new(
            "hostname",
            "Hostname must be 1-63 letters, digits or hyphens and cannot start or end with a hyphen",
        ))
    }
}

// ============================================================================
// Configuration Validation
// ============================================================================

/// A draft that passed validation. Only [`validate`] creates one.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedDraft {
    draft: DraftConfig,
}

impl ValidatedDraft {
    pub fn config(&self) -> &Configuration {
        self.draft.config()
    }

    /// Store version the draft was taken from
    pub fn base_version(&self) -> u64 {
        self.draft.base_version()
    }

    pub fn into_config(self) -> Configuration {
        self.draft.into_config()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ValidationResult {
    Valid(ValidatedDraft),
    /// Never empty, in schema order followed by cross-field rules
    Invalid(Vec<ValidationError>),
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid(_))
    }

    pub fn errors(&self) -> &[ValidationError] {
        match self {
            ValidationResult::Valid(_) => &[],
            ValidationResult::Invalid(errors) => errors,
        }
    }

    pub fn into_result(self) -> Result<ValidatedDraft, Vec<ValidationError>> {
        match self {
            ValidationResult::Valid(draft) => Ok(draft),
            ValidationResult::Invalid(errors) => Err(errors),
        }
    }
}

/// Validate a draft before it may be sent to the device.
///
/// Every rule is evaluated; the result lists all problems found.
pub fn validate(draft: DraftConfig) -> ValidationResult {
    let errors = check_configuration(draft.config());
    if errors.is_empty() {
        ValidationResult::Valid(ValidatedDraft { draft })
    } else {
        debug!(error_count = errors.len(), "Draft configuration rejected");
        ValidationResult::Invalid(errors)
    }
}

/// Collect every validation error in a configuration document
pub fn check_configuration(config: &Configuration) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    match serde_json::to_value(config) {
        Ok(document) => check_fields(&document, &mut errors),
        // Only reachable if a Serialize impl fails; report it against the root
        Err(e) => errors.push(ValidationError::new("", e.to_string())),
    }
    check_cross_field_rules(config, &mut errors);

    errors
}

// ----------------------------------------------------------------------------
// Pass 1: per-field constraints from the schema
// ----------------------------------------------------------------------------

fn check_fields(document: &Value, errors: &mut Vec<ValidationError>) {
    for descriptor in schema::fields() {
        if !requirement_active(document, descriptor.requirement) {
            continue;
        }
        for (path, value) in resolve(document, descriptor.path) {
            if let Some(message) = check_value(descriptor, value) {
                errors.push(ValidationError::new(path, message));
            }
        }
    }
}

/// Expand a schema path (with `*` wildcards) into concrete paths and values
fn resolve<'a>(document: &'a Value, pattern: &str) -> Vec<(String, &'a Value)> {
    let mut matches = vec![(String::new(), document)];

    for segment in pattern.split('.') {
        let mut next = Vec::new();
        for (prefix, value) in matches {
            let join = |key: &str| {
                if prefix.is_empty() {
                    key.to_string()
                } else {
                    format!("{}.{}", prefix, key)
                }
            };

            if segment == "*" {
                if let Some(items) = value.as_array() {
                    for (index, item) in items.iter().enumerate() {
                        next.push((join(&index.to_string()), item));
                    }
                }
            } else if let Some(child) = value.get(segment) {
                next.push((join(segment), child));
            }
        }
        matches = next;
    }

    matches
}

fn value_at<'a>(document: &'a Value, path: &str) -> Option<&'a Value> {
    document.pointer(&format!("/{}", path.replace('.', "/")))
}

fn is_true(document: &Value, path: &str) -> bool {
    value_at(document, path).and_then(Value::as_bool) == Some(true)
}

fn requirement_active(document: &Value, requirement: Requirement) -> bool {
    match requirement {
        Requirement::Optional | Requirement::Always => true,
        Requirement::WhenTrue(path) => is_true(document, path),
        Requirement::WhenNonEmpty(path) => value_at(document, path)
            .and_then(Value::as_str)
            .is_some_and(|s| !s.is_empty()),
        Requirement::WhenAllTrue(paths) => paths.iter().all(|path| is_true(document, path)),
    }
}

fn label_of(path: &str) -> &str {
    schema::lookup(path).map_or(path, |descriptor| descriptor.label)
}

fn missing_message(descriptor: &FieldDescriptor) -> String {
    match descriptor.requirement {
        Requirement::WhenTrue(path) => format!(
            "{} is required when {} is enabled",
            descriptor.label,
            label_of(path)
        ),
        Requirement::WhenNonEmpty(path) => format!(
            "{} is required when {} is set",
            descriptor.label,
            label_of(path)
        ),
        Requirement::WhenAllTrue(paths) => format!(
            "{} is required when {} are enabled",
            descriptor.label,
            paths
                .iter()
                .map(|path| label_of(path))
                .collect::<Vec<_>>()
                .join(" and ")
        ),
        Requirement::Optional | Requirement::Always => {
            format!("{} cannot be empty", descriptor.label)
        }
    }
}

/// Check one value against its descriptor, returning the failure message
fn check_value(descriptor: &FieldDescriptor, value: &Value) -> Option<String> {
    let label = descriptor.label;
    let required = descriptor.requirement != Requirement::Optional;

    match descriptor.kind {
        FieldKind::Text { min_len, max_len } | FieldKind::Secret { min_len, max_len } => {
            let Some(text) = value.as_str() else {
                return Some(format!("{} must be text", label));
            };
            let len = text.chars().count();
            if len == 0 {
                return required.then(|| missing_message(descriptor));
            }
            if len < min_len {
                return Some(format!("{} must be at least {} characters", label, min_len));
            }
            if len > max_len {
                return Some(format!("{} must be at most {} characters", label, max_len));
            }
            None
        }
        FieldKind::Integer { min, max } => match value.as_i64() {
            Some(n) if n < min || n > max => {
                Some(format!("{} must be between {} and {}", label, min, max))
            }
            Some(_) => None,
            None => Some(format!("{} must be a whole number", label)),
        },
        FieldKind::Float { min, max } => match value.as_f64() {
            Some(n) if n < min || n > max => {
                Some(format!("{} must be between {} and {}", label, min, max))
            }
            Some(_) => None,
            // serde_json writes NaN and infinities as null
            None => Some(format!("{} must be a finite number", label)),
        },
        FieldKind::Bool => match value {
            Value::Bool(_) => None,
            _ => Some(format!("{} must be true or false", label)),
        },
        FieldKind::Enum(allowed) => match value.as_str() {
            Some(s) if allowed.contains(&s) => None,
            _ => Some(format!("{} must be one of: {}", label, allowed.join(", "))),
        },
        FieldKind::Time => match value.as_str() {
            Some("") => required.then(|| missing_message(descriptor)),
            Some(s) if validate_time_hhmm(s).is_ok() => None,
            _ => Some(format!("{} must be a time in HH:MM format", label)),
        },
        FieldKind::Hostname => match value.as_str() {
            Some("") => required.then(|| missing_message(descriptor)),
            Some(s) if validate_hostname(s).is_ok() => None,
            _ => Some(format!(
                "{} must contain only letters, digits and hyphens",
                label
            )),
        },
    }
}

// ----------------------------------------------------------------------------
// Pass 2: rules spanning several fields
// ----------------------------------------------------------------------------

fn check_cross_field_rules(config: &Configuration, errors: &mut Vec<ValidationError>) {
    let irrigation = &config.irrigation;
    if irrigation.enabled {
        let storage = &irrigation.water_storage;
        if storage.capacity_liters <= 0.0 {
            errors.push(ValidationError::new(
                "irrigation.water_storage.capacity_liters",
                "Tank capacity must be greater than zero",
            ));
        }
        if storage.current_level_liters > storage.capacity_liters {
            errors.push(ValidationError::new(
                "irrigation.water_storage.current_level_liters",
                "Current water level cannot exceed tank capacity",
            ));
        }
        if storage.critical_level_liters > storage.capacity_liters {
            errors.push(ValidationError::new(
                "irrigation.water_storage.critical_level_liters",
                "Critical water level cannot exceed tank capacity",
            ));
        }
        let threshold = &irrigation.threshold;
        if irrigation.mode == IrrigationMode::Threshold
            && threshold.soil_moisture_min >= threshold.soil_moisture_max
        {
            errors.push(ValidationError::new(
                "irrigation.threshold.soil_moisture_min",
                "Minimum soil moisture must be lower than maximum soil moisture",
            ));
        }
    }

    let ventilation = &config.ventilation;
    if ventilation.enabled {
        let fan = &ventilation.fan;
        if fan.min_rpm >= fan.max_rpm {
            errors.push(ValidationError::new(
                "ventilation.fan.min_rpm",
                "Minimum fan speed must be lower than maximum fan speed",
            ));
        }
        if fan.default_rpm < fan.min_rpm || fan.default_rpm > fan.max_rpm {
            errors.push(ValidationError::new(
                "ventilation.fan.default_rpm",
                "Default fan speed must lie between minimum and maximum fan speed",
            ));
        }
        let control = &ventilation.temperature_control;
        if control.enabled && control.min_temp_c >= control.max_temp_c {
            errors.push(ValidationError::new(
                "ventilation.temperature_control.min_temp_c",
                "Minimum temperature must be lower than maximum temperature",
            ));
        }
    }

    let alerts = &config.notifications.alerts;
    if alerts.temperature_low >= alerts.temperature_high {
        errors.push(ValidationError::new(
            "notifications.alerts.temperature_low",
            "Low temperature alert must be lower than high temperature alert",
        ));
    }
    if alerts.humidity_low >= alerts.humidity_high {
        errors.push(ValidationError::new(
            "notifications.alerts.humidity_low",
            "Low humidity alert must be lower than high humidity alert",
        ));
    }
}
