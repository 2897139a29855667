use std::time::Duration;

pub const DEVICE_URL_VAR: &str = "GROWIT_DEVICE_URL";
pub const REQUEST_TIMEOUT_VAR: &str = "GROWIT_REQUEST_TIMEOUT_SECS";
pub const POLL_INTERVAL_VAR: &str = "GROWIT_POLL_INTERVAL_SECS";

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

/// Configuration for the console
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleConfig {
    /// Controller root URL, e.g. `http://growit.local`
    pub device_url: String,
    /// Bound on every device call
    pub request_timeout: Duration,
    /// Interval between refreshes in `watch`
    pub poll_interval: Duration,
}

impl ConsoleConfig {
    /// Create a new ConsoleConfig from environment variables
    pub fn from_env() -> Result<Self, ConsoleConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any variable source; command-line overrides are layered
    /// over the environment this way
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConsoleConfigError> {
        let device_url = lookup(DEVICE_URL_VAR)
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| ConsoleConfigError::MissingEnvVar(DEVICE_URL_VAR.to_string()))?;

        if !device_url.starts_with("http://") && !device_url.starts_with("https://") {
            return Err(ConsoleConfigError::InvalidValue {
                name: DEVICE_URL_VAR.to_string(),
                value: device_url,
            });
        }

        let request_timeout = seconds(&lookup, REQUEST_TIMEOUT_VAR, DEFAULT_REQUEST_TIMEOUT_SECS)?;
        let poll_interval = seconds(&lookup, POLL_INTERVAL_VAR, DEFAULT_POLL_INTERVAL_SECS)?;

        Ok(ConsoleConfig {
            device_url,
            request_timeout,
            poll_interval,
        })
    }
}

fn seconds(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: u64,
) -> Result<Duration, ConsoleConfigError> {
    let Some(raw) = lookup(name) else {
        return Ok(Duration::from_secs(default));
    };

    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConsoleConfigError::InvalidValue {
            name: name.to_string(),
            value: raw,
        }),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConsoleConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {name}: '{value}'")]
    InvalidValue { name: String, value: String },
}
