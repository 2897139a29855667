//! Connection to the controller's HTTP API.
//!
//! [`DeviceTransport`] is the seam between the console and the device;
//! [`http::HttpDeviceTransport`] talks to real hardware and
//! [`memory::InMemoryDeviceTransport`] stands in for it in tests.

pub mod http;
pub mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

use crate::domain::Configuration;
use crate::error::{error_codes, ErrorResponse};

pub use http::HttpDeviceTransport;
pub use memory::{ActuatorState, InMemoryDeviceTransport};

/// Header carrying the per-request ID
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Subsystems that can be switched on and off at runtime
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Subsystem {
    Irrigation,
    Lighting,
    Ventilation,
}

impl Subsystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            Subsystem::Irrigation => "irrigation",
            Subsystem::Lighting => "lighting",
            Subsystem::Ventilation => "ventilation",
        }
    }
}

impl std::fmt::Display for Subsystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Subsystem {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "irrigation" => Ok(Subsystem::Irrigation),
            "lighting" => Ok(Subsystem::Lighting),
            "ventilation" => Ok(Subsystem::Ventilation),
            other => Err(format!(
                "unknown subsystem '{}', expected irrigation, lighting or ventilation",
                other
            )),
        }
    }
}

// ============================================================================
// Request Bodies
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubsystemRequest {
    pub enabled: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ManualWateringRequest {
    pub amount_ml: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct FanSpeedRequest {
    pub rpm: u32,
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Clone, Error, PartialEq)]
pub enum TransportError {
    /// Unreachable, timed out, or answered without a usable error body
    #[error("Device unreachable: {0}")]
    Network(String),

    /// Response body did not match the expected document
    #[error("Malformed device response: {0}")]
    Decode(String),

    /// The device refused the request
    #[error("Device rejected request: {0}")]
    Rejected(ErrorResponse),
}

impl TransportError {
    /// Stable code for logs and machine-readable output
    pub fn error_code(&self) -> &'static str {
        match self {
            TransportError::Network(_) => error_codes::DEVICE_UNREACHABLE,
            TransportError::Decode(_) => error_codes::INVALID_RESPONSE,
            TransportError::Rejected(_) => error_codes::DEVICE_REJECTED,
        }
    }
}

// ============================================================================
// Transport Trait
// ============================================================================

/// Calls the controller understands
#[async_trait]
pub trait DeviceTransport: Send + Sync + 'static {
    /// `GET /api/config`
    async fn get_config(&self) -> Result<Configuration, TransportError>;

    /// `POST /api/config`; the device stores the document or rejects it whole
    async fn post_config(&self, config: &Configuration) -> Result<(), TransportError>;

    /// `POST /api/config/reset`; returns the factory document now in force
    async fn reset_config(&self) -> Result<Configuration, TransportError>;

    /// `POST /api/control/{subsystem}`
    async fn set_subsystem(
        &self,
        subsystem: Subsystem,
        enabled: bool,
    ) -> Result<(), TransportError>;

    /// `POST /api/irrigation/manual`
    async fn manual_watering(&self, amount_ml: u32) -> Result<(), TransportError>;

    /// `POST /api/ventilation/speed`
    async fn set_fan_speed(&self, rpm: u32) -> Result<(), TransportError>;
}
