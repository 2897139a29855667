use serde::{Deserialize, Serialize};

use crate::validators::ValidationError;

/// Standard error payload.
///
/// The controller returns this body when it refuses a request, and
/// `growitctl` prints it on failure so scripts can match on `error`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    /// Stable machine-readable error code (e.g., "VALIDATION_FAILED")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Request ID for tracing and debugging. Older firmware omits it.
    #[serde(default)]
    pub request_id: String,
}

impl ErrorResponse {
    /// Create a new error response
    pub fn new(
        error: impl Into<String>,
        message: impl Into<String>,
        request_id: impl Into<String>,
    ) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            request_id: request_id.into(),
        }
    }

    /// Summarize local validation failures as a single payload
    pub fn from_validation_errors(
        errors: &[ValidationError],
        request_id: impl Into<String>,
    ) -> Self {
        let message = errors
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect::<Vec<_>>()
            .join("; ");
        Self::new(error_codes::VALIDATION_FAILED, message, request_id)
    }

    /// Convert to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Convert to pretty JSON string
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl std::fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

/// Error codes shared by the controller API and the console
pub mod error_codes {
    // Validation errors
    pub const VALIDATION_FAILED: &str = "VALIDATION_FAILED";
    pub const INVALID_VALUE: &str = "INVALID_VALUE";
    pub const CAPACITY_EXCEEDED: &str = "CAPACITY_EXCEEDED";

    // Device communication
    pub const DEVICE_UNREACHABLE: &str = "DEVICE_UNREACHABLE";
    pub const DEVICE_REJECTED: &str = "DEVICE_REJECTED";
    pub const INVALID_RESPONSE: &str = "INVALID_RESPONSE";

    // Request ordering
    pub const SAVE_IN_PROGRESS: &str = "SAVE_IN_PROGRESS";
    pub const SUPERSEDED: &str = "SUPERSEDED";

    // Local files
    pub const FILE_ERROR: &str = "FILE_ERROR";

    // Derived values
    pub const DIVISION_BY_ZERO: &str = "DIVISION_BY_ZERO";

    // Internal errors
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_creation() {
        let error = ErrorResponse::new(
            error_codes::DEVICE_REJECTED,
            "Pump pin already in use",
            "req-123",
        );

        assert_eq!(error.error, "DEVICE_REJECTED");
        assert_eq!(error.message, "Pump pin already in use");
        assert_eq!(error.request_id, "req-123");
        assert_eq!(error.to_string(), "DEVICE_REJECTED: Pump pin already in use");
    }

    #[test]
    fn test_error_response_to_json() {
        let error = ErrorResponse::new(error_codes::SAVE_IN_PROGRESS, "Save pending", "req-456");

        let json = error.to_json().unwrap();
        let deserialized: ErrorResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, error);
    }

    #[test]
    fn test_error_response_without_request_id() {
        let json = r#"{"error":"INVALID_VALUE","message":"bad hostname"}"#;

        let error: ErrorResponse = serde_json::from_str(json).unwrap();

        assert_eq!(error.error, error_codes::INVALID_VALUE);
        assert_eq!(error.request_id, "");
    }

    #[test]
    fn test_from_validation_errors() {
        let errors = vec![
            ValidationError::new("system.name", "System name cannot be empty"),
            ValidationError::new("network.hostname", "Hostname cannot be empty"),
        ];

        let error = ErrorResponse::from_validation_errors(&errors, "req-789");

        assert_eq!(error.error, error_codes::VALIDATION_FAILED);
        assert_eq!(
            error.message,
            "system.name: System name cannot be empty; network.hostname: Hostname cannot be empty"
        );
    }
}
