use thiserror::Error;

use growit_console::config_file::ConfigFileError;
use growit_console::error::{error_codes, ErrorResponse};
use growit_console::{ScheduleError, SessionError, SyncError, ValidationError};

use crate::config::ConsoleConfigError;

/// Main error type for the console
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConsoleConfigError),

    #[error("{0}")]
    Session(#[from] SessionError),

    #[error("{0}")]
    File(#[from] ConfigFileError),

    #[error("{0}")]
    Schedule(#[from] ScheduleError),

    /// Local validation of a document failed; nothing was sent
    #[error("Configuration is invalid ({} problem(s))", .0.len())]
    Invalid(Vec<ValidationError>),

    #[error("{0}")]
    Usage(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<SyncError> for CliError {
    fn from(error: SyncError) -> Self {
        CliError::Session(SessionError::Sync(error))
    }
}

impl CliError {
    /// Process exit status for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Usage(_) | CliError::Config(_) => 2,
            CliError::Invalid(_)
            | CliError::Session(SessionError::Invalid(_))
            | CliError::Schedule(_) => 3,
            CliError::Session(SessionError::Sync(SyncError::Network(_))) => 4,
            CliError::Session(SessionError::Sync(SyncError::RemoteRejected(_))) => 5,
            _ => 1,
        }
    }

    /// Machine-readable payload printed on stderr
    pub fn to_error_response(&self, request_id: &str) -> ErrorResponse {
        match self {
            CliError::Invalid(errors) | CliError::Session(SessionError::Invalid(errors)) => {
                ErrorResponse::from_validation_errors(errors, request_id)
            }
            // Pass the device's own payload through untouched
            CliError::Session(SessionError::Sync(SyncError::RemoteRejected(response))) => {
                response.clone()
            }
            CliError::Session(SessionError::Sync(e)) => {
                ErrorResponse::new(e.error_code(), &e.to_string(), request_id)
            }
            CliError::Config(e) => {
                ErrorResponse::new(error_codes::INVALID_VALUE, &e.to_string(), request_id)
            }
            CliError::File(e) => {
                ErrorResponse::new(error_codes::FILE_ERROR, &e.to_string(), request_id)
            }
            CliError::Schedule(ScheduleError::CapacityExceeded) => ErrorResponse::new(
                error_codes::CAPACITY_EXCEEDED,
                &self.to_string(),
                request_id,
            ),
            CliError::Schedule(ScheduleError::InvalidTime(_)) | CliError::Usage(_) => {
                ErrorResponse::new(error_codes::INVALID_VALUE, &self.to_string(), request_id)
            }
            CliError::Internal(_) => ErrorResponse::new(
                error_codes::INTERNAL_ERROR,
                "Internal error occurred",
                request_id,
            ),
        }
    }

    pub fn to_json(&self, request_id: &str) -> String {
        self.to_error_response(request_id)
            .to_json_pretty()
            .unwrap_or_else(|_| {
                r#"{"error":"INTERNAL_ERROR","message":"Failed to serialize error response","request_id":""}"#
                    .to_string()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REQUEST_ID: &str = "req-123";

    #[test]
    fn test_validation_errors_are_listed() {
        let error = CliError::Invalid(vec![
            ValidationError::new("system.name", "System name cannot be empty"),
            ValidationError::new("network.hostname", "must be a valid hostname"),
        ]);

        let response = error.to_error_response(REQUEST_ID);

        assert_eq!(error.exit_code(), 3);
        assert_eq!(response.error, error_codes::VALIDATION_FAILED);
        assert!(response.message.contains("system.name"));
        assert!(response.message.contains("network.hostname"));
        assert_eq!(response.request_id, REQUEST_ID);
    }

    #[test]
    fn test_device_rejection_passes_through() {
        let rejection = ErrorResponse::new("INVALID_VALUE", "Pump pin in use", "dev-7");
        let error = CliError::from(SyncError::RemoteRejected(rejection.clone()));

        assert_eq!(error.exit_code(), 5);
        assert_eq!(error.to_error_response(REQUEST_ID), rejection);
    }

    #[test]
    fn test_unreachable_device() {
        let error = CliError::from(SyncError::Network("connection refused".to_string()));

        let response = error.to_error_response(REQUEST_ID);

        assert_eq!(error.exit_code(), 4);
        assert_eq!(response.error, error_codes::DEVICE_UNREACHABLE);
    }

    #[test]
    fn test_schedule_full() {
        let error = CliError::from(ScheduleError::CapacityExceeded);
        assert_eq!(
            error.to_error_response(REQUEST_ID).error,
            error_codes::CAPACITY_EXCEEDED
        );
    }

    #[test]
    fn test_internal_error_hides_details() {
        let error = CliError::from(anyhow::anyhow!("secret detail"));

        let json = error.to_json(REQUEST_ID);

        assert!(json.contains("INTERNAL_ERROR"));
        assert!(!json.contains("secret detail"));
        assert_eq!(error.exit_code(), 1);
    }
}
