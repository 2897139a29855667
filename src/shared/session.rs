use chrono::NaiveTime;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::derive::{derive_dashboard, fan_schedule_changed_since, DashboardValues};
use crate::device_status::{apply_link_event, LinkEvent, LinkStatus};
use crate::domain::Configuration;
use crate::error::error_codes;
use crate::sensor_validation::LiveReadings;
use crate::store::{CommitOutcome, ConfigStore, DraftConfig};
use crate::sync::{ConfigSyncClient, SyncError};
use crate::time::Clock;
use crate::transport::{DeviceTransport, Subsystem};
use crate::validators::{validate, ValidationError, ValidationResult};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum SessionError {
    #[error("Configuration is invalid ({} problem(s))", .0.len())]
    Invalid(Vec<ValidationError>),

    #[error(transparent)]
    Sync(#[from] SyncError),
}

impl SessionError {
    pub fn error_code(&self) -> &'static str {
        match self {
            SessionError::Invalid(_) => error_codes::VALIDATION_FAILED,
            SessionError::Sync(e) => e.error_code(),
        }
    }
}

/// One console connected to one controller.
///
/// Owns the configuration store and routes every device call through the
/// sync client, committing results to the store in sequence order.
pub struct DeviceSession {
    sync: ConfigSyncClient,
    store: Arc<ConfigStore>,
    clock: Arc<dyn Clock>,
    link: Mutex<LinkStatus>,
    fan_override: Mutex<Option<FanOverride>>,
}

/// A fan speed set by hand and when it was set
#[derive(Debug, Clone, Copy)]
struct FanOverride {
    rpm: u32,
    set_at: NaiveTime,
    set_at_ms: i64,
}

impl DeviceSession {
    /// Connect and load the device configuration.
    ///
    /// An unreachable device is not fatal: the session starts from factory
    /// defaults and reports itself offline until a call succeeds.
    pub async fn connect(transport: Arc<dyn DeviceTransport>, clock: Arc<dyn Clock>) -> Self {
        Self::connect_with(ConfigSyncClient::new(transport), clock).await
    }

    pub async fn connect_with(sync: ConfigSyncClient, clock: Arc<dyn Clock>) -> Self {
        let session = Self::new(sync, clock);
        match session.refresh().await {
            Ok(_) => info!("Connected to controller"),
            Err(e) => warn!(
                error_code = e.error_code(),
                error = %e,
                "Controller unreachable, starting from factory defaults"
            ),
        }
        session
    }

    /// Session holding factory defaults that has not talked to the device yet
    pub fn new(sync: ConfigSyncClient, clock: Arc<dyn Clock>) -> Self {
        Self {
            sync,
            store: Arc::new(ConfigStore::new(Configuration::factory())),
            clock,
            link: Mutex::new(LinkStatus::default()),
            fan_override: Mutex::new(None),
        }
    }

    fn link(&self) -> MutexGuard<'_, LinkStatus> {
        self.link.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record<T>(&self, result: &Result<T, SyncError>) {
        let now_ms = self.clock.now_epoch_millis();
        let event = match result {
            Ok(_) => LinkEvent::Success,
            // A superseded or refused call still means the link is up
            Err(SyncError::Superseded { .. } | SyncError::Busy) => return,
            Err(SyncError::RemoteRejected(_)) => LinkEvent::Success,
            Err(e) => LinkEvent::Failure {
                code: e.error_code().to_string(),
                message: e.to_string(),
            },
        };
        apply_link_event(&mut self.link(), event, now_ms);
    }

    pub fn store(&self) -> &Arc<ConfigStore> {
        &self.store
    }

    /// Current configuration snapshot
    pub fn config(&self) -> Arc<Configuration> {
        self.store.get()
    }

    pub fn begin_edit(&self) -> DraftConfig {
        self.store.begin_edit()
    }

    /// Wrap an externally loaded document (e.g. an imported file) as a draft
    pub fn draft_from(&self, config: Configuration) -> DraftConfig {
        self.store.mark_modified();
        DraftConfig::new(config, self.store.version())
    }

    /// Re-read the configuration from the device
    pub async fn refresh(&self) -> Result<CommitOutcome, SessionError> {
        let result = self.sync.fetch().await;
        self.record(&result);
        Ok(self.store.commit(result?))
    }

    /// Validate, save and commit a draft. Nothing is sent if validation fails.
    pub async fn apply(&self, draft: DraftConfig) -> Result<CommitOutcome, SessionError> {
        if draft.base_version() != self.store.version() {
            warn!(
                base_version = draft.base_version(),
                version = self.store.version(),
                "Applying draft taken from an older configuration"
            );
        }

        let validated = match validate(draft) {
            ValidationResult::Valid(validated) => validated,
            ValidationResult::Invalid(errors) => {
                for error in &errors {
                    debug!(field = %error.field, message = %error.message, "Validation failed");
                }
                return Err(SessionError::Invalid(errors));
            }
        };

        let result = self.sync.save(validated).await;
        self.record(&result);
        Ok(self.store.commit(result?))
    }

    /// Restore factory settings on the device and adopt them
    pub async fn reset(&self) -> Result<CommitOutcome, SessionError> {
        let result = self.sync.reset_to_defaults().await;
        self.record(&result);
        Ok(self.store.commit(result?))
    }

    pub async fn set_subsystem(
        &self,
        subsystem: Subsystem,
        enabled: bool,
    ) -> Result<(), SessionError> {
        let result = self.sync.set_subsystem(subsystem, enabled).await;
        self.record(&result);
        Ok(result?)
    }

    pub async fn manual_watering(&self, amount_ml: u32) -> Result<(), SessionError> {
        let result = self.sync.manual_watering(amount_ml).await;
        self.record(&result);
        Ok(result?)
    }

    fn fan_override_slot(&self) -> MutexGuard<'_, Option<FanOverride>> {
        self.fan_override
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Set the fan speed by hand. The dashboard shows manual mode until the
    /// fan schedule reaches its next entry or the override is cleared.
    pub async fn set_fan_speed(&self, rpm: u32) -> Result<(), SessionError> {
        let result = self.sync.set_fan_speed(rpm).await;
        self.record(&result);
        result?;
        *self.fan_override_slot() = Some(FanOverride {
            rpm,
            set_at: self.clock.time_of_day(),
            set_at_ms: self.clock.now_epoch_millis(),
        });
        Ok(())
    }

    pub fn clear_fan_override(&self) {
        *self.fan_override_slot() = None;
    }

    /// Manual fan speed still in force, if any
    pub fn fan_override(&self) -> Option<u32> {
        let mut slot = self.fan_override_slot();
        let current = (*slot)?;

        let elapsed_minutes = (self.clock.now_epoch_millis() - current.set_at_ms) / 60_000;
        let config = self.config();
        let schedule = &config.ventilation.schedule_control;
        if fan_schedule_changed_since(current.set_at, elapsed_minutes, schedule) {
            debug!(rpm = current.rpm, "Fan schedule took over from manual speed");
            *slot = None;
            return None;
        }
        Some(current.rpm)
    }

    /// Dashboard values for the current configuration and the given readings
    pub fn dashboard(&self, readings: &LiveReadings) -> DashboardValues {
        derive_dashboard(
            &self.config(),
            readings,
            self.clock.time_of_day(),
            self.fan_override(),
        )
    }

    pub fn link_status(&self) -> LinkStatus {
        self.link().clone()
    }

    pub fn is_online(&self) -> bool {
        self.link().is_online(self.clock.now_epoch_millis())
    }
}
