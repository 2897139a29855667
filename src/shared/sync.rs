use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domain::Configuration;
use crate::error::{error_codes, ErrorResponse};
use crate::store::Stamped;
use crate::transport::{DeviceTransport, Subsystem, TransportError};
use crate::validators::ValidatedDraft;

/// Default bound on any single device call
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Error, PartialEq)]
pub enum SyncError {
    #[error("Device unreachable: {0}")]
    Network(String),

    #[error("Malformed device response: {0}")]
    Decode(String),

    #[error("Device rejected the configuration: {0}")]
    RemoteRejected(ErrorResponse),

    #[error("Another save is still in progress")]
    Busy,

    /// A newer request of the same kind was issued; drop this result
    #[error("{kind} #{sequence} superseded by #{latest}")]
    Superseded {
        kind: OperationKind,
        sequence: u64,
        latest: u64,
    },
}

impl SyncError {
    /// Stable code for logs and machine-readable output
    pub fn error_code(&self) -> &'static str {
        match self {
            SyncError::Network(_) => error_codes::DEVICE_UNREACHABLE,
            SyncError::Decode(_) => error_codes::INVALID_RESPONSE,
            SyncError::RemoteRejected(_) => error_codes::DEVICE_REJECTED,
            SyncError::Busy => error_codes::SAVE_IN_PROGRESS,
            SyncError::Superseded { .. } => error_codes::SUPERSEDED,
        }
    }
}

impl From<TransportError> for SyncError {
    fn from(error: TransportError) -> Self {
        match error {
            TransportError::Network(message) => SyncError::Network(message),
            TransportError::Decode(message) => SyncError::Decode(message),
            TransportError::Rejected(response) => SyncError::RemoteRejected(response),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Fetch,
    Save,
    Reset,
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            OperationKind::Fetch => "fetch",
            OperationKind::Save => "save",
            OperationKind::Reset => "reset",
        })
    }
}

/// Moves configuration documents between the console and the device.
///
/// Every fetch, save and reset gets a sequence number from one counter when
/// it is issued; results come back stamped with it so the store can ignore
/// anything older than what it already holds. Only one save may be in
/// flight. A fetch or reset that completes after a newer one of the same
/// kind was issued reports [`SyncError::Superseded`].
pub struct ConfigSyncClient {
    transport: Arc<dyn DeviceTransport>,
    timeout: Duration,
    next_sequence: AtomicU64,
    latest_fetch: AtomicU64,
    latest_reset: AtomicU64,
    save_slot: tokio::sync::Mutex<()>,
}

impl ConfigSyncClient {
    pub fn new(transport: Arc<dyn DeviceTransport>) -> Self {
        Self {
            transport,
            timeout: DEFAULT_REQUEST_TIMEOUT,
            next_sequence: AtomicU64::new(0),
            latest_fetch: AtomicU64::new(0),
            latest_reset: AtomicU64::new(0),
            save_slot: tokio::sync::Mutex::new(()),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sequence of the most recently issued request, 0 before the first
    pub fn last_issued(&self) -> u64 {
        self.next_sequence.load(Ordering::SeqCst)
    }

    fn issue(&self, kind: OperationKind) -> u64 {
        let sequence = self.next_sequence.fetch_add(1, Ordering::SeqCst) + 1;
        match kind {
            OperationKind::Fetch => {
                self.latest_fetch.fetch_max(sequence, Ordering::SeqCst);
            }
            OperationKind::Reset => {
                self.latest_reset.fetch_max(sequence, Ordering::SeqCst);
            }
            OperationKind::Save => {}
        }
        sequence
    }

    fn ensure_latest(&self, kind: OperationKind, sequence: u64) -> Result<(), SyncError> {
        let latest = match kind {
            OperationKind::Fetch => self.latest_fetch.load(Ordering::SeqCst),
            OperationKind::Reset => self.latest_reset.load(Ordering::SeqCst),
            OperationKind::Save => sequence,
        };

        if latest > sequence {
            debug!(%kind, sequence, latest, "Dropping superseded result");
            return Err(SyncError::Superseded {
                kind,
                sequence,
                latest,
            });
        }
        Ok(())
    }

    /// Run a transport call under the request timeout
    async fn call<T>(
        &self,
        kind: &str,
        sequence: u64,
        future: impl std::future::Future<Output = Result<T, TransportError>>,
    ) -> Result<T, SyncError> {
        let result = match tokio::time::timeout(self.timeout, future).await {
            Ok(result) => result.map_err(SyncError::from),
            Err(_) => Err(SyncError::Network(format!(
                "no response within {}s",
                self.timeout.as_secs_f64()
            ))),
        };

        if let Err(e) = &result {
            warn!(kind, sequence, error_code = e.error_code(), error = %e, "Device call failed");
        }
        result
    }

    /// Read the configuration from the device
    pub async fn fetch(&self) -> Result<Stamped<Configuration>, SyncError> {
        let sequence = self.issue(OperationKind::Fetch);
        debug!(sequence, kind = "fetch", "Fetching configuration");

        let config = self
            .call("fetch", sequence, self.transport.get_config())
            .await?;
        self.ensure_latest(OperationKind::Fetch, sequence)?;

        info!(sequence, kind = "fetch", "Configuration fetched");
        Ok(Stamped::new(sequence, config))
    }

    /// Push a validated draft; on success the stamped draft is what the device now holds
    pub async fn save(&self, draft: ValidatedDraft) -> Result<Stamped<Configuration>, SyncError> {
        let _slot = self.save_slot.try_lock().map_err(|_| {
            warn!(kind = "save", "Save refused, another save is in flight");
            SyncError::Busy
        })?;

        let sequence = self.issue(OperationKind::Save);
        debug!(
            sequence,
            kind = "save",
            base_version = draft.base_version(),
            "Saving configuration"
        );

        self.call("save", sequence, self.transport.post_config(draft.config()))
            .await?;

        info!(sequence, kind = "save", "Configuration saved");
        Ok(Stamped::new(sequence, draft.into_config()))
    }

    /// Restore factory settings on the device
    pub async fn reset_to_defaults(&self) -> Result<Stamped<Configuration>, SyncError> {
        let sequence = self.issue(OperationKind::Reset);
        debug!(sequence, kind = "reset", "Resetting configuration");

        let config = self
            .call("reset", sequence, self.transport.reset_config())
            .await?;
        self.ensure_latest(OperationKind::Reset, sequence)?;

        info!(sequence, kind = "reset", "Configuration reset to factory defaults");
        Ok(Stamped::new(sequence, config))
    }

    pub async fn set_subsystem(
        &self,
        subsystem: Subsystem,
        enabled: bool,
    ) -> Result<(), SyncError> {
        self.call(
            "control",
            0,
            self.transport.set_subsystem(subsystem, enabled),
        )
        .await?;
        info!(%subsystem, enabled, "Subsystem switched");
        Ok(())
    }

    pub async fn manual_watering(&self, amount_ml: u32) -> Result<(), SyncError> {
        self.call("water", 0, self.transport.manual_watering(amount_ml))
            .await?;
        info!(amount_ml, "Manual watering started");
        Ok(())
    }

    pub async fn set_fan_speed(&self, rpm: u32) -> Result<(), SyncError> {
        self.call("fan", 0, self.transport.set_fan_speed(rpm))
            .await?;
        info!(rpm, "Fan speed set");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::DraftConfig;
    use crate::transport::InMemoryDeviceTransport;
    use crate::validators::validate;

    fn client_with(transport: &Arc<InMemoryDeviceTransport>) -> ConfigSyncClient {
        ConfigSyncClient::new(Arc::clone(transport) as Arc<dyn DeviceTransport>)
    }

    fn validated(config: Configuration) -> ValidatedDraft {
        validate(DraftConfig::new(config, 0)).into_result().unwrap()
    }

    #[tokio::test]
    async fn test_sequences_increase_across_kinds() {
        let transport = Arc::new(InMemoryDeviceTransport::default());
        let client = client_with(&transport);

        let fetched = client.fetch().await.unwrap();
        let saved = client.save(validated(Configuration::factory())).await.unwrap();
        let reset = client.reset_to_defaults().await.unwrap();

        assert_eq!(fetched.sequence, 1);
        assert_eq!(saved.sequence, 2);
        assert_eq!(reset.sequence, 3);
        assert_eq!(client.last_issued(), 3);
    }

    #[tokio::test]
    async fn test_transport_errors_map_to_sync_errors() {
        let transport = Arc::new(InMemoryDeviceTransport::default());
        let client = client_with(&transport);

        transport.fail_next(TransportError::Network("refused".into()));
        assert_eq!(
            client.fetch().await,
            Err(SyncError::Network("refused".into()))
        );

        transport.fail_next(TransportError::Decode("eof".into()));
        assert_eq!(
            client.reset_to_defaults().await,
            Err(SyncError::Decode("eof".into()))
        );

        let rejection = ErrorResponse::new("INVALID_VALUE", "nope", "req-1");
        transport.fail_next(TransportError::Rejected(rejection.clone()));
        assert_eq!(
            client.save(validated(Configuration::factory())).await,
            Err(SyncError::RemoteRejected(rejection))
        );
    }

    #[tokio::test]
    async fn test_save_releases_slot_after_failure() {
        let transport = Arc::new(InMemoryDeviceTransport::default());
        let client = client_with(&transport);

        transport.fail_next(TransportError::Network("refused".into()));
        assert!(client.save(validated(Configuration::factory())).await.is_err());

        assert!(client.save(validated(Configuration::factory())).await.is_ok());
    }

    #[tokio::test]
    async fn test_timeout_is_network_error() {
        let transport = Arc::new(InMemoryDeviceTransport::default());
        transport.hold_fetches();
        let client = client_with(&transport).with_timeout(Duration::from_millis(20));

        let result = client.fetch().await;

        assert!(matches!(result, Err(SyncError::Network(_))));
    }

    #[tokio::test]
    async fn test_control_calls_reach_device() {
        let transport = Arc::new(InMemoryDeviceTransport::default());
        let client = client_with(&transport);

        client
            .set_subsystem(Subsystem::Irrigation, false)
            .await
            .unwrap();
        client.manual_watering(150).await.unwrap();
        client.set_fan_speed(1800).await.unwrap();

        let actuators = transport.actuators();
        assert_eq!(actuators.manual_waterings, vec![150]);
        assert_eq!(actuators.fan_rpm_override, Some(1800));
        // Control calls do not consume sequence numbers
        assert_eq!(client.last_issued(), 0);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(SyncError::Busy.error_code(), error_codes::SAVE_IN_PROGRESS);
        assert_eq!(
            SyncError::Superseded {
                kind: OperationKind::Fetch,
                sequence: 1,
                latest: 2
            }
            .to_string(),
            "fetch #1 superseded by #2"
        );
    }
}
