use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::Semaphore;
use tracing::debug;

use super::{DeviceTransport, Subsystem, TransportError};
use crate::derive::water_after_manual_watering;
use crate::domain::Configuration;
use crate::error::ErrorResponse;
use crate::validators::check_configuration;

/// Actuator side effects recorded by the fake controller
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActuatorState {
    /// Manual watering amounts in call order
    pub manual_waterings: Vec<u32>,
    /// Last speed set through the manual fan endpoint
    pub fan_rpm_override: Option<u32>,
    /// Subsystem switches in call order
    pub switches: Vec<(Subsystem, bool)>,
}

impl ActuatorState {
    /// Last switch position sent for `subsystem`, if any
    pub fn switch_state(&self, subsystem: Subsystem) -> Option<bool> {
        self.switches
            .iter()
            .rev()
            .find(|(switched, _)| *switched == subsystem)
            .map(|(_, enabled)| *enabled)
    }
}

#[derive(Debug)]
struct DeviceState {
    config: Configuration,
    actuators: ActuatorState,
    queued_failures: VecDeque<TransportError>,
    offline: bool,
    requests: u64,
}

/// Holds requests of one kind until the test lets them through
#[derive(Debug)]
struct Gate {
    closed: AtomicBool,
    permits: Semaphore,
    waiting: AtomicUsize,
}

impl Gate {
    fn new() -> Self {
        Self {
            closed: AtomicBool::new(false),
            permits: Semaphore::new(0),
            waiting: AtomicUsize::new(0),
        }
    }

    async fn pass(&self) {
        if !self.closed.load(Ordering::SeqCst) {
            return;
        }
        self.waiting.fetch_add(1, Ordering::SeqCst);
        if let Ok(permit) = self.permits.acquire().await {
            permit.forget();
        }
        self.waiting.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Deterministic stand-in for a controller.
///
/// Keeps a device-side configuration, rejects pushed documents that fail
/// validation the way the firmware does, and can fail or hold requests on
/// demand so tests can reorder responses.
#[derive(Debug)]
pub struct InMemoryDeviceTransport {
    state: Mutex<DeviceState>,
    fetch_gate: Gate,
    save_gate: Gate,
    reset_gate: Gate,
}

impl InMemoryDeviceTransport {
    pub fn new(config: Configuration) -> Self {
        Self {
            state: Mutex::new(DeviceState {
                config,
                actuators: ActuatorState::default(),
                queued_failures: VecDeque::new(),
                offline: false,
                requests: 0,
            }),
            fetch_gate: Gate::new(),
            save_gate: Gate::new(),
            reset_gate: Gate::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, DeviceState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Device-side configuration as currently stored
    pub fn device_config(&self) -> Configuration {
        self.lock().config.clone()
    }

    /// Overwrite the device-side configuration, as another client would
    pub fn set_device_config(&self, config: Configuration) {
        self.lock().config = config;
    }

    pub fn actuators(&self) -> ActuatorState {
        self.lock().actuators.clone()
    }

    /// Requests received so far, failed ones included
    pub fn request_count(&self) -> u64 {
        self.lock().requests
    }

    /// Make the next request fail with `error`. Queued failures are used in order.
    pub fn fail_next(&self, error: TransportError) {
        self.lock().queued_failures.push_back(error);
    }

    /// While offline every request fails with a network error
    pub fn set_offline(&self, offline: bool) {
        self.lock().offline = offline;
    }

    /// Hold every following `get_config` until released
    pub fn hold_fetches(&self) {
        self.fetch_gate.closed.store(true, Ordering::SeqCst);
    }

    /// Let `count` held fetches complete
    pub fn release_fetches(&self, count: usize) {
        self.fetch_gate.permits.add_permits(count);
    }

    pub fn pending_fetches(&self) -> usize {
        self.fetch_gate.waiting.load(Ordering::SeqCst)
    }

    /// Hold every following `post_config` until released
    pub fn hold_saves(&self) {
        self.save_gate.closed.store(true, Ordering::SeqCst);
    }

    pub fn release_saves(&self, count: usize) {
        self.save_gate.permits.add_permits(count);
    }

    pub fn pending_saves(&self) -> usize {
        self.save_gate.waiting.load(Ordering::SeqCst)
    }

    /// Hold every following `reset_config` until released
    pub fn hold_resets(&self) {
        self.reset_gate.closed.store(true, Ordering::SeqCst);
    }

    pub fn release_resets(&self, count: usize) {
        self.reset_gate.permits.add_permits(count);
    }

    pub fn pending_resets(&self) -> usize {
        self.reset_gate.waiting.load(Ordering::SeqCst)
    }

    /// Count the request and apply injected failures
    fn admit(&self, route: &str) -> Result<(), TransportError> {
        let mut state = self.lock();
        state.requests += 1;
        debug!(route, request = state.requests, "In-memory device request");

        if let Some(error) = state.queued_failures.pop_front() {
            return Err(error);
        }
        if state.offline {
            return Err(TransportError::Network("device offline".to_string()));
        }
        Ok(())
    }

    fn request_id(&self) -> String {
        format!("mem-{}", self.lock().requests)
    }
}

impl Default for InMemoryDeviceTransport {
    fn default() -> Self {
        Self::new(Configuration::factory())
    }
}

#[async_trait]
impl DeviceTransport for InMemoryDeviceTransport {
    async fn get_config(&self) -> Result<Configuration, TransportError> {
        self.admit("GET /api/config")?;
        // Read now, answer later: a held fetch returns what the device had when it was asked
        let snapshot = self.device_config();
        self.fetch_gate.pass().await;
        Ok(snapshot)
    }

    async fn post_config(&self, config: &Configuration) -> Result<(), TransportError> {
        self.admit("POST /api/config")?;
        self.save_gate.pass().await;

        let errors = check_configuration(config);
        if !errors.is_empty() {
            return Err(TransportError::Rejected(
                ErrorResponse::from_validation_errors(&errors, self.request_id()),
            ));
        }

        self.lock().config = config.clone();
        Ok(())
    }

    async fn reset_config(&self) -> Result<Configuration, TransportError> {
        self.admit("POST /api/config/reset")?;
        self.reset_gate.pass().await;
        let factory = Configuration::factory();
        self.lock().config = factory.clone();
        Ok(factory)
    }

    async fn set_subsystem(
        &self,
        subsystem: Subsystem,
        enabled: bool,
    ) -> Result<(), TransportError> {
        self.admit("POST /api/control")?;
        // Actuator toggle only; the stored configuration keeps its own flag
        self.lock().actuators.switches.push((subsystem, enabled));
        Ok(())
    }

    async fn manual_watering(&self, amount_ml: u32) -> Result<(), TransportError> {
        self.admit("POST /api/irrigation/manual")?;
        let mut state = self.lock();
        let storage = &mut state.config.irrigation.water_storage;
        storage.current_level_liters =
            water_after_manual_watering(storage.current_level_liters, amount_ml);
        storage.level_estimation.total_water_pumped_ml += u64::from(amount_ml);
        state.actuators.manual_waterings.push(amount_ml);
        Ok(())
    }

    async fn set_fan_speed(&self, rpm: u32) -> Result<(), TransportError> {
        self.admit("POST /api/ventilation/speed")?;
        self.lock().actuators.fan_rpm_override = Some(rpm);
        Ok(())
    }
}
