use anyhow::Context;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use growit_console::config_file;
use growit_console::{
    derive_dashboard, validate, Clock, CommitOutcome, ConfigSyncClient, DeviceSession,
    DraftConfig, HttpDeviceTransport, LiveReadings, Subsystem, SyncError, SystemClock,
    ValidationResult, WateringScheduleEditor,
};

use crate::config::ConsoleConfig;
use crate::error::CliError;

/// Connect to the controller and load its configuration. Unlike the
/// long-running session this fails when the device cannot be reached.
pub async fn open_session(config: &ConsoleConfig) -> Result<DeviceSession, CliError> {
    let transport = HttpDeviceTransport::new(&config.device_url, config.request_timeout)
        .map_err(SyncError::from)?;
    let sync = ConfigSyncClient::new(Arc::new(transport)).with_timeout(config.request_timeout);
    let session = DeviceSession::new(sync, Arc::new(SystemClock::new()));

    session.refresh().await?;
    info!(device_url = %config.device_url, "Connected to controller");
    Ok(session)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(value).context("Failed to render output")?;
    println!("{}", json);
    Ok(())
}

fn report(outcome: CommitOutcome, action: &str) {
    match outcome {
        CommitOutcome::Applied { version } => {
            println!("{} (local version {})", action, version);
        }
        CommitOutcome::Stale {
            sequence,
            applied_sequence,
        } => {
            warn!(sequence, applied_sequence, "Result arrived after a newer one");
            println!("{}, but a newer configuration was already loaded", action);
        }
    }
}

pub fn fetch(session: &DeviceSession) -> Result<(), CliError> {
    print_json(&*session.config())
}

pub fn export(session: &DeviceSession, path: &Path) -> Result<(), CliError> {
    config_file::export_to_path(&session.config(), path)?;
    println!("Configuration written to {}", path.display());
    Ok(())
}

/// Check a file without contacting the device
pub fn validate_file(path: &Path) -> Result<(), CliError> {
    let config = config_file::import_from_path(path)?;

    match validate(DraftConfig::new(config, 0)) {
        ValidationResult::Valid(_) => {
            println!("{} is a valid configuration", path.display());
            Ok(())
        }
        ValidationResult::Invalid(errors) => Err(CliError::Invalid(errors)),
    }
}

pub async fn apply_file(session: &DeviceSession, path: &Path) -> Result<(), CliError> {
    let config = config_file::import_from_path(path)?;
    let draft = session.draft_from(config);

    let outcome = session.apply(draft).await?;
    report(outcome, "Configuration saved to device");
    Ok(())
}

pub async fn reset(session: &DeviceSession, confirmed: bool) -> Result<(), CliError> {
    if !confirmed {
        return Err(CliError::Usage(
            "Resetting erases every setting on the device; pass --yes to confirm".to_string(),
        ));
    }

    let outcome = session.reset().await?;
    report(outcome, "Device reset to factory defaults");
    Ok(())
}

pub async fn control(
    session: &DeviceSession,
    subsystem: Subsystem,
    enabled: bool,
) -> Result<(), CliError> {
    session.set_subsystem(subsystem, enabled).await?;
    println!(
        "{} {}",
        subsystem,
        if enabled { "enabled" } else { "disabled" }
    );
    Ok(())
}

pub async fn water(session: &DeviceSession, amount_ml: u32) -> Result<(), CliError> {
    if amount_ml == 0 {
        return Err(CliError::Usage("Watering amount must be at least 1 ml".to_string()));
    }

    session.manual_watering(amount_ml).await?;
    println!("Watering {} ml", amount_ml);
    Ok(())
}

pub async fn fan(session: &DeviceSession, rpm: u32) -> Result<(), CliError> {
    let fan = session.config().ventilation.fan.clone();
    if rpm < fan.min_rpm || rpm > fan.max_rpm {
        return Err(CliError::Usage(format!(
            "Fan speed must be between {} and {} rpm",
            fan.min_rpm, fan.max_rpm
        )));
    }

    session.set_fan_speed(rpm).await?;
    println!("Fan set to {} rpm", rpm);
    Ok(())
}

// ============================================================================
// Watering Schedule
// ============================================================================

pub fn schedule_list(session: &DeviceSession) -> Result<(), CliError> {
    let editor = WateringScheduleEditor::from_slots(&session.config().irrigation.schedule);
    print_json(&editor.entries())
}

pub async fn schedule_add(
    session: &DeviceSession,
    time: &str,
    amount_ml: u32,
    enabled: bool,
) -> Result<(), CliError> {
    let mut draft = session.begin_edit();
    let mut editor = WateringScheduleEditor::from_slots(&draft.config().irrigation.schedule);
    let slot = editor.add_entry(time, amount_ml, enabled)?;
    draft.config_mut().irrigation.schedule = editor.to_ordered_list();

    let outcome = session.apply(draft).await?;
    report(outcome, &format!("Added watering at {} as entry {}", time, slot + 1));
    Ok(())
}

/// `entry` counts from 1 as printed by `schedule list`
pub async fn schedule_remove(session: &DeviceSession, entry: usize) -> Result<(), CliError> {
    let mut draft = session.begin_edit();
    let mut editor = WateringScheduleEditor::from_slots(&draft.config().irrigation.schedule);

    let removed = entry
        .checked_sub(1)
        .and_then(|index| editor.remove_entry(index))
        .ok_or_else(|| {
            CliError::Usage(format!(
                "No schedule entry {}, the schedule has {}",
                entry,
                editor.len()
            ))
        })?;
    draft.config_mut().irrigation.schedule = editor.to_ordered_list();

    let outcome = session.apply(draft).await?;
    report(outcome, &format!("Removed watering at {}", removed.time));
    Ok(())
}

// ============================================================================
// Monitoring
// ============================================================================

pub fn dashboard(session: &DeviceSession, readings: &LiveReadings) -> Result<(), CliError> {
    print_json(&session.dashboard(readings))
}

/// Dashboard values for a configuration file, no device involved
pub fn dashboard_offline(path: &Path, readings: &LiveReadings) -> Result<(), CliError> {
    let config = config_file::import_from_path(path)?;
    let clock = SystemClock::new();
    print_json(&derive_dashboard(&config, readings, clock.time_of_day(), None))
}

#[derive(Debug, Serialize)]
struct WatchLine {
    at: String,
    online: bool,
    version: u64,
    changed: bool,
}

/// Re-read the configuration every `interval` until interrupted
pub async fn watch(session: &DeviceSession, interval: std::time::Duration) -> Result<(), CliError> {
    let mut ticker = tokio::time::interval(interval);
    let mut last = session.config();
    info!(interval_secs = interval.as_secs(), "Watching controller");

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                info!("Stopped watching");
                return Ok(());
            }
        }

        if let Err(e) = session.refresh().await {
            warn!(error_code = e.error_code(), error = %e, "Refresh failed");
        }

        let current = session.config();
        let line = WatchLine {
            at: chrono::Utc::now().to_rfc3339(),
            online: session.is_online(),
            version: session.store().version(),
            changed: current != last,
        };
        let json = serde_json::to_string(&line).context("Failed to render output")?;
        println!("{}", json);
        last = current;
    }
}
