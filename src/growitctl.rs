#[path = "growitctl/config.rs"]
mod config;

#[path = "growitctl/error.rs"]
mod error;

#[path = "growitctl/commands.rs"]
mod commands;

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use growit_console::{IdGenerator, LiveReadings, RandomIdGenerator, Subsystem};

use crate::config::{
    ConsoleConfig, ConsoleConfigError, DEVICE_URL_VAR, POLL_INTERVAL_VAR, REQUEST_TIMEOUT_VAR,
};
use crate::error::CliError;

/// Configure and monitor a GrowIT controller
#[derive(Debug, Parser)]
#[command(name = "growitctl", version)]
struct Cli {
    /// Controller URL, overrides GROWIT_DEVICE_URL
    #[arg(long, global = true)]
    device_url: Option<String>,

    /// Seconds before a device call is abandoned, overrides GROWIT_REQUEST_TIMEOUT_SECS
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    /// Command-line values take precedence over the environment
    fn load_config(&self, poll_secs: Option<u64>) -> Result<ConsoleConfig, ConsoleConfigError> {
        if self.device_url.is_none() && self.timeout_secs.is_none() && poll_secs.is_none() {
            return ConsoleConfig::from_env();
        }

        ConsoleConfig::from_lookup(|key| {
            let flag = match key {
                DEVICE_URL_VAR => self.device_url.clone(),
                REQUEST_TIMEOUT_VAR => self.timeout_secs.map(|s| s.to_string()),
                POLL_INTERVAL_VAR => poll_secs.map(|s| s.to_string()),
                _ => None,
            };
            flag.or_else(|| std::env::var(key).ok())
        })
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the device configuration as JSON
    Fetch,

    /// Write the device configuration to a file
    Export { path: PathBuf },

    /// Check a configuration file without contacting the device
    Validate { path: PathBuf },

    /// Validate a configuration file and save it to the device
    Apply { path: PathBuf },

    /// Restore factory settings on the device
    Reset {
        #[arg(long)]
        yes: bool,
    },

    /// Switch a subsystem on or off
    Control { subsystem: Subsystem, state: Switch },

    /// Run the pump once
    Water { amount_ml: u32 },

    /// Set the fan speed by hand
    Fan { rpm: u32 },

    /// View or edit the watering schedule
    Schedule {
        #[command(subcommand)]
        action: ScheduleAction,
    },

    /// Show derived control values for the given readings
    Dashboard {
        #[command(flatten)]
        readings: ReadingArgs,

        /// Use a configuration file instead of the device
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Poll the device and report configuration changes
    Watch {
        /// Overrides GROWIT_POLL_INTERVAL_SECS
        #[arg(long)]
        interval_secs: Option<u64>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Switch {
    On,
    Off,
}

#[derive(Debug, Subcommand)]
enum ScheduleAction {
    /// List used schedule entries, numbered from 1
    List,

    /// Add an entry
    Add {
        /// HH:MM
        time: String,
        amount_ml: u32,
        #[arg(long)]
        disabled: bool,
    },

    /// Remove an entry by its number
    Remove { entry: usize },
}

#[derive(Debug, Args)]
struct ReadingArgs {
    /// Air temperature in °C
    #[arg(long)]
    temperature: Option<f64>,
    /// Relative humidity in %
    #[arg(long)]
    humidity: Option<f64>,
    /// Soil moisture in %
    #[arg(long)]
    soil_moisture: Option<f64>,
    #[arg(long)]
    ph: Option<f64>,
    /// Light intensity in %
    #[arg(long)]
    light: Option<f64>,
    /// Water level in liters
    #[arg(long)]
    water_level: Option<f64>,
}

impl From<&ReadingArgs> for LiveReadings {
    fn from(args: &ReadingArgs) -> Self {
        LiveReadings {
            temperature_c: args.temperature,
            humidity_pct: args.humidity,
            soil_moisture_pct: args.soil_moisture,
            ph: args.ph,
            light_intensity_pct: args.light,
            water_level_liters: args.water_level,
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    // Commands that work on files alone
    match &cli.command {
        Command::Validate { path } => return commands::validate_file(path),
        Command::Dashboard {
            readings,
            config: Some(path),
        } => return commands::dashboard_offline(path, &readings.into()),
        _ => {}
    }

    let poll_secs = match &cli.command {
        Command::Watch { interval_secs } => *interval_secs,
        _ => None,
    };
    let config = cli.load_config(poll_secs)?;
    let session = commands::open_session(&config).await?;

    match cli.command {
        Command::Fetch => commands::fetch(&session),
        Command::Export { path } => commands::export(&session, &path),
        Command::Apply { path } => commands::apply_file(&session, &path).await,
        Command::Reset { yes } => commands::reset(&session, yes).await,
        Command::Control { subsystem, state } => {
            commands::control(&session, subsystem, matches!(state, Switch::On)).await
        }
        Command::Water { amount_ml } => commands::water(&session, amount_ml).await,
        Command::Fan { rpm } => commands::fan(&session, rpm).await,
        Command::Schedule { action } => match action {
            ScheduleAction::List => commands::schedule_list(&session),
            ScheduleAction::Add {
                time,
                amount_ml,
                disabled,
            } => commands::schedule_add(&session, &time, amount_ml, !disabled).await,
            ScheduleAction::Remove { entry } => commands::schedule_remove(&session, entry).await,
        },
        Command::Dashboard { readings, .. } => commands::dashboard(&session, &(&readings).into()),
        Command::Watch { .. } => commands::watch(&session, config.poll_interval).await,
        // Handled above
        Command::Validate { .. } => Ok(()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        let request_id = RandomIdGenerator::new().request_id();
        tracing::error!(request_id = %request_id, error = %e, "Command failed");
        eprintln!("{}", e.to_json(&request_id));
        std::process::exit(e.exit_code());
    }

    Ok(())
}
