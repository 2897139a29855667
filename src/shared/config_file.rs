//! Configuration documents on disk.
//!
//! Exports are the same JSON the controller serves, pretty-printed. An
//! imported file is only decoded here; it becomes a draft and goes through
//! validation like any other edit.

use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::info;

use crate::domain::Configuration;

#[derive(Debug, Error)]
pub enum ConfigFileError {
    #[error("File error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Not a configuration document: {0}")]
    Decode(#[from] serde_json::Error),
}

pub fn to_json(config: &Configuration) -> Result<String, ConfigFileError> {
    Ok(serde_json::to_string_pretty(config)?)
}

/// Missing sections and fields take their factory values
pub fn from_json(json: &str) -> Result<Configuration, ConfigFileError> {
    Ok(serde_json::from_str(json)?)
}

pub fn export_to_path(config: &Configuration, path: &Path) -> Result<(), ConfigFileError> {
    let json = to_json(config)?;
    fs::write(path, json)?;
    info!(path = %path.display(), "Configuration exported");
    Ok(())
}

pub fn import_from_path(path: &Path) -> Result<Configuration, ConfigFileError> {
    let json = fs::read_to_string(path)?;
    let config = from_json(&json)?;
    info!(path = %path.display(), "Configuration imported");
    Ok(config)
}
