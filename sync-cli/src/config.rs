//! Configuration loading for the CLI.

use anyhow::{Context, Result};
use autus_sync_device::{Config, DeviceServices};
use std::path::Path;

/// Load `path`, or the defaults when no path is given.
pub fn load(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => {
            let config = Config::from_file(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?;
            tracing::debug!(path = %path.display(), "Loaded configuration");
            Ok(config)
        }
        None => {
            tracing::debug!("No config file given, using defaults");
            Ok(Config::default())
        }
    }
}

/// Build this process's device services.
pub fn services(config: &Config) -> Result<DeviceServices> {
    DeviceServices::from_config(config).context("Failed to set up device services")
}
