//! Configuration loading for sync-device.
//!
//! Configuration is loaded from a TOML file (default: `autus.toml`). Every
//! section and field is optional.

use autus_sync_core::MAX_PAIRING_TTL;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration for the sync services.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Device identity configuration.
    #[serde(default)]
    pub device: DeviceConfig,
    /// QR pairing configuration.
    #[serde(default)]
    pub pairing: PairingConfig,
    /// LAN discovery configuration.
    #[serde(default)]
    pub discovery: DiscoveryConfig,
}

/// Device identity configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeviceConfig {
    /// Fixed device id (optional, a random one is generated if missing).
    pub device_id: Option<String>,
}

/// QR pairing configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PairingConfig {
    /// Default session TTL in seconds (default: 300).
    #[serde(default = "default_ttl_secs")]
    pub default_ttl_secs: u64,
    /// Expiry sweep interval in seconds (default: 60).
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
    /// Enable the expiry sweep task (default: true).
    #[serde(default = "default_sweep_enabled")]
    pub sweep_enabled: bool,
}

/// LAN discovery configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DiscoveryConfig {
    /// Address the routing probe connects to (default: 10.254.254.254:1).
    /// No datagram is ever sent to it.
    #[serde(default = "default_probe_target")]
    pub probe_target: String,
    /// Probe timeout in milliseconds (default: 500, must be below 1000).
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,
}

// Default value functions
fn default_ttl_secs() -> u64 {
    300 // 5 minutes
}

fn default_sweep_interval() -> u64 {
    60
}

fn default_sweep_enabled() -> bool {
    true
}

fn default_probe_target() -> String {
    "10.254.254.254:1".to_string()
}

fn default_probe_timeout_ms() -> u64 {
    500
}

impl Default for PairingConfig {
    fn default() -> Self {
        Self {
            default_ttl_secs: default_ttl_secs(),
            sweep_interval_secs: default_sweep_interval(),
            sweep_enabled: default_sweep_enabled(),
        }
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            probe_target: default_probe_target(),
            probe_timeout_ms: default_probe_timeout_ms(),
        }
    }
}

impl PairingConfig {
    /// Default session TTL.
    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl_secs)
    }

    /// Expiry sweep interval.
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

impl DiscoveryConfig {
    /// Probe timeout.
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    /// Parsed probe target.
    pub fn probe_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.probe_target
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                field: "discovery.probe_target",
                reason: e.to_string(),
            })
    }
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Check value ranges that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ttl = self.pairing.default_ttl_secs;
        if ttl == 0 || ttl > MAX_PAIRING_TTL.as_secs() {
            return Err(ConfigError::Invalid {
                field: "pairing.default_ttl_secs",
                reason: format!("must be between 1 and {}", MAX_PAIRING_TTL.as_secs()),
            });
        }

        if self.pairing.sweep_interval_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "pairing.sweep_interval_secs",
                reason: "must be positive".into(),
            });
        }

        if !(1..1000).contains(&self.discovery.probe_timeout_ms) {
            return Err(ConfigError::Invalid {
                field: "discovery.probe_timeout_ms",
                reason: "must be between 1 and 999".into(),
            });
        }

        self.discovery.probe_addr()?;

        if let Some(id) = &self.device.device_id {
            if autus_sync_types::DeviceId::parse(id).is_none() {
                return Err(ConfigError::Invalid {
                    field: "device.device_id",
                    reason: format!(
                        "must be at least {} characters",
                        autus_sync_types::DeviceId::MIN_LEN
                    ),
                });
            }
        }

        Ok(())
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Failed to parse configuration file.
    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying TOML parse error.
        source: toml::de::Error,
    },
    /// A value is out of range.
    #[error("invalid {field}: {reason}")]
    Invalid {
        /// Dotted name of the offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}
