//! Error types for building the device services.

use crate::config::ConfigError;

/// Errors raised while setting up a device.
///
/// Protocol operations never return this; they answer with
/// [`autus_sync_types::SyncError`].
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A host-supplied device id was rejected.
    #[error("invalid device id: {0:?}")]
    InvalidDeviceId(String),
}
