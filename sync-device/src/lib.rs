//! # sync-device
//!
//! Per-device sync services for Autus.
//!
//! This crate wires the pure logic of `sync-core` into shared, concurrent
//! state owned by one device:
//!
//! - [`SyncCore`]: the device id and packet envelopes
//! - [`QrSync`]: pairing sessions exchanged as scannable tokens
//! - [`LanSync`]: the peer table for devices on the same network
//!
//! ## Example
//!
//! ```rust,no_run
//! use autus_sync_device::{Config, DeviceServices};
//! use serde_json::json;
//!
//! let services = DeviceServices::from_config(&Config::default())?;
//! let data = json!({"note": "abc"}).as_object().cloned().unwrap_or_default();
//!
//! // Show this on screen as a QR code.
//! let token = services.qr.generate_qr_string(data);
//! println!("{token}");
//! # Ok::<(), autus_sync_device::DeviceError>(())
//! ```
//!
//! Nothing is persisted: sessions and peers live as long as the services do.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cleanup;
pub mod config;
pub mod engine;
pub mod error;
pub mod lan;
pub mod net;
pub mod qr;
pub mod services;

pub use cleanup::spawn_expiry_sweep;
pub use config::{Config, ConfigError, DeviceConfig, DiscoveryConfig, PairingConfig};
pub use engine::SyncCore;
pub use error::DeviceError;
pub use lan::{LanSync, PeerDevice, SyncRequest};
pub use net::{probe_local_address, LocalAddress};
pub use qr::QrSync;
pub use services::DeviceServices;
