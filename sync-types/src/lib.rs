//! # sync-types
//!
//! Wire format types for Autus device-to-device sync.
//!
//! This crate provides the foundational types used across all Autus sync crates:
//! - [`DeviceId`], [`SyncId`] - Identity types
//! - [`SyncData`], [`checksum`], [`content_hash`] - The synced key-value map and
//!   its canonical digests
//! - [`SyncPacket`] - Integrity-checked envelope around a data map
//! - [`SyncError`] - The `invalid` / `expired` / `not_found` taxonomy
//! - [`format_timestamp`], [`parse_timestamp`] - Naive UTC ISO-8601 wire timestamps

#![warn(missing_docs)]
#![warn(clippy::all)]

mod canonical;
mod envelope;
mod error;
mod ids;
mod time;

pub use canonical::{canonical_json, checksum, content_hash, to_wire_json, SyncData};
pub use envelope::{verify_packet, SyncPacket, PACKET_VERSION};
pub use error::SyncError;
pub use ids::{DeviceId, SyncId};
pub use time::{format_timestamp, parse_timestamp};
