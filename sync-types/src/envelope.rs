//! SyncPacket - the integrity-checked envelope around a data map.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{content_hash, format_timestamp, DeviceId, SyncData};

/// Envelope format version.
pub const PACKET_VERSION: &str = "1.0";

/// A data map stamped with its sender and a content hash.
///
/// Packets are ephemeral and never stored.
/// The hash covers `data` only; `device` and `timestamp` are informational.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncPacket {
    /// Envelope format version (currently "1.0").
    #[serde(default = "default_version")]
    pub version: String,
    /// Sender's device id.
    pub device: String,
    /// When the packet was built (naive UTC ISO-8601), informational only.
    #[serde(default)]
    pub timestamp: String,
    /// The wrapped payload.
    pub data: SyncData,
    /// SHA-256 over the canonical serialization of `data`.
    pub hash: String,
}

fn default_version() -> String {
    PACKET_VERSION.to_string()
}

impl SyncPacket {
    /// Wrap a data map for sending.
    pub fn new(device: &DeviceId, data: SyncData, now: NaiveDateTime) -> Self {
        let hash = content_hash(&data);
        Self {
            version: PACKET_VERSION.to_string(),
            device: device.to_string(),
            timestamp: format_timestamp(now),
            data,
            hash,
        }
    }

    /// Check that a sender is named and the embedded hash matches the data.
    pub fn verify(&self) -> bool {
        !self.device.is_empty() && content_hash(&self.data) == self.hash
    }
}

/// Verify a packet received as untyped JSON.
///
/// Returns false for anything that is not a well-formed packet with a
/// matching hash. Never fails.
pub fn verify_packet(packet: &Value) -> bool {
    match SyncPacket::deserialize(packet) {
        Ok(packet) => packet.verify(),
        Err(_) => false,
    }
}
