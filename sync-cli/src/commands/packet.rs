//! Create and verify sync packets.

use anyhow::Result;
use autus_sync_device::DeviceServices;
use autus_sync_types::SyncData;
use serde_json::Value;

use super::Output;

/// Wrap data in a packet.
pub fn create(services: &DeviceServices, data: &SyncData) -> Result<Output> {
    Output::json(&services.core.create_sync_packet(data.clone()))
}

/// Print whether the packet verifies. A mismatch exits 1.
pub fn verify(services: &DeviceServices, packet: &Value) -> Output {
    let ok = services.core.verify_packet(packet);
    Output {
        text: ok.to_string(),
        success: ok,
    }
}
