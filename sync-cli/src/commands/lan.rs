//! Local network commands.

use anyhow::Result;
use autus_sync_device::DeviceServices;
use autus_sync_types::SyncData;

use super::Output;

/// Print the LAN address, or `unknown`.
pub async fn ip(services: &DeviceServices) -> Output {
    Output::ok(services.lan.get_local_ip().await.to_string())
}

/// Print a sync request for `data`.
pub fn request(services: &DeviceServices, data: SyncData) -> Result<Output> {
    Output::json(&services.lan.create_sync_request(data))
}
