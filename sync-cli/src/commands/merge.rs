//! Merge two datasets.

use anyhow::Result;
use autus_sync_device::DeviceServices;
use autus_sync_types::SyncData;

use super::Output;

/// Run the merge command.
pub fn run(services: &DeviceServices, local: &SyncData, remote: &SyncData) -> Result<Output> {
    Output::json(&services.lan.merge_sync_data(local, remote))
}
