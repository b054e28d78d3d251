//! Print the device id.

use autus_sync_device::DeviceServices;

use super::Output;

/// Run the identity command.
pub fn run(services: &DeviceServices) -> Output {
    Output::ok(services.core.device_id().to_string())
}
