//! Pairing token commands.

use anyhow::Result;
use autus_sync_device::DeviceServices;
use autus_sync_types::SyncData;
use std::time::Duration;

use super::Output;

/// Print a token for `data`.
pub fn create(services: &DeviceServices, data: SyncData, ttl: Option<u64>) -> Output {
    let ttl = ttl.map_or(services.qr.default_ttl(), Duration::from_secs);
    Output::ok(services.qr.generate_qr_string_with_ttl(data, ttl))
}

/// Print the payload for `data`.
pub fn payload(services: &DeviceServices, data: SyncData, ttl: Option<u64>) -> Result<Output> {
    let ttl = ttl.map_or(services.qr.default_ttl(), Duration::from_secs);
    Output::json(&services.qr.generate_qr_payload_with_ttl(data, ttl))
}

/// Decode a token, or print the tagged error and exit 1.
pub fn parse(services: &DeviceServices, token: &str) -> Result<Output> {
    match services.qr.parse_qr_string(token) {
        Ok(payload) => Output::json(&payload),
        Err(e) => Output::failed_json(&e),
    }
}

/// Acknowledge a token with local data.
pub fn accept(services: &DeviceServices, token: &str, data: &SyncData) -> Result<Output> {
    match services.qr.parse_qr_string(token) {
        Ok(payload) => Output::json(&services.qr.accept_sync(&payload, data)),
        Err(e) => Output::failed_json(&e),
    }
}
