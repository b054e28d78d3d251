//! SyncCore - device identity and packet envelopes.

use autus_sync_core::{Clock, SystemClock};
use autus_sync_types::{verify_packet, DeviceId, SyncData, SyncPacket};
use chrono::NaiveDateTime;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::error::DeviceError;

/// This device's identity plus the clock every expiry check reads.
///
/// Both protocol services hold an `Arc<SyncCore>`, so they stamp the same
/// id and agree on the time.
pub struct SyncCore {
    device_id: DeviceId,
    clock: Arc<dyn Clock>,
}

impl SyncCore {
    /// Create a core with a fresh random device id and the system clock.
    pub fn new() -> Self {
        Self::with_device_id(DeviceId::random())
    }

    /// Create a core for a known device id.
    pub fn with_device_id(device_id: DeviceId) -> Self {
        Self {
            device_id,
            clock: Arc::new(SystemClock),
        }
    }

    /// Create a core from an optional host-supplied id.
    ///
    /// A missing id yields a random one.
    pub fn from_device_id(id: Option<&str>) -> Result<Self, DeviceError> {
        match id {
            Some(id) => DeviceId::parse(id)
                .map(Self::with_device_id)
                .ok_or_else(|| DeviceError::InvalidDeviceId(id.to_string())),
            None => Ok(Self::new()),
        }
    }

    /// Replace the clock.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// This device's id.
    pub fn device_id(&self) -> &DeviceId {
        &self.device_id
    }

    /// Current time according to the injected clock.
    pub fn now(&self) -> NaiveDateTime {
        self.clock.now()
    }

    /// Wrap `data` in a packet stamped with this device's id.
    pub fn create_sync_packet(&self, data: SyncData) -> SyncPacket {
        let packet = SyncPacket::new(&self.device_id, data, self.now());
        tracing::debug!(
            items = packet.data.len(),
            hash = %&packet.hash[..16],
            "Created sync packet"
        );
        packet
    }

    /// Check a received packet. Any malformation yields false.
    pub fn verify_packet(&self, packet: &Value) -> bool {
        let ok = verify_packet(packet);
        if !ok {
            tracing::debug!("Rejected sync packet");
        }
        ok
    }
}

impl Default for SyncCore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SyncCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncCore")
            .field("device_id", &self.device_id)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use autus_sync_core::ManualClock;
    use chrono::NaiveDate;
    use serde_json::json;

    fn data(value: Value) -> SyncData {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn device_id_is_random_hex() {
        let a = SyncCore::new();
        let b = SyncCore::new();
        assert_eq!(a.device_id().as_str().len(), 32);
        assert_ne!(a.device_id(), b.device_id());
    }

    #[test]
    fn device_id_is_fixed_for_the_core() {
        let core = SyncCore::new();
        let first = core.create_sync_packet(SyncData::new());
        let second = core.create_sync_packet(SyncData::new());
        assert_eq!(first.device, second.device);
        assert_eq!(first.device, core.device_id().to_string());
    }

    #[test]
    fn from_device_id_validates() {
        let core = SyncCore::from_device_id(Some("living-room-tv-01")).unwrap();
        assert_eq!(core.device_id().as_str(), "living-room-tv-01");

        assert!(matches!(
            SyncCore::from_device_id(Some("short")),
            Err(DeviceError::InvalidDeviceId(_))
        ));
        assert!(SyncCore::from_device_id(None).is_ok());
    }

    #[test]
    fn packets_verify() {
        let core = SyncCore::new();
        let packet = core.create_sync_packet(data(json!({"notes": ["a", "b"], "count": 2})));
        let value = serde_json::to_value(&packet).unwrap();
        assert!(core.verify_packet(&value));
    }

    #[test]
    fn tampered_packets_fail() {
        let core = SyncCore::new();
        let packet = core.create_sync_packet(data(json!({"count": 2})));
        let mut value = serde_json::to_value(&packet).unwrap();
        value["data"]["count"] = json!(3);
        assert!(!core.verify_packet(&value));
        assert!(!core.verify_packet(&json!("not a packet")));
        assert!(!core.verify_packet(&json!({"data": {}})));
    }

    #[test]
    fn packet_timestamp_comes_from_clock() {
        let at = NaiveDate::from_ymd_opt(2025, 3, 4)
            .unwrap()
            .and_hms_opt(5, 6, 7)
            .unwrap();
        let core = SyncCore::new().with_clock(Arc::new(ManualClock::new(at)));
        assert_eq!(core.now(), at);
        let packet = core.create_sync_packet(SyncData::new());
        assert_eq!(packet.timestamp, "2025-03-04T05:06:07");
    }

    #[test]
    fn debug_does_not_need_clock_debug() {
        let core = SyncCore::with_device_id(DeviceId::parse("0123456789abcdef").unwrap());
        assert!(format!("{core:?}").starts_with("SyncCore"));
    }
}
