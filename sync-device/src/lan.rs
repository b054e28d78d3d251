//! LAN sync: the peer table and the local address probe.
//!
//! Peers announce themselves with a free-form info map carrying an `id`.
//! No pairing secret is involved; devices on the same network are trusted.

use autus_sync_core::{merge_with_report, MergeReport};
use autus_sync_types::{DeviceId, SyncData};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::DiscoveryConfig;
use crate::engine::SyncCore;
use crate::net::{probe_local_address, LocalAddress};

const DEFAULT_PROBE_TARGET: SocketAddr =
    SocketAddr::new(std::net::IpAddr::V4(std::net::Ipv4Addr::new(10, 254, 254, 254)), 1);
const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_millis(500);

/// A peer as it announced itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeerDevice {
    info: SyncData,
}

impl PeerDevice {
    fn from_info(info: SyncData) -> Option<Self> {
        match info.get("id") {
            Some(Value::String(id)) if !id.trim().is_empty() => Some(Self { info }),
            _ => None,
        }
    }

    /// The peer-supplied id.
    pub fn id(&self) -> &str {
        self.info.get("id").and_then(Value::as_str).unwrap_or_default()
    }

    /// The full announced info map.
    pub fn info(&self) -> &SyncData {
        &self.info
    }
}

/// Data addressed to a peer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncRequest {
    /// Sending device id.
    pub device: String,
    /// The data to sync.
    pub data: SyncData,
}

/// Discovery-based sync for one device.
#[derive(Debug)]
pub struct LanSync {
    core: Arc<SyncCore>,
    peers: DashMap<String, PeerDevice>,
    probe_target: SocketAddr,
    probe_timeout: Duration,
}

impl LanSync {
    /// Create the service with the default probe settings.
    pub fn new(core: Arc<SyncCore>) -> Self {
        Self {
            core,
            peers: DashMap::new(),
            probe_target: DEFAULT_PROBE_TARGET,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }

    /// Create the service with probe settings from configuration.
    pub fn from_config(
        core: Arc<SyncCore>,
        config: &DiscoveryConfig,
    ) -> Result<Self, crate::config::ConfigError> {
        Ok(Self {
            probe_target: config.probe_addr()?,
            probe_timeout: config.probe_timeout(),
            ..Self::new(core)
        })
    }

    /// The shared device core.
    pub fn core(&self) -> &Arc<SyncCore> {
        &self.core
    }

    /// Best-effort LAN address, or [`LocalAddress::Unknown`].
    pub async fn get_local_ip(&self) -> LocalAddress {
        probe_local_address(self.probe_target, self.probe_timeout).await
    }

    /// Snapshot of the peer table, ordered by id.
    pub fn get_discovered_devices(&self) -> Vec<PeerDevice> {
        let mut peers: Vec<PeerDevice> = self.peers.iter().map(|e| e.value().clone()).collect();
        peers.sort_by(|a, b| a.id().cmp(b.id()));
        peers
    }

    /// Look up one peer.
    pub fn discovered_device(&self, id: &str) -> Option<PeerDevice> {
        self.peers.get(id).map(|e| e.value().clone())
    }

    /// Record or overwrite a peer. Returns false, changing nothing, when the
    /// info has no usable `id`.
    pub fn register_device(&self, device_info: SyncData) -> bool {
        let Some(peer) = PeerDevice::from_info(device_info) else {
            debug!("Ignored peer announcement without id");
            return false;
        };

        let id = peer.id().to_string();
        let replaced = self.peers.insert(id.clone(), peer).is_some();
        debug!(peer = %id, replaced, "Peer registered");
        true
    }

    /// Remove a peer. Returns whether it was known.
    pub fn forget_device(&self, id: &str) -> bool {
        let removed = self.peers.remove(id).is_some();
        if removed {
            info!(peer = %id, "Peer forgotten");
        }
        removed
    }

    /// Build a request carrying `data` from this device.
    pub fn create_sync_request(&self, data: SyncData) -> SyncRequest {
        SyncRequest {
            device: self.core.device_id().to_string(),
            data,
        }
    }

    /// Local-wins merge with item counts.
    pub fn merge_sync_data(&self, local: &SyncData, remote: &SyncData) -> MergeReport {
        let report = merge_with_report(local, remote);
        debug!(
            local_items = report.local_items,
            remote_items = report.remote_items,
            merged_items = report.merged_items,
            "Merged LAN sync data"
        );
        report
    }

    /// This device's id.
    pub fn device_id(&self) -> &DeviceId {
        self.core.device_id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn data(value: Value) -> SyncData {
        value.as_object().cloned().unwrap_or_default()
    }

    fn service() -> LanSync {
        LanSync::new(Arc::new(SyncCore::new()))
    }

    #[test]
    fn register_and_list() {
        let lan = service();
        assert!(lan.register_device(data(json!({"id": "dev-42", "name": "phone"}))));

        let peers = lan.get_discovered_devices();
        assert_eq!(peers.len(), 1);
        assert_eq!(peers[0].id(), "dev-42");
        assert_eq!(peers[0].info()["name"], "phone");
    }

    #[test]
    fn register_without_id_changes_nothing() {
        let lan = service();
        lan.register_device(data(json!({"id": "dev-1"})));

        assert!(!lan.register_device(data(json!({"name": "no id"}))));
        assert!(!lan.register_device(data(json!({"id": ""}))));
        assert!(!lan.register_device(data(json!({"id": null}))));
        assert!(!lan.register_device(data(json!({"id": 7}))));
        assert_eq!(lan.get_discovered_devices().len(), 1);
    }

    #[test]
    fn register_overwrites_by_id() {
        let lan = service();
        lan.register_device(data(json!({"id": "dev-1", "name": "old"})));
        lan.register_device(data(json!({"id": "dev-1", "name": "new", "port": 8080})));

        let peer = lan.discovered_device("dev-1").unwrap();
        assert_eq!(peer.info()["name"], "new");
        assert_eq!(peer.info()["port"], 8080);
        assert_eq!(lan.get_discovered_devices().len(), 1);
    }

    #[test]
    fn listing_is_a_copy() {
        let lan = service();
        lan.register_device(data(json!({"id": "b"})));
        lan.register_device(data(json!({"id": "a"})));

        let mut peers = lan.get_discovered_devices();
        assert_eq!(peers.iter().map(PeerDevice::id).collect::<Vec<_>>(), ["a", "b"]);
        peers.clear();
        assert_eq!(lan.get_discovered_devices().len(), 2);
    }

    #[test]
    fn forget_removes_peer() {
        let lan = service();
        lan.register_device(data(json!({"id": "dev-1"})));
        assert!(lan.forget_device("dev-1"));
        assert!(!lan.forget_device("dev-1"));
        assert!(lan.discovered_device("dev-1").is_none());
    }

    #[test]
    fn peer_serializes_as_info_map() {
        let lan = service();
        lan.register_device(data(json!({"id": "dev-1", "caps": ["notes"]})));
        let json = serde_json::to_value(lan.get_discovered_devices()).unwrap();
        assert_eq!(json, json!([{"id": "dev-1", "caps": ["notes"]}]));
    }

    #[test]
    fn sync_request_carries_device_id() {
        let lan = service();
        let request = lan.create_sync_request(data(json!({"x": 1})));
        assert_eq!(request.device, lan.device_id().to_string());
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"device": lan.device_id().to_string(), "data": {"x": 1}})
        );
    }

    #[test]
    fn merge_is_local_wins() {
        let lan = service();
        let report = lan.merge_sync_data(
            &data(json!({"k": "local", "a": 1})),
            &data(json!({"k": "remote", "b": 2})),
        );
        assert_eq!(report.merged, data(json!({"k": "local", "a": 1, "b": 2})));
        assert_eq!(report.local_items, 2);
        assert_eq!(report.remote_items, 2);
        assert_eq!(report.merged_items, 3);
    }

    #[test]
    fn merge_identities() {
        let lan = service();
        let x = data(json!({"x": 1, "nested": {"y": [1, 2]}}));
        assert_eq!(lan.merge_sync_data(&x, &SyncData::new()).merged, x);
        assert_eq!(lan.merge_sync_data(&SyncData::new(), &x).merged, x);
    }

    #[test]
    fn from_config_reads_probe_settings() {
        let config = DiscoveryConfig {
            probe_target: "127.0.0.1:9".into(),
            probe_timeout_ms: 200,
        };
        let lan = LanSync::from_config(Arc::new(SyncCore::new()), &config).unwrap();
        assert_eq!(lan.probe_target, "127.0.0.1:9".parse::<SocketAddr>().unwrap());
        assert_eq!(lan.probe_timeout, Duration::from_millis(200));
    }

    #[tokio::test]
    async fn local_ip_via_loopback() {
        let config = DiscoveryConfig {
            probe_target: "127.0.0.1:9".into(),
            probe_timeout_ms: 500,
        };
        let lan = LanSync::from_config(Arc::new(SyncCore::new()), &config).unwrap();
        assert_eq!(lan.get_local_ip().await.to_string(), "127.0.0.1");
    }
}
