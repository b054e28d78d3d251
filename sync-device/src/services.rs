//! One device's full set of sync services, built from configuration.

use autus_sync_core::Clock;
use std::sync::Arc;

use crate::cleanup::spawn_expiry_sweep;
use crate::config::{Config, PairingConfig};
use crate::engine::SyncCore;
use crate::error::DeviceError;
use crate::lan::LanSync;
use crate::qr::QrSync;

/// The shared core plus both protocol services.
///
/// The QR and LAN services keep separate maps and only share the core.
#[derive(Debug, Clone)]
pub struct DeviceServices {
    /// Identity and clock.
    pub core: Arc<SyncCore>,
    /// Token-based sync.
    pub qr: Arc<QrSync>,
    /// Discovery-based sync.
    pub lan: Arc<LanSync>,
    pairing: PairingConfig,
}

impl DeviceServices {
    /// Build the services with the system clock.
    pub fn from_config(config: &Config) -> Result<Self, DeviceError> {
        let core = SyncCore::from_device_id(config.device.device_id.as_deref())?;
        Self::assemble(core, config)
    }

    /// Build the services with an injected clock.
    pub fn with_clock(config: &Config, clock: Arc<dyn Clock>) -> Result<Self, DeviceError> {
        let core = SyncCore::from_device_id(config.device.device_id.as_deref())?.with_clock(clock);
        Self::assemble(core, config)
    }

    fn assemble(core: SyncCore, config: &Config) -> Result<Self, DeviceError> {
        config.validate()?;

        let core = Arc::new(core);
        let qr = QrSync::new(core.clone()).with_default_ttl(config.pairing.default_ttl());
        let lan = LanSync::from_config(core.clone(), &config.discovery)?;

        tracing::debug!(device_id = ?core.device_id(), "Device services ready");

        Ok(Self {
            core,
            qr: Arc::new(qr),
            lan: Arc::new(lan),
            pairing: config.pairing.clone(),
        })
    }

    /// Start the expiry sweep for the QR sessions with the validated
    /// pairing settings these services were built from.
    pub fn spawn_sweep(&self) -> tokio::task::JoinHandle<()> {
        spawn_expiry_sweep(self.qr.clone(), self.pairing.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use autus_sync_types::SyncData;
    use std::time::Duration;

    #[test]
    fn services_share_one_identity() {
        let services = DeviceServices::from_config(&Config::default()).unwrap();
        let request = services.lan.create_sync_request(SyncData::new());
        let payload = services.qr.generate_qr_payload(SyncData::new());
        assert_eq!(request.device, payload.device);
        assert_eq!(request.device, services.core.device_id().to_string());
    }

    #[test]
    fn configured_device_id_and_ttl_apply() {
        let config: Config = toml::from_str(
            "[device]\ndevice_id = \"workshop-laptop-7\"\n[pairing]\ndefault_ttl_secs = 45\n",
        )
        .unwrap();
        let services = DeviceServices::from_config(&config).unwrap();
        assert_eq!(services.core.device_id().as_str(), "workshop-laptop-7");
        assert_eq!(services.qr.default_ttl(), Duration::from_secs(45));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config: Config = toml::from_str("[pairing]\ndefault_ttl_secs = 0\n").unwrap();
        assert!(matches!(
            DeviceServices::from_config(&config),
            Err(DeviceError::Config(_))
        ));

        let config: Config = toml::from_str("[device]\ndevice_id = \"x\"\n").unwrap();
        assert!(matches!(
            DeviceServices::from_config(&config),
            Err(DeviceError::InvalidDeviceId(_))
        ));
    }

    #[tokio::test]
    async fn disabled_sweep_exits() {
        let mut config = Config::default();
        config.pairing.sweep_enabled = false;
        let services = DeviceServices::from_config(&config).unwrap();
        tokio::time::timeout(Duration::from_millis(100), services.spawn_sweep())
            .await
            .expect("sweep should exit when disabled")
            .expect("sweep should not panic");
    }

    #[test]
    fn zero_sweep_interval_never_reaches_the_sweep() {
        let config: Config = toml::from_str("[pairing]\nsweep_interval_secs = 0\n").unwrap();
        assert!(matches!(
            DeviceServices::from_config(&config),
            Err(DeviceError::Config(_))
        ));
    }

    #[tokio::test]
    async fn sweep_uses_the_validated_settings() {
        let services = DeviceServices::from_config(&Config::default()).unwrap();
        let handle = services.spawn_sweep();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!handle.is_finished());
        handle.abort();
    }
}
