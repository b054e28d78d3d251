//! Background sweep for expired pairing sessions.
//!
//! Expired sessions are also dropped when looked up; the sweep bounds memory
//! for sessions nobody ever completes.

use std::sync::Arc;
use tokio::time::interval;

use crate::config::PairingConfig;
use crate::qr::QrSync;

/// Spawn the periodic expiry sweep.
///
/// Returns a handle that can be used to abort the task.
pub fn spawn_expiry_sweep(qr: Arc<QrSync>, config: PairingConfig) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if !config.sweep_enabled {
            tracing::info!("Expiry sweep disabled");
            return;
        }

        let interval_secs = config.sweep_interval_secs;
        if interval_secs == 0 {
            tracing::warn!("Expiry sweep not started: interval must be positive");
            return;
        }
        tracing::info!("Expiry sweep started (interval: {}s)", interval_secs);

        let mut timer = interval(config.sweep_interval());

        loop {
            timer.tick().await;

            let removed = qr.prune_expired();
            if removed > 0 {
                tracing::info!("Expiry sweep: removed {} expired sessions", removed);
            } else {
                tracing::debug!("Expiry sweep: nothing expired");
            }
        }
    })
}
