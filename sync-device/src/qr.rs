//! QR sync: the pending-session map on the originating device.
//!
//! ```text
//! Device A (originator)                     Device B (scanner)
//!   generate_qr_string(data) ──(QR code)──▶   parse_qr_string(qr)
//!                                             accept_sync(payload, data)
//!   complete_sync(sync_id, remote) ◀──────── sends sync_id + its data
//! ```
//!
//! Sessions live in a [`DashMap`]. Completion removes the session before
//! looking at it, so each `sync_id` completes at most once no matter how
//! many callers race.

use autus_sync_core::{
    accept_sync, parse_qr_string, CompletedSync, PairingPayload, PairingSession, PendingSync,
    SyncAcceptance, DEFAULT_PAIRING_TTL,
};
use autus_sync_types::{SyncData, SyncError, SyncId};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::engine::SyncCore;

/// Token-based sync for one device.
#[derive(Debug)]
pub struct QrSync {
    core: Arc<SyncCore>,
    sessions: DashMap<SyncId, PairingSession>,
    default_ttl: Duration,
}

impl QrSync {
    /// Create the service with the default five-minute TTL.
    pub fn new(core: Arc<SyncCore>) -> Self {
        Self {
            core,
            sessions: DashMap::new(),
            default_ttl: DEFAULT_PAIRING_TTL,
        }
    }

    /// Override the TTL used by [`generate_qr_payload`](Self::generate_qr_payload).
    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// The shared device core.
    pub fn core(&self) -> &Arc<SyncCore> {
        &self.core
    }

    /// TTL applied when the caller does not pass one.
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Open a pairing session for `data` with the default TTL.
    pub fn generate_qr_payload(&self, data: SyncData) -> PairingPayload {
        self.generate_qr_payload_with_ttl(data, self.default_ttl)
    }

    /// Open a pairing session for `data` that expires after `ttl`.
    pub fn generate_qr_payload_with_ttl(&self, data: SyncData, ttl: Duration) -> PairingPayload {
        let (session, payload) =
            PairingSession::open(self.core.device_id(), data, ttl, self.core.now());

        tracing::debug!(
            sync_id = %payload.sync_id,
            expires = %payload.expires,
            checksum = %payload.checksum,
            "Pairing session created"
        );

        self.sessions.insert(session.sync_id(), session);
        payload
    }

    /// Open a session and encode its payload as a token string.
    pub fn generate_qr_string(&self, data: SyncData) -> String {
        self.generate_qr_payload(data).to_qr_string()
    }

    /// Like [`generate_qr_string`](Self::generate_qr_string) with an explicit TTL.
    pub fn generate_qr_string_with_ttl(&self, data: SyncData, ttl: Duration) -> String {
        self.generate_qr_payload_with_ttl(data, ttl).to_qr_string()
    }

    /// Decode a scanned token and check its expiry.
    pub fn parse_qr_string(&self, qr: &str) -> Result<PairingPayload, SyncError> {
        parse_qr_string(qr, self.core.now()).map_err(|e| {
            tracing::warn!(error = e.code(), "Rejected pairing token");
            e
        })
    }

    /// Acknowledge a scanned payload. Touches no session.
    pub fn accept_sync(&self, payload: &PairingPayload, my_data: &SyncData) -> SyncAcceptance {
        let acceptance = accept_sync(payload, self.core.device_id(), my_data);
        tracing::debug!(
            sync_id = %acceptance.sync_id,
            from = %acceptance.from_device,
            same_data = acceptance.my_checksum == acceptance.their_checksum,
            "Pairing payload accepted"
        );
        acceptance
    }

    /// Complete a session with the scanner's data.
    ///
    /// Any id without a live session answers [`SyncError::NotFound`],
    /// including malformed ones. An expired session is deleted and answers
    /// [`SyncError::Expired`].
    pub fn complete_sync(
        &self,
        sync_id: &str,
        remote: &SyncData,
    ) -> Result<CompletedSync, SyncError> {
        let id: SyncId = sync_id.parse().map_err(|_| SyncError::NotFound)?;

        let Some((_, mut session)) = self.sessions.remove(&id) else {
            tracing::debug!(sync_id = %id, "No pending session");
            return Err(SyncError::NotFound);
        };

        match session.complete(remote, self.core.now()) {
            Ok(done) => {
                tracing::info!(
                    sync_id = %id,
                    local_items = done.report.local_items,
                    remote_items = done.report.remote_items,
                    merged_items = done.report.merged_items,
                    "Pairing session completed"
                );
                Ok(done)
            }
            Err(e) => {
                tracing::warn!(sync_id = %id, error = e.code(), "Pairing session not completed");
                Err(e)
            }
        }
    }

    /// Live sessions, soonest expiry first. Never includes secrets or data.
    pub fn get_pending_syncs(&self) -> Vec<PendingSync> {
        let now = self.core.now();
        let mut live: Vec<_> = self
            .sessions
            .iter()
            .filter(|entry| !entry.value().is_expired(now))
            .map(|entry| (entry.value().expires(), entry.value().summary()))
            .collect();
        live.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.sync_id.cmp(&b.1.sync_id)));
        live.into_iter().map(|(_, summary)| summary).collect()
    }

    /// Drop every expired session. Returns how many were removed.
    pub fn prune_expired(&self) -> usize {
        let now = self.core.now();
        let mut removed = 0;
        self.sessions.retain(|_, session| {
            let keep = !session.is_expired(now);
            if !keep {
                removed += 1;
            }
            keep
        });
        removed
    }

    /// Number of stored sessions, expired ones included until pruned.
    pub fn pending_count(&self) -> usize {
        self.sessions.len()
    }
}
