//! Pairing session state machine.
//!
//! A session is the originating device's record of one in-flight QR sync:
//!
//! ```text
//! PENDING --complete (before expiry)--> COMPLETED
//! PENDING --lookup (after expiry)-----> EXPIRED (treated as not found)
//! ```
//!
//! There are no reverse transitions, and a session completes at most once.
//! The session keeps the data snapshot taken when it was opened; completion
//! merges against that snapshot, not against whatever the device holds later.

use chrono::{Duration as ChronoDuration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use autus_sync_types::{checksum, format_timestamp, DeviceId, SyncData, SyncError, SyncId};

use crate::merge::{merge_with_report, MergeReport};
use crate::pairing::{
    PairingPayload, PairingSecret, SyncStatus, MAX_PAIRING_TTL, PAYLOAD_TAG, PAYLOAD_VERSION,
};

/// The originating device's record of a pairing attempt.
#[derive(Debug, Clone)]
pub struct PairingSession {
    sync_id: SyncId,
    data: SyncData,
    secret: PairingSecret,
    expires: NaiveDateTime,
    status: SyncStatus,
}

impl PairingSession {
    /// Open a session for `data` and derive the payload to hand out.
    ///
    /// TTLs above [`MAX_PAIRING_TTL`] are clamped.
    pub fn open(
        device: &DeviceId,
        data: SyncData,
        ttl: Duration,
        now: NaiveDateTime,
    ) -> (Self, PairingPayload) {
        let ttl = ttl.min(MAX_PAIRING_TTL);
        let expires = now
            .checked_add_signed(ChronoDuration::milliseconds(ttl.as_millis() as i64))
            .unwrap_or(NaiveDateTime::MAX);

        let session = Self {
            sync_id: SyncId::random(),
            data,
            secret: PairingSecret::random(),
            expires,
            status: SyncStatus::Pending,
        };

        let payload = PairingPayload {
            autus: PAYLOAD_TAG.to_string(),
            version: PAYLOAD_VERSION.to_string(),
            sync_id: session.sync_id,
            device: device.to_string(),
            secret: session.secret.to_base64(),
            expires: format_timestamp(session.expires),
            checksum: checksum(&session.data),
        };

        (session, payload)
    }

    /// The session id.
    pub fn sync_id(&self) -> SyncId {
        self.sync_id
    }

    /// The data snapshot taken when the session was opened.
    pub fn data(&self) -> &SyncData {
        &self.data
    }

    /// The session secret.
    pub fn secret(&self) -> &PairingSecret {
        &self.secret
    }

    /// When the session expires.
    pub fn expires(&self) -> NaiveDateTime {
        self.expires
    }

    /// Current status.
    pub fn status(&self) -> SyncStatus {
        self.status
    }

    /// Check whether `now` is strictly past the expiry.
    pub fn is_expired(&self, now: NaiveDateTime) -> bool {
        now > self.expires
    }

    /// Merge the remote data into the snapshot and mark the session completed.
    ///
    /// A completed session answers [`SyncError::NotFound`], an expired one
    /// [`SyncError::Expired`]; neither changes state.
    pub fn complete(
        &mut self,
        remote: &SyncData,
        now: NaiveDateTime,
    ) -> Result<CompletedSync, SyncError> {
        if self.status == SyncStatus::Completed {
            return Err(SyncError::NotFound);
        }
        if self.is_expired(now) {
            return Err(SyncError::Expired);
        }

        self.status = SyncStatus::Completed;
        Ok(CompletedSync {
            status: SyncStatus::Completed,
            sync_id: self.sync_id,
            report: merge_with_report(&self.data, remote),
        })
    }

    /// Listing entry for this session. Never includes the secret or data.
    pub fn summary(&self) -> PendingSync {
        PendingSync {
            sync_id: self.sync_id,
            status: self.status,
            expires: format_timestamp(self.expires),
        }
    }
}

/// Result of completing a pairing session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletedSync {
    /// Always [`SyncStatus::Completed`].
    pub status: SyncStatus,
    /// The completed session.
    pub sync_id: SyncId,
    /// Merged data and item counts.
    #[serde(flatten)]
    pub report: MergeReport,
}

/// A live session as shown by listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingSync {
    /// Session id.
    pub sync_id: SyncId,
    /// Session status.
    pub status: SyncStatus,
    /// Naive UTC ISO-8601 expiry.
    pub expires: String,
}
