//! QR pairing payloads for Autus sync.
//!
//! This module provides:
//! - The pairing payload wire record and its token string
//!   (`autus://sync?p=<BASE64(JSON)>`)
//! - Token parsing with expiry checks
//! - The scanning side's acceptance record
//!
//! The pairing flow:
//! 1. Device A opens a pairing session and shows the token as a QR code
//! 2. Device B scans it and answers with [`accept_sync`]
//! 3. Device B sends its data; device A completes the session and merges
//!
//! The secret travels inside the token. A pairing token proves possession of
//! the QR code, not the identity of a device.

use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use zeroize::{Zeroize, ZeroizeOnDrop};

use autus_sync_types::{
    checksum, parse_timestamp, to_wire_json, DeviceId, SyncData, SyncError, SyncId,
};

/// Scheme and query prefix of a pairing token string.
pub const QR_SCHEME_PREFIX: &str = "autus://sync?p=";

/// Value of the `autus` tag field.
pub const PAYLOAD_TAG: &str = "sync";

/// Pairing payload format version.
pub const PAYLOAD_VERSION: &str = "1.0";

/// Default pairing session TTL (5 minutes).
pub const DEFAULT_PAIRING_TTL: Duration = Duration::from_secs(300);

/// Longest TTL a pairing session may be given (30 days).
pub const MAX_PAIRING_TTL: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// Length of a pairing secret in bytes.
pub const SECRET_LEN: usize = 16;

/// Status field of sync acknowledgements and session listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    /// Session created, waiting for the other device.
    Pending,
    /// The scanning device accepted a token.
    Accepted,
    /// The originating device merged the remote data.
    Completed,
}

/// An ephemeral secret minted per pairing session.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct PairingSecret([u8; SECRET_LEN]);

impl PairingSecret {
    /// Create a new random secret.
    pub fn random() -> Self {
        let mut bytes = [0u8; SECRET_LEN];
        getrandom::getrandom(&mut bytes).expect("getrandom failed");
        Self(bytes)
    }

    /// Create from raw bytes.
    pub fn from_bytes(bytes: [u8; SECRET_LEN]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub fn as_bytes(&self) -> &[u8; SECRET_LEN] {
        &self.0
    }

    /// Standard base64 (with padding), as carried in the payload.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.0)
    }
}

// Intentionally opaque debug to avoid logging secrets
impl std::fmt::Debug for PairingSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PairingSecret([REDACTED])")
    }
}

/// The wire record embedded in a pairing token.
///
/// Field order is the wire order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairingPayload {
    /// Always `"sync"`.
    pub autus: String,
    /// Payload format version (`"1.0"`).
    pub version: String,
    /// The originating device's session id.
    pub sync_id: SyncId,
    /// The originating device's id.
    pub device: String,
    /// Base64 of the 16-byte session secret.
    pub secret: String,
    /// Naive UTC ISO-8601 expiry.
    pub expires: String,
    /// Checksum of the originating device's data snapshot.
    pub checksum: String,
}

impl PairingPayload {
    /// Encode as JSON, in wire field order.
    pub fn to_json(&self) -> String {
        to_wire_json(self).expect("pairing payload serialization failed")
    }

    /// Encode as a token string for QR display.
    ///
    /// Format: `autus://sync?p=BASE64(JSON({ autus, version, sync_id, ... }))`
    pub fn to_qr_string(&self) -> String {
        format!("{}{}", QR_SCHEME_PREFIX, STANDARD.encode(self.to_json()))
    }

    /// Decode a token string without checking expiry.
    pub fn from_qr_string(qr: &str) -> Result<Self, SyncError> {
        let encoded = qr
            .trim()
            .strip_prefix(QR_SCHEME_PREFIX)
            .ok_or_else(|| SyncError::Invalid("not an autus sync token".into()))?;

        let json_bytes = STANDARD
            .decode(encoded)
            .map_err(|e| SyncError::Invalid(format!("base64 decode: {}", e)))?;

        let payload: Self = serde_json::from_slice(&json_bytes)
            .map_err(|e| SyncError::Invalid(format!("json parse: {}", e)))?;

        if payload.autus != PAYLOAD_TAG {
            return Err(SyncError::Invalid(format!(
                "unexpected payload tag: {:?}",
                payload.autus
            )));
        }

        Ok(payload)
    }

    /// The parsed expiry, or `None` if the field is not ISO-8601.
    pub fn expires_at(&self) -> Option<NaiveDateTime> {
        parse_timestamp(&self.expires)
    }

    /// Check whether the payload is strictly past its expiry.
    ///
    /// An unparseable expiry counts as expired.
    pub fn is_expired(&self, now: NaiveDateTime) -> bool {
        match self.expires_at() {
            Some(expires) => now > expires,
            None => true,
        }
    }
}

/// Parse a scanned token string.
///
/// Returns [`SyncError::Invalid`] for anything that is not a well-formed
/// token and [`SyncError::Expired`] once `now` is strictly past the expiry.
pub fn parse_qr_string(qr: &str, now: NaiveDateTime) -> Result<PairingPayload, SyncError> {
    let payload = PairingPayload::from_qr_string(qr)?;

    let expires = payload
        .expires_at()
        .ok_or_else(|| SyncError::Invalid(format!("bad expiry: {:?}", payload.expires)))?;

    if now > expires {
        return Err(SyncError::Expired);
    }

    Ok(payload)
}

/// The scanning device's acknowledgement of a pairing payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncAcceptance {
    /// Always [`SyncStatus::Accepted`].
    pub status: SyncStatus,
    /// Session id from the payload.
    pub sync_id: SyncId,
    /// The originating device.
    pub from_device: String,
    /// The scanning device.
    pub to_device: String,
    /// Checksum of the scanning device's data.
    pub my_checksum: String,
    /// Checksum carried in the payload.
    pub their_checksum: String,
}

/// Acknowledge a scanned payload on the scanning device.
///
/// Comparing the two checksums tells both sides whether their datasets
/// already match. No session state is touched: the session lives only on
/// the originating device.
pub fn accept_sync(
    payload: &PairingPayload,
    me: &DeviceId,
    my_data: &SyncData,
) -> SyncAcceptance {
    SyncAcceptance {
        status: SyncStatus::Accepted,
        sync_id: payload.sync_id,
        from_device: payload.device.clone(),
        to_device: me.to_string(),
        my_checksum: checksum(my_data),
        their_checksum: payload.checksum.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use autus_sync_types::format_timestamp;
    use chrono::NaiveDate;
    use serde_json::json;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn test_payload(expires: NaiveDateTime) -> PairingPayload {
        PairingPayload {
            autus: PAYLOAD_TAG.into(),
            version: PAYLOAD_VERSION.into(),
            sync_id: SyncId::from_bytes([0x12; 8]),
            device: "0123456789abcdef0123456789abcdef".into(),
            secret: PairingSecret::from_bytes([7; SECRET_LEN]).to_base64(),
            expires: format_timestamp(expires),
            checksum: "613fe5aa65343dbb".into(),
        }
    }

    fn encode_json(value: serde_json::Value) -> String {
        format!("{}{}", QR_SCHEME_PREFIX, STANDARD.encode(value.to_string()))
    }

    #[test]
    fn payload_json_has_wire_field_order() {
        let payload = test_payload(now());
        assert_eq!(
            payload.to_json(),
            "{\"autus\": \"sync\", \"version\": \"1.0\", \"sync_id\": \"1212121212121212\", \
             \"device\": \"0123456789abcdef0123456789abcdef\", \
             \"secret\": \"BwcHBwcHBwcHBwcHBwcHBw==\", \
             \"expires\": \"2025-01-01T12:00:00\", \"checksum\": \"613fe5aa65343dbb\"}"
        );
    }

    #[test]
    fn qr_string_roundtrip() {
        let payload = test_payload(now());
        let qr = payload.to_qr_string();
        assert!(qr.starts_with("autus://sync?p="));
        assert_eq!(parse_qr_string(&qr, now()).unwrap(), payload);
    }

    #[test]
    fn parse_trims_scanner_whitespace() {
        let payload = test_payload(now());
        let qr = format!("  {}\n", payload.to_qr_string());
        assert_eq!(parse_qr_string(&qr, now()).unwrap(), payload);
    }

    #[test]
    fn parse_at_exact_expiry_is_still_valid() {
        let payload = test_payload(now());
        assert!(parse_qr_string(&payload.to_qr_string(), now()).is_ok());
        assert!(!payload.is_expired(now()));
    }

    #[test]
    fn parse_after_expiry_is_expired() {
        let payload = test_payload(now());
        let later = now() + chrono::Duration::microseconds(1);
        assert_eq!(
            parse_qr_string(&payload.to_qr_string(), later),
            Err(SyncError::Expired)
        );
        assert!(payload.is_expired(later));
    }

    #[test]
    fn parse_rejects_wrong_prefix() {
        let qr = test_payload(now()).to_qr_string().replace("autus://", "https://");
        assert!(matches!(parse_qr_string(&qr, now()), Err(SyncError::Invalid(_))));
        assert!(matches!(parse_qr_string("", now()), Err(SyncError::Invalid(_))));
    }

    #[test]
    fn parse_rejects_bad_base64() {
        let result = parse_qr_string("autus://sync?p=not-valid-base64!!!", now());
        assert!(matches!(result, Err(SyncError::Invalid(_))));
    }

    #[test]
    fn parse_rejects_bad_json() {
        let qr = format!("{}{}", QR_SCHEME_PREFIX, STANDARD.encode(b"not valid json"));
        assert!(matches!(parse_qr_string(&qr, now()), Err(SyncError::Invalid(_))));
    }

    #[test]
    fn parse_rejects_missing_fields() {
        let qr = encode_json(json!({"autus": "sync", "version": "1.0"}));
        assert!(matches!(parse_qr_string(&qr, now()), Err(SyncError::Invalid(_))));
    }

    #[test]
    fn parse_rejects_foreign_tag() {
        let mut value = serde_json::to_value(test_payload(now())).unwrap();
        value["autus"] = json!("pay");
        assert!(matches!(
            parse_qr_string(&encode_json(value), now()),
            Err(SyncError::Invalid(_))
        ));
    }

    #[test]
    fn parse_rejects_bad_expiry() {
        let mut value = serde_json::to_value(test_payload(now())).unwrap();
        value["expires"] = json!("next tuesday");
        assert!(matches!(
            parse_qr_string(&encode_json(value), now()),
            Err(SyncError::Invalid(_))
        ));
    }

    #[test]
    fn parse_rejects_malformed_sync_id() {
        let mut value = serde_json::to_value(test_payload(now())).unwrap();
        value["sync_id"] = json!("XYZ");
        assert!(matches!(
            parse_qr_string(&encode_json(value), now()),
            Err(SyncError::Invalid(_))
        ));
    }

    #[test]
    fn parse_accepts_compact_json_from_other_encoders() {
        let value = serde_json::to_value(test_payload(now())).unwrap();
        let payload = parse_qr_string(&encode_json(value), now()).unwrap();
        assert_eq!(payload, test_payload(now()));
    }

    #[test]
    fn accept_reports_both_checksums() {
        let payload = test_payload(now());
        let me = DeviceId::random();
        let my_data = json!({"y": 2}).as_object().unwrap().clone();

        let ack = accept_sync(&payload, &me, &my_data);
        assert_eq!(ack.status, SyncStatus::Accepted);
        assert_eq!(ack.sync_id, payload.sync_id);
        assert_eq!(ack.from_device, payload.device);
        assert_eq!(ack.to_device, me.to_string());
        assert_eq!(ack.my_checksum, "71bb65f507635269");
        assert_eq!(ack.their_checksum, payload.checksum);
    }

    #[test]
    fn acceptance_serializes_with_status() {
        let ack = accept_sync(&test_payload(now()), &DeviceId::random(), &SyncData::new());
        let json = serde_json::to_value(&ack).unwrap();
        assert_eq!(json["status"], "accepted");
        assert_eq!(json["sync_id"], "1212121212121212");
    }

    #[test]
    fn secret_base64_is_24_chars() {
        let secret = PairingSecret::random();
        let encoded = secret.to_base64();
        assert_eq!(encoded.len(), 24);
        assert_eq!(STANDARD.decode(encoded).unwrap(), secret.as_bytes().to_vec());
    }

    #[test]
    fn secret_debug_is_redacted() {
        let secret = PairingSecret::from_bytes([0x42; SECRET_LEN]);
        let debug = format!("{:?}", secret);
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains("66"));
    }
}
