//! Identity types for Autus sync.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::SyncError;

/// A per-installation identifier for a device taking part in sync.
///
/// Freshly generated ids are 16 random bytes, displayed as 32 lowercase hex
/// characters. Ids supplied by the host only need to be long enough to carry
/// comparable entropy.
#[derive(Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct DeviceId(String);

impl DeviceId {
    /// Minimum accepted length (in characters) of a device id.
    pub const MIN_LEN: usize = 16;

    /// Create a new random DeviceId.
    pub fn random() -> Self {
        let mut bytes = [0u8; 16];
        getrandom::getrandom(&mut bytes).expect("getrandom failed");
        Self(hex::encode(bytes))
    }

    /// Use an existing identifier, e.g. one persisted by the host.
    ///
    /// Returns `None` if the id is shorter than [`DeviceId::MIN_LEN`].
    pub fn parse(id: &str) -> Option<Self> {
        let id = id.trim();
        if id.chars().count() >= Self::MIN_LEN {
            Some(Self(id.to_string()))
        } else {
            None
        }
    }

    /// The id as it appears on the wire.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let short: String = self.0.chars().take(8).collect();
        write!(f, "DeviceId({})", short)
    }
}

/// Identifier of a pairing session.
///
/// 8 random bytes, displayed as 16 lowercase hex characters.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SyncId([u8; 8]);

impl SyncId {
    /// Create a new random SyncId.
    pub fn random() -> Self {
        let mut bytes = [0u8; 8];
        getrandom::getrandom(&mut bytes).expect("getrandom failed");
        Self(bytes)
    }

    /// Create a SyncId from raw bytes.
    pub fn from_bytes(bytes: [u8; 8]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes of this SyncId.
    pub fn as_bytes(&self) -> &[u8; 8] {
        &self.0
    }
}

impl FromStr for SyncId {
    type Err = SyncError;

    /// Parse the 16-character lowercase hex form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let well_formed = s.len() == 16
            && s
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        if !well_formed {
            return Err(SyncError::Invalid(format!("malformed sync id: {:?}", s)));
        }

        let mut bytes = [0u8; 8];
        hex::decode_to_slice(s, &mut bytes)
            .map_err(|e| SyncError::Invalid(format!("malformed sync id: {}", e)))?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for SyncId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for SyncId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SyncId({})", self)
    }
}

impl Serialize for SyncId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for SyncId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}
