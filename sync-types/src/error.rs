//! Error types for Autus sync.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use thiserror::Error;

/// Errors returned by sync operations.
///
/// Every public operation is total: failures come back as one of these
/// variants, never as a panic. The wire form is
/// `{"error": <code>, "message": <text>}`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    /// Undecodable token, wrong scheme, or malformed payload.
    #[error("invalid sync token: {0}")]
    Invalid(String),

    /// The token or session existed but is past its expiry.
    #[error("sync token has expired")]
    Expired,

    /// Unknown or already-consumed sync id.
    #[error("sync session not found")]
    NotFound,
}

impl SyncError {
    /// The wire tag for this error.
    pub fn code(&self) -> &'static str {
        match self {
            SyncError::Invalid(_) => "invalid",
            SyncError::Expired => "expired",
            SyncError::NotFound => "not_found",
        }
    }
}

impl Serialize for SyncError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("error", self.code())?;
        map.serialize_entry("message", &self.to_string())?;
        map.end()
    }
}
