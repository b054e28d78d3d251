//! # sync-core
//!
//! Pure logic for Autus device sync (no I/O, instant tests).
//!
//! This crate implements the pairing protocol and the merge rule without
//! any network access or shared state, enabling fast unit tests.
//!
//! ## Design Philosophy
//!
//! All modules in this crate are **pure** - they take input and produce output
//! without side effects. Time is an explicit argument (or a [`Clock`] the
//! caller injects), so expiry is deterministic under test.
//!
//! The shared maps and the LAN probe live in `sync-device`, which drives
//! these types from concurrent callers.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod clock;
pub mod merge;
pub mod pairing;
pub mod session;

pub use clock::{Clock, ManualClock, SystemClock};
pub use merge::{merge, merge_with_report, MergeReport};
pub use pairing::{
    accept_sync, parse_qr_string, PairingPayload, PairingSecret, SyncAcceptance, SyncStatus,
    DEFAULT_PAIRING_TTL, MAX_PAIRING_TTL, PAYLOAD_TAG, PAYLOAD_VERSION, QR_SCHEME_PREFIX,
};
pub use session::{CompletedSync, PairingSession, PendingSync};
