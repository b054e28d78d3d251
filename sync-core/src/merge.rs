//! Local-wins merge of two data maps.
//!
//! Shared by QR and LAN sync. The result starts from the local map; remote
//! keys are added only where the local map has no entry. This is a flat
//! union, not a CRDT: nested values are never merged.

use autus_sync_types::SyncData;
use serde::{Deserialize, Serialize};

/// Outcome of merging a local and a remote data map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeReport {
    /// The merged map.
    pub merged: SyncData,
    /// Number of keys in the local input.
    pub local_items: usize,
    /// Number of keys in the remote input.
    pub remote_items: usize,
    /// Number of keys in the merged map.
    pub merged_items: usize,
}

/// Merge `remote` into a copy of `local`, keeping local values on collision.
pub fn merge(local: &SyncData, remote: &SyncData) -> SyncData {
    let mut merged = local.clone();
    for (key, value) in remote {
        if !merged.contains_key(key) {
            merged.insert(key.clone(), value.clone());
        }
    }
    merged
}

/// Merge and count items on each side.
pub fn merge_with_report(local: &SyncData, remote: &SyncData) -> MergeReport {
    let merged = merge(local, remote);
    MergeReport {
        local_items: local.len(),
        remote_items: remote.len(),
        merged_items: merged.len(),
        merged,
    }
}
