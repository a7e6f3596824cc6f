use crate::local_data::LocalGroupState;
use goat_domain::{BacklogItem, ItemId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConflictKind {
    /// Tombstoned locally, still returned by the server.
    RemovedLocallyPresentRemotely,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncConflict {
    pub group_id: String,
    pub item_id: ItemId,
    pub kind: ConflictKind,
}

/// Compares a group's local overlay with what the server returned.
///
/// Only local removals are checked. An item the server dropped while it is
/// still present locally is not reported.
pub fn detect_conflicts(
    group_id: &str,
    local: &LocalGroupState,
    server_items: &[BacklogItem],
) -> Vec<SyncConflict> {
    server_items
        .iter()
        .filter(|item| local.is_tombstoned(&item.id))
        .map(|item| SyncConflict {
            group_id: group_id.to_string(),
            item_id: item.id.clone(),
            kind: ConflictKind::RemovedLocallyPresentRemotely,
        })
        .collect()
}
