//! Offline-first overlay over server-fetched backlog groups.
//!
//! Each list keeps a [`LocalSessionData`] under `backlog_data_<listId>`.
//! Per group it records tombstones for locally removed items and the items
//! added locally. Reconciliation with server data always applies the same
//! rule: tombstoned items never come back, local additions are never lost.

use crate::serialization::JsonSerializer;
use crate::sync::ItemGroup;
use crate::traits::KeyValueStore;
use chrono::{DateTime, Duration, Utc};
use goat_core::{Clock, GoatResult};
use goat_domain::{BacklogGroup, BacklogItem, ItemId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::{Arc, Mutex};

pub const LOCAL_DATA_KEY_PREFIX: &str = "backlog_data_";

/// Interval after which a full resync is due.
pub const FULL_SYNC_INTERVAL_MINUTES: i64 = 5;

pub fn local_data_key(list_id: &str) -> String {
    format!("{}{}", LOCAL_DATA_KEY_PREFIX, list_id)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalGroupState {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "image_url")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Reconciled item list shown to the user.
    #[serde(default)]
    pub items: Vec<BacklogItem>,
    #[serde(default)]
    pub removed_item_ids: BTreeSet<ItemId>,
    #[serde(default)]
    pub added_items: Vec<BacklogItem>,
    #[serde(default)]
    pub is_expanded: bool,
    #[serde(default)]
    pub is_loaded: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_synced_at: Option<DateTime<Utc>>,
}

impl LocalGroupState {
    fn apply_metadata(&mut self, group: &ItemGroup) {
        self.name = group.name.clone();
        self.description = group.description.clone();
        self.image_url = group.image_url.clone();
        self.category = group.category.clone();
        self.updated_at = group.updated_at;
    }

    pub fn is_tombstoned(&self, item_id: &str) -> bool {
        self.removed_item_ids.contains(item_id)
    }

    /// Backlog view of this group for the item store.
    pub fn to_backlog_group(&self, group_id: &str) -> BacklogGroup {
        let mut group =
            BacklogGroup::new(group_id, self.name.clone()).with_items(self.items.clone());
        group.description = self.description.clone();
        group.image_url = self.image_url.clone();
        group.category = self.category.clone();
        group.is_expanded = self.is_expanded;
        group
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalSessionData {
    pub list_id: String,
    #[serde(default)]
    pub groups: BTreeMap<String, LocalGroupState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_full_sync: Option<DateTime<Utc>>,
}

impl LocalSessionData {
    pub fn new(list_id: &str) -> Self {
        Self {
            list_id: list_id.to_string(),
            groups: BTreeMap::new(),
            last_full_sync: None,
        }
    }

    /// Ids of groups whose items have been loaded at least once.
    pub fn loaded_group_ids(&self) -> Vec<String> {
        self.groups
            .iter()
            .filter(|(_, group)| group.is_loaded)
            .map(|(id, _)| id.clone())
            .collect()
    }
}

pub struct LocalDataManager {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    serializer: JsonSerializer,
    /// Serializes read-modify-write cycles of overlapping syncs.
    writes: Mutex<()>,
}

impl LocalDataManager {
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            serializer: JsonSerializer,
            writes: Mutex::new(()),
        }
    }

    /// Stored data for `list_id`, or an empty session. Unreadable data is
    /// discarded with a warning.
    pub fn get_session(&self, list_id: &str) -> GoatResult<LocalSessionData> {
        let Some(text) = self.store.get(&local_data_key(list_id))? else {
            return Ok(LocalSessionData::new(list_id));
        };
        match self.serializer.from_text::<LocalSessionData>(&text) {
            Ok(data) => Ok(data),
            Err(e) => {
                tracing::warn!("Discarding unreadable local data for {}: {}", list_id, e);
                Ok(LocalSessionData::new(list_id))
            }
        }
    }

    pub fn save_session(&self, data: &LocalSessionData) -> GoatResult<()> {
        let text = self.serializer.to_text(data)?;
        self.store.set(&local_data_key(&data.list_id), &text)
    }

    fn update<R>(
        &self,
        list_id: &str,
        apply: impl FnOnce(&mut LocalSessionData) -> R,
    ) -> GoatResult<R> {
        let _guard = self.writes.lock().unwrap_or_else(|e| e.into_inner());
        let mut data = self.get_session(list_id)?;
        let result = apply(&mut data);
        self.save_session(&data)?;
        Ok(result)
    }

    /// Merges fresh group metadata without touching local item state.
    pub fn initialize_from_api(
        &self,
        list_id: &str,
        groups: &[ItemGroup],
    ) -> GoatResult<LocalSessionData> {
        self.update(list_id, |data| {
            for group in groups {
                data.groups
                    .entry(group.id.clone())
                    .or_default()
                    .apply_metadata(group);
            }
            data.clone()
        })
    }

    /// Reconciles a group with the items the server returned: server items
    /// minus tombstones, followed by local additions.
    pub fn load_group_items(
        &self,
        list_id: &str,
        group_id: &str,
        api_items: Vec<BacklogItem>,
    ) -> GoatResult<Vec<BacklogItem>> {
        let now = self.clock.now();
        self.update(list_id, |data| {
            let group = data.groups.entry(group_id.to_string()).or_default();
            let added_ids: HashSet<&str> =
                group.added_items.iter().map(|item| item.id.as_str()).collect();
            let mut items: Vec<BacklogItem> = api_items
                .into_iter()
                .filter(|item| {
                    !group.is_tombstoned(&item.id) && !added_ids.contains(item.id.as_str())
                })
                .collect();
            items.extend(group.added_items.iter().cloned());
            group.items = items;
            group.is_loaded = true;
            group.last_synced_at = Some(now);
            group.items.clone()
        })
    }

    pub fn remove_item_locally(
        &self,
        list_id: &str,
        group_id: &str,
        item_id: &str,
    ) -> GoatResult<()> {
        self.update(list_id, |data| {
            let group = data.groups.entry(group_id.to_string()).or_default();
            group.removed_item_ids.insert(item_id.to_string());
            group.added_items.retain(|item| item.id != item_id);
            group.items.retain(|item| item.id != item_id);
        })?;
        tracing::debug!("Tombstoned {} in group {}", item_id, group_id);
        Ok(())
    }

    /// Adds an item locally. A tombstoned item is brought back.
    pub fn add_item_locally(
        &self,
        list_id: &str,
        group_id: &str,
        item: BacklogItem,
    ) -> GoatResult<()> {
        self.update(list_id, |data| {
            let group = data.groups.entry(group_id.to_string()).or_default();
            group.removed_item_ids.remove(&item.id);
            if !group.added_items.iter().any(|i| i.id == item.id) {
                group.added_items.push(item.clone());
            }
            if !group.items.iter().any(|i| i.id == item.id) {
                group.items.push(item);
            }
        })
    }

    pub fn get_available_items(
        &self,
        list_id: &str,
        group_id: &str,
    ) -> GoatResult<Vec<BacklogItem>> {
        Ok(self
            .get_session(list_id)?
            .groups
            .get(group_id)
            .map(|group| group.items.clone())
            .unwrap_or_default())
    }

    pub fn toggle_group_expanded(&self, list_id: &str, group_id: &str) -> GoatResult<bool> {
        self.update(list_id, |data| {
            let group = data.groups.entry(group_id.to_string()).or_default();
            group.is_expanded = !group.is_expanded;
            group.is_expanded
        })
    }

    pub fn needs_sync(&self, list_id: &str) -> GoatResult<bool> {
        let data = self.get_session(list_id)?;
        Ok(match data.last_full_sync {
            Some(last) => self.clock.now() - last > Duration::minutes(FULL_SYNC_INTERVAL_MINUTES),
            None => true,
        })
    }

    pub fn mark_full_sync(&self, list_id: &str) -> GoatResult<()> {
        let now = self.clock.now();
        self.update(list_id, |data| data.last_full_sync = Some(now))
    }

    pub fn clear_session(&self, list_id: &str) -> GoatResult<()> {
        tracing::info!("Clearing local data for {}", list_id);
        self.store.remove(&local_data_key(list_id))
    }

    /// Appends server items that are neither known locally nor tombstoned,
    /// returning them.
    pub fn merge_server_items(
        &self,
        list_id: &str,
        group_id: &str,
        server_items: Vec<BacklogItem>,
    ) -> GoatResult<Vec<BacklogItem>> {
        let now = self.clock.now();
        self.update(list_id, |data| {
            let group = data.groups.entry(group_id.to_string()).or_default();
            let known: HashSet<ItemId> = group.items.iter().map(|item| item.id.clone()).collect();
            let new_items: Vec<BacklogItem> = server_items
                .into_iter()
                .filter(|item| !known.contains(&item.id) && !group.is_tombstoned(&item.id))
                .collect();
            group.items.extend(new_items.iter().cloned());
            group.last_synced_at = Some(now);
            new_items
        })
    }

    /// Backlog groups for the item store, in group id order.
    pub fn backlog_groups(&self, list_id: &str) -> GoatResult<Vec<BacklogGroup>> {
        Ok(self
            .get_session(list_id)?
            .groups
            .iter()
            .map(|(id, group)| group.to_backlog_group(id))
            .collect())
    }
}
