use async_trait::async_trait;
use chrono::{DateTime, Utc};
use goat_core::{GoatError, GoatResult};
use goat_domain::BacklogItem;
#[cfg(test)]
use mockall::automock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

/// A backlog group as served by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemGroup {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "image_url")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub items: Vec<BacklogItem>,
}

impl ItemGroup {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            image_url: None,
            category: None,
            updated_at: None,
            items: Vec::new(),
        }
    }

    pub fn with_items(mut self, items: Vec<BacklogItem>) -> Self {
        self.items = items;
        self
    }
}

/// Backend access to item groups.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ItemGroupsApi: Send + Sync {
    /// Fetches a group; items are left empty unless `include_items` is set.
    async fn get_group(&self, group_id: &str, include_items: bool) -> GoatResult<ItemGroup>;
}

/// Serves groups from memory, optionally seeded from a JSON file holding an
/// array of groups.
#[derive(Debug, Default)]
pub struct StaticGroupsApi {
    groups: RwLock<BTreeMap<String, ItemGroup>>,
    calls: AtomicUsize,
}

impl StaticGroupsApi {
    pub fn new(groups: Vec<ItemGroup>) -> Self {
        Self {
            groups: RwLock::new(groups.into_iter().map(|g| (g.id.clone(), g)).collect()),
            calls: AtomicUsize::new(0),
        }
    }

    /// A missing file yields an empty catalog.
    pub fn from_json_file(path: &Path) -> GoatResult<Self> {
        if !path.exists() {
            tracing::debug!("No group catalog at {}", path.display());
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)?;
        let groups: Vec<ItemGroup> =
            serde_json::from_str(&text).map_err(|e| GoatError::Serialization(e.to_string()))?;
        Ok(Self::new(groups))
    }

    pub fn upsert_group(&self, group: ItemGroup) {
        self.groups
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(group.id.clone(), group);
    }

    pub fn remove_item(&self, group_id: &str, item_id: &str) {
        let mut groups = self.groups.write().unwrap_or_else(|e| e.into_inner());
        if let Some(group) = groups.get_mut(group_id) {
            group.items.retain(|item| item.id != item_id);
        }
    }

    /// Number of `get_group` calls served so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ItemGroupsApi for StaticGroupsApi {
    async fn get_group(&self, group_id: &str, include_items: bool) -> GoatResult<ItemGroup> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let groups = self.groups.read().unwrap_or_else(|e| e.into_inner());
        let mut group = groups
            .get(group_id)
            .cloned()
            .ok_or_else(|| GoatError::Api(format!("group {} not found", group_id)))?;
        if !include_items {
            group.items.clear();
        }
        Ok(group)
    }
}
