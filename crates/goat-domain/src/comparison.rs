use crate::item::BacklogItem;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Upper bound on items held side by side in a comparison.
pub const MAX_COMPARE_ITEMS: usize = 4;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComparisonMode {
    #[default]
    SideBySide,
    Overlay,
    Stats,
}

/// Ephemeral comparison overlay. Reset whenever the active session changes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonState {
    pub is_open: bool,
    pub items: Vec<BacklogItem>,
    pub selected_ids: BTreeSet<String>,
    pub mode: ComparisonMode,
}

impl ComparisonState {
    pub fn open(&mut self, items: Vec<BacklogItem>) {
        self.items = items;
        self.selected_ids.clear();
        self.is_open = true;
    }

    pub fn close(&mut self) {
        self.is_open = false;
    }

    /// Returns false when the item is already present or the comparison is full.
    pub fn add_item(&mut self, item: BacklogItem) -> bool {
        if self.items.len() >= MAX_COMPARE_ITEMS || self.items.iter().any(|i| i.id == item.id) {
            return false;
        }
        self.items.push(item);
        true
    }

    pub fn remove_item(&mut self, item_id: &str) {
        self.items.retain(|i| i.id != item_id);
        self.selected_ids.remove(item_id);
    }

    /// Flips selection of an item that is part of the comparison.
    pub fn toggle_selection(&mut self, item_id: &str) -> bool {
        if !self.items.iter().any(|i| i.id == item_id) {
            return false;
        }
        if !self.selected_ids.remove(item_id) {
            self.selected_ids.insert(item_id.to_string());
        }
        self.selected_ids.contains(item_id)
    }

    pub fn set_mode(&mut self, mode: ComparisonMode) {
        self.mode = mode;
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
