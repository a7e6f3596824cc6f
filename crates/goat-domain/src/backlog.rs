use crate::item::{BacklogItem, ItemId};
use goat_core::{GoatError, GoatResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BacklogGroup {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "image_url")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub items: Vec<BacklogItem>,
    #[serde(default)]
    pub is_expanded: bool,
}

impl BacklogGroup {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            image_url: None,
            category: None,
            items: Vec::new(),
            is_expanded: false,
        }
    }

    pub fn with_items(mut self, items: Vec<BacklogItem>) -> Self {
        self.items = items;
        self
    }
}

/// Owns the backlog groups of a session and the "used" flag of every item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BacklogStore {
    groups: Vec<BacklogGroup>,
}

impl BacklogStore {
    pub fn new(groups: Vec<BacklogGroup>) -> Self {
        Self { groups }
    }

    pub fn groups(&self) -> &[BacklogGroup] {
        &self.groups
    }

    pub fn group(&self, group_id: &str) -> Option<&BacklogGroup> {
        self.groups.iter().find(|g| g.id == group_id)
    }

    pub fn get_item_by_id(&self, item_id: &str) -> Option<&BacklogItem> {
        self.groups
            .iter()
            .flat_map(|g| g.items.iter())
            .find(|item| item.id == item_id)
    }

    pub fn is_item_used(&self, item_id: &str) -> bool {
        self.get_item_by_id(item_id)
            .is_some_and(|item| item.matched)
    }

    /// Flags every occurrence of `item_id` as used or unused. Releasing an
    /// item also forgets which slot it was matched with.
    pub fn mark_item_as_used(&mut self, item_id: &str, used: bool) -> GoatResult<()> {
        let mut found = false;
        for item in self.items_mut(item_id) {
            item.matched = used;
            if !used {
                item.matched_with = None;
            }
            found = true;
        }
        if found {
            Ok(())
        } else {
            Err(GoatError::NotFound(format!("backlog item {}", item_id)))
        }
    }

    pub fn set_matched_with(&mut self, item_id: &str, slot_id: Option<String>) -> GoatResult<()> {
        let mut found = false;
        for item in self.items_mut(item_id) {
            item.matched_with = slot_id.clone();
            found = true;
        }
        if found {
            Ok(())
        } else {
            Err(GoatError::NotFound(format!("backlog item {}", item_id)))
        }
    }

    /// Releases an item if the backlog knows it; unknown ids are ignored.
    pub fn release(&mut self, item_id: &str) {
        for item in self.items_mut(item_id) {
            item.matched = false;
            item.matched_with = None;
        }
    }

    fn items_mut<'a>(&'a mut self, item_id: &'a str) -> impl Iterator<Item = &'a mut BacklogItem> {
        self.groups
            .iter_mut()
            .flat_map(|g| g.items.iter_mut())
            .filter(move |item| item.id == item_id)
    }

    pub fn unused_items(&self) -> impl Iterator<Item = &BacklogItem> {
        self.groups
            .iter()
            .flat_map(|g| g.items.iter())
            .filter(|item| !item.matched)
    }

    pub fn toggle_group(&mut self, group_id: &str) -> GoatResult<bool> {
        let group = self
            .groups
            .iter_mut()
            .find(|g| g.id == group_id)
            .ok_or_else(|| GoatError::NotFound(format!("backlog group {}", group_id)))?;
        group.is_expanded = !group.is_expanded;
        Ok(group.is_expanded)
    }

    /// Replaces the groups with freshly reconciled ones. Placement flags
    /// come from `placed`, which maps every item sitting on the grid, in a
    /// tier or in the pool to its grid slot id (`None` off the grid).
    /// Expansion carries over from groups already known.
    pub fn replace_groups(
        &mut self,
        mut groups: Vec<BacklogGroup>,
        placed: &HashMap<ItemId, Option<String>>,
    ) {
        let expanded: HashMap<&str, bool> = self
            .groups
            .iter()
            .map(|g| (g.id.as_str(), g.is_expanded))
            .collect();

        for group in groups.iter_mut() {
            if let Some(is_expanded) = expanded.get(group.id.as_str()) {
                group.is_expanded = *is_expanded;
            }
            for item in group.items.iter_mut() {
                let slot = placed.get(&item.id);
                item.matched = slot.is_some();
                item.matched_with = slot.cloned().flatten();
            }
        }
        self.groups = groups;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> BacklogStore {
        BacklogStore::new(vec![
            BacklogGroup::new("g1", "Rock").with_items(vec![
                BacklogItem::new("a", "Alpha"),
                BacklogItem::new("b", "Beta"),
            ]),
            BacklogGroup::new("g2", "Jazz").with_items(vec![BacklogItem::new("c", "Gamma")]),
        ])
    }

    #[test]
    fn test_lookup_and_usage() {
        let mut backlog = store();
        assert_eq!(backlog.get_item_by_id("c").unwrap().title, "Gamma");
        assert!(!backlog.is_item_used("a"));

        backlog.mark_item_as_used("a", true).unwrap();
        backlog.set_matched_with("a", Some("grid-0".to_string())).unwrap();
        assert!(backlog.is_item_used("a"));
        assert_eq!(backlog.unused_items().count(), 2);

        backlog.mark_item_as_used("a", false).unwrap();
        assert!(!backlog.is_item_used("a"));
        assert!(backlog.get_item_by_id("a").unwrap().matched_with.is_none());
    }

    #[test]
    fn test_mark_unknown_item_fails() {
        let mut backlog = store();
        assert!(matches!(
            backlog.mark_item_as_used("zzz", true),
            Err(GoatError::NotFound(_))
        ));
        assert!(!backlog.is_item_used("zzz"));
    }

    #[test]
    fn test_toggle_group() {
        let mut backlog = store();
        assert!(backlog.toggle_group("g1").unwrap());
        assert!(!backlog.toggle_group("g1").unwrap());
        assert!(backlog.toggle_group("missing").is_err());
    }

    #[test]
    fn test_replace_groups_takes_placement_from_caller() {
        let mut backlog = store();
        backlog.mark_item_as_used("a", true).unwrap();
        backlog.toggle_group("g1").unwrap();

        let placed = HashMap::from([
            ("b".to_string(), Some("grid-4".to_string())),
            ("d".to_string(), None),
        ]);
        backlog.replace_groups(
            vec![BacklogGroup::new("g1", "Rock (renamed)").with_items(vec![
                BacklogItem::new("a", "Alpha"),
                BacklogItem::new("b", "Beta"),
                BacklogItem::new("d", "Delta"),
            ])],
            &placed,
        );

        let group = backlog.group("g1").unwrap();
        assert_eq!(group.name, "Rock (renamed)");
        assert!(group.is_expanded);
        // Stale flags from the previous groups are not trusted.
        assert!(!backlog.is_item_used("a"));
        let b = backlog.get_item_by_id("b").unwrap();
        assert!(b.matched);
        assert_eq!(b.matched_with.as_deref(), Some("grid-4"));
        let d = backlog.get_item_by_id("d").unwrap();
        assert!(d.matched);
        assert!(d.matched_with.is_none());
        assert!(backlog.get_item_by_id("c").is_none());
    }
}
