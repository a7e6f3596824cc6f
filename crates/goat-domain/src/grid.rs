//! Fixed-size ranking grid.
//!
//! Slots are addressed by position `0..max_grid_size`. Every slot always
//! exists; an unfilled slot holds the empty sentinel returned by
//! [`GridItem::empty`].

use crate::item::{ItemId, Transferable};
use goat_core::{GoatError, GoatResult};
use serde::{Deserialize, Serialize};

pub const GRID_ID_PREFIX: &str = "grid-";

pub fn grid_slot_id(position: usize) -> String {
    format!("{}{}", GRID_ID_PREFIX, position)
}

/// Parses `"grid-<index>"` into the slot index.
pub fn parse_grid_slot_id(id: &str) -> Option<usize> {
    id.strip_prefix(GRID_ID_PREFIX)?.parse().ok()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridItem {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "image_url")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub matched: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_with: Option<ItemId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backlog_item_id: Option<ItemId>,
}

impl GridItem {
    pub fn empty(position: usize) -> Self {
        Self {
            id: grid_slot_id(position),
            title: String::new(),
            description: None,
            image_url: None,
            tags: Vec::new(),
            matched: false,
            matched_with: None,
            backlog_item_id: None,
        }
    }

    fn filled(position: usize, item: &Transferable) -> Self {
        Self {
            id: grid_slot_id(position),
            title: item.title.clone(),
            description: item.description.clone(),
            image_url: item.image_url.clone(),
            tags: item.tags.clone(),
            matched: true,
            matched_with: Some(item.id.clone()),
            backlog_item_id: Some(item.id.clone()),
        }
    }

    /// The id of the item placed in this slot, if any.
    pub fn item_id(&self) -> Option<&str> {
        if !self.matched {
            return None;
        }
        self.backlog_item_id
            .as_deref()
            .or(self.matched_with.as_deref())
    }

    /// Rebuilds the transferable payload from the slot's own fields.
    pub fn to_transferable(&self) -> Option<Transferable> {
        let id = self.item_id()?;
        Some(Transferable {
            id: id.to_string(),
            title: self.title.clone(),
            description: self.description.clone(),
            image_url: self.image_url.clone(),
            tags: self.tags.clone(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GridStore {
    items: Vec<GridItem>,
}

impl GridStore {
    pub fn new(max_grid_size: usize) -> Self {
        Self {
            items: (0..max_grid_size).map(GridItem::empty).collect(),
        }
    }

    pub fn max_grid_size(&self) -> usize {
        self.items.len()
    }

    pub fn grid_items(&self) -> &[GridItem] {
        &self.items
    }

    pub fn get(&self, position: usize) -> Option<&GridItem> {
        self.items.get(position)
    }

    pub fn matched_count(&self) -> usize {
        self.items.iter().filter(|item| item.matched).count()
    }

    pub fn position_of(&self, item_id: &str) -> Option<usize> {
        self.items
            .iter()
            .position(|slot| slot.item_id() == Some(item_id))
    }

    fn check_bounds(&self, position: usize) -> GoatResult<()> {
        if position >= self.items.len() {
            return Err(GoatError::OutOfBounds {
                index: position,
                len: self.items.len(),
            });
        }
        Ok(())
    }

    /// Places `item` at `position`, returning the previous occupant if the
    /// slot was filled.
    pub fn assign_item_to_grid(
        &mut self,
        item: &Transferable,
        position: usize,
    ) -> GoatResult<Option<GridItem>> {
        self.check_bounds(position)?;
        if item.title.is_empty() {
            return Err(GoatError::Validation(format!(
                "item {} has an empty title",
                item.id
            )));
        }
        let previous = std::mem::replace(
            &mut self.items[position],
            GridItem::filled(position, item),
        );
        Ok(previous.matched.then_some(previous))
    }

    /// Empties the slot at `position` and returns what was there.
    pub fn remove_item_from_grid(&mut self, position: usize) -> GoatResult<GridItem> {
        self.check_bounds(position)?;
        Ok(std::mem::replace(
            &mut self.items[position],
            GridItem::empty(position),
        ))
    }

    /// Swaps the contents of two slots. Slot ids stay bound to positions.
    pub fn move_grid_item(&mut self, from: usize, to: usize) -> GoatResult<()> {
        self.check_bounds(from)?;
        self.check_bounds(to)?;
        if from == to {
            return Ok(());
        }
        self.items.swap(from, to);
        self.items[from].id = grid_slot_id(from);
        self.items[to].id = grid_slot_id(to);
        Ok(())
    }

    /// Resets every slot to the empty sentinel and returns the ids of the
    /// items that were placed.
    pub fn clear_grid(&mut self) -> Vec<ItemId> {
        let released = self
            .items
            .iter()
            .filter_map(|slot| slot.item_id().map(str::to_string))
            .collect();
        let size = self.items.len();
        self.items = (0..size).map(GridItem::empty).collect();
        released
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str) -> Transferable {
        Transferable::new(id, format!("Title {}", id))
    }

    #[test]
    fn test_new_grid_is_empty() {
        let grid = GridStore::new(4);
        assert_eq!(grid.max_grid_size(), 4);
        assert_eq!(grid.matched_count(), 0);
        assert_eq!(grid.get(3).unwrap().id, "grid-3");
    }

    #[test]
    fn test_assign_and_displace() {
        let mut grid = GridStore::new(3);
        assert!(grid.assign_item_to_grid(&item("a"), 1).unwrap().is_none());

        let displaced = grid.assign_item_to_grid(&item("b"), 1).unwrap().unwrap();
        assert_eq!(displaced.item_id(), Some("a"));
        assert_eq!(grid.get(1).unwrap().item_id(), Some("b"));
        assert_eq!(grid.matched_count(), 1);
    }

    #[test]
    fn test_assign_out_of_bounds() {
        let mut grid = GridStore::new(2);
        let err = grid.assign_item_to_grid(&item("a"), 2).unwrap_err();
        assert!(matches!(err, GoatError::OutOfBounds { index: 2, len: 2 }));
    }

    #[test]
    fn test_assign_rejects_empty_title() {
        let mut grid = GridStore::new(2);
        let untitled = Transferable::new("a", "");
        assert!(grid.assign_item_to_grid(&untitled, 0).is_err());
        assert!(!grid.get(0).unwrap().matched);
    }

    #[test]
    fn test_move_swaps_and_keeps_slot_ids() {
        let mut grid = GridStore::new(3);
        grid.assign_item_to_grid(&item("a"), 0).unwrap();
        grid.move_grid_item(0, 2).unwrap();

        assert!(!grid.get(0).unwrap().matched);
        assert_eq!(grid.get(0).unwrap().id, "grid-0");
        assert_eq!(grid.get(2).unwrap().item_id(), Some("a"));
        assert_eq!(grid.get(2).unwrap().id, "grid-2");
    }

    #[test]
    fn test_clear_is_idempotent() {
        let mut grid = GridStore::new(5);
        grid.assign_item_to_grid(&item("a"), 0).unwrap();
        grid.assign_item_to_grid(&item("b"), 4).unwrap();

        let released = grid.clear_grid();
        assert_eq!(released, vec!["a".to_string(), "b".to_string()]);
        let once = grid.clone();

        assert!(grid.clear_grid().is_empty());
        assert_eq!(grid, once);
        assert_eq!(grid.max_grid_size(), 5);
        assert!(grid
            .grid_items()
            .iter()
            .enumerate()
            .all(|(i, slot)| *slot == GridItem::empty(i)));
    }

    #[test]
    fn test_slot_id_parsing() {
        assert_eq!(parse_grid_slot_id("grid-7"), Some(7));
        assert_eq!(parse_grid_slot_id("grid-x"), None);
        assert_eq!(parse_grid_slot_id("tier-S"), None);
    }

    #[test]
    fn test_transferable_from_slot() {
        let mut grid = GridStore::new(1);
        let mut source = item("a");
        source.tags = vec!["rock".to_string()];
        grid.assign_item_to_grid(&source, 0).unwrap();

        assert_eq!(grid.get(0).unwrap().to_transferable(), Some(source));
        assert!(GridItem::empty(0).to_transferable().is_none());
    }
}
