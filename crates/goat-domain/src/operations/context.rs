use crate::item::ItemId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DragSourceType {
    Backlog,
    Grid,
    Tier,
    UnrankedPool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DropTargetType {
    GridSlot,
    Tier,
    UnrankedPool,
    Backlog,
    Compare,
}

/// Where a drag started.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DragSource {
    pub source_type: DragSourceType,
    pub item_id: ItemId,
    pub tier_id: Option<String>,
    /// Index within the source tier.
    pub index: Option<usize>,
    pub grid_position: Option<usize>,
}

impl DragSource {
    pub fn backlog(item_id: impl Into<ItemId>) -> Self {
        Self {
            source_type: DragSourceType::Backlog,
            item_id: item_id.into(),
            tier_id: None,
            index: None,
            grid_position: None,
        }
    }

    pub fn grid(position: usize, item_id: impl Into<ItemId>) -> Self {
        Self {
            source_type: DragSourceType::Grid,
            item_id: item_id.into(),
            tier_id: None,
            index: None,
            grid_position: Some(position),
        }
    }

    pub fn tier(tier_id: impl Into<String>, item_id: impl Into<ItemId>, index: usize) -> Self {
        Self {
            source_type: DragSourceType::Tier,
            item_id: item_id.into(),
            tier_id: Some(tier_id.into()),
            index: Some(index),
            grid_position: None,
        }
    }

    pub fn pool(item_id: impl Into<ItemId>) -> Self {
        Self {
            source_type: DragSourceType::UnrankedPool,
            item_id: item_id.into(),
            tier_id: None,
            index: None,
            grid_position: None,
        }
    }
}

/// Where a drag was dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropTarget {
    pub target_type: DropTargetType,
    pub tier_id: Option<String>,
    /// Index within the target tier; `None` appends.
    pub index: Option<usize>,
    pub grid_position: Option<usize>,
}

impl DropTarget {
    fn of(target_type: DropTargetType) -> Self {
        Self {
            target_type,
            tier_id: None,
            index: None,
            grid_position: None,
        }
    }

    pub fn grid_slot(position: usize) -> Self {
        Self {
            grid_position: Some(position),
            ..Self::of(DropTargetType::GridSlot)
        }
    }

    pub fn tier(tier_id: impl Into<String>, index: Option<usize>) -> Self {
        Self {
            tier_id: Some(tier_id.into()),
            index,
            ..Self::of(DropTargetType::Tier)
        }
    }

    pub fn unranked_pool() -> Self {
        Self::of(DropTargetType::UnrankedPool)
    }

    pub fn backlog() -> Self {
        Self::of(DropTargetType::Backlog)
    }

    pub fn compare() -> Self {
        Self::of(DropTargetType::Compare)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DragContext {
    pub source: DragSource,
    pub target: DropTarget,
    pub max_grid_size: usize,
}

impl DragContext {
    pub fn new(source: DragSource, target: DropTarget, max_grid_size: usize) -> Self {
        Self {
            source,
            target,
            max_grid_size,
        }
    }
}
