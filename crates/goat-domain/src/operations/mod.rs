//! Drag-and-drop operations.
//!
//! Every operation is a unit struct implementing [`DragOperation`]:
//! `validate` is a pure precondition check against the stores, and
//! `execute` applies the mutation. Execution runs inside
//! [`run_atomically`], which captures the stores beforehand and restores
//! them if any store call fails, so a failed operation never leaves a
//! partial mutation behind.

pub mod add_to_compare;
pub mod backlog_to_grid;
pub mod context;
pub mod grid_move;
pub mod grid_to_backlog;
pub mod grid_to_tier;
pub mod rank_from_pool;
pub mod result;
pub mod tier_assign;
pub mod tier_move;
pub mod tier_to_grid;
pub mod tier_transfer;
pub mod unrank;

pub use add_to_compare::AddToCompare;
pub use backlog_to_grid::BacklogToGrid;
pub use context::{DragContext, DragSource, DragSourceType, DropTarget, DropTargetType};
pub use grid_move::GridMove;
pub use grid_to_backlog::GridToBacklog;
pub use grid_to_tier::GridToTier;
pub use rank_from_pool::RankFromPool;
pub use result::{DragOperationResult, ErrorCode, OperationAction, ValidationResult};
pub use tier_assign::TierAssign;
pub use tier_move::TierMove;
pub use tier_to_grid::TierToGrid;
pub use tier_transfer::TierTransfer;
pub use unrank::Unrank;

use crate::backlog::BacklogStore;
use crate::grid::{GridItem, GridStore};
use crate::item::BacklogItem;
use crate::tier::TierStore;
use goat_core::GoatResult;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Mutable view over the stores an operation may touch.
pub struct OperationStoreContext<'a> {
    pub backlog: &'a mut BacklogStore,
    pub tiers: &'a mut TierStore,
    pub grid: &'a mut GridStore,
    pub compare_list: &'a mut Vec<BacklogItem>,
}

impl OperationStoreContext<'_> {
    /// The filled grid slot a grid-sourced drag starts from.
    pub fn grid_source(&self, context: &DragContext) -> Option<&GridItem> {
        if context.source.source_type != DragSourceType::Grid {
            return None;
        }
        self.grid
            .get(context.source.grid_position?)
            .filter(|slot| slot.matched)
    }

    /// The tier a drop targets, provided it exists.
    pub fn target_tier<'c>(&self, context: &'c DragContext) -> Result<&'c str, ValidationResult> {
        let Some(tier_id) = context.target.tier_id.as_deref() else {
            return Err(ValidationResult::invalid(
                ErrorCode::TargetPositionInvalid,
                "Drop target is not a tier",
            ));
        };
        if self.tiers.tier(tier_id).is_none() {
            return Err(ValidationResult::invalid(
                ErrorCode::TargetPositionInvalid,
                format!("Unknown tier {}", tier_id),
            )
            .with_debug(serde_json::json!({ "tierId": tier_id })));
        }
        Ok(tier_id)
    }
}

pub trait DragOperation: Send + Sync {
    fn kind(&self) -> DragOperationKind;

    /// Side-effect free precondition check.
    fn validate(&self, context: &DragContext, stores: &OperationStoreContext<'_>)
        -> ValidationResult;

    /// Applies the operation. Store failures come back as a rejected result.
    fn execute(
        &self,
        context: &DragContext,
        stores: &mut OperationStoreContext<'_>,
    ) -> DragOperationResult;
}

/// Closed set of operations the dispatcher can select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DragOperationKind {
    TierAssign,
    TierMove,
    TierTransfer,
    Unrank,
    RankFromPool,
    TierToGrid,
    GridToTier,
    BacklogToGrid,
    GridMove,
    GridToBacklog,
    AddToCompare,
}

impl DragOperationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TierAssign => "tier-assign",
            Self::TierMove => "tier-move",
            Self::TierTransfer => "tier-transfer",
            Self::Unrank => "unrank",
            Self::RankFromPool => "rank-from-pool",
            Self::TierToGrid => "tier-to-grid",
            Self::GridToTier => "grid-to-tier",
            Self::BacklogToGrid => "backlog-to-grid",
            Self::GridMove => "grid-move",
            Self::GridToBacklog => "grid-to-backlog",
            Self::AddToCompare => "add-to-compare",
        }
    }

    /// Picks the operation for a source/target pair, if any applies.
    pub fn classify(context: &DragContext) -> Option<Self> {
        use DragSourceType as S;
        use DropTargetType as T;

        let kind = match (context.source.source_type, context.target.target_type) {
            (S::Backlog, T::Tier) => Self::TierAssign,
            (S::Backlog, T::GridSlot) => Self::BacklogToGrid,
            (S::Backlog | S::Grid, T::Compare) => Self::AddToCompare,
            (S::Tier, T::Tier) => {
                if context.source.tier_id == context.target.tier_id {
                    Self::TierMove
                } else {
                    Self::TierTransfer
                }
            }
            (S::Tier, T::UnrankedPool) => Self::Unrank,
            (S::UnrankedPool, T::Tier) => Self::RankFromPool,
            (S::Tier | S::UnrankedPool, T::GridSlot) => Self::TierToGrid,
            (S::Grid, T::Tier) => Self::GridToTier,
            (S::Grid, T::GridSlot) => Self::GridMove,
            (S::Grid, T::Backlog) => Self::GridToBacklog,
            _ => return None,
        };
        Some(kind)
    }

    pub fn operation(self) -> &'static dyn DragOperation {
        match self {
            Self::TierAssign => &TierAssign,
            Self::TierMove => &TierMove,
            Self::TierTransfer => &TierTransfer,
            Self::Unrank => &Unrank,
            Self::RankFromPool => &RankFromPool,
            Self::TierToGrid => &TierToGrid,
            Self::GridToTier => &GridToTier,
            Self::BacklogToGrid => &BacklogToGrid,
            Self::GridMove => &GridMove,
            Self::GridToBacklog => &GridToBacklog,
            Self::AddToCompare => &AddToCompare,
        }
    }
}

impl fmt::Display for DragOperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

struct StoreCheckpoint {
    backlog: BacklogStore,
    tiers: TierStore,
    grid: GridStore,
    compare_list: Vec<BacklogItem>,
}

impl StoreCheckpoint {
    fn capture(stores: &OperationStoreContext<'_>) -> Self {
        Self {
            backlog: stores.backlog.clone(),
            tiers: stores.tiers.clone(),
            grid: stores.grid.clone(),
            compare_list: stores.compare_list.clone(),
        }
    }

    fn restore(self, stores: &mut OperationStoreContext<'_>) {
        *stores.backlog = self.backlog;
        *stores.tiers = self.tiers;
        *stores.grid = self.grid;
        *stores.compare_list = self.compare_list;
    }
}

/// Runs `apply` against the stores, rolling every store back and returning
/// an `UNKNOWN_ERROR` rejection if it fails.
pub(crate) fn run_atomically<'a, F>(
    kind: DragOperationKind,
    stores: &mut OperationStoreContext<'a>,
    apply: F,
) -> DragOperationResult
where
    F: FnOnce(&mut OperationStoreContext<'a>) -> GoatResult<DragOperationResult>,
{
    let checkpoint = StoreCheckpoint::capture(stores);
    match apply(stores) {
        Ok(result) => result,
        Err(e) => {
            checkpoint.restore(stores);
            tracing::warn!("{} failed and was rolled back: {}", kind, e);
            DragOperationResult::reject(Some(kind), ErrorCode::UnknownError, e.to_string())
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::backlog::BacklogGroup;
    use crate::item::Transferable;

    /// Owned stores for building an [`OperationStoreContext`] in tests.
    pub struct Fixture {
        pub backlog: BacklogStore,
        pub tiers: TierStore,
        pub grid: GridStore,
        pub compare_list: Vec<BacklogItem>,
    }

    impl Fixture {
        pub fn new(grid_size: usize, backlog_ids: &[&str]) -> Self {
            let items = backlog_ids
                .iter()
                .map(|id| BacklogItem::new(*id, format!("Item {}", id)))
                .collect();
            Self {
                backlog: BacklogStore::new(vec![
                    BacklogGroup::new("g1", "Group").with_items(items)
                ]),
                tiers: TierStore::default(),
                grid: GridStore::new(grid_size),
                compare_list: Vec::new(),
            }
        }

        /// Places a backlog item into a tier the way a prior assign would.
        pub fn rank(&mut self, item_id: &str, tier_id: &str) {
            let item = self
                .backlog
                .get_item_by_id(item_id)
                .map(BacklogItem::to_transferable)
                .unwrap_or_else(|| Transferable::new(item_id, item_id));
            self.backlog.mark_item_as_used(item_id, true).ok();
            self.tiers.assign_to_tier(item_id, tier_id, Some(item)).unwrap();
        }

        pub fn place(&mut self, item_id: &str, position: usize) {
            let item = self.backlog.get_item_by_id(item_id).unwrap().to_transferable();
            self.grid.assign_item_to_grid(&item, position).unwrap();
            self.backlog.mark_item_as_used(item_id, true).unwrap();
            self.backlog
                .set_matched_with(item_id, Some(crate::grid::grid_slot_id(position)))
                .unwrap();
        }

        pub fn stores(&mut self) -> OperationStoreContext<'_> {
            OperationStoreContext {
                backlog: &mut self.backlog,
                tiers: &mut self.tiers,
                grid: &mut self.grid,
                compare_list: &mut self.compare_list,
            }
        }
    }
}
