use super::{
    run_atomically, DragContext, DragOperation, DragOperationKind, DragOperationResult,
    DropTargetType, ErrorCode, OperationAction, OperationStoreContext, ValidationResult,
};
use crate::grid::grid_slot_id;
use goat_core::GoatError;

/// Move a placed item to another slot, swapping with any occupant.
pub struct GridMove;

impl DragOperation for GridMove {
    fn kind(&self) -> DragOperationKind {
        DragOperationKind::GridMove
    }

    fn validate(
        &self,
        context: &DragContext,
        stores: &OperationStoreContext<'_>,
    ) -> ValidationResult {
        if stores.grid_source(context).is_none() {
            return ValidationResult::invalid(
                ErrorCode::SourceNotFound,
                "No placed item at the source slot",
            );
        }
        let Some(position) = context
            .target
            .grid_position
            .filter(|_| context.target.target_type == DropTargetType::GridSlot)
        else {
            return ValidationResult::invalid(
                ErrorCode::TargetPositionInvalid,
                "Target must be a grid slot",
            );
        };
        if position >= context.max_grid_size {
            return ValidationResult::invalid(
                ErrorCode::TargetOutOfBounds,
                format!("Grid position {} outside [0, {})", position, context.max_grid_size),
            );
        }
        ValidationResult::Valid
    }

    fn execute(
        &self,
        context: &DragContext,
        stores: &mut OperationStoreContext<'_>,
    ) -> DragOperationResult {
        run_atomically(self.kind(), stores, |stores| {
            let (Some(from), Some(to)) =
                (context.source.grid_position, context.target.grid_position)
            else {
                return Err(GoatError::Validation("missing grid positions".to_string()));
            };
            let swapped = stores.grid.get(to).is_some_and(|slot| slot.matched);
            stores.grid.move_grid_item(from, to)?;

            for position in [from, to] {
                let placed = stores
                    .grid
                    .get(position)
                    .and_then(|slot| slot.item_id())
                    .map(str::to_string);
                if let Some(item_id) = placed {
                    if stores.backlog.get_item_by_id(&item_id).is_some() {
                        stores
                            .backlog
                            .set_matched_with(&item_id, Some(grid_slot_id(position)))?;
                    }
                }
            }

            let action = if swapped {
                OperationAction::Swap
            } else {
                OperationAction::Move
            };
            Ok(DragOperationResult::success(
                self.kind(),
                action,
                stores.grid.get(to).and_then(|slot| slot.to_transferable()),
            )
            .with_metadata("fromIndex", from)
            .with_metadata("toIndex", to))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::test_support::Fixture;
    use crate::operations::{DragSource, DropTarget};

    #[test]
    fn test_move_to_empty_slot() {
        let mut fixture = Fixture::new(4, &["a"]);
        fixture.place("a", 0);
        let ctx = DragContext::new(DragSource::grid(0, "a"), DropTarget::grid_slot(2), 4);

        let result = {
            let mut stores = fixture.stores();
            GridMove.execute(&ctx, &mut stores)
        };

        assert_eq!(result.action, OperationAction::Move);
        assert_eq!(fixture.grid.get(2).unwrap().item_id(), Some("a"));
        assert_eq!(
            fixture.backlog.get_item_by_id("a").unwrap().matched_with.as_deref(),
            Some("grid-2")
        );
    }

    #[test]
    fn test_swap_updates_both_items() {
        let mut fixture = Fixture::new(4, &["a", "b"]);
        fixture.place("a", 0);
        fixture.place("b", 1);
        let ctx = DragContext::new(DragSource::grid(0, "a"), DropTarget::grid_slot(1), 4);

        let result = {
            let mut stores = fixture.stores();
            GridMove.execute(&ctx, &mut stores)
        };

        assert_eq!(result.action, OperationAction::Swap);
        assert_eq!(fixture.grid.get(0).unwrap().item_id(), Some("b"));
        assert_eq!(
            fixture.backlog.get_item_by_id("b").unwrap().matched_with.as_deref(),
            Some("grid-0")
        );
    }

    #[test]
    fn test_empty_source_is_rejected() {
        let mut fixture = Fixture::new(4, &[]);
        let stores = fixture.stores();
        let ctx = DragContext::new(DragSource::grid(0, "grid-0"), DropTarget::grid_slot(1), 4);

        assert_eq!(
            GridMove.validate(&ctx, &stores).error_code(),
            Some(ErrorCode::SourceNotFound)
        );
    }
}
