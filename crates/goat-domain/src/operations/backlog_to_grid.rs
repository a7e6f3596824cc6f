use super::{
    run_atomically, DragContext, DragOperation, DragOperationKind, DragOperationResult,
    DragSourceType, DropTargetType, ErrorCode, OperationAction, OperationStoreContext,
    ValidationResult,
};
use crate::grid::grid_slot_id;
use goat_core::GoatError;

/// Backlog item dropped onto a grid slot.
pub struct BacklogToGrid;

impl DragOperation for BacklogToGrid {
    fn kind(&self) -> DragOperationKind {
        DragOperationKind::BacklogToGrid
    }

    fn validate(
        &self,
        context: &DragContext,
        stores: &OperationStoreContext<'_>,
    ) -> ValidationResult {
        if context.source.source_type != DragSourceType::Backlog {
            return ValidationResult::invalid(
                ErrorCode::TargetPositionInvalid,
                "Source must be a backlog item",
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
        let item_id = &context.source.item_id;
        if stores.backlog.get_item_by_id(item_id).is_none() {
            return ValidationResult::invalid(
                ErrorCode::SourceNotFound,
                format!("Backlog item {} not found", item_id),
            );
        }
        if stores.backlog.is_item_used(item_id) {
            return ValidationResult::invalid(
                ErrorCode::SourceAlreadyUsed,
                format!("Backlog item {} is already placed", item_id),
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
            let item_id = context.source.item_id.as_str();
            let position = context
                .target
                .grid_position
                .ok_or_else(|| GoatError::Validation("missing grid position".to_string()))?;
            let item = stores
                .backlog
                .get_item_by_id(item_id)
                .map(|item| item.to_transferable())
                .ok_or_else(|| GoatError::NotFound(format!("backlog item {}", item_id)))?;

            let displaced = stores.grid.assign_item_to_grid(&item, position)?;
            if let Some(displaced_id) = displaced.as_ref().and_then(|slot| slot.item_id()) {
                stores.backlog.release(displaced_id);
            }
            stores.backlog.mark_item_as_used(item_id, true)?;
            stores
                .backlog
                .set_matched_with(item_id, Some(grid_slot_id(position)))?;

            let mut result =
                DragOperationResult::success(self.kind(), OperationAction::Place, Some(item))
                    .with_metadata("gridPosition", position);
            if let Some(displaced_id) = displaced.as_ref().and_then(|slot| slot.item_id()) {
                result = result.with_metadata("displacedItemId", displaced_id);
            }
            Ok(result)
        })
    }
}
