use super::{
    run_atomically, DragContext, DragOperation, DragOperationKind, DragOperationResult,
    DropTargetType, ErrorCode, OperationAction, OperationStoreContext, ValidationResult,
};
use goat_core::GoatError;

/// Placed item dragged back to the backlog.
pub struct GridToBacklog;

impl DragOperation for GridToBacklog {
    fn kind(&self) -> DragOperationKind {
        DragOperationKind::GridToBacklog
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
        if context.target.target_type != DropTargetType::Backlog {
            return ValidationResult::invalid(
                ErrorCode::TargetPositionInvalid,
                "Target must be the backlog",
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
            let position = context
                .source
                .grid_position
                .ok_or_else(|| GoatError::Validation("missing grid position".to_string()))?;
            let removed = stores.grid.remove_item_from_grid(position)?;
            let item = removed.to_transferable();
            if let Some(item) = &item {
                stores.backlog.release(&item.id);
            }
            Ok(
                DragOperationResult::success(self.kind(), OperationAction::Remove, item)
                    .with_metadata("gridPosition", position),
            )
        })
    }
}
