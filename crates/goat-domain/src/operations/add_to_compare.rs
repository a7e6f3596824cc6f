use super::{
    run_atomically, DragContext, DragOperation, DragOperationKind, DragOperationResult,
    DragSourceType, DropTargetType, ErrorCode, OperationAction, OperationStoreContext,
    ValidationResult,
};
use crate::comparison::MAX_COMPARE_ITEMS;
use crate::item::BacklogItem;
use goat_core::GoatError;

/// Backlog or grid item dropped onto the compare tray.
pub struct AddToCompare;

impl AddToCompare {
    fn resolve(context: &DragContext, stores: &OperationStoreContext<'_>) -> Option<BacklogItem> {
        match context.source.source_type {
            DragSourceType::Backlog => stores
                .backlog
                .get_item_by_id(&context.source.item_id)
                .cloned(),
            DragSourceType::Grid => {
                let slot = stores.grid_source(context)?;
                let item_id = slot.item_id()?;
                stores
                    .backlog
                    .get_item_by_id(item_id)
                    .cloned()
                    .or_else(|| slot.to_transferable().map(BacklogItem::from))
            }
            DragSourceType::Tier | DragSourceType::UnrankedPool => None,
        }
    }
}

impl DragOperation for AddToCompare {
    fn kind(&self) -> DragOperationKind {
        DragOperationKind::AddToCompare
    }

    fn validate(
        &self,
        context: &DragContext,
        stores: &OperationStoreContext<'_>,
    ) -> ValidationResult {
        if context.target.target_type != DropTargetType::Compare {
            return ValidationResult::invalid(
                ErrorCode::TargetPositionInvalid,
                "Target must be the compare tray",
            );
        }
        let Some(item) = Self::resolve(context, stores) else {
            return ValidationResult::invalid(
                ErrorCode::SourceNotFound,
                format!("Item {} not found", context.source.item_id),
            );
        };
        if stores.compare_list.iter().any(|i| i.id == item.id) {
            return ValidationResult::invalid(
                ErrorCode::SourceAlreadyUsed,
                format!("Item {} is already being compared", item.id),
            );
        }
        if stores.compare_list.len() >= MAX_COMPARE_ITEMS {
            return ValidationResult::invalid(
                ErrorCode::TargetOutOfBounds,
                format!("Compare list holds at most {} items", MAX_COMPARE_ITEMS),
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
            let item = Self::resolve(context, stores).ok_or_else(|| {
                GoatError::NotFound(format!("item {}", context.source.item_id))
            })?;
            let transferable = item.to_transferable();
            stores.compare_list.push(item);
            Ok(DragOperationResult::success(
                self.kind(),
                OperationAction::Compare,
                Some(transferable),
            )
            .with_metadata("compareCount", stores.compare_list.len()))
        })
    }
}
