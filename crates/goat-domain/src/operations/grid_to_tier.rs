use super::{
    run_atomically, DragContext, DragOperation, DragOperationKind, DragOperationResult,
    ErrorCode, OperationAction, OperationStoreContext, ValidationResult,
};
use goat_core::GoatError;

/// Filled grid slot dropped onto a tier row.
pub struct GridToTier;

impl DragOperation for GridToTier {
    fn kind(&self) -> DragOperationKind {
        DragOperationKind::GridToTier
    }

    fn validate(
        &self,
        context: &DragContext,
        stores: &OperationStoreContext<'_>,
    ) -> ValidationResult {
        if stores.grid_source(context).is_none() {
            return ValidationResult::invalid(
                ErrorCode::SourceNotFound,
                format!(
                    "No placed item at grid position {:?}",
                    context.source.grid_position
                ),
            );
        }
        if let Err(invalid) = stores.target_tier(context) {
            return invalid;
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
            let tier_id = context
                .target
                .tier_id
                .as_deref()
                .ok_or_else(|| GoatError::Validation("missing target tier".to_string()))?;

            let removed = stores.grid.remove_item_from_grid(position)?;
            let item = removed.to_transferable().ok_or_else(|| {
                GoatError::NotFound(format!("placed item at grid position {}", position))
            })?;
            stores
                .tiers
                .assign_to_tier(&item.id, tier_id, Some(item.clone()))?;
            if stores.backlog.get_item_by_id(&item.id).is_some() {
                stores.backlog.set_matched_with(&item.id, None)?;
            }

            Ok(
                DragOperationResult::success(self.kind(), OperationAction::Assign, Some(item))
                    .with_metadata("tierId", tier_id)
                    .with_metadata("gridPosition", position),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::test_support::Fixture;
    use crate::operations::{DragSource, DropTarget};

    #[test]
    fn test_moves_grid_item_into_tier() {
        let mut fixture = Fixture::new(4, &["a"]);
        fixture.place("a", 3);
        let ctx = DragContext::new(DragSource::grid(3, "a"), DropTarget::tier("A", None), 4);

        let result = {
            let mut stores = fixture.stores();
            assert!(GridToTier.validate(&ctx, &stores).is_valid());
            GridToTier.execute(&ctx, &mut stores)
        };

        assert!(result.success);
        assert_eq!(result.item.unwrap().title, "Item a");
        assert!(!fixture.grid.get(3).unwrap().matched);
        assert_eq!(fixture.tiers.tier_of("a"), Some("A"));
        assert!(fixture.backlog.is_item_used("a"));
        assert!(fixture.backlog.get_item_by_id("a").unwrap().matched_with.is_none());
    }

    #[test]
    fn test_empty_slot_is_rejected() {
        let mut fixture = Fixture::new(4, &["a"]);
        let stores = fixture.stores();
        let ctx = DragContext::new(DragSource::grid(0, "grid-0"), DropTarget::tier("A", None), 4);

        assert_eq!(
            GridToTier.validate(&ctx, &stores).error_code(),
            Some(ErrorCode::SourceNotFound)
        );
    }

    #[test]
    fn test_unknown_tier_is_rejected_and_execute_restores_grid() {
        let mut fixture = Fixture::new(4, &["a"]);
        fixture.place("a", 0);
        let grid_before = fixture.grid.clone();
        let ctx = DragContext::new(DragSource::grid(0, "a"), DropTarget::tier("nope", None), 4);

        let result = {
            let mut stores = fixture.stores();
            assert_eq!(
                GridToTier.validate(&ctx, &stores).error_code(),
                Some(ErrorCode::TargetPositionInvalid)
            );
            GridToTier.execute(&ctx, &mut stores)
        };

        assert!(!result.success);
        assert_eq!(fixture.grid, grid_before);
    }
}
