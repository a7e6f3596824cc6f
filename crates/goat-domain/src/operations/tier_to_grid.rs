use super::{
    run_atomically, DragContext, DragOperation, DragOperationKind, DragOperationResult,
    DragSourceType, DropTargetType, ErrorCode, OperationAction, OperationStoreContext,
    ValidationResult,
};
use crate::grid::grid_slot_id;
use goat_core::GoatError;
use serde_json::json;

/// Tier or pooled item dropped onto a grid slot.
pub struct TierToGrid;

impl DragOperation for TierToGrid {
    fn kind(&self) -> DragOperationKind {
        DragOperationKind::TierToGrid
    }

    fn validate(
        &self,
        context: &DragContext,
        stores: &OperationStoreContext<'_>,
    ) -> ValidationResult {
        if !matches!(
            context.source.source_type,
            DragSourceType::Tier | DragSourceType::UnrankedPool
        ) {
            return ValidationResult::invalid(
                ErrorCode::TargetPositionInvalid,
                "Source must be a tier or the unranked pool",
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
            )
            .with_debug(json!({ "position": position, "maxGridSize": context.max_grid_size }));
        }
        let item_id = &context.source.item_id;
        let has_payload = stores.tiers.get_item(item_id).is_some()
            || stores.backlog.get_item_by_id(item_id).is_some();
        let in_source = match context.source.source_type {
            DragSourceType::Tier => stores.tiers.locate(item_id).is_some_and(|(tier_id, index)| {
                context.source.tier_id.as_deref() == Some(tier_id)
                    && context.source.index.map_or(true, |given| given == index)
            }),
            _ => stores.tiers.is_unranked(item_id),
        };
        if !in_source || !has_payload {
            return ValidationResult::invalid(
                ErrorCode::SourceNotFound,
                format!("Item {} is not where the drag started", item_id),
            )
            .with_debug(json!({
                "itemId": item_id,
                "tierId": context.source.tier_id,
                "index": context.source.index,
            }));
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

            let fallback = stores
                .backlog
                .get_item_by_id(item_id)
                .map(|item| item.to_transferable());
            let item = stores
                .tiers
                .remove_item(item_id)
                .or(fallback)
                .ok_or_else(|| GoatError::NotFound(format!("payload for {}", item_id)))?;

            if let Some(displaced) = stores.grid.assign_item_to_grid(&item, position)? {
                if let Some(displaced_id) = displaced.item_id() {
                    stores.backlog.release(displaced_id);
                }
            }
            if stores.backlog.get_item_by_id(item_id).is_some() {
                stores.backlog.mark_item_as_used(item_id, true)?;
                stores
                    .backlog
                    .set_matched_with(item_id, Some(grid_slot_id(position)))?;
            }

            Ok(
                DragOperationResult::success(self.kind(), OperationAction::Place, Some(item))
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
    fn test_places_tier_item_on_grid() {
        let mut fixture = Fixture::new(5, &["a"]);
        fixture.rank("a", "S");
        let ctx = DragContext::new(DragSource::tier("S", "a", 0), DropTarget::grid_slot(2), 5);

        let result = {
            let mut stores = fixture.stores();
            assert!(TierToGrid.validate(&ctx, &stores).is_valid());
            TierToGrid.execute(&ctx, &mut stores)
        };

        assert!(result.success);
        assert_eq!(fixture.grid.get(2).unwrap().item_id(), Some("a"));
        assert!(!fixture.tiers.contains("a"));
        let backlog_item = fixture.backlog.get_item_by_id("a").unwrap();
        assert!(backlog_item.matched);
        assert_eq!(backlog_item.matched_with.as_deref(), Some("grid-2"));
    }

    #[test]
    fn test_pooled_item_to_grid() {
        let mut fixture = Fixture::new(3, &["a"]);
        fixture.rank("a", "B");
        fixture.tiers.add_to_unranked("a");
        let ctx = DragContext::new(DragSource::pool("a"), DropTarget::grid_slot(0), 3);

        let mut stores = fixture.stores();
        assert!(TierToGrid.execute(&ctx, &mut stores).success);
        assert!(fixture.tiers.unranked().is_empty());
        assert!(fixture.grid.get(0).unwrap().matched);
    }

    #[test]
    fn test_out_of_bounds_target() {
        let mut fixture = Fixture::new(3, &["a"]);
        fixture.rank("a", "S");
        let stores = fixture.stores();
        let ctx = DragContext::new(DragSource::tier("S", "a", 0), DropTarget::grid_slot(3), 3);

        assert_eq!(
            TierToGrid.validate(&ctx, &stores).error_code(),
            Some(ErrorCode::TargetOutOfBounds)
        );
    }

    #[test]
    fn test_displaced_occupant_is_released() {
        let mut fixture = Fixture::new(3, &["a", "b"]);
        fixture.place("b", 1);
        fixture.rank("a", "S");
        let ctx = DragContext::new(DragSource::tier("S", "a", 0), DropTarget::grid_slot(1), 3);

        let mut stores = fixture.stores();
        assert!(TierToGrid.execute(&ctx, &mut stores).success);
        assert!(!fixture.backlog.is_item_used("b"));
        assert_eq!(fixture.grid.get(1).unwrap().item_id(), Some("a"));
    }

    #[test]
    fn test_source_must_match_the_item_placement() {
        let mut fixture = Fixture::new(3, &["a", "b"]);
        fixture.rank("a", "S");
        fixture.rank("b", "S");
        let stale = [
            DragSource::tier("A", "a", 0),
            DragSource::tier("S", "a", 1),
            DragSource::pool("b"),
        ];

        for source in stale {
            let ctx = DragContext::new(source, DropTarget::grid_slot(0), 3);
            let stores = fixture.stores();
            assert_eq!(
                TierToGrid.validate(&ctx, &stores).error_code(),
                Some(ErrorCode::SourceNotFound)
            );
        }
    }
}
