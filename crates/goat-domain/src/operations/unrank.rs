use super::{
    run_atomically, DragContext, DragOperation, DragOperationKind, DragOperationResult,
    DragSourceType, DropTargetType, ErrorCode, OperationAction, OperationStoreContext,
    ValidationResult,
};

/// Tier item dropped onto the unranked pool.
pub struct Unrank;

impl DragOperation for Unrank {
    fn kind(&self) -> DragOperationKind {
        DragOperationKind::Unrank
    }

    fn validate(
        &self,
        context: &DragContext,
        stores: &OperationStoreContext<'_>,
    ) -> ValidationResult {
        let Some(tier_id) = context
            .source
            .tier_id
            .as_deref()
            .filter(|_| context.source.source_type == DragSourceType::Tier)
        else {
            return ValidationResult::invalid(
                ErrorCode::TargetPositionInvalid,
                "Only tier items can be unranked",
            );
        };
        if context.target.target_type != DropTargetType::UnrankedPool {
            return ValidationResult::invalid(
                ErrorCode::TargetPositionInvalid,
                "Unrank must drop onto the unranked pool",
            );
        }
        if stores.tiers.tier_of(&context.source.item_id) != Some(tier_id) {
            return ValidationResult::invalid(
                ErrorCode::SourceNotFound,
                format!("Item {} not in tier {}", context.source.item_id, tier_id),
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
            stores.tiers.add_to_unranked(item_id);
            let mut result = DragOperationResult::success(
                self.kind(),
                OperationAction::Unrank,
                stores.tiers.get_item(item_id).cloned(),
            );
            if let Some(tier_id) = &context.source.tier_id {
                result = result.with_metadata("fromTierId", tier_id.as_str());
            }
            Ok(result)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::test_support::Fixture;
    use crate::operations::{DragSource, DropTarget};

    #[test]
    fn test_moves_item_into_pool() {
        let mut fixture = Fixture::new(10, &["a"]);
        fixture.rank("a", "C");
        let ctx = DragContext::new(DragSource::tier("C", "a", 0), DropTarget::unranked_pool(), 10);

        let result = {
            let mut stores = fixture.stores();
            assert!(Unrank.validate(&ctx, &stores).is_valid());
            Unrank.execute(&ctx, &mut stores)
        };

        assert!(result.success);
        assert!(fixture.tiers.is_unranked("a"));
        assert!(fixture.tiers.tier_of("a").is_none());
        // Still placed, just not ranked.
        assert!(fixture.backlog.is_item_used("a"));
    }

    #[test]
    fn test_requires_pool_target() {
        let mut fixture = Fixture::new(10, &["a"]);
        fixture.rank("a", "C");
        let stores = fixture.stores();
        let ctx = DragContext::new(DragSource::tier("C", "a", 0), DropTarget::backlog(), 10);

        assert_eq!(
            Unrank.validate(&ctx, &stores).error_code(),
            Some(ErrorCode::TargetPositionInvalid)
        );
    }

    #[test]
    fn test_requires_tier_source() {
        let mut fixture = Fixture::new(10, &["a"]);
        let stores = fixture.stores();
        let ctx = DragContext::new(DragSource::pool("a"), DropTarget::unranked_pool(), 10);

        assert_eq!(
            Unrank.validate(&ctx, &stores).error_code(),
            Some(ErrorCode::TargetPositionInvalid)
        );
    }
}
