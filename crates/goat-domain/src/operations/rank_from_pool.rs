use super::{
    run_atomically, DragContext, DragOperation, DragOperationKind, DragOperationResult,
    DragSourceType, ErrorCode, OperationAction, OperationStoreContext, ValidationResult,
};
use goat_core::GoatError;

/// Pooled item dropped onto a tier; always appends.
pub struct RankFromPool;

impl DragOperation for RankFromPool {
    fn kind(&self) -> DragOperationKind {
        DragOperationKind::RankFromPool
    }

    fn validate(
        &self,
        context: &DragContext,
        stores: &OperationStoreContext<'_>,
    ) -> ValidationResult {
        if context.source.source_type != DragSourceType::UnrankedPool {
            return ValidationResult::invalid(
                ErrorCode::TargetPositionInvalid,
                "Source must be the unranked pool",
            );
        }
        if let Err(invalid) = stores.target_tier(context) {
            return invalid;
        }
        if !stores.tiers.is_unranked(&context.source.item_id) {
            return ValidationResult::invalid(
                ErrorCode::SourceNotFound,
                format!("Item {} is not in the unranked pool", context.source.item_id),
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
            let tier_id = context
                .target
                .tier_id
                .as_deref()
                .ok_or_else(|| GoatError::Validation("missing target tier".to_string()))?;
            stores.tiers.assign_to_tier(item_id, tier_id, None)?;
            Ok(DragOperationResult::success(
                self.kind(),
                OperationAction::Rank,
                stores.tiers.get_item(item_id).cloned(),
            )
            .with_metadata("tierId", tier_id))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::test_support::Fixture;
    use crate::operations::{DragSource, DropTarget};

    #[test]
    fn test_appends_pooled_item() {
        let mut fixture = Fixture::new(10, &["a", "b"]);
        fixture.rank("a", "A");
        fixture.rank("b", "S");
        fixture.tiers.add_to_unranked("b");
        let ctx = DragContext::new(DragSource::pool("b"), DropTarget::tier("A", Some(0)), 10);

        let result = {
            let mut stores = fixture.stores();
            assert!(RankFromPool.validate(&ctx, &stores).is_valid());
            RankFromPool.execute(&ctx, &mut stores)
        };

        assert!(result.success);
        assert_eq!(result.item.unwrap().title, "Item b");
        assert_eq!(fixture.tiers.tier("A").unwrap().item_ids(), vec!["a", "b"]);
        assert!(fixture.tiers.unranked().is_empty());
    }

    #[test]
    fn test_item_must_be_pooled() {
        let mut fixture = Fixture::new(10, &["a"]);
        fixture.rank("a", "A");
        let stores = fixture.stores();
        let ctx = DragContext::new(DragSource::pool("a"), DropTarget::tier("S", None), 10);

        assert_eq!(
            RankFromPool.validate(&ctx, &stores).error_code(),
            Some(ErrorCode::SourceNotFound)
        );
    }

    #[test]
    fn test_unknown_tier_is_rejected_and_execute_rolls_back() {
        let mut fixture = Fixture::new(10, &["a"]);
        fixture.rank("a", "A");
        fixture.tiers.add_to_unranked("a");
        let before = fixture.tiers.clone();
        let ctx = DragContext::new(DragSource::pool("a"), DropTarget::tier("Q", None), 10);

        let result = {
            let mut stores = fixture.stores();
            assert_eq!(
                RankFromPool.validate(&ctx, &stores).error_code(),
                Some(ErrorCode::TargetPositionInvalid)
            );
            RankFromPool.execute(&ctx, &mut stores)
        };

        assert_eq!(result.error_code, Some(ErrorCode::UnknownError));
        assert_eq!(fixture.tiers, before);
    }
}
