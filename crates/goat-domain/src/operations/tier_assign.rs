use super::{
    run_atomically, DragContext, DragOperation, DragOperationKind, DragOperationResult,
    ErrorCode, OperationAction, OperationStoreContext, ValidationResult,
};
use goat_core::GoatError;
use serde_json::json;

/// Backlog item dropped onto a tier row.
pub struct TierAssign;

impl DragOperation for TierAssign {
    fn kind(&self) -> DragOperationKind {
        DragOperationKind::TierAssign
    }

    fn validate(
        &self,
        context: &DragContext,
        stores: &OperationStoreContext<'_>,
    ) -> ValidationResult {
        if let Err(invalid) = stores.target_tier(context) {
            return invalid;
        }
        let item_id = &context.source.item_id;
        if stores.backlog.get_item_by_id(item_id).is_none() {
            return ValidationResult::invalid(
                ErrorCode::SourceNotFound,
                format!("Backlog item {} not found", item_id),
            )
            .with_debug(json!({ "itemId": item_id }));
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
            let tier_id = context
                .target
                .tier_id
                .as_deref()
                .ok_or_else(|| GoatError::Validation("missing target tier".to_string()))?;
            let item = stores
                .backlog
                .get_item_by_id(item_id)
                .map(|item| item.to_transferable())
                .ok_or_else(|| GoatError::NotFound(format!("backlog item {}", item_id)))?;

            stores.backlog.mark_item_as_used(item_id, true)?;
            stores.tiers.assign_to_tier(item_id, tier_id, Some(item.clone()))?;

            Ok(
                DragOperationResult::success(self.kind(), OperationAction::Assign, Some(item))
                    .with_metadata("tierId", tier_id),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::test_support::Fixture;
    use crate::operations::{DragSource, DropTarget};
    use crate::tier::{Tier, TierStore};

    fn ctx(item: &str, tier: &str) -> DragContext {
        DragContext::new(DragSource::backlog(item), DropTarget::tier(tier, None), 10)
    }

    #[test]
    fn test_assigns_and_marks_used() {
        let mut fixture = Fixture::new(10, &["a"]);
        let mut stores = fixture.stores();
        assert!(TierAssign.validate(&ctx("a", "S"), &stores).is_valid());

        let result = TierAssign.execute(&ctx("a", "S"), &mut stores);
        assert!(result.success);
        assert_eq!(result.action, OperationAction::Assign);
        assert_eq!(result.item.unwrap().id, "a");
        assert!(fixture.backlog.is_item_used("a"));
        assert_eq!(fixture.tiers.tier_of("a"), Some("S"));
    }

    #[test]
    fn test_rejects_used_item() {
        let mut fixture = Fixture::new(10, &["a"]);
        fixture.backlog.mark_item_as_used("a", true).unwrap();
        let stores = fixture.stores();

        let validation = TierAssign.validate(&ctx("a", "S"), &stores);
        assert_eq!(validation.error_code(), Some(ErrorCode::SourceAlreadyUsed));
    }

    #[test]
    fn test_rejects_unknown_item() {
        let mut fixture = Fixture::new(10, &["a"]);
        let stores = fixture.stores();
        assert_eq!(
            TierAssign.validate(&ctx("zzz", "S"), &stores).error_code(),
            Some(ErrorCode::SourceNotFound)
        );
    }

    #[test]
    fn test_unknown_tier_is_rejected() {
        let mut fixture = Fixture::new(10, &["a"]);
        let stores = fixture.stores();
        assert_eq!(
            TierAssign.validate(&ctx("a", "Z"), &stores).error_code(),
            Some(ErrorCode::TargetPositionInvalid)
        );
    }

    #[test]
    fn test_store_failure_leaves_no_partial_state() {
        let mut fixture = Fixture::new(10, &["a"]);
        assert!(TierAssign.validate(&ctx("a", "S"), &fixture.stores()).is_valid());

        // The tier row disappears between validation and execution, so the
        // tier store fails after the backlog was already marked.
        fixture.tiers = TierStore::with_tiers(vec![Tier::new("A", "A")]);
        let tiers_before = fixture.tiers.clone();
        let result = {
            let mut stores = fixture.stores();
            TierAssign.execute(&ctx("a", "S"), &mut stores)
        };

        assert!(!result.success);
        assert_eq!(result.error_code, Some(ErrorCode::UnknownError));
        assert!(!fixture.backlog.is_item_used("a"));
        assert_eq!(fixture.tiers, tiers_before);
    }
}
