use super::{
    run_atomically, DragContext, DragOperation, DragOperationKind, DragOperationResult,
    ErrorCode, OperationAction, OperationStoreContext, ValidationResult,
};
use goat_core::GoatError;
use serde_json::json;

/// Move an item from one tier into a different tier.
pub struct TierTransfer;

impl DragOperation for TierTransfer {
    fn kind(&self) -> DragOperationKind {
        DragOperationKind::TierTransfer
    }

    fn validate(
        &self,
        context: &DragContext,
        stores: &OperationStoreContext<'_>,
    ) -> ValidationResult {
        let Some(from) = context.source.tier_id.as_deref() else {
            return ValidationResult::invalid(
                ErrorCode::TargetPositionInvalid,
                "Tier transfer needs a source tier",
            );
        };
        let to = match stores.target_tier(context) {
            Ok(to) => to,
            Err(invalid) => return invalid,
        };
        if from == to {
            return ValidationResult::invalid(
                ErrorCode::TargetPositionInvalid,
                "Source and target tier are the same",
            )
            .with_debug(json!({ "tierId": from }));
        }
        if stores.tiers.tier_of(&context.source.item_id) != Some(from) {
            return ValidationResult::invalid(
                ErrorCode::SourceNotFound,
                format!("Item {} not in tier {}", context.source.item_id, from),
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
            let (Some(from), Some(to)) = (
                context.source.tier_id.as_deref(),
                context.target.tier_id.as_deref(),
            ) else {
                return Err(GoatError::Validation("missing tier ids".to_string()));
            };
            let item_id = context.source.item_id.as_str();
            stores
                .tiers
                .move_between_tiers(item_id, from, to, context.target.index)?;

            let mut result = DragOperationResult::success(
                self.kind(),
                OperationAction::Transfer,
                stores.tiers.get_item(item_id).cloned(),
            )
            .with_metadata("fromTierId", from)
            .with_metadata("toTierId", to);
            if let Some(position) = context.target.index {
                result = result.with_metadata("position", position);
            }
            Ok(result)
        })
    }
}
