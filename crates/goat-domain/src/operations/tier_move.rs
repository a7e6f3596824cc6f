use super::{
    run_atomically, DragContext, DragOperation, DragOperationKind, DragOperationResult,
    ErrorCode, OperationAction, OperationStoreContext, ValidationResult,
};
use goat_core::GoatError;

/// Reorder inside a single tier.
pub struct TierMove;

impl TierMove {
    /// Resolves `(tier_id, from, to)`; a missing target index means "last".
    fn indices<'c>(
        context: &'c DragContext,
        stores: &OperationStoreContext<'_>,
    ) -> Result<(&'c str, usize, usize), ValidationResult> {
        let (Some(source_tier), Some(target_tier)) =
            (context.source.tier_id.as_deref(), context.target.tier_id.as_deref())
        else {
            return Err(ValidationResult::invalid(
                ErrorCode::TargetPositionInvalid,
                "Tier move needs a source and target tier",
            ));
        };
        if source_tier != target_tier {
            return Err(ValidationResult::invalid(
                ErrorCode::TargetPositionInvalid,
                "Tier move must stay within one tier",
            ));
        }
        let tier = stores.tiers.tier(source_tier).ok_or_else(|| {
            ValidationResult::invalid(
                ErrorCode::SourceNotFound,
                format!("Tier {} not found", source_tier),
            )
        })?;
        let item_id = &context.source.item_id;
        let located = stores
            .tiers
            .locate(item_id)
            .filter(|(tier_id, _)| *tier_id == source_tier)
            .map(|(_, index)| index);
        let from = match (located, context.source.index) {
            (Some(index), Some(given)) if index != given => {
                return Err(ValidationResult::invalid(
                    ErrorCode::SourceNotFound,
                    format!("Item {} is not at index {} of tier {}", item_id, given, source_tier),
                )
                .with_debug(serde_json::json!({ "actualIndex": index, "givenIndex": given })));
            }
            (Some(index), _) => index,
            (None, _) => {
                return Err(ValidationResult::invalid(
                    ErrorCode::SourceNotFound,
                    format!("Item {} not in tier {}", item_id, source_tier),
                ));
            }
        };
        let to = context.target.index.unwrap_or(tier.len() - 1);
        if to >= tier.len() {
            return Err(ValidationResult::invalid(
                ErrorCode::TargetOutOfBounds,
                format!("Index {} outside tier {} of {} items", to, source_tier, tier.len()),
            ));
        }
        Ok((source_tier, from, to))
    }
}

impl DragOperation for TierMove {
    fn kind(&self) -> DragOperationKind {
        DragOperationKind::TierMove
    }

    fn validate(
        &self,
        context: &DragContext,
        stores: &OperationStoreContext<'_>,
    ) -> ValidationResult {
        match Self::indices(context, stores) {
            Ok(_) => ValidationResult::Valid,
            Err(invalid) => invalid,
        }
    }

    fn execute(
        &self,
        context: &DragContext,
        stores: &mut OperationStoreContext<'_>,
    ) -> DragOperationResult {
        let (tier_id, from, to) = match Self::indices(context, stores) {
            Ok(indices) => indices,
            Err(invalid) => return DragOperationResult::from_validation(self.kind(), invalid),
        };
        run_atomically(self.kind(), stores, |stores| {
            stores.tiers.move_within_tier(tier_id, from, to)?;
            let item = stores.tiers.get_item(&context.source.item_id).cloned();
            if item.is_none() {
                return Err(GoatError::NotFound(format!(
                    "payload for {}",
                    context.source.item_id
                )));
            }
            Ok(
                DragOperationResult::success(self.kind(), OperationAction::Reorder, item)
                    .with_metadata("tierId", tier_id)
                    .with_metadata("fromIndex", from)
                    .with_metadata("toIndex", to),
            )
        })
    }
}
