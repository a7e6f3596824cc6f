//! Drag-end dispatch.
//!
//! The UI hands over the raw `active`/`over` identifiers of a finished drag.
//! They are decoded into a [`DragContext`], the matching operation is picked
//! by [`DragOperationKind::classify`], and exactly one operation is validated
//! and, if valid, executed.
//!
//! Identifier encoding:
//!
//! | id | meaning |
//! |---|---|
//! | `grid-<n>` | grid slot `n` |
//! | `tier-item-<id>` | item `id` inside a tier (or the pool) |
//! | `pool-item-<id>` | item `id` in the unranked pool |
//! | `tier-<tierId>` | a tier row (targets only) |
//! | `unranked-pool`, `backlog`, `compare` | drop zones (targets only) |
//! | anything else | a backlog item id (sources only) |

use crate::grid::parse_grid_slot_id;
use crate::operations::{
    DragContext, DragOperationKind, DragOperationResult, DragSource, DropTarget, ErrorCode,
    OperationStoreContext,
};
use serde::{Deserialize, Serialize};

pub const TIER_ITEM_PREFIX: &str = "tier-item-";
pub const POOL_ITEM_PREFIX: &str = "pool-item-";
pub const TIER_PREFIX: &str = "tier-";
pub const UNRANKED_POOL_ID: &str = "unranked-pool";
pub const BACKLOG_ID: &str = "backlog";
pub const COMPARE_ID: &str = "compare";

/// Raw end-of-drag event as reported by the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DragEndEvent {
    pub active_id: String,
    /// `None` when the item was dropped outside every drop zone.
    pub over_id: Option<String>,
}

impl DragEndEvent {
    pub fn new(active_id: impl Into<String>, over_id: Option<&str>) -> Self {
        Self {
            active_id: active_id.into(),
            over_id: over_id.map(str::to_string),
        }
    }
}

fn decode_source(
    active_id: &str,
    stores: &OperationStoreContext<'_>,
) -> Result<DragSource, DragOperationResult> {
    if let Some(position) = parse_grid_slot_id(active_id) {
        let item_id = stores
            .grid
            .get(position)
            .and_then(|slot| slot.item_id())
            .unwrap_or(active_id);
        return Ok(DragSource::grid(position, item_id));
    }
    if let Some(item_id) = active_id.strip_prefix(TIER_ITEM_PREFIX) {
        if let Some((tier_id, index)) = stores.tiers.locate(item_id) {
            return Ok(DragSource::tier(tier_id, item_id, index));
        }
        if stores.tiers.is_unranked(item_id) {
            return Ok(DragSource::pool(item_id));
        }
        return Err(not_found(item_id));
    }
    if let Some(item_id) = active_id.strip_prefix(POOL_ITEM_PREFIX) {
        return Ok(DragSource::pool(item_id));
    }
    if stores.backlog.get_item_by_id(active_id).is_some() {
        return Ok(DragSource::backlog(active_id));
    }
    Err(not_found(active_id))
}

fn decode_target(
    over_id: &str,
    stores: &OperationStoreContext<'_>,
) -> Result<DropTarget, DragOperationResult> {
    if let Some(position) = parse_grid_slot_id(over_id) {
        return Ok(DropTarget::grid_slot(position));
    }
    match over_id {
        UNRANKED_POOL_ID => return Ok(DropTarget::unranked_pool()),
        BACKLOG_ID => return Ok(DropTarget::backlog()),
        COMPARE_ID => return Ok(DropTarget::compare()),
        _ => {}
    }
    if let Some(item_id) = over_id.strip_prefix(TIER_ITEM_PREFIX) {
        if let Some((tier_id, index)) = stores.tiers.locate(item_id) {
            return Ok(DropTarget::tier(tier_id, Some(index)));
        }
        if stores.tiers.is_unranked(item_id) {
            return Ok(DropTarget::unranked_pool());
        }
        return Err(invalid_target(over_id));
    }
    if let Some(tier_id) = over_id.strip_prefix(TIER_PREFIX) {
        return Ok(DropTarget::tier(tier_id, None));
    }
    Err(invalid_target(over_id))
}

fn not_found(id: &str) -> DragOperationResult {
    DragOperationResult::reject(
        None,
        ErrorCode::SourceNotFound,
        format!("Unknown drag source {}", id),
    )
}

fn invalid_target(id: &str) -> DragOperationResult {
    DragOperationResult::reject(
        None,
        ErrorCode::TargetPositionInvalid,
        format!("Unknown drop target {}", id),
    )
}

/// Decodes a drag-end event into a typed context, or the rejection to
/// report if either end cannot be resolved.
pub fn build_drag_context(
    event: &DragEndEvent,
    stores: &OperationStoreContext<'_>,
    max_grid_size: usize,
) -> Result<DragContext, DragOperationResult> {
    let over_id = event.over_id.as_deref().ok_or_else(|| {
        DragOperationResult::reject(
            None,
            ErrorCode::TargetPositionInvalid,
            "Dropped outside any target",
        )
    })?;
    let source = decode_source(&event.active_id, stores)?;
    let target = decode_target(over_id, stores)?;
    Ok(DragContext::new(source, target, max_grid_size))
}

/// Validates then executes the operation matching `context`.
pub fn run_operation(
    context: &DragContext,
    stores: &mut OperationStoreContext<'_>,
) -> DragOperationResult {
    let Some(kind) = DragOperationKind::classify(context) else {
        return DragOperationResult::reject(
            None,
            ErrorCode::TargetPositionInvalid,
            format!(
                "No operation moves {:?} onto {:?}",
                context.source.source_type, context.target.target_type
            ),
        );
    };
    let operation = kind.operation();
    let validation = operation.validate(context, stores);
    if !validation.is_valid() {
        tracing::debug!("{} rejected: {:?}", kind, validation.error_code());
        return DragOperationResult::from_validation(kind, validation);
    }
    let result = operation.execute(context, stores);
    tracing::debug!("{} executed, success={}", kind, result.success);
    result
}

/// Entry point for every UI drag handler.
pub fn handle_drag_end(
    event: &DragEndEvent,
    stores: &mut OperationStoreContext<'_>,
    max_grid_size: usize,
) -> DragOperationResult {
    match build_drag_context(event, stores, max_grid_size) {
        Ok(context) => run_operation(&context, stores),
        Err(rejection) => rejection,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::test_support::Fixture;
    use crate::operations::{DragSourceType, DropTargetType, OperationAction};

    #[test]
    fn test_decodes_tier_item_source_and_target() {
        let mut fixture = Fixture::new(4, &["a", "b"]);
        fixture.rank("a", "S");
        fixture.rank("b", "S");
        let stores = fixture.stores();

        let event = DragEndEvent::new("tier-item-a", Some("tier-item-b"));
        let ctx = build_drag_context(&event, &stores, 4).unwrap();

        assert_eq!(ctx.source.source_type, DragSourceType::Tier);
        assert_eq!(ctx.source.index, Some(0));
        assert_eq!(ctx.target.target_type, DropTargetType::Tier);
        assert_eq!(ctx.target.tier_id.as_deref(), Some("S"));
        assert_eq!(ctx.target.index, Some(1));
    }

    #[test]
    fn test_pooled_tier_item_becomes_pool_source() {
        let mut fixture = Fixture::new(4, &["a"]);
        fixture.rank("a", "S");
        fixture.tiers.add_to_unranked("a");
        let stores = fixture.stores();

        let ctx = build_drag_context(&DragEndEvent::new("tier-item-a", Some("tier-A")), &stores, 4)
            .unwrap();
        assert_eq!(ctx.source.source_type, DragSourceType::UnrankedPool);
        assert_eq!(ctx.target.tier_id.as_deref(), Some("A"));
    }

    #[test]
    fn test_backlog_to_grid_end_to_end() {
        let mut fixture = Fixture::new(10, &["itemA"]);
        let result = {
            let mut stores = fixture.stores();
            handle_drag_end(&DragEndEvent::new("itemA", Some("grid-3")), &mut stores, 10)
        };

        assert!(result.success);
        assert_eq!(result.operation_type, Some(DragOperationKind::BacklogToGrid));
        assert_eq!(result.action, OperationAction::Place);
        assert!(fixture.grid.get(3).unwrap().matched);
        assert!(fixture.backlog.is_item_used("itemA"));
    }

    #[test]
    fn test_unknown_source_is_rejected_without_operation() {
        let mut fixture = Fixture::new(4, &["a"]);
        let mut stores = fixture.stores();

        let result = handle_drag_end(&DragEndEvent::new("ghost", Some("tier-S")), &mut stores, 4);
        assert!(!result.success);
        assert_eq!(result.operation_type, None);
        assert_eq!(result.error_code, Some(ErrorCode::SourceNotFound));
    }

    #[test]
    fn test_drop_outside_and_unmatched_pairs() {
        let mut fixture = Fixture::new(4, &["a"]);
        let before = fixture.backlog.clone();
        {
            let mut stores = fixture.stores();
            let outside = handle_drag_end(&DragEndEvent::new("a", None), &mut stores, 4);
            assert_eq!(outside.error_code, Some(ErrorCode::TargetPositionInvalid));

            let unmatched =
                handle_drag_end(&DragEndEvent::new("a", Some("unranked-pool")), &mut stores, 4);
            assert!(!unmatched.success);
            assert_eq!(unmatched.operation_type, None);
        }
        assert_eq!(fixture.backlog, before);
    }

    #[test]
    fn test_invalid_drop_is_reported_with_kind() {
        let mut fixture = Fixture::new(4, &["a"]);
        fixture.place("a", 0);
        let mut stores = fixture.stores();

        let result = handle_drag_end(&DragEndEvent::new("a", Some("grid-1")), &mut stores, 4);
        assert_eq!(result.operation_type, Some(DragOperationKind::BacklogToGrid));
        assert_eq!(result.error_code, Some(ErrorCode::SourceAlreadyUsed));
    }
}
