use goat_core::ManualClock;
use goat_domain::*;
use std::sync::Arc;

fn store_with(ids: &[&str], size: usize) -> ItemStore {
    let clock = Arc::new(ManualClock::new(chrono::Utc::now()));
    let mut store = ItemStore::new(clock, size);
    store.switch_to_list("L1", Some(size));
    let items = ids
        .iter()
        .map(|id| BacklogItem::new(*id, format!("Item {}", id)))
        .collect();
    store
        .set_backlog_groups(vec![BacklogGroup::new("g1", "Group").with_items(items)])
        .unwrap();
    store
}

fn drag(store: &mut ItemStore, active: &str, over: &str) -> DragOperationResult {
    store.handle_drag_end(&DragEndEvent::new(active, Some(over)))
}

/// Every item sits in at most one of: a tier, the pool, a grid slot, or the
/// unused backlog. Placed items are always marked used.
fn assert_mutual_exclusion(store: &ItemStore, ids: &[&str]) {
    let session = store.current_session().unwrap();
    for id in ids {
        let in_tier = session.tiers.tier_of(id).is_some() as usize;
        let in_pool = session.tiers.is_unranked(id) as usize;
        let in_grid = session.grid.position_of(id).is_some() as usize;
        let unused = !session.backlog.is_item_used(id) as usize;
        let placements = in_tier + in_pool + in_grid;

        assert!(placements <= 1, "{} placed {} times", id, placements);
        assert!(placements + unused <= 1, "{} placed but unused", id);
    }
}

#[test]
fn test_mutual_exclusion_across_drag_sequence() {
    let ids = ["a", "b", "c", "d"];
    let mut store = store_with(&ids, 4);

    let steps = [
        ("a", "tier-S"),
        ("b", "grid-0"),
        ("c", "tier-S"),
        ("tier-item-a", "unranked-pool"),
        ("tier-item-a", "grid-1"),
        ("grid-0", "tier-A"),
        ("tier-item-c", "grid-1"),
        ("grid-1", "grid-2"),
        ("d", "grid-2"),
        ("grid-2", "backlog"),
        ("tier-item-b", "tier-item-c"),
    ];
    for (active, over) in steps {
        drag(&mut store, active, over);
        assert_mutual_exclusion(&store, &ids);
    }
}

#[test]
fn test_scenario_backlog_item_to_grid() {
    let mut store = store_with(&["itemA"], 10);
    let result = drag(&mut store, "itemA", "grid-3");

    assert!(result.success);
    let session = store.current_session().unwrap();
    assert!(session.grid.grid_items()[3].matched);
    assert!(session.backlog.is_item_used("itemA"));
}

#[test]
fn test_scenario_reorder_within_tier() {
    let mut store = store_with(&["a", "b", "c"], 10);
    for id in ["a", "b", "c"] {
        assert!(drag(&mut store, id, "tier-S").success);
    }

    let result = drag(&mut store, "tier-item-a", "tier-item-c");
    assert_eq!(result.operation_type, Some(DragOperationKind::TierMove));
    let tier = store.current_session().unwrap().tiers.tier("S").unwrap();
    assert_eq!(tier.item_ids(), vec!["b", "c", "a"]);
}

#[test]
fn test_scenario_same_tier_transfer_is_invalid() {
    let mut store = store_with(&["a", "b"], 10);
    drag(&mut store, "a", "tier-S");
    drag(&mut store, "b", "tier-S");
    let before = store.current_session().unwrap().clone();

    let ctx = DragContext::new(
        DragSource::tier("S", "a", 0),
        DropTarget::tier("S", Some(1)),
        10,
    );
    let mut session = before.clone();
    let stores = OperationStoreContext {
        backlog: &mut session.backlog,
        tiers: &mut session.tiers,
        grid: &mut session.grid,
        compare_list: &mut session.compare_list,
    };
    let validation = DragOperationKind::TierTransfer.operation().validate(&ctx, &stores);

    assert_eq!(validation.error_code(), Some(ErrorCode::TargetPositionInvalid));
    assert_eq!(session, before);
}

#[test]
fn test_rejected_drop_leaves_session_untouched() {
    let mut store = store_with(&["a", "b"], 2);
    drag(&mut store, "a", "grid-0");
    let before = store.current_session().unwrap().clone();

    let expected = [
        ("a", "grid-1", ErrorCode::SourceAlreadyUsed),
        ("b", "grid-9", ErrorCode::TargetOutOfBounds),
        ("ghost", "tier-S", ErrorCode::SourceNotFound),
        ("b", "tier-Z", ErrorCode::TargetPositionInvalid),
        ("grid-0", "tier-Z", ErrorCode::TargetPositionInvalid),
    ];
    for (active, over, code) in expected {
        let result = drag(&mut store, active, over);
        assert!(!result.success);
        assert_eq!(result.error_code, Some(code), "{} -> {}", active, over);
    }
    assert_eq!(store.current_session().unwrap(), &before);
}

#[test]
fn test_backlog_refresh_preserves_mutual_exclusion() {
    let ids = ["a", "b"];
    let mut store = store_with(&ids, 3);
    assert!(drag(&mut store, "a", "grid-0").success);
    assert!(drag(&mut store, "b", "tier-A").success);

    store.set_backlog_groups(Vec::new()).unwrap();
    let items = ids.iter().map(|id| BacklogItem::new(*id, id.to_uppercase())).collect();
    store
        .set_backlog_groups(vec![BacklogGroup::new("g1", "Group").with_items(items)])
        .unwrap();
    assert_mutual_exclusion(&store, &ids);

    assert!(!drag(&mut store, "a", "grid-1").success);
    assert!(!drag(&mut store, "b", "tier-S").success);
    assert_mutual_exclusion(&store, &ids);
}

#[test]
fn test_compare_tray_is_capped() {
    let ids = ["a", "b", "c", "d", "e"];
    let mut store = store_with(&ids, 5);
    for id in &ids[..4] {
        assert!(drag(&mut store, id, "compare").success);
    }

    let result = drag(&mut store, "e", "compare");
    assert_eq!(result.error_code, Some(ErrorCode::TargetOutOfBounds));
    assert_eq!(
        store.current_session().unwrap().compare_list.len(),
        MAX_COMPARE_ITEMS
    );
}
