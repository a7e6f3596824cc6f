pub mod backlog;
pub mod comparison;
pub mod dispatcher;
pub mod grid;
pub mod item;
pub mod item_store;
pub mod operations;
pub mod session;
pub mod tier;

pub use backlog::{BacklogGroup, BacklogStore};
pub use comparison::{ComparisonMode, ComparisonState, MAX_COMPARE_ITEMS};
pub use dispatcher::{build_drag_context, handle_drag_end, run_operation, DragEndEvent};
pub use grid::{grid_slot_id, parse_grid_slot_id, GridItem, GridStore};
pub use item::{BacklogItem, ItemId, Transferable};
pub use item_store::{ItemStore, ItemStoreState};
pub use operations::{
    DragContext, DragOperation, DragOperationKind, DragOperationResult, DragSource,
    DragSourceType, DropTarget, DropTargetType, ErrorCode, OperationAction,
    OperationStoreContext, ValidationResult,
};
pub use session::{
    calculate_progress, create_empty_session, has_unsaved_changes, mark_session_synced,
    update_session_timestamp, validate_session, ListSession, SessionProgress,
};
pub use tier::{Tier, TierAssignment, TierStore, DEFAULT_TIERS};
