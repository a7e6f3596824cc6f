//! Per-list working sessions and the pure helpers that maintain them.

use crate::backlog::BacklogStore;
use crate::grid::{GridItem, GridStore};
use crate::item::BacklogItem;
use crate::tier::TierStore;
use chrono::{DateTime, Duration, Utc};
use goat_core::{GoatError, GoatResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Window during which an unsynced session still counts as having unsaved
/// changes.
pub const UNSAVED_CHANGES_WINDOW_MINUTES: i64 = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListSession {
    pub id: Uuid,
    pub list_id: String,
    pub list_size: usize,
    #[serde(rename = "gridItems")]
    pub grid: GridStore,
    #[serde(rename = "backlogGroups", default)]
    pub backlog: BacklogStore,
    #[serde(default)]
    pub tiers: TierStore,
    #[serde(default)]
    pub selected_backlog_item: Option<BacklogItem>,
    #[serde(default)]
    pub selected_grid_item: Option<GridItem>,
    #[serde(default)]
    pub compare_list: Vec<BacklogItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub synced: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionProgress {
    pub matched_count: usize,
    pub total_size: usize,
    pub percentage: f64,
    pub is_complete: bool,
}

pub fn create_empty_session(list_id: &str, size: usize, now: DateTime<Utc>) -> ListSession {
    ListSession {
        id: Uuid::new_v4(),
        list_id: list_id.to_string(),
        list_size: size,
        grid: GridStore::new(size),
        backlog: BacklogStore::default(),
        tiers: TierStore::default(),
        selected_backlog_item: None,
        selected_grid_item: None,
        compare_list: Vec::new(),
        created_at: now,
        updated_at: now,
        synced: false,
    }
}

/// Bumps `updated_at`; any local mutation also makes the session unsynced.
pub fn update_session_timestamp(mut session: ListSession, now: DateTime<Utc>) -> ListSession {
    session.updated_at = now;
    session.synced = false;
    session
}

pub fn mark_session_synced(mut session: ListSession) -> ListSession {
    session.synced = true;
    session
}

/// Structural check applied before trusting a restored session.
pub fn validate_session(session: &ListSession) -> GoatResult<()> {
    if session.list_id.is_empty() {
        return Err(GoatError::Validation("session has no list id".to_string()));
    }
    let grid_len = session.grid.max_grid_size();
    if grid_len != session.list_size {
        return Err(GoatError::Validation(format!(
            "session {} has {} grid slots for a list of {}",
            session.list_id, grid_len, session.list_size
        )));
    }
    Ok(())
}

pub fn calculate_progress(grid_items: &[GridItem]) -> SessionProgress {
    let matched_count = grid_items.iter().filter(|item| item.matched).count();
    let total_size = grid_items.len();
    let percentage = if total_size == 0 {
        0.0
    } else {
        matched_count as f64 / total_size as f64 * 100.0
    };
    // Exact comparison is deliberate; see DESIGN.md.
    #[allow(clippy::float_cmp)]
    let is_complete = percentage == 100.0;
    SessionProgress {
        matched_count,
        total_size,
        percentage,
        is_complete,
    }
}

/// Heuristic: unsynced and touched within the last five minutes.
pub fn has_unsaved_changes(session: &ListSession, now: DateTime<Utc>) -> bool {
    !session.synced
        && now - session.updated_at < Duration::minutes(UNSAVED_CHANGES_WINDOW_MINUTES)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::Transferable;

    fn at(minutes: i64) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap() + Duration::minutes(minutes)
    }

    #[test]
    fn test_empty_session_shape() {
        let session = create_empty_session("L1", 10, at(0));
        assert_eq!(session.grid.grid_items().len(), 10);
        assert!(session.backlog.groups().is_empty());
        assert!(!session.synced);
        assert!(validate_session(&session).is_ok());
    }

    #[test]
    fn test_validate_rejects_size_mismatch() {
        let mut session = create_empty_session("L1", 10, at(0));
        session.list_size = 12;
        assert!(validate_session(&session).is_err());
    }

    #[test]
    fn test_half_filled_progress() {
        let mut grid = GridStore::new(10);
        for position in 0..5 {
            let item = Transferable::new(format!("i{}", position), "Title");
            grid.assign_item_to_grid(&item, position).unwrap();
        }

        let progress = calculate_progress(grid.grid_items());
        assert_eq!(
            progress,
            SessionProgress {
                matched_count: 5,
                total_size: 10,
                percentage: 50.0,
                is_complete: false,
            }
        );
    }

    #[test]
    fn test_complete_and_empty_progress() {
        let mut grid = GridStore::new(3);
        for position in 0..3 {
            let item = Transferable::new(format!("i{}", position), "Title");
            grid.assign_item_to_grid(&item, position).unwrap();
        }
        assert!(calculate_progress(grid.grid_items()).is_complete);

        let empty = calculate_progress(&[]);
        assert_eq!(empty.percentage, 0.0);
        assert!(!empty.is_complete);
    }

    #[test]
    fn test_unsaved_changes_window() {
        let session = update_session_timestamp(create_empty_session("L1", 3, at(0)), at(1));
        assert!(has_unsaved_changes(&session, at(4)));
        // Still unsynced, but outside the window.
        assert!(!has_unsaved_changes(&session, at(7)));

        let synced = mark_session_synced(session);
        assert!(!has_unsaved_changes(&synced, at(2)));
    }

    #[test]
    fn test_session_json_field_names() {
        let session = create_empty_session("L1", 2, at(0));
        let value = serde_json::to_value(&session).unwrap();

        assert_eq!(value["listId"], "L1");
        assert_eq!(value["gridItems"][1]["id"], "grid-1");
        assert!(value["backlogGroups"].as_array().unwrap().is_empty());
    }
}
