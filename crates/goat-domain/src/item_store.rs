//! The item store aggregate.
//!
//! Owns every [`ListSession`] keyed by list id, the working copy of the
//! active session, and the ephemeral comparison state. It is the only
//! writer of sessions: every grid, backlog or tier mutation goes through
//! one of its actions, which delegate to the drag operations and then bump
//! the session timestamp.

use crate::backlog::BacklogGroup;
use crate::comparison::{ComparisonMode, ComparisonState};
use crate::dispatcher::{self, DragEndEvent};
use crate::grid::grid_slot_id;
use crate::item::{BacklogItem, ItemId};
use crate::operations::{
    DragContext, DragOperationKind, DragOperationResult, DragSource, DropTarget, ErrorCode,
    OperationStoreContext,
};
use crate::session::{
    calculate_progress, create_empty_session, update_session_timestamp, validate_session,
    ListSession, SessionProgress,
};
use goat_core::{Clock, DebugLog, GoatError, GoatResult, Loggable};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Persisted form of the item store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemStoreState {
    pub list_sessions: BTreeMap<String, ListSession>,
    pub active_session_id: Option<String>,
    #[serde(default)]
    pub comparison: ComparisonState,
}

pub struct ItemStore {
    list_sessions: BTreeMap<String, ListSession>,
    active: Option<ListSession>,
    comparison: ComparisonState,
    default_list_size: usize,
    clock: Arc<dyn Clock>,
    log: DebugLog,
}

fn stores(session: &mut ListSession) -> OperationStoreContext<'_> {
    OperationStoreContext {
        backlog: &mut session.backlog,
        tiers: &mut session.tiers,
        grid: &mut session.grid,
        compare_list: &mut session.compare_list,
    }
}

impl ItemStore {
    pub fn new(clock: Arc<dyn Clock>, default_list_size: usize) -> Self {
        Self {
            list_sessions: BTreeMap::new(),
            active: None,
            comparison: ComparisonState::default(),
            default_list_size,
            clock,
            log: DebugLog::new(),
        }
    }

    pub fn from_state(
        state: ItemStoreState,
        clock: Arc<dyn Clock>,
        default_list_size: usize,
    ) -> Self {
        let mut store = Self::new(clock, default_list_size);
        store.list_sessions = state.list_sessions;
        store.comparison = state.comparison;
        if let Some(list_id) = state.active_session_id {
            if !store.load_session(&list_id) {
                tracing::warn!("Active session {} could not be restored", list_id);
            }
        }
        store
    }

    /// Snapshot for persistence, including unsaved edits of the active
    /// session.
    pub fn to_state(&self) -> ItemStoreState {
        let mut list_sessions = self.list_sessions.clone();
        if let Some(active) = &self.active {
            list_sessions.insert(active.list_id.clone(), active.clone());
        }
        ItemStoreState {
            list_sessions,
            active_session_id: self.active_session_id().map(str::to_string),
            comparison: self.comparison.clone(),
        }
    }

    pub fn active_session_id(&self) -> Option<&str> {
        self.active.as_ref().map(|s| s.list_id.as_str())
    }

    pub fn current_session(&self) -> Option<&ListSession> {
        self.active.as_ref()
    }

    pub fn list_sessions(&self) -> &BTreeMap<String, ListSession> {
        &self.list_sessions
    }

    pub fn comparison(&self) -> &ComparisonState {
        &self.comparison
    }

    pub fn debug_log(&self) -> &DebugLog {
        &self.log
    }

    fn active_mut(&mut self) -> GoatResult<&mut ListSession> {
        self.active
            .as_mut()
            .ok_or_else(|| GoatError::Validation("no active session".to_string()))
    }

    fn touch(&mut self) {
        let now = self.clock.now();
        if let Some(session) = self.active.take() {
            self.active = Some(update_session_timestamp(session, now));
        }
    }

    /// True when the working copy differs from what was last saved.
    pub fn is_dirty(&self) -> bool {
        match &self.active {
            Some(active) => self.list_sessions.get(&active.list_id) != Some(active),
            None => false,
        }
    }

    /// Saves the active session if needed, then loads or creates the one
    /// for `list_id`.
    pub fn switch_to_list(&mut self, list_id: &str, list_size: Option<usize>) -> &ListSession {
        if self.active_session_id() != Some(list_id) {
            if self.is_dirty() {
                self.save_current_session();
            }
            self.comparison.clear();
            if !self.load_session(list_id) {
                let size = list_size.unwrap_or(self.default_list_size);
                tracing::info!("Creating session for list {} ({} slots)", list_id, size);
                self.active = Some(create_empty_session(list_id, size, self.clock.now()));
            }
        }
        self.log.add_log(format!("switched to list {}", list_id));
        // The branch above always leaves a session in place.
        self.active.get_or_insert_with(|| {
            create_empty_session(list_id, self.default_list_size, self.clock.now())
        })
    }

    pub fn save_current_session(&mut self) {
        if let Some(active) = &self.active {
            tracing::debug!("Saving session for list {}", active.list_id);
            self.list_sessions
                .insert(active.list_id.clone(), active.clone());
        }
    }

    /// Makes the stored session for `list_id` active. Returns false when
    /// there is none or it fails validation.
    pub fn load_session(&mut self, list_id: &str) -> bool {
        let Some(stored) = self.list_sessions.get(list_id) else {
            return false;
        };
        if let Err(e) = validate_session(stored) {
            tracing::warn!("Discarding stored session {}: {}", list_id, e);
            return false;
        }
        self.active = Some(stored.clone());
        true
    }

    pub fn delete_session(&mut self, list_id: &str) -> bool {
        let removed = self.list_sessions.remove(list_id).is_some();
        if self.active_session_id() == Some(list_id) {
            self.active = None;
            self.comparison.clear();
            return true;
        }
        removed
    }

    fn run(&mut self, source: DragSource, target: DropTarget) -> DragOperationResult {
        let Ok(session) = self.active_mut() else {
            return no_session();
        };
        let context = DragContext::new(source, target, session.list_size);
        let result = dispatcher::run_operation(&context, &mut stores(session));
        self.after_operation(&result);
        result
    }

    fn after_operation(&mut self, result: &DragOperationResult) {
        let kind = result
            .operation_type
            .map_or("none", DragOperationKind::as_str);
        if result.success {
            self.log.add_log(format!("{} {:?}", kind, result.action));
            self.touch();
            if result.operation_type == Some(DragOperationKind::AddToCompare)
                && self.comparison.is_open
            {
                self.sync_comparison_items();
            }
        } else {
            let code = result.error_code.map_or("", ErrorCode::as_str);
            self.log.add_log(format!("{} rejected {}", kind, code));
        }
    }

    pub fn assign_item_to_grid(&mut self, item_id: &str, position: usize) -> DragOperationResult {
        self.run(DragSource::backlog(item_id), DropTarget::grid_slot(position))
    }

    pub fn remove_item_from_grid(&mut self, position: usize) -> DragOperationResult {
        let item_id = self.grid_item_id(position);
        self.run(DragSource::grid(position, item_id), DropTarget::backlog())
    }

    pub fn move_grid_item(&mut self, from: usize, to: usize) -> DragOperationResult {
        let item_id = self.grid_item_id(from);
        self.run(DragSource::grid(from, item_id), DropTarget::grid_slot(to))
    }

    fn grid_item_id(&self, position: usize) -> String {
        self.active
            .as_ref()
            .and_then(|s| s.grid.get(position))
            .and_then(|slot| slot.item_id())
            .map(str::to_string)
            .unwrap_or_default()
    }

    /// Empties the grid and releases every placed backlog item.
    pub fn clear_grid(&mut self) -> GoatResult<Vec<String>> {
        let session = self.active_mut()?;
        let released = session.grid.clear_grid();
        for item_id in &released {
            session.backlog.release(item_id);
        }
        session.selected_grid_item = None;
        self.log.add_log(format!("cleared grid ({} released)", released.len()));
        self.touch();
        Ok(released)
    }

    pub fn toggle_backlog_group(&mut self, group_id: &str) -> GoatResult<bool> {
        let expanded = self.active_mut()?.backlog.toggle_group(group_id)?;
        self.touch();
        Ok(expanded)
    }

    /// Replaces the backlog groups. Items already on the grid, in a tier or
    /// in the pool come back marked used.
    pub fn set_backlog_groups(&mut self, groups: Vec<BacklogGroup>) -> GoatResult<()> {
        let session = self.active_mut()?;
        let placed = placements(session);
        session.backlog.replace_groups(groups, &placed);
        self.touch();
        Ok(())
    }

    pub fn select_backlog_item(&mut self, item_id: Option<&str>) -> GoatResult<()> {
        let session = self.active_mut()?;
        session.selected_backlog_item = match item_id {
            Some(id) => Some(
                session
                    .backlog
                    .get_item_by_id(id)
                    .cloned()
                    .ok_or_else(|| GoatError::NotFound(format!("backlog item {}", id)))?,
            ),
            None => None,
        };
        Ok(())
    }

    pub fn select_grid_item(&mut self, position: Option<usize>) -> GoatResult<()> {
        let session = self.active_mut()?;
        session.selected_grid_item = match position {
            Some(position) => Some(session.grid.get(position).cloned().ok_or(
                GoatError::OutOfBounds {
                    index: position,
                    len: session.grid.max_grid_size(),
                },
            )?),
            None => None,
        };
        Ok(())
    }

    pub fn open_comparison(&mut self) {
        let items = self
            .active
            .as_ref()
            .map(|s| s.compare_list.clone())
            .unwrap_or_default();
        self.comparison.open(items);
    }

    pub fn close_comparison(&mut self) {
        self.comparison.close();
    }

    pub fn add_to_comparison(&mut self, item_id: &str) -> DragOperationResult {
        self.run(DragSource::backlog(item_id), DropTarget::compare())
    }

    pub fn remove_from_comparison(&mut self, item_id: &str) {
        if let Some(session) = self.active.as_mut() {
            session.compare_list.retain(|item| item.id != item_id);
        }
        self.comparison.remove_item(item_id);
        self.touch();
    }

    pub fn toggle_comparison_selection(&mut self, item_id: &str) -> bool {
        self.comparison.toggle_selection(item_id)
    }

    pub fn set_comparison_mode(&mut self, mode: ComparisonMode) {
        self.comparison.set_mode(mode);
    }

    pub fn clear_comparison(&mut self) {
        if let Some(session) = self.active.as_mut() {
            session.compare_list.clear();
        }
        self.comparison.clear();
        self.touch();
    }

    fn sync_comparison_items(&mut self) {
        let Some(session) = &self.active else {
            return;
        };
        let items: Vec<BacklogItem> = session.compare_list.clone();
        for item in items {
            self.comparison.add_item(item);
        }
    }

    /// Dispatches a raw drag-end event against the active session.
    pub fn handle_drag_end(&mut self, event: &DragEndEvent) -> DragOperationResult {
        let Ok(session) = self.active_mut() else {
            return no_session();
        };
        let size = session.list_size;
        let result = dispatcher::handle_drag_end(event, &mut stores(session), size);
        self.after_operation(&result);
        result
    }

    pub fn get_session_progress(&self) -> Option<SessionProgress> {
        self.active
            .as_ref()
            .map(|s| calculate_progress(s.grid.grid_items()))
    }
}

/// Items placed anywhere in the session, with their grid slot id when on
/// the grid.
fn placements(session: &ListSession) -> HashMap<ItemId, Option<String>> {
    let mut placed: HashMap<ItemId, Option<String>> = session
        .tiers
        .tiers()
        .iter()
        .flat_map(|tier| tier.item_ids())
        .chain(session.tiers.unranked().iter().map(String::as_str))
        .map(|item_id| (item_id.to_string(), None))
        .collect();
    for (position, slot) in session.grid.grid_items().iter().enumerate() {
        if let Some(item_id) = slot.item_id() {
            placed.insert(item_id.to_string(), Some(grid_slot_id(position)));
        }
    }
    placed
}

fn no_session() -> DragOperationResult {
    DragOperationResult::reject(None, ErrorCode::UnknownError, "No active session")
}
