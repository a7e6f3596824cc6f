//! Background reconciliation of local backlog data with the backend.
//!
//! [`SyncService::scheduled_sync`] debounces requests behind one timer for
//! the whole process: a new request cancels a pending timer whichever list
//! it was for, but a sync that already woke up runs to completion.
//! [`SyncService::perform_sync`] walks loaded groups one after another, so a
//! failing group never stops the rest.

use super::api::ItemGroupsApi;
use crate::conflict::{detect_conflicts, ConflictResolution, SyncConflict};
use crate::local_data::LocalDataManager;
use goat_core::GoatResult;
use goat_domain::BacklogItem;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;

pub const BACKLOG_NEW_ITEMS_EVENT: &str = "backlog-new-items";

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Sync indicator state of a list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncStatus {
    #[default]
    Idle,
    /// Local changes exist and a sync is scheduled.
    Pending,
    Syncing,
    Synced,
    Error,
    Conflict,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum SyncEvent {
    /// A sync found server items the user has not seen yet.
    #[serde(rename = "backlog-new-items", rename_all = "camelCase")]
    BacklogNewItems {
        list_id: String,
        group_id: String,
        group_name: String,
        items: Vec<BacklogItem>,
    },
}

impl SyncEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::BacklogNewItems { .. } => BACKLOG_NEW_ITEMS_EVENT,
        }
    }
}

/// Outcome of one [`SyncService::perform_sync`] pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub list_id: String,
    pub synced_groups: Vec<String>,
    pub failed_groups: Vec<String>,
    /// New items per group id.
    pub new_items: BTreeMap<String, Vec<BacklogItem>>,
}

impl SyncReport {
    pub fn new_item_count(&self) -> usize {
        self.new_items.values().map(Vec::len).sum()
    }
}

/// A debounced sync task. Whoever sets `claimed` first owns it: the task
/// when its timer fires, or a newer request cancelling it.
struct ScheduledSync {
    handle: JoinHandle<()>,
    claimed: Arc<AtomicBool>,
}

#[derive(Default)]
struct SyncTimers {
    pending: Option<ScheduledSync>,
    running: Vec<JoinHandle<()>>,
}

#[derive(Clone)]
pub struct SyncService {
    api: Arc<dyn ItemGroupsApi>,
    local: Arc<LocalDataManager>,
    statuses: Arc<Mutex<HashMap<String, SyncStatus>>>,
    timers: Arc<Mutex<SyncTimers>>,
    events: broadcast::Sender<SyncEvent>,
    debounce: Duration,
}

impl SyncService {
    pub fn new(
        api: Arc<dyn ItemGroupsApi>,
        local: Arc<LocalDataManager>,
        debounce: Duration,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            api,
            local,
            statuses: Arc::new(Mutex::new(HashMap::new())),
            timers: Arc::new(Mutex::new(SyncTimers::default())),
            events,
            debounce,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.events.subscribe()
    }

    pub async fn status(&self, list_id: &str) -> SyncStatus {
        self.statuses
            .lock()
            .await
            .get(list_id)
            .copied()
            .unwrap_or_default()
    }

    async fn set_status(&self, list_id: &str, status: SyncStatus) {
        tracing::debug!("Sync status of {} -> {:?}", list_id, status);
        self.statuses
            .lock()
            .await
            .insert(list_id.to_string(), status);
    }

    /// Requests a sync of `list_id` after the debounce window. A request
    /// made before the window elapses replaces this one; once the sync has
    /// started it is left to finish.
    pub async fn scheduled_sync(&self, list_id: &str) {
        self.set_status(list_id, SyncStatus::Pending).await;
        let mut timers = self.timers.lock().await;
        timers.running.retain(|handle| !handle.is_finished());
        if let Some(previous) = timers.pending.take() {
            if previous.claimed.swap(true, Ordering::SeqCst) {
                timers.running.push(previous.handle);
            } else {
                previous.handle.abort();
            }
        }

        let claimed = Arc::new(AtomicBool::new(false));
        let service = self.clone();
        let list_id = list_id.to_string();
        let debounce = self.debounce;
        let flag = claimed.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            if flag.swap(true, Ordering::SeqCst) {
                return;
            }
            if let Err(e) = service.perform_sync(&list_id).await {
                tracing::warn!("Scheduled sync of {} failed: {}", list_id, e);
            }
        });
        timers.pending = Some(ScheduledSync { handle, claimed });
    }

    /// Waits for the pending scheduled sync and any sync still running.
    pub async fn flush(&self) {
        let handles: Vec<JoinHandle<()>> = {
            let mut timers = self.timers.lock().await;
            let pending = timers.pending.take().map(|scheduled| scheduled.handle);
            timers.running.drain(..).chain(pending).collect()
        };
        for handle in handles {
            if let Err(e) = handle.await {
                if !e.is_cancelled() {
                    tracing::warn!("Scheduled sync task failed: {}", e);
                }
            }
        }
    }

    /// Pulls every loaded group from the backend and merges in items not
    /// seen locally.
    pub async fn perform_sync(&self, list_id: &str) -> GoatResult<SyncReport> {
        self.set_status(list_id, SyncStatus::Syncing).await;
        let session = match self.local.get_session(list_id) {
            Ok(session) => session,
            Err(e) => {
                self.set_status(list_id, SyncStatus::Error).await;
                return Err(e);
            }
        };

        let mut report = SyncReport {
            list_id: list_id.to_string(),
            ..SyncReport::default()
        };
        for group_id in session.loaded_group_ids() {
            let merged = match self.api.get_group(&group_id, true).await {
                Ok(group) => self
                    .local
                    .merge_server_items(list_id, &group_id, group.items)
                    .map(|items| (group.name, items)),
                Err(e) => Err(e),
            };
            match merged {
                Ok((group_name, items)) => {
                    if !items.is_empty() {
                        tracing::info!("{} new items in group {}", items.len(), group_id);
                        // No subscribers is fine.
                        let _ = self.events.send(SyncEvent::BacklogNewItems {
                            list_id: list_id.to_string(),
                            group_id: group_id.clone(),
                            group_name,
                            items: items.clone(),
                        });
                        report.new_items.insert(group_id.clone(), items);
                    }
                    report.synced_groups.push(group_id);
                }
                Err(e) => {
                    tracing::warn!("Failed to sync group {}: {}", group_id, e);
                    report.failed_groups.push(group_id);
                }
            }
        }

        let all_failed = !report.failed_groups.is_empty() && report.synced_groups.is_empty();
        if all_failed {
            self.set_status(list_id, SyncStatus::Error).await;
        } else {
            self.local.mark_full_sync(list_id)?;
            self.set_status(list_id, SyncStatus::Synced).await;
        }
        Ok(report)
    }

    /// Items removed locally that the server still has.
    pub async fn check_for_conflicts(&self, list_id: &str) -> GoatResult<Vec<SyncConflict>> {
        let session = self.local.get_session(list_id)?;
        let mut conflicts = Vec::new();
        for (group_id, state) in &session.groups {
            if state.removed_item_ids.is_empty() {
                continue;
            }
            match self.api.get_group(group_id, true).await {
                Ok(group) => conflicts.extend(detect_conflicts(group_id, state, &group.items)),
                Err(e) => tracing::warn!("Conflict check skipped group {}: {}", group_id, e),
            }
        }
        if !conflicts.is_empty() {
            self.set_status(list_id, SyncStatus::Conflict).await;
        }
        Ok(conflicts)
    }

    /// `UseRemote` wipes local data and reloads every previously loaded
    /// group from the backend. `KeepLocal` changes nothing.
    pub async fn resolve_conflicts(
        &self,
        list_id: &str,
        resolution: ConflictResolution,
    ) -> GoatResult<()> {
        tracing::info!("Resolving conflicts of {} with {}", list_id, resolution);
        if resolution == ConflictResolution::KeepLocal {
            return Ok(());
        }

        let group_ids = self.local.get_session(list_id)?.loaded_group_ids();
        self.local.clear_session(list_id)?;
        self.set_status(list_id, SyncStatus::Syncing).await;

        let mut failed = 0;
        for group_id in &group_ids {
            match self.api.get_group(group_id, true).await {
                Ok(group) => {
                    let items = group.items.clone();
                    self.local.initialize_from_api(list_id, &[group])?;
                    self.local.load_group_items(list_id, group_id, items)?;
                }
                Err(e) => {
                    tracing::warn!("Failed to reload group {}: {}", group_id, e);
                    failed += 1;
                }
            }
        }

        if failed > 0 && failed == group_ids.len() {
            self.set_status(list_id, SyncStatus::Error).await;
        } else {
            self.local.mark_full_sync(list_id)?;
            self.set_status(list_id, SyncStatus::Synced).await;
        }
        Ok(())
    }
}
