use goat_core::{AppConfig, Clock, GoatError, GoatResult, SystemClock};
use goat_domain::{ItemStore, ListSession};
use goat_persistence::{
    JsonDirStore, KeyValueStore, LocalDataManager, SessionStore, StaticGroupsApi, SyncService,
};
use std::path::PathBuf;
use std::sync::Arc;

/// File in the data directory that seeds the group catalog.
pub const GROUP_CATALOG_FILE: &str = "groups.json";

pub struct CliContext {
    pub items: ItemStore,
    pub local: Arc<LocalDataManager>,
    pub api: Arc<StaticGroupsApi>,
    config: AppConfig,
    sessions: SessionStore,
}

impl CliContext {
    pub fn load(data_dir: Option<&str>) -> GoatResult<Self> {
        let mut config = AppConfig::load();
        if let Some(dir) = data_dir {
            config.data_dir = Some(PathBuf::from(dir));
        }
        let data_dir = config.effective_data_dir();
        tracing::debug!("Using data directory {}", data_dir.display());

        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let kv: Arc<dyn KeyValueStore> = Arc::new(JsonDirStore::new(&data_dir));
        let sessions = SessionStore::new(kv.clone(), clock.clone());
        let items = match sessions.load()? {
            Some((state, metadata)) => {
                tracing::debug!("Loaded item store saved at {}", metadata.saved_at);
                ItemStore::from_state(state, clock.clone(), config.effective_list_size())
            }
            None => ItemStore::new(clock.clone(), config.effective_list_size()),
        };
        let api = Arc::new(StaticGroupsApi::from_json_file(
            &data_dir.join(GROUP_CATALOG_FILE),
        )?);

        Ok(Self {
            items,
            local: Arc::new(LocalDataManager::new(kv, clock)),
            api,
            config,
            sessions,
        })
    }

    pub fn save(&self) -> GoatResult<()> {
        self.sessions.save(&self.items.to_state())?;
        Ok(())
    }

    pub fn sync_service(&self) -> SyncService {
        SyncService::new(self.api.clone(), self.local.clone(), self.config.sync_debounce())
    }

    /// Activates `list_id`, creating an empty session for unknown lists.
    pub fn open_list(&mut self, list_id: &str, size: Option<usize>) -> &ListSession {
        self.items.switch_to_list(list_id, size)
    }

    /// Activates `list_id` and refreshes its backlog from local data.
    pub fn refresh_backlog(&mut self, list_id: &str) -> GoatResult<()> {
        let groups = self.local.backlog_groups(list_id)?;
        self.items.switch_to_list(list_id, None);
        self.items.set_backlog_groups(groups)
    }

    /// Looks up a stored or active session without switching to it.
    pub fn session(&self, list_id: Option<&str>) -> GoatResult<&ListSession> {
        match list_id {
            None => self
                .items
                .current_session()
                .ok_or_else(|| GoatError::NotFound("no active session".to_string())),
            Some(id) if self.items.active_session_id() == Some(id) => self
                .items
                .current_session()
                .ok_or_else(|| GoatError::NotFound(format!("session {}", id))),
            Some(id) => self
                .items
                .list_sessions()
                .get(id)
                .ok_or_else(|| GoatError::NotFound(format!("session {}", id))),
        }
    }
}
