use crate::serialization::JsonSerializer;
use crate::traits::{KeyValueStore, PersistenceMetadata, Serializer, FORMAT_VERSION};
use goat_core::{Clock, GoatError, GoatResult};
use goat_domain::ItemStoreState;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use uuid::Uuid;

/// Storage key of the persisted item store.
pub const ITEM_STORE_KEY: &str = "item-store";

/// On-disk wrapper around the item store state
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonEnvelope {
    pub version: u32,
    pub metadata: PersistenceMetadata,
    pub data: serde_json::Value,
}

/// Saves and restores [`ItemStoreState`] under [`ITEM_STORE_KEY`].
pub struct SessionStore {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    instance_id: Uuid,
    serializer: JsonSerializer,
}

impl SessionStore {
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            instance_id: Uuid::new_v4(),
            serializer: JsonSerializer,
        }
    }

    pub fn instance_id(&self) -> Uuid {
        self.instance_id
    }

    pub fn save(&self, state: &ItemStoreState) -> GoatResult<PersistenceMetadata> {
        let data =
            serde_json::to_value(state).map_err(|e| GoatError::Serialization(e.to_string()))?;
        let envelope = JsonEnvelope {
            version: FORMAT_VERSION,
            metadata: PersistenceMetadata::new(self.instance_id, self.clock.now()),
            data,
        };
        let bytes = Serializer::<JsonEnvelope>::serialize(&self.serializer, &envelope)?;
        let text = String::from_utf8(bytes).map_err(|e| GoatError::Serialization(e.to_string()))?;
        self.store.set(ITEM_STORE_KEY, &text)?;
        tracing::debug!("Saved item store ({} sessions)", state.list_sessions.len());
        Ok(envelope.metadata)
    }

    /// Returns `None` when nothing has been saved yet.
    pub fn load(&self) -> GoatResult<Option<(ItemStoreState, PersistenceMetadata)>> {
        let Some(text) = self.store.get(ITEM_STORE_KEY)? else {
            return Ok(None);
        };
        let envelope: JsonEnvelope =
            Serializer::<JsonEnvelope>::deserialize(&self.serializer, text.as_bytes())?;
        if envelope.version != FORMAT_VERSION {
            return Err(GoatError::Serialization(format!(
                "Unsupported format version: {}",
                envelope.version
            )));
        }
        let state = serde_json::from_value(envelope.data)
            .map_err(|e| GoatError::Serialization(e.to_string()))?;
        Ok(Some((state, envelope.metadata)))
    }
}

/// Spawns a task that persists snapshots sent on the returned channel.
///
/// Snapshots arriving within `window` of the first pending one collapse
/// into a single write of the latest. Dropping the sender flushes anything
/// pending and ends the task.
pub fn spawn_batched_saver(
    store: Arc<SessionStore>,
    window: Duration,
) -> (mpsc::UnboundedSender<ItemStoreState>, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::unbounded_channel::<ItemStoreState>();
    let handle = tokio::spawn(async move {
        while let Some(mut latest) = rx.recv().await {
            let deadline = tokio::time::sleep(window);
            tokio::pin!(deadline);
            loop {
                tokio::select! {
                    _ = &mut deadline => break,
                    next = rx.recv() => match next {
                        Some(state) => latest = state,
                        None => break,
                    },
                }
            }
            if let Err(e) = store.save(&latest) {
                tracing::error!("Failed to persist item store: {}", e);
            }
        }
        tracing::debug!("Batched saver stopped");
    });
    (tx, handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use goat_core::SystemClock;
    use goat_domain::{create_empty_session, ItemStoreState};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingStore {
        inner: MemoryStore,
        writes: AtomicUsize,
    }

    impl KeyValueStore for CountingStore {
        fn get(&self, key: &str) -> GoatResult<Option<String>> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> GoatResult<()> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> GoatResult<()> {
            self.inner.remove(key)
        }

        fn keys(&self) -> GoatResult<Vec<String>> {
            self.inner.keys()
        }
    }

    fn state_for(list_ids: &[&str]) -> ItemStoreState {
        let mut state = ItemStoreState::default();
        for id in list_ids {
            state
                .list_sessions
                .insert(id.to_string(), create_empty_session(id, 3, chrono::Utc::now()));
        }
        state.active_session_id = list_ids.last().map(|id| id.to_string());
        state
    }

    #[test]
    fn test_save_and_load_envelope() {
        let kv = Arc::new(MemoryStore::new());
        let store = SessionStore::new(kv.clone(), Arc::new(SystemClock));
        let state = state_for(&["L1", "L2"]);

        let metadata = store.save(&state).unwrap();
        assert_eq!(metadata.instance_id, store.instance_id());

        let raw: serde_json::Value =
            serde_json::from_str(&kv.get(ITEM_STORE_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(raw["version"], FORMAT_VERSION);
        assert_eq!(raw["data"]["activeSessionId"], "L2");

        let (loaded, loaded_metadata) = store.load().unwrap().unwrap();
        assert_eq!(loaded, state);
        assert_eq!(loaded_metadata, metadata);
    }

    #[test]
    fn test_load_empty_and_wrong_version() {
        let kv = Arc::new(MemoryStore::new());
        let store = SessionStore::new(kv.clone(), Arc::new(SystemClock));
        assert!(store.load().unwrap().is_none());

        kv.set(
            ITEM_STORE_KEY,
            r#"{"version":99,"metadata":{"format_version":99,
                "instance_id":"00000000-0000-0000-0000-000000000000",
                "saved_at":"2024-01-01T00:00:00Z"},"data":{}}"#,
        )
        .unwrap();
        assert!(matches!(store.load(), Err(GoatError::Serialization(_))));
    }

    #[tokio::test]
    async fn test_batched_saver_coalesces_bursts() {
        let kv = Arc::new(CountingStore::default());
        let store = Arc::new(SessionStore::new(kv.clone(), Arc::new(SystemClock)));
        let (tx, handle) = spawn_batched_saver(store.clone(), Duration::from_millis(100));

        tx.send(state_for(&["L1"])).unwrap();
        tx.send(state_for(&["L1", "L2"])).unwrap();
        tx.send(state_for(&["L1", "L2", "L3"])).unwrap();
        drop(tx);
        handle.await.unwrap();

        assert_eq!(kv.writes.load(Ordering::SeqCst), 1);
        let (loaded, _) = store.load().unwrap().unwrap();
        assert_eq!(loaded.list_sessions.len(), 3);
    }
}
