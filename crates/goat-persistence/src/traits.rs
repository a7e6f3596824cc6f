use chrono::{DateTime, Utc};
use goat_core::GoatResult;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Envelope format written by this version.
pub const FORMAT_VERSION: u32 = 1;

/// Metadata stamped on every persisted envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistenceMetadata {
    pub format_version: u32,
    /// Process that performed the save
    pub instance_id: Uuid,
    pub saved_at: DateTime<Utc>,
}

impl PersistenceMetadata {
    pub fn new(instance_id: Uuid, saved_at: DateTime<Utc>) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            instance_id,
            saved_at,
        }
    }
}

/// String key-value storage, the browser `localStorage` analogue.
///
/// Operations are synchronous. Implementations use interior mutability so
/// a single store can be shared behind an `Arc` by the session store, the
/// local data manager and the sync service.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> GoatResult<Option<String>>;

    fn set(&self, key: &str, value: &str) -> GoatResult<()>;

    /// Removing a missing key is not an error.
    fn remove(&self, key: &str) -> GoatResult<()>;

    /// All keys, sorted.
    fn keys(&self) -> GoatResult<Vec<String>>;
}

/// Serialization strategy at the storage boundary
pub trait Serializer<T: Send + Sync>: Send + Sync {
    fn serialize(&self, data: &T) -> GoatResult<Vec<u8>>;

    fn deserialize(&self, bytes: &[u8]) -> GoatResult<T>;
}
