pub mod json_dir_store;
pub mod memory_store;
pub mod session_store;

pub use json_dir_store::JsonDirStore;
pub use memory_store::MemoryStore;
pub use session_store::{spawn_batched_saver, JsonEnvelope, SessionStore, ITEM_STORE_KEY};
