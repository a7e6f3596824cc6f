pub mod api;
pub mod service;

#[cfg(test)]
pub use api::MockItemGroupsApi;
pub use api::{ItemGroup, ItemGroupsApi, StaticGroupsApi};
pub use service::{SyncEvent, SyncReport, SyncService, SyncStatus, BACKLOG_NEW_ITEMS_EVENT};
