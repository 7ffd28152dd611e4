//! Persisted activation state.
//!
//! The registry talks to its table through [`PluginStore`]. Two
//! implementations are provided:
//! - [`PluginRepository`](plugreg_database::PluginRepository) (PostgreSQL)
//! - [`MemoryPluginStore`] (in-process, for embedding and tests)

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use plugreg_core::result::AppResult;
use plugreg_entity::plugin::model::PluginRecord;

pub use memory::MemoryPluginStore;

/// Storage of plugin activation records. A record's existence means "active".
#[async_trait]
pub trait PluginStore: Send + Sync + std::fmt::Debug + 'static {
    /// Provision the backing table. Returns `true` if it was created by this call.
    async fn install(&self) -> AppResult<bool>;

    /// Find the record for a clean plugin name.
    async fn find_by_name(&self, name: &str) -> AppResult<Option<PluginRecord>>;

    /// Insert a record. Fails with a conflict if one already exists.
    async fn insert(&self, name: &str, version: &str) -> AppResult<PluginRecord>;

    /// Delete the record for a plugin. Returns `true` if one was removed.
    async fn delete(&self, name: &str) -> AppResult<bool>;

    /// List all records.
    async fn list(&self) -> AppResult<Vec<PluginRecord>>;

    /// Returns whether a record exists for a clean plugin name.
    async fn exists(&self, name: &str) -> AppResult<bool> {
        Ok(self.find_by_name(name).await?.is_some())
    }

    /// Human-readable name of the backing table.
    fn table(&self) -> &str;
}
