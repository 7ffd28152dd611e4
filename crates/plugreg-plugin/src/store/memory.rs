//! In-memory plugin store using a Tokio mutex.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use tracing::debug;

use plugreg_core::error::AppError;
use plugreg_core::result::AppResult;
use plugreg_entity::plugin::model::PluginRecord;

use super::PluginStore;

#[derive(Debug, Default)]
struct InnerState {
    installed: bool,
    next_id: i32,
    records: BTreeMap<String, PluginRecord>,
}

/// In-memory plugin store.
///
/// Cloning shares the underlying state, so a test can keep a handle and
/// inspect what the registry persisted.
#[derive(Debug, Clone)]
pub struct MemoryPluginStore {
    table: String,
    state: Arc<Mutex<InnerState>>,
}

impl MemoryPluginStore {
    /// Creates an empty store for the given table name.
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            state: Arc::new(Mutex::new(InnerState {
                next_id: 1,
                ..Default::default()
            })),
        }
    }

    /// Creates a store that is already provisioned and holds `names` as active.
    pub async fn with_active(table: &str, names: &[(&str, &str)]) -> AppResult<Self> {
        let store = Self::new(table);
        store.install().await?;
        for (name, version) in names {
            store.insert(name, version).await?;
        }
        Ok(store)
    }

    /// Names of all stored records, sorted.
    pub async fn names(&self) -> Vec<String> {
        self.state.lock().await.records.keys().cloned().collect()
    }
}

impl Default for MemoryPluginStore {
    fn default() -> Self {
        Self::new("plugin")
    }
}

#[async_trait]
impl PluginStore for MemoryPluginStore {
    async fn install(&self) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        if state.installed {
            return Ok(false);
        }
        state.installed = true;
        debug!(table = %self.table, "In-memory plugin table provisioned");
        Ok(true)
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<PluginRecord>> {
        Ok(self.state.lock().await.records.get(name).cloned())
    }

    async fn insert(&self, name: &str, version: &str) -> AppResult<PluginRecord> {
        let mut state = self.state.lock().await;
        if state.records.contains_key(name) {
            return Err(AppError::conflict(format!(
                "Plugin '{name}' already has an activation record"
            )));
        }

        let record = PluginRecord {
            id: state.next_id,
            name: name.to_string(),
            version: PluginRecord::fit_version(version),
            created: Utc::now(),
        };
        state.next_id += 1;
        state.records.insert(name.to_string(), record.clone());
        Ok(record)
    }

    async fn delete(&self, name: &str) -> AppResult<bool> {
        Ok(self.state.lock().await.records.remove(name).is_some())
    }

    async fn list(&self) -> AppResult<Vec<PluginRecord>> {
        let state = self.state.lock().await;
        let mut records: Vec<PluginRecord> = state.records.values().cloned().collect();
        records.sort_by_key(|r| (r.created, r.id));
        Ok(records)
    }

    fn table(&self) -> &str {
        &self.table
    }
}
