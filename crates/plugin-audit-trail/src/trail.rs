//! Bounded in-memory audit trail.

use std::collections::VecDeque;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;

/// Default number of entries kept.
pub const DEFAULT_CAPACITY: usize = 1024;

/// One recorded transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditEntry {
    /// Source of the entry (`"plugin"` or `"registry"`).
    pub source: String,
    /// What happened (`"activate"`, `"plugin.deactivate"`, ...).
    pub action: String,
    /// Plugin involved, empty for table-level events.
    pub plugin: String,
    /// When it was recorded.
    pub at: DateTime<Utc>,
}

/// Shared trail. Cloning shares the entries.
#[derive(Debug, Clone)]
pub struct AuditTrail {
    capacity: usize,
    entries: Arc<Mutex<VecDeque<AuditEntry>>>,
}

impl AuditTrail {
    /// Creates a trail keeping at most `capacity` entries (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
        }
    }

    /// Appends an entry, evicting the oldest when full.
    pub async fn record(&self, source: &str, action: &str, plugin: &str) {
        let mut entries = self.entries.lock().await;
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(AuditEntry {
            source: source.to_string(),
            action: action.to_string(),
            plugin: plugin.to_string(),
            at: Utc::now(),
        });
    }

    /// Snapshot of all entries, oldest first.
    pub async fn entries(&self) -> Vec<AuditEntry> {
        self.entries.lock().await.iter().cloned().collect()
    }

    /// Entries for one plugin.
    pub async fn entries_for(&self, plugin: &str) -> Vec<AuditEntry> {
        self.entries
            .lock()
            .await
            .iter()
            .filter(|e| e.plugin == plugin)
            .cloned()
            .collect()
    }

    /// Number of entries held.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    /// Returns whether the trail is empty.
    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

impl Default for AuditTrail {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
