//! Plugin activation record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Maximum length of the `name` column.
pub const MAX_NAME_LEN: usize = 128;

/// Maximum length of the `version` column.
pub const MAX_VERSION_LEN: usize = 16;

/// A row in the plugin table. Its existence marks the plugin as active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct PluginRecord {
    /// Auto-increment primary key.
    pub id: i32,
    /// Clean plugin name (unique).
    pub name: String,
    /// Version recorded at activation time.
    pub version: String,
    /// When the plugin was activated.
    pub created: DateTime<Utc>,
}

impl PluginRecord {
    /// Truncate a version string to fit the `version` column.
    pub fn fit_version(version: &str) -> String {
        version.chars().take(MAX_VERSION_LEN).collect()
    }
}
