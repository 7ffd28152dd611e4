//! Plugin registry configuration.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Plugin registry configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginConfig {
    /// Directory containing one subdirectory per plugin.
    #[serde(default = "default_plugin_directory")]
    pub directory: String,
    /// Name of the table holding activation records.
    #[serde(default = "default_table")]
    pub table: String,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            directory: default_plugin_directory(),
            table: default_table(),
        }
    }
}

impl PluginConfig {
    /// Validate the configuration.
    ///
    /// The table name is interpolated into DDL and queries, so it must be a
    /// plain SQL identifier.
    pub fn validate(&self) -> Result<(), AppError> {
        if !is_sql_identifier(&self.table) {
            return Err(AppError::configuration(format!(
                "plugins.table '{}' is not a valid SQL identifier",
                self.table
            )));
        }
        if self.directory.trim().is_empty() {
            return Err(AppError::configuration("plugins.directory must not be empty"));
        }
        Ok(())
    }
}

/// Returns `true` for `[A-Za-z_][A-Za-z0-9_]{0,62}`.
pub fn is_sql_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    name.len() <= 63 && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn default_plugin_directory() -> String {
    "./plugins".to_string()
}

fn default_table() -> String {
    "plugin".to_string()
}
