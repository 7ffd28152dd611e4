//! Plugin activation repository implementation.

use sqlx::PgPool;

use plugreg_core::error::{AppError, ErrorKind};
use plugreg_core::result::AppResult;
use plugreg_entity::plugin::model::PluginRecord;

use crate::schema::{ensure_plugin_table, quoted_table};

const COLUMNS: &str = "id, name, version, created";

/// Repository for plugin activation records.
#[derive(Debug, Clone)]
pub struct PluginRepository {
    pool: PgPool,
    table: String,
    quoted: String,
}

impl PluginRepository {
    /// Create a new plugin repository for the given table.
    pub fn new(pool: PgPool, table: &str) -> AppResult<Self> {
        Ok(Self {
            pool,
            table: table.to_string(),
            quoted: quoted_table(table)?,
        })
    }

    /// The unquoted table name.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Create the table if it does not exist. Returns `true` if created.
    pub async fn install(&self) -> AppResult<bool> {
        ensure_plugin_table(&self.pool, &self.table).await
    }

    /// Find a record by clean plugin name.
    pub async fn find_by_name(&self, name: &str) -> AppResult<Option<PluginRecord>> {
        sqlx::query_as::<_, PluginRecord>(&format!(
            "SELECT {COLUMNS} FROM {} WHERE name = $1",
            self.quoted
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find plugin", e))
    }

    /// List every record, ordered by activation time.
    pub async fn find_all(&self) -> AppResult<Vec<PluginRecord>> {
        sqlx::query_as::<_, PluginRecord>(&format!(
            "SELECT {COLUMNS} FROM {} ORDER BY created, id",
            self.quoted
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list plugins", e))
    }

    /// Insert an activation record.
    ///
    /// A unique violation on `name` is reported as a conflict.
    pub async fn create(&self, name: &str, version: &str) -> AppResult<PluginRecord> {
        sqlx::query_as::<_, PluginRecord>(&format!(
            "INSERT INTO {} (name, version) VALUES ($1, $2) RETURNING {COLUMNS}",
            self.quoted
        ))
        .bind(name)
        .bind(PluginRecord::fit_version(version))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            let unique = e
                .as_database_error()
                .map(|db| db.is_unique_violation())
                .unwrap_or(false);
            if unique {
                AppError::with_source(
                    ErrorKind::Conflict,
                    format!("Plugin '{name}' already has an activation record"),
                    e,
                )
            } else {
                AppError::with_source(ErrorKind::Database, "Failed to insert plugin", e)
            }
        })
    }

    /// Delete the record for a plugin. Returns `true` if a row was removed.
    pub async fn delete_by_name(&self, name: &str) -> AppResult<bool> {
        let result = sqlx::query(&format!("DELETE FROM {} WHERE name = $1", self.quoted))
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete plugin", e))?;
        Ok(result.rows_affected() > 0)
    }
}
