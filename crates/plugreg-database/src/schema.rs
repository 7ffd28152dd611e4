//! Plugin table provisioning.
//!
//! The plugin table is created on first use instead of through a migration
//! set, so the registry can be dropped into an existing database.

use sqlx::PgPool;
use tracing::info;

use plugreg_core::config::plugin::is_sql_identifier;
use plugreg_core::error::{AppError, ErrorKind};
use plugreg_core::result::AppResult;
use plugreg_entity::plugin::model::{MAX_NAME_LEN, MAX_VERSION_LEN};

/// Validate a table name and return it double-quoted for interpolation.
pub fn quoted_table(table: &str) -> AppResult<String> {
    if !is_sql_identifier(table) {
        return Err(AppError::validation(format!(
            "'{table}' is not a valid table name"
        )));
    }
    Ok(format!("\"{table}\""))
}

/// DDL for the plugin table.
pub fn create_table_sql(table: &str) -> AppResult<String> {
    let quoted = quoted_table(table)?;
    Ok(format!(
        "CREATE TABLE IF NOT EXISTS {quoted} (\n  \
         id SERIAL PRIMARY KEY,\n  \
         name VARCHAR({MAX_NAME_LEN}) NOT NULL,\n  \
         version VARCHAR({MAX_VERSION_LEN}) NOT NULL,\n  \
         created TIMESTAMPTZ NOT NULL DEFAULT NOW(),\n  \
         CONSTRAINT {table}_name_key UNIQUE (name)\n)"
    ))
}

/// Returns whether the table exists in the current search path.
pub async fn table_exists(pool: &PgPool, table: &str) -> AppResult<bool> {
    sqlx::query_scalar::<_, bool>("SELECT to_regclass($1) IS NOT NULL")
        .bind(quoted_table(table)?)
        .fetch_one(pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to inspect schema", e))
}

/// Create the plugin table if it is missing.
///
/// Returns `true` when the table was created by this call.
pub async fn ensure_plugin_table(pool: &PgPool, table: &str) -> AppResult<bool> {
    if table_exists(pool, table).await? {
        return Ok(false);
    }

    sqlx::query(&create_table_sql(table)?)
        .execute(pool)
        .await
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                format!("Failed to create plugin table '{table}'"),
                e,
            )
        })?;

    info!(table = %table, "Plugin table created");
    Ok(true)
}
