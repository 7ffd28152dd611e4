//! CLI command definitions and dispatch.

pub mod info;
pub mod lifecycle;
pub mod list;

use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use tracing::debug;

use plugin_audit_trail::{AuditTrail, AuditTrailListener};
use plugreg_core::config::AppConfig;
use plugreg_core::error::AppError;
use plugreg_database::{DatabasePool, PluginRepository};
use plugreg_plugin::{EventDispatcher, ListenerRegistry, PluginFactories, PluginRegistry};

use crate::output::OutputFormat;

/// plugreg: plugin registry administration
#[derive(Debug, Parser)]
#[command(name = "plugreg", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Plugin name argument
#[derive(Debug, Args)]
pub struct NameArgs {
    /// Plugin name (a `vendor/` prefix is ignored)
    pub name: String,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List plugins found on disk or recorded as active
    List,
    /// Show whether a plugin is active
    Status(NameArgs),
    /// Activate a plugin
    Activate(NameArgs),
    /// Deactivate a plugin
    Deactivate(NameArgs),
    /// Show a plugin's descriptor and state
    Info(NameArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: &AppConfig) -> Result<(), AppError> {
        let pool = DatabasePool::connect(&config.database).await?;
        if !pool.health_check().await? {
            return Err(AppError::database("Database health check returned an unexpected value"));
        }

        let result = self.run(&pool, config).await;
        pool.close().await;
        result
    }

    async fn run(&self, pool: &DatabasePool, config: &AppConfig) -> Result<(), AppError> {
        let registry = open_registry(pool, config).await?;

        match &self.command {
            Commands::List => list::execute(&registry, self.format).await,
            Commands::Status(args) => lifecycle::status(&registry, &args.name, self.format).await,
            Commands::Activate(args) => {
                lifecycle::activate(&registry, &args.name, self.format).await
            }
            Commands::Deactivate(args) => {
                lifecycle::deactivate(&registry, &args.name, self.format).await
            }
            Commands::Info(args) => info::execute(&registry, &args.name, self.format).await,
        }
    }
}

/// Opens the registry over the database table with the compiled-in plugins.
pub async fn open_registry(
    pool: &DatabasePool,
    config: &AppConfig,
) -> Result<Arc<PluginRegistry>, AppError> {
    let store = PluginRepository::new(pool.pool().clone(), &config.plugins.table)?;

    let trail = AuditTrail::default();
    let mut factories = PluginFactories::new();
    plugin_audit_trail::register(&mut factories, trail.clone());

    let listeners = Arc::new(ListenerRegistry::new());
    listeners
        .subscribe_all(Arc::new(AuditTrailListener::new(trail)))
        .await;

    debug!(
        root = %config.plugins.directory,
        table = %config.plugins.table,
        "Opening plugin registry"
    );

    let registry = PluginRegistry::builder(&config.plugins.directory, Arc::new(store))
        .factories(factories)
        .dispatcher(Arc::new(EventDispatcher::new(listeners)))
        .open()
        .await?;
    Ok(registry)
}
