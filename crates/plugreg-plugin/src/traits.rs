//! The lifecycle trait every plugin implements.

use async_trait::async_trait;

use crate::api::context::PluginContext;
use crate::descriptor::PluginDescriptor;

/// Trait that all plugins must implement.
///
/// Hooks return `Err(message)` to signal failure; the registry wraps the
/// message into a registry error after compensating its persisted state.
#[async_trait]
pub trait Plugin: Send + Sync + std::fmt::Debug {
    /// The context the plugin was constructed with.
    fn context(&self) -> &PluginContext;

    /// Persisted record id.
    fn id(&self) -> i32 {
        self.context().id
    }

    /// Clean plugin name.
    fn name(&self) -> &str {
        &self.context().name
    }

    /// Plugin metadata, including version info.
    fn info(&self) -> &PluginDescriptor {
        &self.context().descriptor
    }

    /// Called when an already-active plugin is loaded at registry startup.
    async fn init(&self) -> Result<(), String> {
        Ok(())
    }

    /// Called once when the plugin transitions to active.
    async fn activate(&self) -> Result<(), String>;

    /// Called once when the plugin transitions to inactive.
    async fn deactivate(&self) -> Result<(), String>;
}
