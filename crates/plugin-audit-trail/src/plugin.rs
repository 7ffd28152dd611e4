//! The audit trail plugin itself.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use plugreg_plugin::prelude::*;

use crate::trail::AuditTrail;

/// Constructor symbol. A plugin directory named `audit-trail` (or any name
/// ending in `-trail`) resolves to it.
pub const SYMBOL: &str = "trail::Plugin";

/// Plugin recording its own lifecycle hooks.
#[derive(Debug)]
pub struct AuditTrailPlugin {
    context: PluginContext,
    trail: AuditTrail,
}

impl AuditTrailPlugin {
    /// Creates the plugin for a registry-provided context.
    pub fn new(context: PluginContext, trail: AuditTrail) -> Self {
        Self { context, trail }
    }

    /// The trail this instance writes to.
    pub fn trail(&self) -> &AuditTrail {
        &self.trail
    }

    async fn record(&self, action: &str) {
        info!(
            plugin = %self.name(),
            id = self.id(),
            version = ?self.info().version,
            action,
            "Audit trail"
        );
        self.trail.record("plugin", action, self.name()).await;
    }
}

#[async_trait]
impl Plugin for AuditTrailPlugin {
    fn context(&self) -> &PluginContext {
        &self.context
    }

    async fn init(&self) -> Result<(), String> {
        self.record("init").await;
        Ok(())
    }

    async fn activate(&self) -> Result<(), String> {
        self.record("activate").await;
        Ok(())
    }

    async fn deactivate(&self) -> Result<(), String> {
        self.record("deactivate").await;
        Ok(())
    }
}

/// Registers the plugin constructor under [`SYMBOL`], writing to `trail`.
pub fn register(factories: &mut PluginFactories, trail: AuditTrail) {
    factories.register(SYMBOL, move |context| -> Arc<dyn Plugin> {
        Arc::new(AuditTrailPlugin::new(context, trail.clone()))
    });
}
