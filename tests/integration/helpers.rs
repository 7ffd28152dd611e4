//! Shared test helpers for integration tests.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tempfile::TempDir;

use plugin_audit_trail::{AuditTrail, AuditTrailListener};
use plugreg_plugin::{
    EventDispatcher, ListenerRegistry, MemoryPluginStore, Plugin, PluginContext, PluginFactories,
    PluginRegistry,
};

/// Test application context
pub struct TestApp {
    /// Plugin root
    pub root: TempDir,
    /// Store shared with the registry
    pub store: MemoryPluginStore,
    /// Trail written by the audit plugin and listener
    pub trail: AuditTrail,
}

impl TestApp {
    /// Create a plugin root holding the given plugin directories
    pub fn new(plugins: &[&str]) -> Self {
        let root = TempDir::new().expect("Failed to create plugin root");
        for name in plugins {
            std::fs::create_dir(root.path().join(name)).expect("Failed to create plugin dir");
        }
        Self {
            root,
            store: MemoryPluginStore::default(),
            trail: AuditTrail::default(),
        }
    }

    /// Plugin root path
    pub fn path(&self) -> &Path {
        self.root.path()
    }

    /// Write a `plugin.json` for a plugin
    pub fn manifest(&self, plugin: &str, json: &str) {
        std::fs::write(self.path().join(plugin).join("plugin.json"), json)
            .expect("Failed to write manifest");
    }

    /// Open a registry over this root, sharing the store and trail
    pub async fn open(&self) -> Arc<PluginRegistry> {
        let mut factories = PluginFactories::new();
        plugin_audit_trail::register(&mut factories, self.trail.clone());
        factories.register("broken::Plugin", |context| -> Arc<dyn Plugin> {
            Arc::new(BrokenPlugin { context })
        });

        let listeners = Arc::new(ListenerRegistry::new());
        listeners
            .subscribe_all(Arc::new(AuditTrailListener::new(self.trail.clone())))
            .await;

        PluginRegistry::builder(self.path(), Arc::new(self.store.clone()))
            .factories(factories)
            .dispatcher(Arc::new(EventDispatcher::new(listeners)))
            .open()
            .await
            .expect("Failed to open registry")
    }
}

/// Plugin whose activation hook always fails
#[derive(Debug)]
pub struct BrokenPlugin {
    context: PluginContext,
}

#[async_trait]
impl Plugin for BrokenPlugin {
    fn context(&self) -> &PluginContext {
        &self.context
    }

    async fn activate(&self) -> Result<(), String> {
        Err("missing configuration".to_string())
    }

    async fn deactivate(&self) -> Result<(), String> {
        Ok(())
    }
}
