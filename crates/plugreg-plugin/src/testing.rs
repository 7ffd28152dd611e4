//! Test doubles shared by the registry tests.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tempfile::TempDir;

use plugreg_core::error::AppError;
use plugreg_core::result::AppResult;
use plugreg_entity::plugin::model::PluginRecord;

use crate::api::context::PluginContext;
use crate::descriptor::MANIFEST_FILE;
use crate::factory::PluginFactories;
use crate::store::{MemoryPluginStore, PluginStore};
use crate::traits::Plugin;

/// Shared record of hook calls plus failure switches.
#[derive(Debug, Clone, Default)]
pub struct Journal {
    calls: Arc<Mutex<Vec<String>>>,
    pub fail_init: Arc<AtomicBool>,
    pub fail_activate: Arc<AtomicBool>,
    pub fail_deactivate: Arc<AtomicBool>,
}

impl Journal {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, hook: &str, name: &str) {
        self.calls.lock().unwrap().push(format!("{hook}:{name}"));
    }

    /// Constructors for `blog`, `gallery`, and `news`.
    pub fn factories(&self) -> PluginFactories {
        let mut factories = PluginFactories::new();
        for module in ["blog", "gallery", "news"] {
            factories.register(
                format!("{module}::Plugin"),
                RecordingPlugin::constructor(self.clone()),
            );
        }
        factories
    }
}

#[derive(Debug)]
pub struct RecordingPlugin {
    context: PluginContext,
    journal: Journal,
}

impl RecordingPlugin {
    pub fn constructor(
        journal: Journal,
    ) -> impl Fn(PluginContext) -> Arc<dyn Plugin> + Send + Sync + 'static {
        move |context| {
            Arc::new(RecordingPlugin {
                context,
                journal: journal.clone(),
            })
        }
    }

    fn hook(&self, hook: &str, fail: &AtomicBool) -> Result<(), String> {
        self.journal.record(hook, self.name());
        if fail.load(Ordering::SeqCst) {
            return Err("boom".to_string());
        }
        Ok(())
    }
}

#[async_trait]
impl Plugin for RecordingPlugin {
    fn context(&self) -> &PluginContext {
        &self.context
    }

    async fn init(&self) -> Result<(), String> {
        self.hook("init", &self.journal.fail_init)
    }

    async fn activate(&self) -> Result<(), String> {
        self.hook("activate", &self.journal.fail_activate)
    }

    async fn deactivate(&self) -> Result<(), String> {
        self.hook("deactivate", &self.journal.fail_deactivate)
    }
}

/// Temporary plugin root with one directory per plugin.
pub struct TestPluginRoot {
    dir: TempDir,
}

impl TestPluginRoot {
    pub fn new(plugins: &[&str]) -> Self {
        let dir = TempDir::new().unwrap();
        for name in plugins {
            std::fs::create_dir(dir.path().join(name)).unwrap();
        }
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn write_manifest(&self, plugin: &str, json: &str) {
        std::fs::write(self.dir.path().join(plugin).join(MANIFEST_FILE), json).unwrap();
    }
}

/// Memory store whose `delete` can be switched to fail.
#[derive(Debug, Clone, Default)]
pub struct FlakyStore {
    pub inner: MemoryPluginStore,
    pub fail_delete: Arc<AtomicBool>,
}

#[async_trait]
impl PluginStore for FlakyStore {
    async fn install(&self) -> AppResult<bool> {
        self.inner.install().await
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<PluginRecord>> {
        self.inner.find_by_name(name).await
    }

    async fn insert(&self, name: &str, version: &str) -> AppResult<PluginRecord> {
        self.inner.insert(name, version).await
    }

    async fn delete(&self, name: &str) -> AppResult<bool> {
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(AppError::database("connection reset"));
        }
        self.inner.delete(name).await
    }

    async fn list(&self) -> AppResult<Vec<PluginRecord>> {
        self.inner.list().await
    }

    fn table(&self) -> &str {
        self.inner.table()
    }
}
