//! Plugin registry.
//!
//! A plugin is *active* when its clean name has a record in the plugin
//! table. The registry holds one instance per active plugin for its whole
//! lifetime. Activation and deactivation are two-phase: the table write and
//! the plugin hook. If the hook fails, the table write is compensated and
//! the hook error is returned wrapped in a [`RegistryError`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, warn};

use plugreg_entity::plugin::model::{MAX_NAME_LEN, PluginRecord};

use crate::api::context::PluginContext;
use crate::descriptor::PluginDescriptor;
use crate::discovery::list_plugin_dirs;
use crate::error::{RegistryError, RegistryResult};
use crate::events::definitions::PluginEvent;
use crate::events::dispatcher::EventDispatcher;
use crate::factory::{PluginConstructor, PluginFactories};
use crate::loader::{DynamicLoader, entry_file_path};
use crate::name::{clean_plugin_name, default_symbol, namespace_symbol};
use crate::store::PluginStore;
use crate::traits::Plugin;

/// Combined on-disk and persisted view of one plugin.
#[derive(Debug, Clone, Serialize)]
pub struct PluginSummary {
    /// Clean plugin name.
    pub name: String,
    /// Whether the plugin directory exists under the root.
    pub installed: bool,
    /// Whether an activation record exists.
    pub active: bool,
    /// Whether the registry holds an instance.
    pub loaded: bool,
    /// Version recorded at activation.
    pub recorded_version: Option<String>,
    /// When the plugin was activated.
    pub activated_at: Option<DateTime<Utc>>,
}

/// Builder for [`PluginRegistry`].
#[derive(Debug)]
pub struct PluginRegistryBuilder {
    root: PathBuf,
    store: Arc<dyn PluginStore>,
    factories: PluginFactories,
    dispatcher: Arc<EventDispatcher>,
}

impl PluginRegistryBuilder {
    /// Registers the compiled-in plugin constructors.
    pub fn factories(mut self, factories: PluginFactories) -> Self {
        self.factories.extend(factories);
        self
    }

    /// Uses `dispatcher` for registry events.
    pub fn dispatcher(mut self, dispatcher: Arc<EventDispatcher>) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    /// Provisions the table and loads every active plugin.
    pub async fn open(self) -> RegistryResult<Arc<PluginRegistry>> {
        let registry = Arc::new_cyclic(|weak: &Weak<PluginRegistry>| PluginRegistry {
            root: self.root,
            store: self.store,
            dispatcher: self.dispatcher,
            active: RwLock::new(BTreeMap::new()),
            factories: RwLock::new(self.factories),
            loader: Mutex::new(DynamicLoader::new()),
            self_ref: weak.clone(),
        });

        registry.install().await?;
        registry.init_active_plugins().await?;
        Ok(registry)
    }
}

/// Registry of plugins under one root directory.
#[derive(Debug)]
pub struct PluginRegistry {
    root: PathBuf,
    store: Arc<dyn PluginStore>,
    dispatcher: Arc<EventDispatcher>,
    // Instances and constructors may point into loaded libraries, so they
    // are declared (and dropped) before the loader.
    active: RwLock<BTreeMap<String, Arc<dyn Plugin>>>,
    factories: RwLock<PluginFactories>,
    loader: Mutex<DynamicLoader>,
    self_ref: Weak<PluginRegistry>,
}

impl PluginRegistry {
    /// Starts building a registry over `root` backed by `store`.
    pub fn builder(root: impl Into<PathBuf>, store: Arc<dyn PluginStore>) -> PluginRegistryBuilder {
        PluginRegistryBuilder {
            root: root.into(),
            store,
            factories: PluginFactories::new(),
            dispatcher: Arc::new(EventDispatcher::default()),
        }
    }

    /// The plugin root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The event dispatcher.
    pub fn dispatcher(&self) -> &Arc<EventDispatcher> {
        &self.dispatcher
    }

    /// Directory names under the root that are candidate plugins.
    pub fn list_available(&self) -> RegistryResult<Vec<String>> {
        list_plugin_dirs(&self.root)
    }

    /// Directory of a plugin. An unusable name yields the root itself.
    pub fn plugin_path(&self, name: &str) -> PathBuf {
        let clean = clean_plugin_name(name);
        if clean.is_empty() {
            return self.root.clone();
        }
        self.root.join(clean)
    }

    /// Descriptor from the plugin's manifest, or synthesized defaults.
    pub fn descriptor(&self, name: &str) -> RegistryResult<PluginDescriptor> {
        let name = clean_name(name)?;
        PluginDescriptor::load(&self.plugin_path(&name), &name)
    }

    /// Returns whether the plugin has an activation record.
    pub async fn is_active(&self, name: &str) -> RegistryResult<bool> {
        let name = clean_name(name)?;
        Ok(self.store.exists(&name).await?)
    }

    /// The held instance of an active plugin. Never instantiates.
    pub async fn get_plugin(&self, name: &str) -> Option<Arc<dyn Plugin>> {
        let name = clean_plugin_name(name);
        self.active.read().await.get(&name).cloned()
    }

    /// Names of plugins with a held instance, sorted.
    pub async fn active_names(&self) -> Vec<String> {
        self.active.read().await.keys().cloned().collect()
    }

    /// All activation records.
    pub async fn list_active(&self) -> RegistryResult<Vec<PluginRecord>> {
        Ok(self.store.list().await?)
    }

    /// Every plugin known on disk or in the table.
    pub async fn summaries(&self) -> RegistryResult<Vec<PluginSummary>> {
        let available = self.list_available()?;
        let records = self.list_active().await?;
        let loaded = self.active_names().await;

        let mut summaries: BTreeMap<String, PluginSummary> = BTreeMap::new();
        for dir in available {
            let name = clean_plugin_name(&dir);
            summaries.insert(
                name.clone(),
                PluginSummary {
                    loaded: loaded.contains(&name),
                    name,
                    installed: true,
                    active: false,
                    recorded_version: None,
                    activated_at: None,
                },
            );
        }
        for record in records {
            let summary = summaries
                .entry(record.name.clone())
                .or_insert_with(|| PluginSummary {
                    name: record.name.clone(),
                    installed: false,
                    active: false,
                    loaded: loaded.contains(&record.name),
                    recorded_version: None,
                    activated_at: None,
                });
            summary.active = true;
            summary.recorded_version = Some(record.version);
            summary.activated_at = Some(record.created);
        }

        Ok(summaries.into_values().collect())
    }

    /// The constructor symbol a plugin resolves to.
    pub async fn resolve_symbol(&self, name: &str) -> RegistryResult<String> {
        let name = clean_name(name)?;
        let descriptor = self.descriptor(&name)?;
        let factories = self.factories.read().await;
        Ok(resolve_symbol_in(&factories, &name, &descriptor))
    }

    /// Activates a plugin.
    ///
    /// Fails with [`RegistryError::AlreadyActive`] if a record exists. On
    /// instantiation or hook failure the record is removed again and the
    /// plugin stays inactive.
    pub async fn activate(&self, name: &str) -> RegistryResult<Arc<dyn Plugin>> {
        let name = clean_name(name)?;
        if self.store.exists(&name).await? {
            return Err(RegistryError::AlreadyActive { name });
        }

        let descriptor = self.descriptor(&name)?;
        let version = descriptor.version_or_placeholder().to_string();

        let dispatch = self
            .dispatcher
            .dispatch(&PluginEvent::activate(&name, descriptor.clone()))
            .await;
        if dispatch.halted {
            return Err(RegistryError::Vetoed {
                name,
                listener: dispatch.halted_by.unwrap_or_default(),
                reason: dispatch.halt_reason.unwrap_or_default(),
            });
        }

        let record = self.store.insert(&name, &version).await?;

        let plugin = match self.instantiate(&record, descriptor).await {
            Ok(plugin) => plugin,
            Err(e) => {
                error!(plugin = %name, error = %e, "Plugin instantiation failed, rolling back");
                self.remove_record(&name).await;
                return Err(e);
            }
        };

        if let Err(reason) = plugin.activate().await {
            error!(plugin = %name, error = %reason, "Activation hook failed, rolling back");
            self.remove_record(&name).await;
            return Err(RegistryError::ActivationFailed { name, reason });
        }

        self.active.write().await.insert(name.clone(), plugin.clone());
        info!(plugin = %name, version = %version, id = record.id, "Plugin activated");
        Ok(plugin)
    }

    /// Deactivates a plugin.
    ///
    /// Fails with [`RegistryError::NotActive`] if no record exists. If the
    /// plugin's hook fails the record is kept (or restored) and the instance
    /// stays held. The instance is dropped only after the record is deleted.
    pub async fn deactivate(&self, name: &str) -> RegistryResult<()> {
        let name = clean_name(name)?;
        let Some(record) = self.store.find_by_name(&name).await? else {
            return Err(RegistryError::NotActive { name });
        };

        let held = self.active.read().await.get(&name).cloned();
        let descriptor = match &held {
            Some(plugin) => plugin.info().clone(),
            None => self
                .descriptor(&name)
                .unwrap_or_else(|_| PluginDescriptor::synthesize(&self.plugin_path(&name), &name)),
        };

        let dispatch = self
            .dispatcher
            .dispatch(&PluginEvent::deactivate(&name, descriptor))
            .await;
        if dispatch.halted {
            return Err(RegistryError::Vetoed {
                name,
                listener: dispatch.halted_by.unwrap_or_default(),
                reason: dispatch.halt_reason.unwrap_or_default(),
            });
        }

        match held {
            Some(plugin) => {
                if let Err(reason) = plugin.deactivate().await {
                    error!(plugin = %name, error = %reason, "Deactivation hook failed, restoring record");
                    self.restore_record(&name, &record.version).await;
                    return Err(RegistryError::DeactivationFailed { name, reason });
                }
            }
            None => {
                warn!(plugin = %name, "No instance held, removing record without calling hooks");
            }
        }

        // Record first: if the delete fails the plugin stays fully active.
        self.store.delete(&name).await?;
        self.active.write().await.remove(&name);
        info!(plugin = %name, "Plugin deactivated");
        Ok(())
    }

    async fn install(&self) -> RegistryResult<()> {
        if self.store.install().await? {
            info!(table = %self.store.table(), "Plugin table installed");
            self.dispatcher
                .fire_and_forget(&PluginEvent::install(self.store.table()))
                .await;
        }
        Ok(())
    }

    /// Instantiates and initializes every plugin that is both on disk and active.
    async fn init_active_plugins(&self) -> RegistryResult<()> {
        for dir in self.list_available()? {
            let name = clean_plugin_name(&dir);
            if name != dir {
                warn!(directory = %dir, "Plugin directory name is not a clean name, skipping");
                continue;
            }

            let Some(record) = self.store.find_by_name(&name).await? else {
                continue;
            };

            match self.init_plugin(&record).await {
                Ok(plugin) => {
                    self.active.write().await.insert(name.clone(), plugin.clone());
                    self.dispatcher
                        .fire_and_forget(&PluginEvent::init(&name, plugin.info().clone()))
                        .await;
                    debug!(plugin = %name, "Active plugin initialized");
                }
                Err(RegistryError::Store(e)) => return Err(RegistryError::Store(e)),
                Err(e) => error!(plugin = %name, error = %e, "Failed to initialize active plugin"),
            }
        }

        info!(
            root = %self.root.display(),
            loaded = self.active.read().await.len(),
            "Plugin registry ready"
        );
        Ok(())
    }

    async fn init_plugin(&self, record: &PluginRecord) -> RegistryResult<Arc<dyn Plugin>> {
        let descriptor = self.descriptor(&record.name)?;
        let plugin = self.instantiate(record, descriptor).await?;
        plugin
            .init()
            .await
            .map_err(|reason| RegistryError::ActivationFailed {
                name: record.name.clone(),
                reason: format!("init failed: {reason}"),
            })?;
        Ok(plugin)
    }

    /// Builds a plugin instance for an existing record.
    async fn instantiate(
        &self,
        record: &PluginRecord,
        descriptor: PluginDescriptor,
    ) -> RegistryResult<Arc<dyn Plugin>> {
        let name = record.name.as_str();
        let dir = self.plugin_path(name);

        let constructor = match self.lookup_constructor(name, &descriptor).await {
            Some(constructor) => constructor,
            None => {
                let entry = entry_file_path(&dir);
                if !entry.is_file() {
                    self.force_deactivate(name).await;
                    return Err(RegistryError::MissingEntryFile {
                        name: name.to_string(),
                        path: entry,
                    });
                }

                self.load_entry(name, &entry).await?;
                match self.lookup_constructor(name, &descriptor).await {
                    Some(constructor) => constructor,
                    None => {
                        let factories = self.factories.read().await;
                        return Err(RegistryError::FactoryNotFound {
                            name: name.to_string(),
                            symbol: resolve_symbol_in(&factories, name, &descriptor),
                        });
                    }
                }
            }
        };

        let context = PluginContext::new(record.id, name, dir, descriptor, self.self_ref.clone());
        Ok(constructor(context))
    }

    async fn lookup_constructor(
        &self,
        name: &str,
        descriptor: &PluginDescriptor,
    ) -> Option<PluginConstructor> {
        let factories = self.factories.read().await;
        let symbol = resolve_symbol_in(&factories, name, descriptor);
        debug!(plugin = %name, symbol = %symbol, "Resolving plugin constructor");
        factories.get(&symbol)
    }

    async fn load_entry(&self, name: &str, entry: &Path) -> RegistryResult<()> {
        let mut loader = self.loader.lock().await;
        let mut factories = self.factories.write().await;
        // SAFETY: the plugin root is trusted deployment content; the loader
        // outlives every instance because it is dropped last.
        unsafe { loader.load(name, entry, &mut factories) }?;
        Ok(())
    }

    /// Clears the activation of a plugin whose code cannot be found.
    async fn force_deactivate(&self, name: &str) {
        warn!(plugin = %name, "Plugin entry file missing, deactivating");
        self.active.write().await.remove(name);
        self.remove_record(name).await;
    }

    async fn remove_record(&self, name: &str) {
        if let Err(e) = self.store.delete(name).await {
            error!(plugin = %name, error = %e, "Failed to remove activation record");
        }
    }

    async fn restore_record(&self, name: &str, version: &str) {
        let result = match self.store.exists(name).await {
            Ok(true) => return,
            Ok(false) => self.store.insert(name, version).await.map(|_| ()),
            Err(e) => Err(e),
        };
        if let Err(e) = result {
            error!(plugin = %name, error = %e, "Failed to restore activation record");
        }
    }
}

fn clean_name(raw: &str) -> RegistryResult<String> {
    let name = clean_plugin_name(raw);
    if name.is_empty() || name.len() > MAX_NAME_LEN {
        return Err(RegistryError::InvalidName {
            raw: raw.to_string(),
        });
    }
    Ok(name)
}

/// Declared namespace symbol when a constructor exists for it, else the default symbol.
fn resolve_symbol_in(factories: &PluginFactories, name: &str, descriptor: &PluginDescriptor) -> String {
    if let Some(namespace) = descriptor.namespace() {
        let symbol = namespace_symbol(namespace);
        if factories.contains(&symbol) {
            return symbol;
        }
    }
    default_symbol(name)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::events::definitions::{EventKind, ListenerAction};
    use crate::events::registry::{FnListener, ListenerRegistry};
    use crate::store::MemoryPluginStore;
    use crate::testing::{FlakyStore, Journal, RecordingPlugin, TestPluginRoot};

    async fn open(
        root: &TestPluginRoot,
        store: &MemoryPluginStore,
        journal: &Journal,
    ) -> Arc<PluginRegistry> {
        PluginRegistry::builder(root.path(), Arc::new(store.clone()))
            .factories(journal.factories())
            .open()
            .await
            .expect("open registry")
    }

    #[tokio::test]
    async fn test_activate_then_deactivate() {
        let root = TestPluginRoot::new(&["ems-plugin-blog", "gallery"]);
        let store = MemoryPluginStore::default();
        let journal = Journal::default();
        let registry = open(&root, &store, &journal).await;

        assert!(!registry.is_active("ems-plugin-blog").await.unwrap());
        let plugin = registry.activate("ems-plugin-blog").await.unwrap();
        assert_eq!(plugin.name(), "ems-plugin-blog");
        assert!(registry.is_active("ems-plugin-blog").await.unwrap());
        assert!(registry.get_plugin("ems-plugin-blog").await.is_some());
        assert_eq!(journal.calls(), vec!["activate:ems-plugin-blog"]);

        registry.deactivate("ems-plugin-blog").await.unwrap();
        assert!(!registry.is_active("ems-plugin-blog").await.unwrap());
        assert!(registry.get_plugin("ems-plugin-blog").await.is_none());
        assert_eq!(
            journal.calls(),
            vec!["activate:ems-plugin-blog", "deactivate:ems-plugin-blog"]
        );
    }

    #[tokio::test]
    async fn test_activate_twice_fails() {
        let root = TestPluginRoot::new(&["gallery"]);
        let store = MemoryPluginStore::default();
        let journal = Journal::default();
        let registry = open(&root, &store, &journal).await;

        registry.activate("gallery").await.unwrap();
        let record = store.find_by_name("gallery").await.unwrap().unwrap();

        let err = registry.activate("vendor/gallery").await.unwrap_err();
        assert!(matches!(err, RegistryError::AlreadyActive { ref name } if name == "gallery"));
        assert_eq!(store.find_by_name("gallery").await.unwrap(), Some(record));
        assert_eq!(journal.calls(), vec!["activate:gallery"]);
    }

    #[tokio::test]
    async fn test_deactivate_inactive_fails() {
        let root = TestPluginRoot::new(&["gallery"]);
        let store = MemoryPluginStore::default();
        let journal = Journal::default();
        let registry = open(&root, &store, &journal).await;

        let err = registry.deactivate("gallery").await.unwrap_err();
        assert!(matches!(err, RegistryError::NotActive { .. }));
        assert!(store.names().await.is_empty());
        assert!(journal.calls().is_empty());
    }

    #[tokio::test]
    async fn test_activation_hook_failure_rolls_back() {
        let root = TestPluginRoot::new(&["gallery"]);
        let store = MemoryPluginStore::default();
        let journal = Journal::default();
        journal.fail_activate.store(true, Ordering::SeqCst);
        let registry = open(&root, &store, &journal).await;

        let err = registry.activate("gallery").await.unwrap_err();
        assert!(matches!(err, RegistryError::ActivationFailed { ref reason, .. } if reason == "boom"));
        assert!(!registry.is_active("gallery").await.unwrap());
        assert!(registry.get_plugin("gallery").await.is_none());
        assert!(store.names().await.is_empty());
    }

    #[tokio::test]
    async fn test_deactivation_hook_failure_restores() {
        let root = TestPluginRoot::new(&["gallery"]);
        let store = MemoryPluginStore::default();
        let journal = Journal::default();
        let registry = open(&root, &store, &journal).await;

        registry.activate("gallery").await.unwrap();
        journal.fail_deactivate.store(true, Ordering::SeqCst);

        let err = registry.deactivate("gallery").await.unwrap_err();
        assert!(matches!(err, RegistryError::DeactivationFailed { .. }));
        assert!(registry.is_active("gallery").await.unwrap());
        assert!(registry.get_plugin("gallery").await.is_some());
        assert_eq!(registry.active_names().await, vec!["gallery"]);
    }

    #[tokio::test]
    async fn test_version_recorded_from_manifest_or_placeholder() {
        let root = TestPluginRoot::new(&["gallery", "news"]);
        root.write_manifest("gallery", r#"{ "name": "acme/gallery", "version": "3.2.1" }"#);
        root.write_manifest("news", r#"{ "name": "acme/news" }"#);
        let store = MemoryPluginStore::default();
        let journal = Journal::default();
        let registry = open(&root, &store, &journal).await;

        registry.activate("gallery").await.unwrap();
        registry.activate("news").await.unwrap();

        let gallery = store.find_by_name("gallery").await.unwrap().unwrap();
        let news = store.find_by_name("news").await.unwrap().unwrap();
        assert_eq!(gallery.version, "3.2.1");
        assert_eq!(news.version, "0.0.0");
    }

    #[tokio::test]
    async fn test_namespace_symbol_preferred() {
        let root = TestPluginRoot::new(&["site-gallery"]);
        root.write_manifest(
            "site-gallery",
            r#"{ "version": "1.0.0", "autoload": { "namespace": "acme::photos" } }"#,
        );
        let store = MemoryPluginStore::default();
        let journal = Journal::default();
        let factories = journal
            .factories()
            .with("acme::photos::Plugin", RecordingPlugin::constructor(journal.clone()));
        let registry = PluginRegistry::builder(root.path(), Arc::new(store.clone()))
            .factories(factories)
            .open()
            .await
            .unwrap();

        assert_eq!(
            registry.resolve_symbol("site-gallery").await.unwrap(),
            "acme::photos::Plugin"
        );
    }

    #[tokio::test]
    async fn test_namespace_without_constructor_falls_back() {
        let root = TestPluginRoot::new(&["site-gallery"]);
        root.write_manifest(
            "site-gallery",
            r#"{ "autoload": { "namespace": "acme::unknown" } }"#,
        );
        let store = MemoryPluginStore::default();
        let journal = Journal::default();
        let registry = open(&root, &store, &journal).await;

        assert_eq!(
            registry.resolve_symbol("site-gallery").await.unwrap(),
            "gallery::Plugin"
        );
        registry.activate("site-gallery").await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_entry_file_deactivates() {
        let root = TestPluginRoot::new(&["orphan"]);
        let store = MemoryPluginStore::default();
        let journal = Journal::default();
        let registry = open(&root, &store, &journal).await;

        let err = registry.activate("orphan").await.unwrap_err();
        assert!(matches!(err, RegistryError::MissingEntryFile { .. }));
        assert!(!registry.is_active("orphan").await.unwrap());
        assert!(journal.calls().is_empty());
    }

    #[cfg(not(feature = "dynamic"))]
    #[tokio::test]
    async fn test_entry_file_without_dynamic_is_factory_not_found() {
        use crate::loader::entry_file_name;

        let root = TestPluginRoot::new(&["external"]);
        std::fs::write(root.path().join("external").join(entry_file_name()), b"not a library")
            .unwrap();
        let store = MemoryPluginStore::default();
        let journal = Journal::default();
        let registry = open(&root, &store, &journal).await;

        let err = registry.activate("external").await.unwrap_err();
        assert!(
            matches!(err, RegistryError::FactoryNotFound { ref symbol, .. } if symbol == "external::Plugin")
        );
        assert!(!registry.is_active("external").await.unwrap());
    }

    #[cfg(feature = "dynamic")]
    #[tokio::test]
    async fn test_invalid_entry_library_is_interface_mismatch() {
        use crate::loader::entry_file_name;

        let root = TestPluginRoot::new(&["external"]);
        std::fs::write(root.path().join("external").join(entry_file_name()), b"not a library")
            .unwrap();
        let store = MemoryPluginStore::default();
        let journal = Journal::default();
        let registry = open(&root, &store, &journal).await;

        let err = registry.activate("external").await.unwrap_err();
        assert!(matches!(err, RegistryError::InterfaceMismatch { ref name, .. } if name == "external"));
        assert!(!registry.is_active("external").await.unwrap());
        assert!(store.names().await.is_empty());
        assert!(journal.calls().is_empty());
    }

    #[tokio::test]
    async fn test_startup_initializes_active_plugins() {
        let root = TestPluginRoot::new(&["gallery", "news", "_template"]);
        let store = MemoryPluginStore::with_active("plugin", &[("gallery", "1.0.0"), ("ghost", "1.0.0")])
            .await
            .unwrap();
        let journal = Journal::default();
        let registry = open(&root, &store, &journal).await;

        assert_eq!(registry.active_names().await, vec!["gallery"]);
        assert_eq!(journal.calls(), vec!["init:gallery"]);
        let plugin = registry.get_plugin("gallery").await.unwrap();
        assert_eq!(plugin.id(), 1);
        assert!(plugin.context().registry().is_some());
        assert!(registry.get_plugin("news").await.is_none());
    }

    #[tokio::test]
    async fn test_startup_missing_entry_deactivates() {
        let root = TestPluginRoot::new(&["orphan"]);
        let store = MemoryPluginStore::with_active("plugin", &[("orphan", "1.0.0")])
            .await
            .unwrap();
        let journal = Journal::default();
        let registry = open(&root, &store, &journal).await;

        assert!(registry.active_names().await.is_empty());
        assert!(!registry.is_active("orphan").await.unwrap());
    }

    #[tokio::test]
    async fn test_init_failure_leaves_record_without_instance() {
        let root = TestPluginRoot::new(&["gallery"]);
        let store = MemoryPluginStore::with_active("plugin", &[("gallery", "1.0.0")])
            .await
            .unwrap();
        let journal = Journal::default();
        journal.fail_init.store(true, Ordering::SeqCst);
        let registry = open(&root, &store, &journal).await;

        assert!(registry.get_plugin("gallery").await.is_none());
        assert!(registry.is_active("gallery").await.unwrap());

        registry.deactivate("gallery").await.unwrap();
        assert!(!registry.is_active("gallery").await.unwrap());
        assert_eq!(journal.calls(), vec!["init:gallery"]);
    }

    #[tokio::test]
    async fn test_listener_veto_leaves_state_unchanged() {
        let root = TestPluginRoot::new(&["gallery"]);
        let store = MemoryPluginStore::default();
        let journal = Journal::default();
        let listeners = Arc::new(ListenerRegistry::new());
        listeners
            .subscribe(
                EventKind::Activate,
                Arc::new(FnListener::new("freeze", 10, |_| {
                    ListenerAction::halt("release freeze")
                })),
            )
            .await;
        let registry = PluginRegistry::builder(root.path(), Arc::new(store.clone()))
            .factories(journal.factories())
            .dispatcher(Arc::new(EventDispatcher::new(listeners)))
            .open()
            .await
            .unwrap();

        let err = registry.activate("gallery").await.unwrap_err();
        assert!(matches!(err, RegistryError::Vetoed { ref listener, .. } if listener == "freeze"));
        assert!(store.names().await.is_empty());
        assert!(journal.calls().is_empty());
    }

    #[tokio::test]
    async fn test_deactivate_veto_leaves_plugin_active() {
        let root = TestPluginRoot::new(&["gallery"]);
        let store = MemoryPluginStore::default();
        let journal = Journal::default();
        let listeners = Arc::new(ListenerRegistry::new());
        listeners
            .subscribe(
                EventKind::Deactivate,
                Arc::new(FnListener::new("pinned", 10, |_| {
                    ListenerAction::halt("plugin is pinned")
                })),
            )
            .await;
        let registry = PluginRegistry::builder(root.path(), Arc::new(store.clone()))
            .factories(journal.factories())
            .dispatcher(Arc::new(EventDispatcher::new(listeners)))
            .open()
            .await
            .unwrap();

        registry.activate("gallery").await.unwrap();
        let err = registry.deactivate("gallery").await.unwrap_err();
        assert!(matches!(err, RegistryError::Vetoed { ref listener, .. } if listener == "pinned"));
        assert!(registry.is_active("gallery").await.unwrap());
        assert!(registry.get_plugin("gallery").await.is_some());
        assert_eq!(journal.calls(), vec!["activate:gallery"]);
    }

    #[tokio::test]
    async fn test_failed_record_delete_keeps_plugin_active() {
        let root = TestPluginRoot::new(&["gallery"]);
        let store = FlakyStore::default();
        let journal = Journal::default();
        let registry = PluginRegistry::builder(root.path(), Arc::new(store.clone()))
            .factories(journal.factories())
            .open()
            .await
            .unwrap();

        registry.activate("gallery").await.unwrap();
        store.fail_delete.store(true, Ordering::SeqCst);

        let err = registry.deactivate("gallery").await.unwrap_err();
        assert!(matches!(err, RegistryError::Store(_)));
        assert!(registry.is_active("gallery").await.unwrap());
        assert!(registry.get_plugin("gallery").await.is_some());

        store.fail_delete.store(false, Ordering::SeqCst);
        registry.deactivate("gallery").await.unwrap();
        assert!(!registry.is_active("gallery").await.unwrap());
        assert!(registry.get_plugin("gallery").await.is_none());
    }

    #[tokio::test]
    async fn test_events_emitted() {
        let root = TestPluginRoot::new(&["gallery"]);
        let store = MemoryPluginStore::default();
        let journal = Journal::default();
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink = seen.clone();
        let listeners = Arc::new(ListenerRegistry::new());
        listeners
            .subscribe_all(Arc::new(FnListener::new("recorder", 100, move |event| {
                sink.lock()
                    .unwrap()
                    .push(format!("{}:{}", event.kind, event.plugin_name()));
                ListenerAction::Continue
            })))
            .await;

        let registry = PluginRegistry::builder(root.path(), Arc::new(store.clone()))
            .factories(journal.factories())
            .dispatcher(Arc::new(EventDispatcher::new(listeners)))
            .open()
            .await
            .unwrap();
        registry.activate("gallery").await.unwrap();
        registry.deactivate("gallery").await.unwrap();

        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                "plugin.install:",
                "plugin.activate:gallery",
                "plugin.deactivate:gallery"
            ]
        );
    }

    #[tokio::test]
    async fn test_install_event_only_once() {
        let root = TestPluginRoot::new(&[]);
        let store = MemoryPluginStore::default();
        store.install().await.unwrap();
        let journal = Journal::default();
        let listeners = Arc::new(ListenerRegistry::new());
        let count = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let counter = count.clone();
        listeners
            .subscribe(
                EventKind::Install,
                Arc::new(FnListener::new("count", 100, move |_| {
                    counter.fetch_add(1, Ordering::SeqCst);
                    ListenerAction::Continue
                })),
            )
            .await;

        PluginRegistry::builder(root.path(), Arc::new(store.clone()))
            .factories(journal.factories())
            .dispatcher(Arc::new(EventDispatcher::new(listeners)))
            .open()
            .await
            .unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_invalid_name() {
        let root = TestPluginRoot::new(&[]);
        let store = MemoryPluginStore::default();
        let journal = Journal::default();
        let registry = open(&root, &store, &journal).await;

        let err = registry.activate("../").await.unwrap_err();
        assert!(matches!(err, RegistryError::InvalidName { .. }));
        assert!(registry.get_plugin("").await.is_none());

        let long = "p".repeat(MAX_NAME_LEN + 1);
        let err = registry.activate(&long).await.unwrap_err();
        assert!(matches!(err, RegistryError::InvalidName { .. }));
        assert!(store.names().await.is_empty());
        assert!(registry.is_active(&"p".repeat(MAX_NAME_LEN)).await.is_ok());
    }

    #[tokio::test]
    async fn test_summaries() {
        let root = TestPluginRoot::new(&["gallery", "news"]);
        let store = MemoryPluginStore::with_active("plugin", &[("gallery", "1.0.0"), ("ghost", "0.1")])
            .await
            .unwrap();
        let journal = Journal::default();
        let registry = open(&root, &store, &journal).await;

        let summaries = registry.summaries().await.unwrap();
        let names: Vec<&str> = summaries.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["gallery", "ghost", "news"]);

        let gallery = &summaries[0];
        assert!(gallery.installed && gallery.active && gallery.loaded);
        let ghost = &summaries[1];
        assert!(!ghost.installed && ghost.active && !ghost.loaded);
        assert_eq!(ghost.recorded_version.as_deref(), Some("0.1"));
        let news = &summaries[2];
        assert!(news.installed && !news.active);
    }
}
