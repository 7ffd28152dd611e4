//! Plugin constructor registration.
//!
//! Plugins are not looked up by runtime symbol resolution. Instead the host
//! registers a constructor per symbol at startup (`"blog::Plugin"` →
//! `BlogPlugin::new`), and the registry resolves a plugin's symbol against
//! this map.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use crate::api::context::PluginContext;
use crate::traits::Plugin;

/// A plugin constructor.
pub type PluginConstructor = Arc<dyn Fn(PluginContext) -> Arc<dyn Plugin> + Send + Sync>;

/// Symbol → constructor map.
#[derive(Clone, Default)]
pub struct PluginFactories {
    constructors: BTreeMap<String, PluginConstructor>,
}

impl PluginFactories {
    /// Creates an empty factory map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a constructor under `symbol`, replacing any previous one.
    pub fn register<F>(&mut self, symbol: impl Into<String>, constructor: F) -> &mut Self
    where
        F: Fn(PluginContext) -> Arc<dyn Plugin> + Send + Sync + 'static,
    {
        let symbol = symbol.into();
        debug!(symbol = %symbol, "Plugin constructor registered");
        self.constructors.insert(symbol, Arc::new(constructor));
        self
    }

    /// Builder-style variant of [`register`](Self::register).
    pub fn with<F>(mut self, symbol: impl Into<String>, constructor: F) -> Self
    where
        F: Fn(PluginContext) -> Arc<dyn Plugin> + Send + Sync + 'static,
    {
        self.register(symbol, constructor);
        self
    }

    /// Moves every constructor from `other` into this map.
    pub fn extend(&mut self, other: PluginFactories) {
        self.constructors.extend(other.constructors);
    }

    /// Returns whether a constructor exists for `symbol`.
    pub fn contains(&self, symbol: &str) -> bool {
        self.constructors.contains_key(symbol)
    }

    /// Returns the constructor for `symbol`.
    pub fn get(&self, symbol: &str) -> Option<PluginConstructor> {
        self.constructors.get(symbol).cloned()
    }

    /// All registered symbols, sorted.
    pub fn symbols(&self) -> Vec<&str> {
        self.constructors.keys().map(String::as_str).collect()
    }

    /// Number of registered constructors.
    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    /// Returns whether no constructor is registered.
    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }
}

impl std::fmt::Debug for PluginFactories {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginFactories")
            .field("symbols", &self.symbols())
            .finish()
    }
}
