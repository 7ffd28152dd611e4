//! Identity and registry access for a plugin instance.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};

use crate::descriptor::PluginDescriptor;
use crate::registry::PluginRegistry;

/// Context passed to a plugin constructor.
///
/// Holds the persisted record id, the clean name, the plugin directory,
/// the resolved descriptor, and a weak back-reference to the registry that
/// created the instance.
#[derive(Clone)]
pub struct PluginContext {
    /// Persisted record id.
    pub id: i32,
    /// Clean plugin name.
    pub name: String,
    /// Plugin directory.
    pub path: PathBuf,
    /// Descriptor resolved at instantiation time.
    pub descriptor: PluginDescriptor,
    registry: Weak<PluginRegistry>,
}

impl PluginContext {
    /// Creates a new context.
    pub fn new(
        id: i32,
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        descriptor: PluginDescriptor,
        registry: Weak<PluginRegistry>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            path: path.into(),
            descriptor,
            registry,
        }
    }

    /// Creates a context that is not attached to any registry.
    pub fn detached(id: i32, name: impl Into<String>, descriptor: PluginDescriptor) -> Self {
        Self::new(id, name, PathBuf::new(), descriptor, Weak::new())
    }

    /// The registry owning this plugin, if it is still alive.
    pub fn registry(&self) -> Option<Arc<PluginRegistry>> {
        self.registry.upgrade()
    }

    /// The plugin directory.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl std::fmt::Debug for PluginContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginContext")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("path", &self.path)
            .field("attached", &(self.registry.strong_count() > 0))
            .finish()
    }
}
