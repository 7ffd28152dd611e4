//! # plugreg-plugin
//!
//! Plugin registry for plugreg. Provides:
//!
//! - Discovery of plugin directories under a root
//! - Activation state persisted through a [`PluginStore`]
//! - Lifecycle hooks (init, activate, deactivate) with rollback on failure
//! - Registry events with priority-ordered listeners and veto support
//! - Optional entry-library loading via `libloading` (`dynamic` feature)

pub mod api;
pub mod descriptor;
pub mod discovery;
pub mod error;
pub mod events;
pub mod factory;
pub mod loader;
pub mod name;
pub mod prelude;
pub mod registry;
pub mod store;
pub mod traits;

#[cfg(test)]
mod testing;

pub use api::context::PluginContext;
pub use descriptor::PluginDescriptor;
pub use error::{RegistryError, RegistryResult};
pub use events::{EventDispatcher, EventKind, ListenerAction, ListenerRegistry, PluginEvent};
pub use factory::{PluginConstructor, PluginFactories};
pub use registry::{PluginRegistry, PluginRegistryBuilder, PluginSummary};
pub use store::{MemoryPluginStore, PluginStore};
pub use traits::Plugin;
