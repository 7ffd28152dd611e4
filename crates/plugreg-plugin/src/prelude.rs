//! Prelude for plugin authors.

pub use async_trait::async_trait;

pub use crate::api::context::PluginContext;
pub use crate::descriptor::PluginDescriptor;
pub use crate::events::definitions::{EventKind, ListenerAction, PluginEvent};
pub use crate::events::registry::EventListener;
pub use crate::factory::PluginFactories;
pub use crate::traits::Plugin;
