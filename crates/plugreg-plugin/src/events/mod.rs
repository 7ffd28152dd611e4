//! Registry events and their listeners.

pub mod definitions;
pub mod dispatcher;
pub mod registry;

pub use definitions::{EventKind, ListenerAction, PluginEvent};
pub use dispatcher::{DispatchResult, EventDispatcher};
pub use registry::{EventListener, FnListener, ListenerRegistry};
