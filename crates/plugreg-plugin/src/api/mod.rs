//! The context handed to plugin constructors.

pub mod context;

pub use context::PluginContext;
