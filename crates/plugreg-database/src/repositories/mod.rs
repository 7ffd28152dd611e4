//! Repository implementations for plugreg entities.

pub mod plugin;

pub use plugin::PluginRepository;
