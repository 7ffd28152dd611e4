//! Plugin activation entities.

pub mod model;

pub use model::PluginRecord;
