//! # plugreg-database
//!
//! PostgreSQL connection management, plugin table provisioning, and the
//! plugin activation repository.

pub mod connection;
pub mod repositories;
pub mod schema;

pub use connection::DatabasePool;
pub use repositories::PluginRepository;
