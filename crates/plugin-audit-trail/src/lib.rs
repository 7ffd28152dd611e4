//! Audit trail plugin for plugreg.
//!
//! Records plugin lifecycle transitions into a shared, bounded
//! [`AuditTrail`]. The plugin itself logs its own hooks; the
//! [`AuditTrailListener`] logs every registry event, including the ones
//! that were vetoed before reaching a plugin.

pub mod listener;
pub mod plugin;
pub mod trail;

pub use listener::AuditTrailListener;
pub use plugin::{AuditTrailPlugin, SYMBOL, register};
pub use trail::{AuditEntry, AuditTrail};
