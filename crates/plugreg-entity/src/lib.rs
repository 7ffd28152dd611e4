//! # plugreg-entity
//!
//! Domain entity models for plugreg. Every struct in this crate represents a
//! database table row; they derive `Debug`, `Clone`, `Serialize`,
//! `Deserialize`, and `sqlx::FromRow`.

pub mod plugin;
