//! Registry error type.
//!
//! Every registry operation reports failures as a [`RegistryError`]; plugin
//! hook failures are wrapped rather than passed through, and store errors
//! keep their [`AppError`] as the source.

use std::path::PathBuf;

use plugreg_core::error::{AppError, ErrorKind};
use thiserror::Error;

/// Errors raised by the plugin registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The name is empty after sanitization or too long for the plugin table.
    #[error("Invalid plugin name: '{raw}'")]
    InvalidName {
        /// The name as supplied by the caller.
        raw: String,
    },

    /// Activation was requested for a plugin that is already active.
    #[error("Plugin '{name}' is already active")]
    AlreadyActive {
        /// Clean plugin name.
        name: String,
    },

    /// Deactivation or instantiation was requested for an inactive plugin.
    #[error("Plugin '{name}' is not active")]
    NotActive {
        /// Clean plugin name.
        name: String,
    },

    /// No constructor is registered under the resolved symbol.
    #[error("No plugin constructor registered for '{symbol}' (plugin '{name}')")]
    FactoryNotFound {
        /// Clean plugin name.
        name: String,
        /// The symbol that was looked up.
        symbol: String,
    },

    /// The plugin's entry library does not speak the expected interface.
    #[error("Plugin '{name}' uses an incompatible interface: {reason}")]
    InterfaceMismatch {
        /// Clean plugin name.
        name: String,
        /// What did not match.
        reason: String,
    },

    /// The plugin has no constructor and no entry file on disk.
    #[error("Cannot locate entry file for plugin '{name}': {path}")]
    MissingEntryFile {
        /// Clean plugin name.
        name: String,
        /// The expected entry file path.
        path: PathBuf,
    },

    /// The plugin's `activate` hook failed; the activation record was removed.
    #[error("Plugin '{name}' failed to activate: {reason}")]
    ActivationFailed {
        /// Clean plugin name.
        name: String,
        /// The hook's error message.
        reason: String,
    },

    /// The plugin's `deactivate` hook failed; the activation record was kept.
    #[error("Plugin '{name}' failed to deactivate: {reason}")]
    DeactivationFailed {
        /// Clean plugin name.
        name: String,
        /// The hook's error message.
        reason: String,
    },

    /// A listener vetoed the transition.
    #[error("Plugin '{name}' transition blocked by listener '{listener}': {reason}")]
    Vetoed {
        /// Clean plugin name.
        name: String,
        /// Listener that halted.
        listener: String,
        /// Reason given by the listener.
        reason: String,
    },

    /// The manifest exists but could not be read or parsed.
    #[error("Invalid manifest {path}: {reason}")]
    Manifest {
        /// Manifest path.
        path: PathBuf,
        /// Parse or read error.
        reason: String,
    },

    /// The plugin root could not be scanned.
    #[error("Failed to scan plugin directory {path}: {source}")]
    Scan {
        /// Plugin root.
        path: PathBuf,
        /// I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The persisted store failed.
    #[error("Plugin store error: {0}")]
    Store(#[from] AppError),
}

impl RegistryError {
    /// The workspace error kind this error maps to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidName { .. } => ErrorKind::Validation,
            Self::AlreadyActive { .. } | Self::NotActive { .. } | Self::Vetoed { .. } => {
                ErrorKind::Conflict
            }
            Self::FactoryNotFound { .. } | Self::MissingEntryFile { .. } => ErrorKind::NotFound,
            Self::InterfaceMismatch { .. }
            | Self::ActivationFailed { .. }
            | Self::DeactivationFailed { .. } => ErrorKind::Plugin,
            Self::Manifest { .. } => ErrorKind::Serialization,
            Self::Scan { .. } => ErrorKind::Storage,
            Self::Store(err) => err.kind,
        }
    }
}

impl From<RegistryError> for AppError {
    fn from(err: RegistryError) -> Self {
        let kind = err.kind();
        match err {
            RegistryError::Store(inner) => inner,
            other => AppError::with_source(kind, other.to_string(), other),
        }
    }
}

/// Result alias for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;
