//! Event kinds emitted by the registry and their payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::descriptor::PluginDescriptor;

/// Kinds of registry events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// The plugin table was provisioned.
    Install,
    /// An active plugin was instantiated and initialized at startup.
    Init,
    /// A plugin is about to be activated. Can halt.
    Activate,
    /// A plugin is about to be deactivated. Can halt.
    Deactivate,
}

impl EventKind {
    /// Returns the string name of this event kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Install => "plugin.install",
            Self::Init => "plugin.init",
            Self::Activate => "plugin.activate",
            Self::Deactivate => "plugin.deactivate",
        }
    }

    /// Returns whether this kind fires before a state change and honors halts.
    pub fn is_pre_commit(&self) -> bool {
        matches!(self, Self::Activate | Self::Deactivate)
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Payload passed to listeners.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginEvent {
    /// Unique event ID.
    pub id: Uuid,
    /// The kind of event.
    pub kind: EventKind,
    /// Clean plugin name (absent for `Install`).
    pub plugin: Option<String>,
    /// Descriptor of the plugin involved.
    pub descriptor: Option<PluginDescriptor>,
    /// Table name (set for `Install`).
    pub table: Option<String>,
    /// When the event was raised.
    pub timestamp: DateTime<Utc>,
}

impl PluginEvent {
    fn new(kind: EventKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            plugin: None,
            descriptor: None,
            table: None,
            timestamp: Utc::now(),
        }
    }

    fn for_plugin(kind: EventKind, name: &str, descriptor: PluginDescriptor) -> Self {
        let mut event = Self::new(kind);
        event.plugin = Some(name.to_string());
        event.descriptor = Some(descriptor);
        event
    }

    /// The plugin table was created.
    pub fn install(table: &str) -> Self {
        let mut event = Self::new(EventKind::Install);
        event.table = Some(table.to_string());
        event
    }

    /// An active plugin was initialized at startup.
    pub fn init(name: &str, descriptor: PluginDescriptor) -> Self {
        Self::for_plugin(EventKind::Init, name, descriptor)
    }

    /// A plugin is about to be activated.
    pub fn activate(name: &str, descriptor: PluginDescriptor) -> Self {
        Self::for_plugin(EventKind::Activate, name, descriptor)
    }

    /// A plugin is about to be deactivated.
    pub fn deactivate(name: &str, descriptor: PluginDescriptor) -> Self {
        Self::for_plugin(EventKind::Deactivate, name, descriptor)
    }

    /// The plugin name, or an empty string for table-level events.
    pub fn plugin_name(&self) -> &str {
        self.plugin.as_deref().unwrap_or_default()
    }
}

/// Action returned by a listener telling the dispatcher what to do next.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ListenerAction {
    /// Continue to the next listener.
    Continue,
    /// Stop the transition (honored for pre-commit events only).
    Halt {
        /// Reason for halting.
        reason: String,
    },
}

impl ListenerAction {
    /// Creates a halt action.
    pub fn halt(reason: impl Into<String>) -> Self {
        Self::Halt {
            reason: reason.into(),
        }
    }
}
