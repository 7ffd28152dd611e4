//! Listeners subscribe per event kind with priority ordering.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use super::definitions::{EventKind, ListenerAction, PluginEvent};

/// Trait for registry event listeners.
#[async_trait]
pub trait EventListener: Send + Sync + std::fmt::Debug {
    /// Handles an event.
    async fn handle(&self, event: &PluginEvent) -> ListenerAction;

    /// Listener name used in logs and veto errors.
    fn name(&self) -> &str;

    /// Returns the priority (lower = runs first).
    fn priority(&self) -> i32 {
        100
    }
}

/// Listener backed by a synchronous closure.
pub struct FnListener {
    name: String,
    priority: i32,
    handler: Box<dyn Fn(&PluginEvent) -> ListenerAction + Send + Sync>,
}

impl FnListener {
    /// Creates a closure listener.
    pub fn new<F>(name: &str, priority: i32, handler: F) -> Self
    where
        F: Fn(&PluginEvent) -> ListenerAction + Send + Sync + 'static,
    {
        Self {
            name: name.to_string(),
            priority,
            handler: Box::new(handler),
        }
    }
}

impl std::fmt::Debug for FnListener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnListener")
            .field("name", &self.name)
            .field("priority", &self.priority)
            .finish()
    }
}

#[async_trait]
impl EventListener for FnListener {
    async fn handle(&self, event: &PluginEvent) -> ListenerAction {
        (self.handler)(event)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> i32 {
        self.priority
    }
}

/// Registry of listeners organized by event kind.
#[derive(Debug, Default)]
pub struct ListenerRegistry {
    listeners: RwLock<HashMap<EventKind, Vec<Arc<dyn EventListener>>>>,
}

impl ListenerRegistry {
    /// Creates an empty listener registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes a listener to one event kind.
    pub async fn subscribe(&self, kind: EventKind, listener: Arc<dyn EventListener>) {
        let mut listeners = self.listeners.write().await;
        let entries = listeners.entry(kind).or_default();

        debug!(
            kind = %kind,
            listener = %listener.name(),
            priority = listener.priority(),
            "Listener subscribed"
        );

        entries.push(listener);
        // Stable sort keeps registration order among equal priorities.
        entries.sort_by_key(|l| l.priority());
    }

    /// Subscribes a listener to every event kind.
    pub async fn subscribe_all(&self, listener: Arc<dyn EventListener>) {
        for kind in [
            EventKind::Install,
            EventKind::Init,
            EventKind::Activate,
            EventKind::Deactivate,
        ] {
            self.subscribe(kind, listener.clone()).await;
        }
    }

    /// Removes every subscription of the named listener.
    pub async fn unsubscribe(&self, name: &str) {
        let mut listeners = self.listeners.write().await;
        for entries in listeners.values_mut() {
            entries.retain(|l| l.name() != name);
        }
        listeners.retain(|_, entries| !entries.is_empty());
    }

    /// Returns the listeners for a kind, sorted by priority.
    pub async fn listeners_for(&self, kind: EventKind) -> Vec<Arc<dyn EventListener>> {
        let listeners = self.listeners.read().await;
        listeners.get(&kind).cloned().unwrap_or_default()
    }

    /// Returns the number of listeners subscribed to a kind.
    pub async fn listener_count(&self, kind: EventKind) -> usize {
        let listeners = self.listeners.read().await;
        listeners.get(&kind).map(Vec::len).unwrap_or(0)
    }
}
