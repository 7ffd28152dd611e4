//! Delivers registry events to listeners.
//!
//! For pre-commit events (`Activate`, `Deactivate`):
//! - Listeners are called in priority order.
//! - If any listener returns `Halt`, delivery stops and the transition is vetoed.
//!
//! For `Install` / `Init`:
//! - All listeners are called; `Halt` is ignored with a warning.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::definitions::{ListenerAction, PluginEvent};
use super::registry::{EventListener, ListenerRegistry};

/// Upper bound on a single listener call.
const LISTENER_TIMEOUT: Duration = Duration::from_secs(30);

/// Aggregated result of dispatching an event.
#[derive(Debug, Clone, Default)]
pub struct DispatchResult {
    /// Whether delivery was halted.
    pub halted: bool,
    /// Halt reason (if halted).
    pub halt_reason: Option<String>,
    /// Listener that halted (if halted).
    pub halted_by: Option<String>,
    /// Number of listeners that were called.
    pub delivered: usize,
}

/// Dispatches events to subscribed listeners.
#[derive(Debug, Default)]
pub struct EventDispatcher {
    registry: Arc<ListenerRegistry>,
}

impl EventDispatcher {
    /// Creates a dispatcher over an existing listener registry.
    pub fn new(registry: Arc<ListenerRegistry>) -> Self {
        Self { registry }
    }

    /// Delivers an event to all listeners of its kind.
    pub async fn dispatch(&self, event: &PluginEvent) -> DispatchResult {
        let listeners = self.registry.listeners_for(event.kind).await;
        let mut result = DispatchResult::default();

        if listeners.is_empty() {
            return result;
        }

        debug!(
            kind = %event.kind,
            plugin = %event.plugin_name(),
            listener_count = listeners.len(),
            "Dispatching event"
        );

        for listener in &listeners {
            let action = call_listener(listener.as_ref(), event).await;
            result.delivered += 1;

            if let ListenerAction::Halt { reason } = action {
                if event.kind.is_pre_commit() {
                    info!(
                        kind = %event.kind,
                        plugin = %event.plugin_name(),
                        listener = %listener.name(),
                        reason = %reason,
                        "Listener halted transition"
                    );
                    result.halted = true;
                    result.halt_reason = Some(reason);
                    result.halted_by = Some(listener.name().to_string());
                    break;
                }
                warn!(
                    kind = %event.kind,
                    listener = %listener.name(),
                    "Listener returned Halt for a non pre-commit event, ignoring"
                );
            }
        }

        result
    }

    /// Delivers an event without inspecting the result.
    pub async fn fire_and_forget(&self, event: &PluginEvent) {
        let _ = self.dispatch(event).await;
    }

    /// Returns the listener registry.
    pub fn registry(&self) -> &Arc<ListenerRegistry> {
        &self.registry
    }
}

async fn call_listener(listener: &dyn EventListener, event: &PluginEvent) -> ListenerAction {
    match tokio::time::timeout(LISTENER_TIMEOUT, listener.handle(event)).await {
        Ok(action) => action,
        Err(_) => {
            warn!(
                kind = %event.kind,
                listener = %listener.name(),
                "Listener timed out, continuing"
            );
            ListenerAction::Continue
        }
    }
}
