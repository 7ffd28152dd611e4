//! Registry event listener writing to the audit trail.

use async_trait::async_trait;
use tracing::info;

use plugreg_plugin::prelude::*;

use crate::trail::AuditTrail;

/// Listener name.
pub const LISTENER_NAME: &str = "audit-trail";

/// Records every registry event. Never vetoes.
#[derive(Debug, Clone)]
pub struct AuditTrailListener {
    trail: AuditTrail,
    priority: i32,
}

impl AuditTrailListener {
    /// Creates a listener with the default priority.
    pub fn new(trail: AuditTrail) -> Self {
        Self {
            trail,
            priority: 100,
        }
    }

    /// Overrides the priority.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

#[async_trait]
impl EventListener for AuditTrailListener {
    async fn handle(&self, event: &PluginEvent) -> ListenerAction {
        info!(
            event_id = %event.id,
            kind = %event.kind,
            plugin = %event.plugin_name(),
            "Registry event"
        );
        self.trail
            .record("registry", event.kind.as_str(), event.plugin_name())
            .await;
        ListenerAction::Continue
    }

    fn name(&self) -> &str {
        LISTENER_NAME
    }

    fn priority(&self) -> i32 {
        self.priority
    }
}
