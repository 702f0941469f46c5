//! Event bus abstraction for decoupled event emission.
//!
//! Lets the monitor loop run and be tested without any particular UI or
//! notification layer attached.

use crate::MonitorEvent;
use std::sync::{Arc, Mutex};

/// Trait for emitting events to subscribers.
pub trait EventBus: Send + Sync {
    fn emit(&self, event: MonitorEvent);
}

/// Type alias for shared event bus reference.
pub type EventBusRef = Arc<dyn EventBus>;

/// A captured event from InMemoryEventBus.
#[derive(Debug, Clone)]
pub struct EmittedEvent {
    pub topic: &'static str,
    pub event: MonitorEvent,
    pub timestamp_ms: i64,
}

/// In-memory event bus for testing.
///
/// Captures all emitted events for later inspection.
#[derive(Default)]
pub struct InMemoryEventBus {
    events: Mutex<Vec<EmittedEvent>>,
}

impl InMemoryEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<EmittedEvent>> {
        self.events.lock().expect("event bus mutex poisoned")
    }

    pub fn events(&self) -> Vec<EmittedEvent> {
        self.lock().clone()
    }

    /// Get events for a specific topic.
    pub fn events_for(&self, topic: &str) -> Vec<EmittedEvent> {
        self.lock()
            .iter()
            .filter(|e| e.topic == topic)
            .cloned()
            .collect()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

impl EventBus for InMemoryEventBus {
    fn emit(&self, event: MonitorEvent) {
        self.lock().push(EmittedEvent {
            topic: event.topic(),
            event,
            timestamp_ms: chrono::Utc::now().timestamp_millis(),
        });
    }
}

/// No-op event bus that discards all events.
pub struct NullEventBus;

impl EventBus for NullEventBus {
    fn emit(&self, _event: MonitorEvent) {}
}

/// Writes every event to the log as JSON.
pub struct TracingEventBus;

impl EventBus for TracingEventBus {
    fn emit(&self, event: MonitorEvent) {
        match serde_json::to_string(&event) {
            Ok(payload) => tracing::info!(topic = event.topic(), %payload, "event"),
            Err(err) => tracing::warn!(topic = event.topic(), error = %err, "unserializable event"),
        }
    }
}
