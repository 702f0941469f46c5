//! Typed event contracts exposed to lifecycle and status collaborators.
//!
//! Every notification leaving the monitor is one [`MonitorEvent`] variant.
//! Payloads are validated once when built and never re-parsed downstream.
//!
//! Also provides the `EventBus` trait for decoupled event emission.

mod bus;

pub use bus::{EmittedEvent, EventBus, EventBusRef, InMemoryEventBus, NullEventBus, TracingEventBus};

use serde::{Deserialize, Serialize};
use veil_context::DetectionState;
use veil_overlay::BlockingSummary;

/// Notification emitted by the monitor loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MonitorEvent {
    /// A monitored package came to the foreground.
    TargetOpened { package: String },

    /// The monitored package left the foreground.
    TargetClosed,

    /// The tracker accepted a new detection state.
    StateChanged { state: DetectionState },

    /// The back control just appeared. Fired ahead of the debounced
    /// reconcile that follows the matching `StateChanged`.
    BackButtonDetected,

    /// Blocking summary changed.
    StatusChanged { summary: BlockingSummary },
}

impl MonitorEvent {
    pub fn topic(&self) -> &'static str {
        match self {
            MonitorEvent::TargetOpened { .. } => event_names::TARGET_OPENED,
            MonitorEvent::TargetClosed => event_names::TARGET_CLOSED,
            MonitorEvent::StateChanged { .. } => event_names::STATE_CHANGED,
            MonitorEvent::BackButtonDetected => event_names::BACK_BUTTON_DETECTED,
            MonitorEvent::StatusChanged { .. } => event_names::STATUS_CHANGED,
        }
    }
}

/// Event names as constants to prevent typos.
pub mod event_names {
    pub const TARGET_OPENED: &str = "monitor:target_opened";
    pub const TARGET_CLOSED: &str = "monitor:target_closed";
    pub const STATE_CHANGED: &str = "detection:state_changed";
    pub const BACK_BUTTON_DETECTED: &str = "detection:back_button";
    pub const STATUS_CHANGED: &str = "overlay:status";
}
