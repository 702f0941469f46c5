//! Monitor configuration.

use crate::policy::{DEBOUNCE, DETECTION_DELAY, IGNORED_SOURCE_CLASSES, MIN_DETECTION_INTERVAL};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use veil_context::{CLOSED_POLL_INTERVAL, MONITORED_PACKAGES, OPEN_POLL_INTERVAL};

/// Timing and filtering policy for [`Monitor`](crate::Monitor).
///
/// Every field has a default, so partial JSON is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Packages that open a monitoring session when foreground.
    pub packages: Vec<String>,
    pub open_poll_interval_ms: u64,
    pub closed_poll_interval_ms: u64,
    /// Delay from the open transition to the first detection pass.
    pub detection_delay_ms: u64,
    /// Debounce before a detected change reaches the orchestrator.
    pub reconcile_debounce_ms: u64,
    /// Minimum spacing between two tree inspection passes.
    pub min_detection_interval_ms: u64,
    /// Tree-change events from these source classes are dropped.
    pub ignored_source_classes: Vec<String>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            packages: MONITORED_PACKAGES.iter().map(|p| p.to_string()).collect(),
            open_poll_interval_ms: OPEN_POLL_INTERVAL.as_millis() as u64,
            closed_poll_interval_ms: CLOSED_POLL_INTERVAL.as_millis() as u64,
            detection_delay_ms: DETECTION_DELAY.as_millis() as u64,
            reconcile_debounce_ms: DEBOUNCE.as_millis() as u64,
            min_detection_interval_ms: MIN_DETECTION_INTERVAL.as_millis() as u64,
            ignored_source_classes: IGNORED_SOURCE_CLASSES.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl MonitorConfig {
    pub fn open_poll_interval(&self) -> Duration {
        Duration::from_millis(self.open_poll_interval_ms)
    }

    pub fn closed_poll_interval(&self) -> Duration {
        Duration::from_millis(self.closed_poll_interval_ms)
    }

    pub fn detection_delay(&self) -> Duration {
        Duration::from_millis(self.detection_delay_ms)
    }

    pub fn reconcile_debounce(&self) -> Duration {
        Duration::from_millis(self.reconcile_debounce_ms)
    }

    pub fn min_detection_interval(&self) -> Duration {
        Duration::from_millis(self.min_detection_interval_ms)
    }
}
