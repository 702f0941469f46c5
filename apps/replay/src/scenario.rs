//! Scripted platform input for the replay tool.

use serde::Deserialize;
use veil_detect::SnapshotNode;
use veil_monitor::{MonitorConfig, TreeChangeEvent};
use veil_overlay::{DisplayMetrics, OverlaySettings};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Scenario {
    pub config: MonitorConfig,
    /// Initial settings; ignored when a database is used.
    pub settings: Option<OverlaySettings>,
    pub display: DisplayMetrics,
    pub steps: Vec<Step>,
}

/// One scripted action, applied in order.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// Set the foreground package and poll immediately.
    Foreground(Option<String>),
    /// Replace the UI tree and report a content change.
    Tree(Option<SnapshotNode>),
    /// Deliver a raw tree-change notification.
    TreeEvent(TreeChangeEvent),
    /// Change the overlay margins.
    Settings(OverlaySettings),
    WaitMs(u64),
}

impl Scenario {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Total scripted wait, for progress logging.
    pub fn duration_ms(&self) -> u64 {
        self.steps
            .iter()
            .map(|step| match step {
                Step::WaitMs(ms) => *ms,
                _ => 0,
            })
            .sum()
    }
}
