//! Read-only projection of the blocking state for status displays.

use crate::settings::OverlaySettings;
use crate::surface::SurfaceKind;
use serde::{Deserialize, Serialize};
use veil_context::ScreenContext;

/// What is currently blocked, and why.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BlockingSummary {
    /// Target application is foreground.
    pub open: bool,
    pub context: ScreenContext,
    /// Live surfaces, sorted by kind.
    pub surfaces: Vec<SurfaceKind>,
    /// Surface operations stopped after repeated failures.
    pub suspended: bool,
    pub back_button_visible: bool,
    pub keyboard_active_in_search: bool,
    pub settings: OverlaySettings,
}

impl BlockingSummary {
    pub fn is_blocking(&self, kind: SurfaceKind) -> bool {
        self.surfaces.contains(&kind)
    }

    /// One-line human description.
    pub fn status_line(&self) -> String {
        if !self.open {
            return "Waiting for target app".to_string();
        }
        if self.suspended {
            return "Blocking suspended (surface errors)".to_string();
        }

        let s = &self.settings;
        match self.context {
            ScreenContext::DirectMessages => "Direct messages (no blocking)".to_string(),
            ScreenContext::Feed if self.back_button_visible => {
                "Feed free (back active)".to_string()
            }
            ScreenContext::Feed => format!(
                "Feed blocked (top {}px, bottom {}px)",
                s.top_margin_feed, s.bottom_margin
            ),
            ScreenContext::Search if self.keyboard_active_in_search => {
                "Search free (keyboard active)".to_string()
            }
            ScreenContext::Search if self.back_button_visible => {
                "Search free (back active)".to_string()
            }
            ScreenContext::Search => format!(
                "Search blocked (top {}px, bottom {}px)",
                s.top_margin_search, s.bottom_margin
            ),
            ScreenContext::Other if self.is_blocking(SurfaceKind::Reels) => {
                "Reels blocked".to_string()
            }
            ScreenContext::Other if self.is_blocking(SurfaceKind::Mask) => {
                "Target app open (masking)".to_string()
            }
            ScreenContext::Other => "Target app open".to_string(),
        }
    }
}

impl std::fmt::Display for BlockingSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.status_line())
    }
}
