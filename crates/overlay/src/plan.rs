//! Mapping from detection state to the required surface set.
//!
//! Pure domain logic - no host calls.

use crate::geometry::{band_rect, reels_rect, DisplayMetrics};
use crate::settings::OverlaySettings;
use crate::surface::{OverlaySurfaceSpec, SurfaceKind};
use std::collections::BTreeMap;
use veil_context::DetectionState;

/// Targeted surfaces keyed by kind. Never contains the mask.
pub type SurfacePlan = BTreeMap<SurfaceKind, OverlaySurfaceSpec>;

/// Derive the targeted surfaces for `state`.
///
/// Rules:
/// 1. Direct messages: nothing.
/// 2. Reels: when the element is visible with known bounds.
/// 3. Feed band: feed tab, no back control, search tab not also set.
/// 4. Search band: search tab, no back control, no keyboard.
pub fn plan_surfaces(
    state: &DetectionState,
    settings: &OverlaySettings,
    display: DisplayMetrics,
) -> SurfacePlan {
    let mut plan = SurfacePlan::new();
    if state.in_direct_messages {
        return plan;
    }

    let mut insert = |kind, geometry| {
        plan.insert(kind, OverlaySurfaceSpec::new(kind, geometry));
    };

    if let Some(bounds) = state.reels_target() {
        insert(SurfaceKind::Reels, reels_rect(bounds));
    }

    if state.in_feed_tab && !state.in_search_tab && !state.back_button_visible {
        insert(
            SurfaceKind::FeedBand,
            band_rect(display, settings.top_margin_feed, settings.bottom_margin),
        );
    }

    if state.in_search_tab && !state.back_button_visible && !state.keyboard_active_in_search {
        insert(
            SurfaceKind::SearchBand,
            band_rect(display, settings.top_margin_search, settings.bottom_margin),
        );
    }

    plan
}
