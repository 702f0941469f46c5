//! Surface geometry.

use crate::policy::{MIN_REELS_SIZE, REELS_SCALE_DEN, REELS_SCALE_NUM};
use serde::{Deserialize, Serialize};
use veil_detect::Rect;

/// Size of the display the surfaces are laid out on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayMetrics {
    pub width: i32,
    pub height: i32,
}

impl Default for DisplayMetrics {
    fn default() -> Self {
        Self {
            width: 1080,
            height: 1920,
        }
    }
}

impl DisplayMetrics {
    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }
}

/// Reels cover: 0.8x the element, centered on it, at least 50 on each side.
pub fn reels_rect(element: Rect) -> Rect {
    let width = scale_reels_side(element.width());
    let height = scale_reels_side(element.height());
    let (cx, cy) = element.center();
    Rect::from_origin_size(
        cx.saturating_sub(width / 2),
        cy.saturating_sub(height / 2),
        width,
        height,
    )
}

/// Widened so oversized bounds from the platform cannot overflow.
fn scale_reels_side(side: i32) -> i32 {
    let scaled = i64::from(side) * i64::from(REELS_SCALE_NUM) / i64::from(REELS_SCALE_DEN);
    // |scaled| <= |side|, so it fits.
    (scaled as i32).max(MIN_REELS_SIZE)
}

/// Full-width band between the top and bottom margins.
pub fn band_rect(display: DisplayMetrics, top_margin: u32, bottom_margin: u32) -> Rect {
    let top = top_margin as i32;
    let height = display
        .height
        .saturating_sub(top)
        .saturating_sub(bottom_margin as i32)
        .max(0);
    Rect::from_origin_size(0, top, display.width, height)
}
