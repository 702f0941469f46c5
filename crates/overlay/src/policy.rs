//! Orchestration policy constants.

use std::time::Duration;

/// How long the full-display mask stays up before targeted surfaces replace it.
pub const TRANSITION: Duration = Duration::from_millis(100);

/// Consecutive surface failures tolerated before operations are suspended.
pub const MAX_CONSECUTIVE_FAILURES: u32 = 3;

/// Reels surfaces are scaled to `REELS_SCALE_NUM / REELS_SCALE_DEN` of the element.
pub const REELS_SCALE_NUM: i32 = 4;
pub const REELS_SCALE_DEN: i32 = 5;

/// Floor for each dimension of a reels surface.
pub const MIN_REELS_SIZE: i32 = 50;
