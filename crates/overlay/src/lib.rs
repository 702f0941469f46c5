//! Blocking overlay orchestration.
//!
//! Maps a [`veil_context::DetectionState`] to a set of opaque surfaces and
//! drives a [`SurfaceHost`] to show exactly that set. New surfaces appear
//! behind a short full-display mask; removals are immediate. Repeated host
//! failures suspend surface operations until the next reconcile.

mod error;
mod geometry;
mod orchestrator;
mod plan;
mod settings;
mod summary;
mod surface;

pub mod policy;

pub use error::OverlayError;
pub use geometry::{band_rect, reels_rect, DisplayMetrics};
pub use orchestrator::{OverlayOrchestrator, ReconcileOutcome};
pub use plan::{plan_surfaces, SurfacePlan};
pub use settings::{
    clamp_margin, InMemorySettingsStore, OverlaySettings, SettingsStore, SettingsStoreRef,
    DEFAULT_BOTTOM_MARGIN, DEFAULT_TOP_MARGIN_FEED, DEFAULT_TOP_MARGIN_SEARCH, MAX_MARGIN,
};
pub use summary::BlockingSummary;
pub use surface::{
    InMemorySurfaceHost, OverlaySurfaceSpec, SurfaceHandle, SurfaceHost, SurfaceKind, SurfaceOp,
    ZIntent,
};
