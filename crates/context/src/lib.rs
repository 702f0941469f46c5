//! Screen context awareness for the monitored application.
//!
//! This crate turns raw UI tree snapshots into a stable, de-duplicated
//! [`DetectionState`] and decides when the target application is open.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Domain Layer                             │
//! │  screen.rs   - ScreenContext and classification (pure)      │
//! │  state.rs    - DetectionState and the detection pass        │
//! │  limits.rs   - Packages, indicators, cadence                │
//! │  provider.rs - Traits for platform queries                  │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   Application Layer                          │
//! │  tracker.rs - Previous-state ownership and change detection │
//! │  poller.rs  - Open/close state machine with adaptive cadence│
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use veil_context::{detect, DetectionStateTracker};
//! use veil_detect::SnapshotNode;
//!
//! let mut tracker = DetectionStateTracker::new();
//! let state = detect(&SnapshotNode::default());
//!
//! // Nothing detected on an empty tree, so nothing changed either.
//! assert!(!tracker.update(state));
//! ```

mod limits;
mod poller;
mod provider;
mod screen;
mod state;
mod tracker;

pub use limits::{
    is_monitored_package, CLOSED_POLL_INTERVAL, DIRECT_MESSAGE_INDICATORS,
    DIRECT_MESSAGE_SEARCH_DEPTH, MONITORED_PACKAGES, OPEN_POLL_INTERVAL, SEARCH_FIELD_IDS,
};
pub use poller::{PollSession, PollingController, Transition};
pub use provider::{ForegroundAppProvider, NullProvider, SnapshotProvider, UiTreeProvider};
pub use screen::{classify, keyboard_active_in_search, ScreenContext};
pub use state::{detect, DetectionState};
pub use tracker::{DetectionStateTracker, Observation};
