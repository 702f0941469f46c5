//! Overlay blocking service runtime.
//!
//! Ties the pieces together on a single tokio task:
//!
//! ```text
//! foreground poll ──▶ PollingController ──▶ open / close
//!                                              │
//! tree changes ──▶ EventFilter ──▶ rate limit ─┴─▶ detect ──▶ DetectionStateTracker
//!                                                               │
//!                         back button fast path ◀───────────────┤
//!                                                               ▼
//!                                  debounce ──▶ OverlayOrchestrator ──▶ SurfaceHost
//! ```
//!
//! Platform glue feeds a [`MonitorHandle`]; everything else is owned by the
//! [`Monitor`] loop and driven by [`scheduler`] timers.

mod config;
mod error;
mod filter;
mod monitor;

pub mod policy;
pub mod scheduler;

pub use config::MonitorConfig;
pub use error::MonitorError;
pub use filter::{EventFilter, TreeChangeEvent, TreeEventCategory};
pub use monitor::{Monitor, MonitorHandle};
