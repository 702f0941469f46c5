//! Element detection over UI tree snapshots.
//!
//! Stateless search routines that locate the monitored application's
//! navigation affordances. Detection is two-phase: an identifier lookup across
//! the whole tree, then a depth-bounded heuristic scan driven by the
//! [`ElementSignature`] table.
//!
//! # Example
//!
//! ```
//! use veil_detect::{find_element, ElementKind, Rect, SnapshotNode};
//!
//! let root = SnapshotNode::builder()
//!     .child(
//!         SnapshotNode::builder()
//!             .id("com.instagram.android:id/feed_tab")
//!             .bounds(Rect::new(0, 1800, 216, 1920))
//!             .selected()
//!             .build(),
//!     )
//!     .build();
//!
//! assert!(find_element(&root, ElementKind::FeedTab).is_some());
//! ```

mod element;
mod geometry;
mod node;
mod search;

pub use element::{
    has_reasonable_size, ElementKind, ElementSignature, Validity, BACK_BUTTON, FEED_TAB,
    MIN_ELEMENT_SIZE, REELS_BUTTON, SEARCH_TAB,
};
pub use geometry::Rect;
pub use node::{NodeFlags, SnapshotBuilder, SnapshotNode, UiNode};
pub use search::{find_bounded, find_element, search_for_any_indicator, MAX_SEARCH_DEPTH};
