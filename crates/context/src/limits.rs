//! Fixed heuristics for the monitored application.
//!
//! Single source of truth for package names, indicator strings and polling
//! cadence.

use std::time::Duration;

/// Packages whose foreground presence opens a monitoring session.
pub const MONITORED_PACKAGES: &[&str] = &["com.instagram.android"];

/// Substrings that mark a direct-message screen.
pub const DIRECT_MESSAGE_INDICATORS: &[&str] = &[
    "direct_inbox",
    "DirectThreadFragment",
    "direct_thread",
    "message_list",
];

/// Depth bound for the direct-message indicator scan.
pub const DIRECT_MESSAGE_SEARCH_DEPTH: usize = 4;

/// Class tag fragment shared by every text input widget.
pub const TEXT_INPUT_CLASS_FRAGMENT: &str = "EditText";

/// Known identifiers of the search input field.
pub const SEARCH_FIELD_IDS: &[&str] = &[
    "com.instagram.android:id/action_bar_search_edit_text",
    "com.instagram.android:id/search_edit_text",
    "com.instagram.android:id/search_box",
    "com.instagram.android:id/search_field",
];

/// Poll cadence while the target is foreground.
pub const OPEN_POLL_INTERVAL: Duration = Duration::from_millis(1000);

/// Poll cadence while the target is not foreground.
pub const CLOSED_POLL_INTERVAL: Duration = Duration::from_millis(3000);

pub fn is_monitored_package(package: &str) -> bool {
    MONITORED_PACKAGES.contains(&package)
}
