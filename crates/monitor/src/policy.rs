//! Timing policy for the monitor loop.

use std::time::Duration;

/// Delay between an open transition and the first detection pass.
pub const DETECTION_DELAY: Duration = Duration::from_millis(300);

/// Debounce window before a detected change is reconciled.
pub const DEBOUNCE: Duration = Duration::from_millis(300);

/// Minimum time between two tree inspection passes.
pub const MIN_DETECTION_INTERVAL: Duration = Duration::from_millis(500);

/// Event source classes that only report noise (progress, seek bars, layout).
pub const IGNORED_SOURCE_CLASSES: &[&str] = &[
    "android.widget.ProgressBar",
    "android.widget.SeekBar",
    "android.view.ViewGroup",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants() {
        assert!(DEBOUNCE.as_millis() > 0);
        assert!(DETECTION_DELAY.as_millis() > 0);
        assert!(MIN_DETECTION_INTERVAL > DEBOUNCE);
    }
}
