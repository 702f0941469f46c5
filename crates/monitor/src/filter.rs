//! Tree-change event intake.

use crate::config::MonitorConfig;
use serde::{Deserialize, Serialize};

/// Category tag carried by a tree-change notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeEventCategory {
    WindowContentChanged,
    WindowStateChanged,
    ViewFocused,
    ViewTextChanged,
    #[serde(other)]
    Other,
}

impl TreeEventCategory {
    /// Categories that can change what the detector would report.
    pub fn is_relevant(&self) -> bool {
        !matches!(self, TreeEventCategory::Other)
    }
}

/// Notification that the inspected application's UI changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeChangeEvent {
    #[serde(default)]
    pub package: Option<String>,
    pub category: TreeEventCategory,
    #[serde(default)]
    pub source_class: Option<String>,
}

impl TreeChangeEvent {
    pub fn new(package: impl Into<String>, category: TreeEventCategory) -> Self {
        Self {
            package: Some(package.into()),
            category,
            source_class: None,
        }
    }

    pub fn with_source_class(mut self, class_name: impl Into<String>) -> Self {
        self.source_class = Some(class_name.into());
        self
    }
}

/// Drops events that cannot change the detection result.
#[derive(Debug, Clone)]
pub struct EventFilter {
    packages: Vec<String>,
    ignored_classes: Vec<String>,
}

impl EventFilter {
    pub fn from_config(config: &MonitorConfig) -> Self {
        Self {
            packages: config.packages.clone(),
            ignored_classes: config.ignored_source_classes.clone(),
        }
    }

    pub fn accepts(&self, event: &TreeChangeEvent) -> bool {
        let from_target = event
            .package
            .as_deref()
            .is_some_and(|package| self.packages.iter().any(|p| p == package));
        let noisy = event
            .source_class
            .as_deref()
            .is_some_and(|class| self.ignored_classes.iter().any(|c| c == class));

        from_target && event.category.is_relevant() && !noisy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TARGET: &str = "com.instagram.android";

    fn filter() -> EventFilter {
        EventFilter::from_config(&MonitorConfig::default())
    }

    #[test]
    fn test_accepts_relevant_target_events() {
        for category in [
            TreeEventCategory::WindowContentChanged,
            TreeEventCategory::WindowStateChanged,
            TreeEventCategory::ViewFocused,
            TreeEventCategory::ViewTextChanged,
        ] {
            assert!(filter().accepts(&TreeChangeEvent::new(TARGET, category)));
        }
    }

    #[test]
    fn test_rejects_other_packages() {
        let event =
            TreeChangeEvent::new("com.android.systemui", TreeEventCategory::WindowStateChanged);
        assert!(!filter().accepts(&event));

        let anonymous = TreeChangeEvent {
            package: None,
            category: TreeEventCategory::WindowStateChanged,
            source_class: None,
        };
        assert!(!filter().accepts(&anonymous));
    }

    #[test]
    fn test_rejects_noise() {
        let progress = TreeChangeEvent::new(TARGET, TreeEventCategory::WindowContentChanged)
            .with_source_class("android.widget.ProgressBar");
        assert!(!filter().accepts(&progress));

        let scroll = TreeChangeEvent::new(TARGET, TreeEventCategory::Other);
        assert!(!filter().accepts(&scroll));
    }

    #[test]
    fn test_unknown_category_deserializes_as_other() {
        let event: TreeChangeEvent =
            serde_json::from_str(r#"{"package": "x", "category": "view_scrolled"}"#).unwrap();
        assert_eq!(event.category, TreeEventCategory::Other);
    }
}
