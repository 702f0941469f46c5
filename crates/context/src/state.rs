//! Detection state and the per-pass detection routine.

use crate::screen::{classify, keyboard_active_in_search, ScreenContext};
use serde::{Deserialize, Serialize};
use veil_detect::{find_element, ElementKind, Rect, UiNode};

/// Result of one detection pass.
///
/// `in_direct_messages` is exclusive: when set, every other field is cleared
/// by [`DetectionState::normalized`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DetectionState {
    pub reels_visible: bool,
    #[serde(default)]
    pub reels_bounds: Option<Rect>,
    pub in_feed_tab: bool,
    pub in_search_tab: bool,
    pub in_direct_messages: bool,
    pub keyboard_active_in_search: bool,
    pub back_button_visible: bool,
}

impl DetectionState {
    /// The terminal direct-message state.
    pub fn direct_messages() -> Self {
        Self {
            in_direct_messages: true,
            ..Self::default()
        }
    }

    /// Enforce field invariants.
    pub fn normalized(self) -> Self {
        if self.in_direct_messages {
            return Self::direct_messages();
        }
        if !self.reels_visible {
            return Self {
                reels_bounds: None,
                ..self
            };
        }
        self
    }

    pub fn context(&self) -> ScreenContext {
        if self.in_direct_messages {
            ScreenContext::DirectMessages
        } else if self.in_search_tab {
            ScreenContext::Search
        } else if self.in_feed_tab {
            ScreenContext::Feed
        } else {
            ScreenContext::Other
        }
    }

    /// Bounds of the reels element, when it is visible.
    pub fn reels_target(&self) -> Option<Rect> {
        self.reels_bounds.filter(|_| self.reels_visible)
    }
}

/// Run one detection pass over a tree snapshot.
///
/// Only the elements relevant to the classified context are inspected:
/// direct messages short-circuit, the search screen checks the keyboard, the
/// others check the reels button.
pub fn detect<N: UiNode>(root: &N) -> DetectionState {
    let context = classify(root);
    if context == ScreenContext::DirectMessages {
        tracing::debug!(%context, "detection pass");
        return DetectionState::direct_messages();
    }

    let mut state = DetectionState {
        back_button_visible: find_element(root, ElementKind::BackButton).is_some(),
        ..DetectionState::default()
    };

    match context {
        ScreenContext::Search => {
            state.in_search_tab = true;
            state.keyboard_active_in_search = keyboard_active_in_search(root);
        }
        ScreenContext::Feed => {
            state.in_feed_tab = true;
            apply_reels(root, &mut state);
        }
        ScreenContext::Other | ScreenContext::DirectMessages => {
            apply_reels(root, &mut state);
        }
    }

    tracing::debug!(
        %context,
        reels = state.reels_visible,
        back = state.back_button_visible,
        keyboard = state.keyboard_active_in_search,
        "detection pass"
    );
    state
}

fn apply_reels<N: UiNode>(root: &N, state: &mut DetectionState) {
    if let Some(reels) = find_element(root, ElementKind::ReelsButton) {
        state.reels_visible = true;
        state.reels_bounds = Some(reels.bounds());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use veil_detect::SnapshotNode;

    fn node(id: &str) -> veil_detect::SnapshotBuilder {
        SnapshotNode::builder()
            .id(format!("com.instagram.android:id/{id}"))
            .class("android.widget.FrameLayout")
            .bounds(Rect::new(0, 1800, 216, 1920))
    }

    fn reels() -> SnapshotNode {
        node("clips_tab")
            .bounds(Rect::new(100, 200, 300, 400))
            .clickable()
            .focusable()
            .build()
    }

    fn back() -> SnapshotNode {
        node("action_bar_button_back")
            .class("android.widget.ImageView")
            .bounds(Rect::new(0, 0, 120, 120))
            .clickable()
            .build()
    }

    #[test]
    fn test_feed_pass_collects_reels_and_back() {
        let root = SnapshotNode::builder()
            .child(node("feed_tab").selected().build())
            .child(reels())
            .child(back())
            .build();

        let state = detect(&root);
        assert!(state.in_feed_tab);
        assert!(!state.in_search_tab);
        assert!(state.reels_visible);
        assert_eq!(state.reels_bounds, Some(Rect::new(100, 200, 300, 400)));
        assert!(state.back_button_visible);
        assert_eq!(state.context(), ScreenContext::Feed);
    }

    #[test]
    fn test_search_pass_skips_reels() {
        let root = SnapshotNode::builder()
            .child(node("search_tab").selected().build())
            .child(reels())
            .build();

        let state = detect(&root);
        assert!(state.in_search_tab);
        assert!(!state.reels_visible);
        assert!(!state.keyboard_active_in_search);
    }

    #[test]
    fn test_other_pass_has_no_tab_flags() {
        let root = SnapshotNode::builder().child(reels()).child(back()).build();

        let state = detect(&root);
        assert!(!state.in_feed_tab);
        assert!(!state.in_search_tab);
        assert!(state.reels_visible);
        assert!(state.back_button_visible);
    }

    #[test]
    fn test_direct_messages_is_exclusive() {
        let root = SnapshotNode::builder()
            .child(SnapshotNode::builder().id("com.instagram.android:id/message_list").build())
            .child(node("feed_tab").selected().build())
            .child(reels())
            .child(back())
            .build();

        assert_eq!(detect(&root), DetectionState::direct_messages());
    }

    #[test]
    fn test_normalized_clears_everything_in_direct_messages() {
        let raw = DetectionState {
            reels_visible: true,
            reels_bounds: Some(Rect::new(0, 0, 10, 10)),
            in_feed_tab: true,
            in_direct_messages: true,
            back_button_visible: true,
            ..DetectionState::default()
        };
        assert_eq!(raw.normalized(), DetectionState::direct_messages());
    }

    #[test]
    fn test_normalized_drops_bounds_without_reels() {
        let raw = DetectionState {
            reels_bounds: Some(Rect::new(0, 0, 10, 10)),
            ..DetectionState::default()
        };
        assert_eq!(raw.normalized().reels_bounds, None);
        assert_eq!(raw.reels_target(), None);
    }

    #[test]
    fn test_serde_field_names() {
        let json = serde_json::to_value(DetectionState::direct_messages()).unwrap();
        assert_eq!(json["in_direct_messages"], true);
        assert_eq!(json["reels_bounds"], serde_json::Value::Null);
    }
}
