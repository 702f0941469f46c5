//! Screen context classification.
//!
//! Pure domain logic over one tree snapshot - no I/O, no retained state.

use crate::limits::{
    DIRECT_MESSAGE_INDICATORS, DIRECT_MESSAGE_SEARCH_DEPTH, SEARCH_FIELD_IDS,
    TEXT_INPUT_CLASS_FRAGMENT,
};
use serde::{Deserialize, Serialize};
use veil_detect::{
    find_bounded, find_element, has_reasonable_size, search_for_any_indicator, ElementKind,
    UiNode, MAX_SEARCH_DEPTH,
};

/// Which screen of the monitored application is displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ScreenContext {
    /// Inbox or a conversation thread. Never blocked.
    DirectMessages,

    /// Home feed tab selected.
    Feed,

    /// Search / explore tab selected.
    Search,

    #[default]
    Other,
}

impl ScreenContext {
    pub fn label(&self) -> &'static str {
        match self {
            ScreenContext::DirectMessages => "Direct messages",
            ScreenContext::Feed => "Feed",
            ScreenContext::Search => "Search",
            ScreenContext::Other => "Other",
        }
    }
}

impl std::fmt::Display for ScreenContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Classify a tree snapshot.
///
/// Priority:
/// 1. DirectMessages (any indicator within the shallow depth bound)
/// 2. Search (search tab found and selected)
/// 3. Feed (feed tab found and selected)
/// 4. Other
///
/// Direct-message screens can keep the selected flag of the tab they were
/// opened from, so the indicator scan runs first.
pub fn classify<N: UiNode>(root: &N) -> ScreenContext {
    if search_for_any_indicator(root, DIRECT_MESSAGE_INDICATORS, DIRECT_MESSAGE_SEARCH_DEPTH) {
        return ScreenContext::DirectMessages;
    }

    if is_selected(root, ElementKind::SearchTab) {
        return ScreenContext::Search;
    }

    if is_selected(root, ElementKind::FeedTab) {
        return ScreenContext::Feed;
    }

    ScreenContext::Other
}

fn is_selected<N: UiNode>(root: &N, kind: ElementKind) -> bool {
    find_element(root, kind).is_some_and(|tab| tab.flags().selected)
}

/// Best-effort check for an on-screen keyboard on the search screen.
///
/// True when a focused text input is present, or when one of the known search
/// fields is focused or already holds text.
pub fn keyboard_active_in_search<N: UiNode>(root: &N) -> bool {
    // Inputs are checked down to and including depth MAX_SEARCH_DEPTH.
    let focused_input = find_bounded(root, MAX_SEARCH_DEPTH + 1, |node| {
        let flags = node.flags();
        node.class_name()
            .is_some_and(|class| class.contains(TEXT_INPUT_CLASS_FRAGMENT))
            && flags.visible
            && flags.enabled
            && flags.focused
            && has_reasonable_size(node)
    });
    if focused_input.is_some() {
        return true;
    }

    SEARCH_FIELD_IDS.iter().any(|id| {
        root.find_by_identifier(id)
            .iter()
            .any(is_active_search_field)
    })
}

fn is_active_search_field<N: UiNode>(node: &N) -> bool {
    let flags = node.flags();
    flags.visible
        && flags.enabled
        && has_reasonable_size(node)
        && (flags.focused || node.text().is_some_and(|text| !text.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use veil_detect::{Rect, SnapshotNode};

    fn tab(id: &str, selected: bool) -> SnapshotNode {
        let builder = SnapshotNode::builder()
            .id(format!("com.instagram.android:id/{id}"))
            .class("android.widget.FrameLayout")
            .bounds(Rect::new(0, 1800, 216, 1920));
        if selected {
            builder.selected().build()
        } else {
            builder.build()
        }
    }

    fn tab_bar(feed_selected: bool, search_selected: bool) -> SnapshotNode {
        SnapshotNode::builder()
            .child(tab("feed_tab", feed_selected))
            .child(tab("search_tab", search_selected))
            .build()
    }

    #[test]
    fn test_feed_selected() {
        assert_eq!(classify(&tab_bar(true, false)), ScreenContext::Feed);
    }

    #[test]
    fn test_search_selected() {
        assert_eq!(classify(&tab_bar(false, true)), ScreenContext::Search);
    }

    #[test]
    fn test_search_wins_over_feed() {
        assert_eq!(classify(&tab_bar(true, true)), ScreenContext::Search);
    }

    #[test]
    fn test_nothing_selected_is_other() {
        assert_eq!(classify(&tab_bar(false, false)), ScreenContext::Other);
        assert_eq!(classify(&SnapshotNode::default()), ScreenContext::Other);
    }

    #[test]
    fn test_direct_messages_preempts_selected_tab() {
        let root = SnapshotNode::builder()
            .child(SnapshotNode::builder().id("com.instagram.android:id/direct_inbox").build())
            .child(tab("search_tab", true))
            .build();
        assert_eq!(classify(&root), ScreenContext::DirectMessages);
    }

    #[test]
    fn test_deep_direct_indicator_is_ignored() {
        let mut node = SnapshotNode::builder().class("x.DirectThreadFragment").build();
        for _ in 0..4 {
            node = SnapshotNode::builder().child(node).build();
        }
        assert_eq!(classify(&node), ScreenContext::Other);
    }

    #[test]
    fn test_keyboard_focused_edit_text() {
        let root = SnapshotNode::builder()
            .child(
                SnapshotNode::builder()
                    .class("android.widget.EditText")
                    .bounds(Rect::new(0, 100, 1080, 200))
                    .focused()
                    .build(),
            )
            .build();
        assert!(keyboard_active_in_search(&root));
    }

    #[test]
    fn test_keyboard_unfocused_edit_text() {
        let root = SnapshotNode::builder()
            .child(
                SnapshotNode::builder()
                    .class("com.google.android.material.textfield.TextInputEditText")
                    .bounds(Rect::new(0, 100, 1080, 200))
                    .build(),
            )
            .build();
        assert!(!keyboard_active_in_search(&root));
    }

    fn nested(leaf: SnapshotNode, depth: usize) -> SnapshotNode {
        (0..depth).fold(leaf, |child, _| SnapshotNode::builder().child(child).build())
    }

    fn focused_input() -> SnapshotNode {
        SnapshotNode::builder()
            .class("android.widget.EditText")
            .bounds(Rect::new(0, 100, 1080, 200))
            .focused()
            .build()
    }

    #[test]
    fn test_keyboard_edit_text_at_max_depth() {
        assert!(keyboard_active_in_search(&nested(focused_input(), MAX_SEARCH_DEPTH)));
        assert!(!keyboard_active_in_search(&nested(
            focused_input(),
            MAX_SEARCH_DEPTH + 1
        )));
    }

    #[test]
    fn test_keyboard_search_field_with_text() {
        let root = SnapshotNode::builder()
            .child(
                SnapshotNode::builder()
                    .id("com.instagram.android:id/action_bar_search_edit_text")
                    .class("android.widget.TextView")
                    .text("cats")
                    .bounds(Rect::new(0, 100, 1080, 200))
                    .build(),
            )
            .build();
        assert!(keyboard_active_in_search(&root));
    }

    #[test]
    fn test_keyboard_empty_search_field() {
        let root = SnapshotNode::builder()
            .child(
                SnapshotNode::builder()
                    .id("com.instagram.android:id/search_box")
                    .text("")
                    .bounds(Rect::new(0, 100, 1080, 200))
                    .build(),
            )
            .build();
        assert!(!keyboard_active_in_search(&root));
    }

    #[test]
    fn test_label_display() {
        assert_eq!(ScreenContext::DirectMessages.to_string(), "Direct messages");
        assert_eq!(ScreenContext::default(), ScreenContext::Other);
    }
}
