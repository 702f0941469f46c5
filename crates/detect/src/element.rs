//! Element signatures for the monitored application.
//!
//! Each [`ElementKind`] maps to one row of [`ElementSignature`] data that
//! drives both the identifier lookup and the heuristic fallback.

use crate::node::{NodeFlags, UiNode};
use serde::{Deserialize, Serialize};

/// Smallest width and height, exclusive, for a node to count as real.
pub const MIN_ELEMENT_SIZE: i32 = 20;

/// UI affordances located by the detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    BackButton,
    FeedTab,
    SearchTab,
    ReelsButton,
}

impl ElementKind {
    pub const ALL: [ElementKind; 4] = [
        ElementKind::BackButton,
        ElementKind::FeedTab,
        ElementKind::SearchTab,
        ElementKind::ReelsButton,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ElementKind::BackButton => "back button",
            ElementKind::FeedTab => "feed tab",
            ElementKind::SearchTab => "search tab",
            ElementKind::ReelsButton => "reels button",
        }
    }

    pub fn signature(&self) -> &'static ElementSignature {
        match self {
            ElementKind::BackButton => &BACK_BUTTON,
            ElementKind::FeedTab => &FEED_TAB,
            ElementKind::SearchTab => &SEARCH_TAB,
            ElementKind::ReelsButton => &REELS_BUTTON,
        }
    }
}

impl std::fmt::Display for ElementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Extra flags a candidate must carry beyond visible + enabled + sized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Validity {
    pub clickable: bool,
    pub focusable: bool,
}

/// How to recognise one kind of element.
#[derive(Debug, Clone, Copy)]
pub struct ElementSignature {
    /// Full identifier for indexed lookup.
    pub view_id: &'static str,
    /// Substring of the identifier that marks a match on its own.
    pub id_fragment: &'static str,
    /// Class tag substring that enables the keyword check.
    pub class_fragment: &'static str,
    /// Lowercase keywords matched against the content description.
    pub keywords: &'static [&'static str],
    pub validity: Validity,
}

pub const BACK_BUTTON: ElementSignature = ElementSignature {
    view_id: "com.instagram.android:id/action_bar_button_back",
    id_fragment: "action_bar_button_back",
    class_fragment: "ImageView",
    keywords: &["back", "atrás", "volver", "navigate up", "up button"],
    validity: Validity {
        clickable: true,
        focusable: false,
    },
};

pub const FEED_TAB: ElementSignature = ElementSignature {
    view_id: "com.instagram.android:id/feed_tab",
    id_fragment: "feed_tab",
    class_fragment: "FrameLayout",
    keywords: &["home", "feed", "inicio"],
    validity: Validity {
        clickable: false,
        focusable: false,
    },
};

pub const SEARCH_TAB: ElementSignature = ElementSignature {
    view_id: "com.instagram.android:id/search_tab",
    id_fragment: "search_tab",
    class_fragment: "FrameLayout",
    keywords: &["search", "buscar", "busqueda", "explore", "explorar"],
    validity: Validity {
        clickable: false,
        focusable: false,
    },
};

pub const REELS_BUTTON: ElementSignature = ElementSignature {
    view_id: "com.instagram.android:id/clips_tab",
    id_fragment: "clips_tab",
    class_fragment: "FrameLayout",
    keywords: &["reels", "reel", "clips"],
    validity: Validity {
        clickable: true,
        focusable: true,
    },
};

impl ElementSignature {
    /// Heuristic classifier used by the bounded fallback scan.
    pub fn matches<N: UiNode>(&self, node: &N) -> bool {
        if node
            .identifier()
            .is_some_and(|id| id.contains(self.id_fragment))
        {
            return true;
        }

        if !node
            .class_name()
            .is_some_and(|class| class.contains(self.class_fragment))
        {
            return false;
        }

        node.content_description()
            .map(str::to_lowercase)
            .is_some_and(|desc| self.keywords.iter().any(|k| desc.contains(k)))
    }

    pub fn is_valid<N: UiNode>(&self, node: &N) -> bool {
        let flags = node.flags();
        is_interactive(&flags)
            && has_reasonable_size(node)
            && (!self.validity.clickable || flags.clickable)
            && (!self.validity.focusable || flags.focusable)
    }
}

fn is_interactive(flags: &NodeFlags) -> bool {
    flags.visible && flags.enabled
}

/// Both dimensions strictly greater than [`MIN_ELEMENT_SIZE`].
pub fn has_reasonable_size<N: UiNode>(node: &N) -> bool {
    let bounds = node.bounds();
    bounds.width() > MIN_ELEMENT_SIZE && bounds.height() > MIN_ELEMENT_SIZE
}
