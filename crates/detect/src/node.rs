//! UI tree node abstraction.
//!
//! Platform node handles are borrowed from the inspected application and are
//! only valid for one inspection pass. Everything in this crate works against
//! the [`UiNode`] trait so the search routines never retain a handle past the
//! call that received it.

use crate::geometry::Rect;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::sync::Arc;

/// Boolean state flags exposed by every node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeFlags {
    pub visible: bool,
    pub enabled: bool,
    pub clickable: bool,
    pub focusable: bool,
    pub focused: bool,
    pub selected: bool,
}

impl Default for NodeFlags {
    fn default() -> Self {
        Self {
            visible: true,
            enabled: true,
            clickable: false,
            focusable: false,
            focused: false,
            selected: false,
        }
    }
}

/// Read-only view of one node in the inspected application's UI tree.
pub trait UiNode: Clone {
    /// Fully-qualified view identifier, e.g. `com.example:id/feed_tab`.
    fn identifier(&self) -> Option<&str>;

    /// Class or type tag, e.g. `android.widget.FrameLayout`.
    fn class_name(&self) -> Option<&str>;

    fn content_description(&self) -> Option<&str>;

    fn text(&self) -> Option<&str>;

    /// Bounds in screen coordinates.
    fn bounds(&self) -> Rect;

    fn flags(&self) -> NodeFlags;

    fn child_count(&self) -> usize;

    /// Child at `index`, or `None` if the platform invalidated it since the
    /// parent was obtained.
    fn child(&self, index: usize) -> Option<Self>;

    /// Every node in the subtree whose identifier equals `identifier`.
    ///
    /// Platforms with an identifier index should override this; the default
    /// walks the whole tree.
    fn find_by_identifier(&self, identifier: &str) -> Vec<Self> {
        let mut matches = Vec::new();
        let mut stack = vec![self.clone()];
        while let Some(node) = stack.pop() {
            if node.identifier() == Some(identifier) {
                matches.push(node.clone());
            }
            for index in (0..node.child_count()).rev() {
                if let Some(child) = node.child(index) {
                    stack.push(child);
                }
            }
        }
        matches
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct SnapshotData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(default, rename = "class", skip_serializing_if = "Option::is_none")]
    class_name: Option<String>,
    #[serde(default, rename = "desc", skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default)]
    bounds: Rect,
    #[serde(flatten)]
    flags: NodeFlags,
    /// Simulates a child that disappeared between listing and access.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    detached: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    children: Vec<SnapshotNode>,
}

/// Owned, immutable UI tree captured at one instant.
///
/// Cloning is cheap; children share the same allocation. Used by tests and by
/// the replay tool, which loads trees from JSON.
#[derive(Debug, Clone, Default)]
pub struct SnapshotNode(Arc<SnapshotData>);

impl SnapshotNode {
    pub fn builder() -> SnapshotBuilder {
        SnapshotBuilder::default()
    }

    /// Total number of nodes in this subtree.
    pub fn node_count(&self) -> usize {
        1 + self.0.children.iter().map(SnapshotNode::node_count).sum::<usize>()
    }
}

impl UiNode for SnapshotNode {
    fn identifier(&self) -> Option<&str> {
        self.0.id.as_deref()
    }

    fn class_name(&self) -> Option<&str> {
        self.0.class_name.as_deref()
    }

    fn content_description(&self) -> Option<&str> {
        self.0.description.as_deref()
    }

    fn text(&self) -> Option<&str> {
        self.0.text.as_deref()
    }

    fn bounds(&self) -> Rect {
        self.0.bounds
    }

    fn flags(&self) -> NodeFlags {
        self.0.flags
    }

    fn child_count(&self) -> usize {
        self.0.children.len()
    }

    fn child(&self, index: usize) -> Option<Self> {
        self.0
            .children
            .get(index)
            .filter(|child| !child.0.detached)
            .cloned()
    }
}

impl Serialize for SnapshotNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SnapshotNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        SnapshotData::deserialize(deserializer).map(|data| SnapshotNode(Arc::new(data)))
    }
}

/// Fluent constructor for [`SnapshotNode`] trees.
#[derive(Debug, Default)]
pub struct SnapshotBuilder {
    data: SnapshotData,
}

impl SnapshotBuilder {
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.data.id = Some(id.into());
        self
    }

    pub fn class(mut self, class_name: impl Into<String>) -> Self {
        self.data.class_name = Some(class_name.into());
        self
    }

    pub fn desc(mut self, description: impl Into<String>) -> Self {
        self.data.description = Some(description.into());
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.data.text = Some(text.into());
        self
    }

    pub fn bounds(mut self, bounds: Rect) -> Self {
        self.data.bounds = bounds;
        self
    }

    pub fn flags(mut self, flags: NodeFlags) -> Self {
        self.data.flags = flags;
        self
    }

    pub fn visible(mut self, visible: bool) -> Self {
        self.data.flags.visible = visible;
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.data.flags.enabled = enabled;
        self
    }

    pub fn clickable(mut self) -> Self {
        self.data.flags.clickable = true;
        self
    }

    pub fn focusable(mut self) -> Self {
        self.data.flags.focusable = true;
        self
    }

    pub fn focused(mut self) -> Self {
        self.data.flags.focused = true;
        self
    }

    pub fn selected(mut self) -> Self {
        self.data.flags.selected = true;
        self
    }

    pub fn detached(mut self) -> Self {
        self.data.detached = true;
        self
    }

    pub fn child(mut self, child: SnapshotNode) -> Self {
        self.data.children.push(child);
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = SnapshotNode>) -> Self {
        self.data.children.extend(children);
        self
    }

    pub fn build(self) -> SnapshotNode {
        SnapshotNode(Arc::new(self.data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(id: &str) -> SnapshotNode {
        SnapshotNode::builder().id(id).build()
    }

    #[test]
    fn test_find_by_identifier_walks_whole_tree() {
        let root = SnapshotNode::builder()
            .child(
                SnapshotNode::builder()
                    .child(leaf("app:id/target"))
                    .child(leaf("app:id/other"))
                    .build(),
            )
            .child(leaf("app:id/target"))
            .build();

        assert_eq!(root.find_by_identifier("app:id/target").len(), 2);
        assert!(root.find_by_identifier("app:id/missing").is_empty());
    }

    #[test]
    fn test_find_by_identifier_is_exact() {
        let root = SnapshotNode::builder().child(leaf("app:id/feed_tab_x")).build();
        assert!(root.find_by_identifier("app:id/feed_tab").is_empty());
    }

    #[test]
    fn test_detached_child_is_skipped() {
        let root = SnapshotNode::builder()
            .child(SnapshotNode::builder().id("app:id/gone").detached().build())
            .build();

        assert_eq!(root.child_count(), 1);
        assert!(root.child(0).is_none());
        assert!(root.find_by_identifier("app:id/gone").is_empty());
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let json = r#"{
            "class": "android.widget.FrameLayout",
            "children": [
                {"id": "app:id/tab", "desc": "Home", "selected": true,
                 "bounds": {"left": 0, "top": 0, "right": 100, "bottom": 100}}
            ]
        }"#;
        let root: SnapshotNode = serde_json::from_str(json).unwrap();

        assert_eq!(root.class_name(), Some("android.widget.FrameLayout"));
        assert!(root.flags().visible);
        assert!(root.flags().enabled);

        let tab = root.child(0).unwrap();
        assert_eq!(tab.identifier(), Some("app:id/tab"));
        assert_eq!(tab.content_description(), Some("Home"));
        assert!(tab.flags().selected);
        assert!(!tab.flags().clickable);
        assert_eq!(tab.bounds().width(), 100);
        assert_eq!(root.node_count(), 2);
    }
}
