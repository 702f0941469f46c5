//! Provider traits for platform queries.
//!
//! These traits abstract the foreground-app query and the UI tree accessor,
//! keeping detection and polling logic pure and testable.

use std::sync::Mutex;
use veil_detect::{SnapshotNode, UiNode};

/// Answers "which package is frontmost". Best-effort; may lag by seconds.
pub trait ForegroundAppProvider: Send + Sync {
    fn current_foreground_package(&self) -> Option<String>;
}

/// Access to the inspected application's UI tree.
pub trait UiTreeProvider: Send + Sync {
    type Node: UiNode;

    /// Root of the current tree, if one is available.
    fn root_node(&self) -> Option<Self::Node>;

    /// Return a root obtained from [`root_node`](Self::root_node) to the platform.
    fn release(&self, root: Self::Node) {
        drop(root);
    }
}

/// Null implementation for testing or unsupported platforms.
pub struct NullProvider;

impl ForegroundAppProvider for NullProvider {
    fn current_foreground_package(&self) -> Option<String> {
        None
    }
}

impl UiTreeProvider for NullProvider {
    type Node = SnapshotNode;

    fn root_node(&self) -> Option<SnapshotNode> {
        None
    }
}

/// Provider backed by values set from the outside.
///
/// Used by the replay tool and by tests to script what the platform reports.
#[derive(Debug, Default)]
pub struct SnapshotProvider {
    foreground: Mutex<Option<String>>,
    tree: Mutex<Option<SnapshotNode>>,
    released: Mutex<usize>,
}

impl SnapshotProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_foreground(&self, package: Option<&str>) {
        *self.foreground.lock().expect("provider mutex poisoned") = package.map(str::to_string);
    }

    pub fn set_tree(&self, tree: Option<SnapshotNode>) {
        *self.tree.lock().expect("provider mutex poisoned") = tree;
    }

    /// Number of roots handed back through [`UiTreeProvider::release`].
    pub fn released_count(&self) -> usize {
        *self.released.lock().expect("provider mutex poisoned")
    }
}

impl ForegroundAppProvider for SnapshotProvider {
    fn current_foreground_package(&self) -> Option<String> {
        self.foreground.lock().expect("provider mutex poisoned").clone()
    }
}

impl UiTreeProvider for SnapshotProvider {
    type Node = SnapshotNode;

    fn root_node(&self) -> Option<SnapshotNode> {
        self.tree.lock().expect("provider mutex poisoned").clone()
    }

    fn release(&self, root: SnapshotNode) {
        drop(root);
        *self.released.lock().expect("provider mutex poisoned") += 1;
    }
}
