//! Bounded tree searches.

use crate::element::ElementKind;
use crate::node::UiNode;

/// Default depth bound for heuristic scans. The root is depth 0.
pub const MAX_SEARCH_DEPTH: usize = 8;

/// Depth-first, pre-order search for the first node accepted by `predicate`.
///
/// Nodes at depth `max_depth` or deeper are never visited. Children that were
/// invalidated by the platform are skipped.
pub fn find_bounded<N, F>(root: &N, max_depth: usize, mut predicate: F) -> Option<N>
where
    N: UiNode,
    F: FnMut(&N) -> bool,
{
    visit(root, 0, max_depth, &mut predicate)
}

fn visit<N, F>(node: &N, depth: usize, max_depth: usize, predicate: &mut F) -> Option<N>
where
    N: UiNode,
    F: FnMut(&N) -> bool,
{
    if depth >= max_depth {
        return None;
    }
    if predicate(node) {
        return Some(node.clone());
    }
    (0..node.child_count())
        .filter_map(|index| node.child(index))
        .find_map(|child| visit(&child, depth + 1, max_depth, predicate))
}

/// Locate a validated element: identifier lookup first, then the bounded
/// heuristic scan.
pub fn find_element<N: UiNode>(root: &N, kind: ElementKind) -> Option<N> {
    let signature = kind.signature();

    if let Some(node) = root
        .find_by_identifier(signature.view_id)
        .into_iter()
        .find(|candidate| signature.is_valid(candidate))
    {
        tracing::trace!(element = %kind, "found by identifier");
        return Some(node);
    }

    let found = find_bounded(root, MAX_SEARCH_DEPTH, |node| {
        signature.matches(node) && signature.is_valid(node)
    });
    if found.is_some() {
        tracing::trace!(element = %kind, "found by heuristic scan");
    }
    found
}

/// True if any node within `max_depth` has an identifier, class tag or content
/// description containing one of `indicators`, ignoring case.
pub fn search_for_any_indicator<N: UiNode>(
    root: &N,
    indicators: &[&str],
    max_depth: usize,
) -> bool {
    let needles: Vec<String> = indicators.iter().map(|i| i.to_lowercase()).collect();
    find_bounded(root, max_depth, |node| {
        [
            node.identifier(),
            node.class_name(),
            node.content_description(),
        ]
        .into_iter()
        .flatten()
        .map(str::to_lowercase)
        .any(|haystack| needles.iter().any(|needle| haystack.contains(needle.as_str())))
    })
    .is_some()
}
