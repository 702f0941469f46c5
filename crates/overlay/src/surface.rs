//! Overlay surfaces and the host abstraction.

use crate::error::OverlayError;
use crate::geometry::DisplayMetrics;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use veil_detect::Rect;

/// The kinds of blocking surface.
///
/// Ordered so that iteration visits the mask first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceKind {
    /// Full-display cover used during transitions.
    Mask,
    Reels,
    FeedBand,
    SearchBand,
}

impl SurfaceKind {
    pub fn label(&self) -> &'static str {
        match self {
            SurfaceKind::Mask => "mask",
            SurfaceKind::Reels => "reels",
            SurfaceKind::FeedBand => "feed band",
            SurfaceKind::SearchBand => "search band",
        }
    }

    pub fn is_band(&self) -> bool {
        matches!(self, SurfaceKind::FeedBand | SurfaceKind::SearchBand)
    }
}

impl std::fmt::Display for SurfaceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Stacking request for a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZIntent {
    /// Opaque, above the target application, not touchable.
    #[default]
    OpaqueTopmost,
}

/// Everything a host needs to materialize one surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlaySurfaceSpec {
    pub kind: SurfaceKind,
    pub geometry: Rect,
    #[serde(default)]
    pub z: ZIntent,
}

impl OverlaySurfaceSpec {
    pub fn new(kind: SurfaceKind, geometry: Rect) -> Self {
        Self {
            kind,
            geometry,
            z: ZIntent::OpaqueTopmost,
        }
    }
}

/// Opaque identifier for a live surface, issued by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SurfaceHandle(pub u64);

impl std::fmt::Display for SurfaceHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Platform overlay API. Every call may fail, e.g. when racing a torn-down
/// window manager.
pub trait SurfaceHost: Send {
    fn display(&self) -> DisplayMetrics;

    fn create(&mut self, spec: &OverlaySurfaceSpec) -> Result<SurfaceHandle, OverlayError>;

    fn remove(&mut self, handle: SurfaceHandle) -> Result<(), OverlayError>;
}

/// Successful host operation, as recorded by [`InMemorySurfaceHost`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceOp {
    Created(SurfaceKind, Rect),
    Removed(SurfaceKind),
}

#[derive(Debug, Default)]
struct HostState {
    next_handle: u64,
    live: BTreeMap<SurfaceHandle, OverlaySurfaceSpec>,
    ops: Vec<SurfaceOp>,
    failed_calls: usize,
    fail_creates: usize,
    fail_removes: usize,
    fail_always: bool,
}

/// In-memory host for testing.
///
/// Clones share state, so a test can keep one clone for inspection while the
/// orchestrator owns another.
#[derive(Debug, Clone, Default)]
pub struct InMemorySurfaceHost {
    display: DisplayMetrics,
    state: Arc<Mutex<HostState>>,
}

impl InMemorySurfaceHost {
    pub fn new(display: DisplayMetrics) -> Self {
        Self {
            display,
            state: Arc::default(),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HostState> {
        self.state.lock().expect("surface host mutex poisoned")
    }

    /// Live surfaces, sorted by kind.
    pub fn live(&self) -> Vec<OverlaySurfaceSpec> {
        let mut live: Vec<_> = self.lock().live.values().copied().collect();
        live.sort_by_key(|spec| spec.kind);
        live
    }

    pub fn live_kinds(&self) -> Vec<SurfaceKind> {
        self.live().iter().map(|spec| spec.kind).collect()
    }

    pub fn spec_of(&self, kind: SurfaceKind) -> Option<OverlaySurfaceSpec> {
        self.lock().live.values().find(|spec| spec.kind == kind).copied()
    }

    /// Successful operations in call order.
    pub fn ops(&self) -> Vec<SurfaceOp> {
        self.lock().ops.clone()
    }

    /// Kinds created so far, in call order.
    pub fn created(&self) -> Vec<SurfaceKind> {
        self.lock()
            .ops
            .iter()
            .filter_map(|op| match op {
                SurfaceOp::Created(kind, _) => Some(*kind),
                SurfaceOp::Removed(_) => None,
            })
            .collect()
    }

    pub fn clear_ops(&self) {
        self.lock().ops.clear();
    }

    /// Number of calls that returned an error.
    pub fn failed_calls(&self) -> usize {
        self.lock().failed_calls
    }

    /// Fail the next `count` create calls.
    pub fn fail_next_creates(&self, count: usize) {
        self.lock().fail_creates = count;
    }

    /// Fail the next `count` remove calls.
    pub fn fail_next_removes(&self, count: usize) {
        self.lock().fail_removes = count;
    }

    /// Fail every call until turned off.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.lock().fail_always = unavailable;
    }
}

impl SurfaceHost for InMemorySurfaceHost {
    fn display(&self) -> DisplayMetrics {
        self.display
    }

    fn create(&mut self, spec: &OverlaySurfaceSpec) -> Result<SurfaceHandle, OverlayError> {
        let mut state = self.lock();
        if state.fail_always {
            state.failed_calls += 1;
            return Err(OverlayError::HostUnavailable);
        }
        if state.fail_creates > 0 {
            state.fail_creates -= 1;
            state.failed_calls += 1;
            return Err(OverlayError::CreateFailed {
                kind: spec.kind,
                reason: "injected failure".to_string(),
            });
        }

        state.next_handle += 1;
        let handle = SurfaceHandle(state.next_handle);
        state.live.insert(handle, *spec);
        state.ops.push(SurfaceOp::Created(spec.kind, spec.geometry));
        Ok(handle)
    }

    fn remove(&mut self, handle: SurfaceHandle) -> Result<(), OverlayError> {
        let mut state = self.lock();
        if state.fail_always {
            state.failed_calls += 1;
            return Err(OverlayError::HostUnavailable);
        }
        if state.fail_removes > 0 {
            state.fail_removes -= 1;
            state.failed_calls += 1;
            return Err(OverlayError::RemoveFailed {
                handle,
                reason: "injected failure".to_string(),
            });
        }

        let spec = state
            .live
            .remove(&handle)
            .ok_or(OverlayError::UnknownHandle(handle))?;
        state.ops.push(SurfaceOp::Removed(spec.kind));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_remove() {
        let mut host = InMemorySurfaceHost::default();
        let spec = OverlaySurfaceSpec::new(SurfaceKind::Reels, Rect::new(0, 0, 50, 50));

        let handle = host.create(&spec).unwrap();
        assert_eq!(host.live_kinds(), vec![SurfaceKind::Reels]);

        host.remove(handle).unwrap();
        assert!(host.live().is_empty());
        assert_eq!(
            host.ops(),
            vec![
                SurfaceOp::Created(SurfaceKind::Reels, Rect::new(0, 0, 50, 50)),
                SurfaceOp::Removed(SurfaceKind::Reels),
            ]
        );
    }

    #[test]
    fn test_remove_unknown_handle() {
        let mut host = InMemorySurfaceHost::default();
        let err = host.remove(SurfaceHandle(42)).unwrap_err();
        assert!(matches!(err, OverlayError::UnknownHandle(SurfaceHandle(42))));
    }

    #[test]
    fn test_injected_failures() {
        let mut host = InMemorySurfaceHost::default();
        let spec = OverlaySurfaceSpec::new(SurfaceKind::Mask, Rect::new(0, 0, 10, 10));

        host.fail_next_creates(1);
        assert!(host.create(&spec).is_err());
        assert!(host.create(&spec).is_ok());
        assert_eq!(host.failed_calls(), 1);

        host.set_unavailable(true);
        assert!(matches!(host.create(&spec), Err(OverlayError::HostUnavailable)));
    }

    #[test]
    fn test_clones_share_state() {
        let inspector = InMemorySurfaceHost::default();
        let mut owned = inspector.clone();
        owned
            .create(&OverlaySurfaceSpec::new(SurfaceKind::FeedBand, Rect::new(0, 0, 10, 10)))
            .unwrap();
        assert_eq!(inspector.created(), vec![SurfaceKind::FeedBand]);
    }

    #[test]
    fn test_spec_serializes_kind() {
        let spec = OverlaySurfaceSpec::new(SurfaceKind::SearchBand, Rect::new(0, 150, 1080, 1820));
        let json = serde_json::to_value(spec).unwrap();
        assert_eq!(json["kind"], "search_band");
        assert_eq!(json["z"], "opaque_topmost");
    }
}
