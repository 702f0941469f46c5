//! Reconciliation of the live surface set against detection state.
//!
//! The orchestrator is synchronous. Delays are expressed through
//! [`ReconcileOutcome::Transition`]; the caller's event loop schedules
//! [`OverlayOrchestrator::complete_transition`] after the returned duration.

use crate::error::OverlayError;
use crate::plan::{plan_surfaces, SurfacePlan};
use crate::policy::{MAX_CONSECUTIVE_FAILURES, TRANSITION};
use crate::settings::OverlaySettings;
use crate::summary::BlockingSummary;
use crate::surface::{OverlaySurfaceSpec, SurfaceHandle, SurfaceHost, SurfaceKind};
use std::collections::BTreeMap;
use std::time::Duration;
use veil_context::DetectionState;

/// What the caller must do after [`OverlayOrchestrator::reconcile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum ReconcileOutcome {
    /// Surface set matches the state.
    Settled,
    /// Mask is up; call `complete_transition` after this delay.
    Transition(Duration),
}

#[derive(Debug, Clone, Copy)]
struct LiveSurface {
    spec: OverlaySurfaceSpec,
    handle: SurfaceHandle,
}

/// Owns the surface host and the set of surfaces currently shown.
pub struct OverlayOrchestrator {
    host: Box<dyn SurfaceHost>,
    settings: OverlaySettings,
    live: BTreeMap<SurfaceKind, LiveSurface>,
    pending: Option<SurfacePlan>,
    last_state: DetectionState,
    open: bool,
    consecutive_failures: u32,
    suspended: bool,
}

impl OverlayOrchestrator {
    pub fn new(host: Box<dyn SurfaceHost>, settings: OverlaySettings) -> Self {
        Self {
            host,
            settings: settings.clamped(),
            live: BTreeMap::new(),
            pending: None,
            last_state: DetectionState::default(),
            open: false,
            consecutive_failures: 0,
            suspended: false,
        }
    }

    /// Target application came to the foreground: cover the display.
    pub fn on_open(&mut self) {
        self.open = true;
        self.resume();
        self.ensure_mask();
    }

    /// Target application left the foreground: remove everything.
    ///
    /// Runs regardless of suspension; failures are logged only.
    pub fn on_close(&mut self) {
        self.open = false;
        self.pending = None;

        for (kind, surface) in std::mem::take(&mut self.live) {
            match self.host.remove(surface.handle) {
                Ok(()) => tracing::debug!(%kind, "surface removed"),
                Err(err) => {
                    tracing::warn!(%kind, error = %err, "failed to remove surface on close")
                }
            }
        }

        self.last_state = DetectionState::default();
        self.consecutive_failures = 0;
        self.suspended = false;
        tracing::info!("all surfaces removed");
    }

    /// Bring the live surface set in line with `state`.
    ///
    /// Removals happen now. Missing surfaces are created now if a mask is
    /// already up; otherwise the mask goes up and the caller completes the
    /// transition later. Lifts a failure suspension.
    pub fn reconcile(&mut self, state: &DetectionState) -> ReconcileOutcome {
        self.resume();
        self.last_state = state.normalized();
        let plan = plan_surfaces(&self.last_state, &self.settings, self.host.display());

        let stale: Vec<SurfaceKind> = self
            .live
            .iter()
            .filter(|(kind, surface)| {
                **kind != SurfaceKind::Mask && plan.get(*kind) != Some(&surface.spec)
            })
            .map(|(kind, _)| *kind)
            .collect();
        for kind in stale {
            self.remove_surface(kind);
        }

        let missing = self.missing_from(&plan);
        if missing.is_empty() {
            self.pending = None;
            self.remove_surface(SurfaceKind::Mask);
            return ReconcileOutcome::Settled;
        }

        if self.live.contains_key(&SurfaceKind::Mask) {
            self.pending = None;
            self.materialize(&missing);
            self.remove_surface(SurfaceKind::Mask);
            return ReconcileOutcome::Settled;
        }

        self.ensure_mask();
        if self.suspended {
            self.pending = None;
            return ReconcileOutcome::Settled;
        }

        tracing::debug!(
            surfaces = ?missing.keys().collect::<Vec<_>>(),
            "masked transition started"
        );
        self.pending = Some(plan);
        ReconcileOutcome::Transition(TRANSITION)
    }

    /// Create the surfaces planned by the last reconcile and drop the mask.
    ///
    /// Does nothing if no transition is pending.
    pub fn complete_transition(&mut self) {
        let Some(plan) = self.pending.take() else {
            return;
        };
        if self.suspended {
            return;
        }

        let missing = self.missing_from(&plan);
        self.materialize(&missing);
        self.remove_surface(SurfaceKind::Mask);
        tracing::debug!("masked transition completed");
    }

    /// Back control appeared: drop both bands without waiting for a reconcile.
    pub fn on_back_button_detected(&mut self) {
        self.last_state.back_button_visible = true;

        if let Some(plan) = self.pending.as_mut() {
            plan.remove(&SurfaceKind::FeedBand);
            plan.remove(&SurfaceKind::SearchBand);
            if plan.is_empty() {
                self.pending = None;
                self.remove_surface(SurfaceKind::Mask);
            }
        }

        self.remove_surface(SurfaceKind::FeedBand);
        self.remove_surface(SurfaceKind::SearchBand);
    }

    /// Apply new margins to future reconciles. Returns whether they changed.
    pub fn update_settings(&mut self, settings: OverlaySettings) -> bool {
        let settings = settings.clamped();
        if settings == self.settings {
            return false;
        }
        tracing::info!(
            top_feed = settings.top_margin_feed,
            top_search = settings.top_margin_search,
            bottom = settings.bottom_margin,
            "overlay settings updated"
        );
        self.settings = settings;
        true
    }

    pub fn settings(&self) -> OverlaySettings {
        self.settings
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    pub fn has_pending_transition(&self) -> bool {
        self.pending.is_some()
    }

    /// True if a feed or search band would be affected by a margin change.
    pub fn bands_relevant(&self) -> bool {
        self.live.keys().any(SurfaceKind::is_band)
            || self.last_state.in_feed_tab
            || self.last_state.in_search_tab
    }

    /// Kinds currently shown, sorted.
    pub fn live_kinds(&self) -> Vec<SurfaceKind> {
        self.live.keys().copied().collect()
    }

    pub fn summary(&self) -> BlockingSummary {
        BlockingSummary {
            open: self.open,
            context: self.last_state.context(),
            surfaces: self.live_kinds(),
            suspended: self.suspended,
            back_button_visible: self.last_state.back_button_visible,
            keyboard_active_in_search: self.last_state.keyboard_active_in_search,
            settings: self.settings,
        }
    }

    fn resume(&mut self) {
        if self.suspended {
            tracing::info!("resuming surface operations");
            self.suspended = false;
            self.consecutive_failures = 0;
        }
    }

    fn missing_from(&self, plan: &SurfacePlan) -> SurfacePlan {
        plan.iter()
            .filter(|(kind, _)| !self.live.contains_key(*kind))
            .map(|(kind, spec)| (*kind, *spec))
            .collect()
    }

    fn materialize(&mut self, plan: &SurfacePlan) {
        for spec in plan.values() {
            self.create_surface(*spec);
        }
    }

    fn ensure_mask(&mut self) {
        if !self.live.contains_key(&SurfaceKind::Mask) {
            let bounds = self.host.display().bounds();
            self.create_surface(OverlaySurfaceSpec::new(SurfaceKind::Mask, bounds));
        }
    }

    fn create_surface(&mut self, spec: OverlaySurfaceSpec) {
        if self.suspended {
            return;
        }
        match self.host.create(&spec) {
            Ok(handle) => {
                tracing::debug!(
                    kind = %spec.kind,
                    geometry = %spec.geometry,
                    %handle,
                    "surface created"
                );
                self.live.insert(spec.kind, LiveSurface { spec, handle });
                self.consecutive_failures = 0;
            }
            Err(err) => self.record_failure(spec.kind, &err),
        }
    }

    /// Removal failures still forget the handle: the host most likely tore
    /// the surface down already.
    fn remove_surface(&mut self, kind: SurfaceKind) {
        if self.suspended {
            return;
        }
        let Some(surface) = self.live.remove(&kind) else {
            return;
        };
        match self.host.remove(surface.handle) {
            Ok(()) => {
                tracing::debug!(%kind, handle = %surface.handle, "surface removed");
                self.consecutive_failures = 0;
            }
            Err(err) => self.record_failure(kind, &err),
        }
    }

    fn record_failure(&mut self, kind: SurfaceKind, err: &OverlayError) {
        self.consecutive_failures += 1;
        tracing::warn!(
            %kind,
            error = %err,
            consecutive = self.consecutive_failures,
            "surface operation failed"
        );
        if self.consecutive_failures >= MAX_CONSECUTIVE_FAILURES {
            self.suspended = true;
            self.pending = None;
            self.drop_mask();
            tracing::warn!("surface operations suspended until next state change");
        }
    }

    /// Take the mask down regardless of suspension; failures are logged only.
    fn drop_mask(&mut self) {
        let Some(mask) = self.live.remove(&SurfaceKind::Mask) else {
            return;
        };
        match self.host.remove(mask.handle) {
            Ok(()) => tracing::debug!(handle = %mask.handle, "mask removed on suspension"),
            Err(err) => tracing::warn!(error = %err, "failed to remove mask on suspension"),
        }
    }
}
