//! Change tracking for detection states.

use crate::state::DetectionState;

/// Outcome of feeding one state to the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Observation {
    /// Some field differs from the previously stored state.
    pub changed: bool,
    /// The back control went from hidden to visible in this observation.
    /// Reported even when `changed` would be coalesced downstream.
    pub back_button_appeared: bool,
}

/// Holds the last published [`DetectionState`] and reports real changes.
///
/// This is the only owner of "previous state"; detection itself is stateless.
#[derive(Debug, Default)]
pub struct DetectionStateTracker {
    previous: DetectionState,
}

impl DetectionStateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `state` if it differs from the previous one. Returns whether it did.
    pub fn update(&mut self, state: DetectionState) -> bool {
        self.observe(state).changed
    }

    /// Like [`update`](Self::update), also reporting the back-control edge.
    pub fn observe(&mut self, state: DetectionState) -> Observation {
        let state = state.normalized();
        let back_button_appeared = state.back_button_visible && !self.previous.back_button_visible;
        let changed = state != self.previous;

        if changed {
            tracing::debug!(
                context = %state.context(),
                back_button_appeared,
                "detection state changed"
            );
            self.previous = state;
        }

        Observation {
            changed,
            back_button_appeared,
        }
    }

    pub fn current(&self) -> &DetectionState {
        &self.previous
    }

    /// Reset to the default state.
    pub fn clear(&mut self) {
        self.previous = DetectionState::default();
    }
}
