//! Foreground polling state machine.
//!
//! The controller is driven by the caller's timer: each tick feeds it the
//! latest foreground package and it reports edge transitions only.

use crate::limits::{CLOSED_POLL_INTERVAL, MONITORED_PACKAGES, OPEN_POLL_INTERVAL};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Mutable polling session owned by [`PollingController`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollSession {
    pub is_target_foreground: bool,
    pub current_poll_interval_ms: u64,
}

impl Default for PollSession {
    fn default() -> Self {
        Self {
            is_target_foreground: false,
            current_poll_interval_ms: CLOSED_POLL_INTERVAL.as_millis() as u64,
        }
    }
}

/// Edge reported by a tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Opened { package: String },
    Closed,
}

/// Open/close state machine with adaptive cadence.
#[derive(Debug, Clone)]
pub struct PollingController {
    session: PollSession,
    packages: Vec<String>,
    open_interval: Duration,
    closed_interval: Duration,
}

impl Default for PollingController {
    fn default() -> Self {
        Self::new(MONITORED_PACKAGES.iter().copied())
    }
}

impl PollingController {
    pub fn new<I, S>(packages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_intervals(packages, OPEN_POLL_INTERVAL, CLOSED_POLL_INTERVAL)
    }

    pub fn with_intervals<I, S>(
        packages: I,
        open_interval: Duration,
        closed_interval: Duration,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            session: PollSession {
                is_target_foreground: false,
                current_poll_interval_ms: closed_interval.as_millis() as u64,
            },
            packages: packages.into_iter().map(Into::into).collect(),
            open_interval,
            closed_interval,
        }
    }

    pub fn session(&self) -> PollSession {
        self.session
    }

    pub fn is_open(&self) -> bool {
        self.session.is_target_foreground
    }

    /// Delay until the next tick should run.
    pub fn next_interval(&self) -> Duration {
        Duration::from_millis(self.session.current_poll_interval_ms)
    }

    pub fn is_monitored(&self, package: &str) -> bool {
        self.packages.iter().any(|p| p == package)
    }

    /// Process one foreground query result.
    ///
    /// Returns a transition only when the open/closed state flips. The poll
    /// interval for the following tick is updated after the transition.
    pub fn tick(&mut self, foreground: Option<&str>) -> Option<Transition> {
        let matched = foreground.filter(|package| self.is_monitored(package));

        let transition = match (matched, self.session.is_target_foreground) {
            (Some(package), false) => {
                self.session.is_target_foreground = true;
                tracing::info!(package, "target app opened");
                Some(Transition::Opened {
                    package: package.to_string(),
                })
            }
            (None, true) => {
                self.session.is_target_foreground = false;
                tracing::info!(foreground = ?foreground, "target app closed");
                Some(Transition::Closed)
            }
            _ => None,
        };

        let interval = if self.session.is_target_foreground {
            self.open_interval
        } else {
            self.closed_interval
        };
        let interval_ms = interval.as_millis() as u64;
        if interval_ms != self.session.current_poll_interval_ms {
            self.session.current_poll_interval_ms = interval_ms;
            tracing::debug!(interval_ms, "poll interval adjusted");
        }

        transition
    }

    /// Drop back to the initial closed session.
    pub fn reset(&mut self) {
        self.session = PollSession {
            is_target_foreground: false,
            current_poll_interval_ms: self.closed_interval.as_millis() as u64,
        };
    }
}
