//! Error types for overlay surface operations.

use crate::surface::{SurfaceHandle, SurfaceKind};
use thiserror::Error;

/// Errors reported by a [`SurfaceHost`](crate::SurfaceHost).
#[derive(Debug, Error)]
pub enum OverlayError {
    /// The host window manager is gone or not yet attached.
    #[error("surface host unavailable")]
    HostUnavailable,

    /// Missing overlay permission on the platform.
    #[error("overlay permission not granted")]
    PermissionDenied,

    #[error("failed to create {kind} surface: {reason}")]
    CreateFailed { kind: SurfaceKind, reason: String },

    #[error("failed to remove surface {handle}: {reason}")]
    RemoveFailed { handle: SurfaceHandle, reason: String },

    /// The handle does not refer to a live surface.
    #[error("unknown surface {0}")]
    UnknownHandle(SurfaceHandle),
}
