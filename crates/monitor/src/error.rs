//! Error types for the monitor handle.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MonitorError {
    /// The event loop has exited; the message was not delivered.
    #[error("monitor loop is not running")]
    Stopped,
}
