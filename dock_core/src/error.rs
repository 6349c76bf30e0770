//! Error types for the session layer.

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the session layer.
///
/// Stale worker responses are never errors; they are dropped silently by
/// the coordinators.
#[derive(Debug, Error)]
pub enum SessionError {
    /// An operation was attempted against a disposed buffer.
    #[error("buffer is disposed")]
    InvalidBufferState,

    /// A worker was terminated or never started.
    #[error("worker is unavailable")]
    WorkerUnavailable,

    /// A buffer could not be located or constructed for a path. The
    /// previously active buffer remains attached.
    #[error("failed to open buffer for {path}")]
    OpenFailed { path: PathBuf },

    /// The session is not in the `Active` state.
    #[error("session is not mounted")]
    NotMounted,

    /// `mount` was called on a session that is already active.
    #[error("session is already mounted")]
    AlreadyMounted,
}
