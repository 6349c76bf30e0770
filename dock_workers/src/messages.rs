//! Message types for the lint and typings worker protocols.
//!
//! These messages are sent over channels between the session thread and
//! the worker threads. They are serde-serializable so the same shapes can
//! cross a process boundary when a worker is hosted out of process.

use codedock_core::Marker;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Buffer version counter, owned by the widget. Bumped by every content
/// mutation.
pub type Version = u64;

/// Lint request: the full buffer text plus the version it was read at.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LintRequest {
    pub code: String,
    pub version: Version,
}

/// Lint response. `version` echoes the request; the session applies the
/// markers only when it still matches the buffer's current version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LintResponse {
    pub markers: Vec<Marker>,
    pub version: Version,
}

/// Typings fetch request for one package at one version.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypingsRequest {
    /// Package name, already reduced to its package root.
    pub qualifier: String,
    /// Requested package version.
    pub version: String,
}

/// Typings fetch response: declaration text keyed by declaration path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypingsResponse {
    pub qualifier: String,
    pub version: String,
    pub typings: HashMap<String, String>,
}
