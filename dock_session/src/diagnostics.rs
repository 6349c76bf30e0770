//! Versioned lint coordination.
//!
//! Dispatches buffer text to the lint worker and applies responses back to
//! the widget, gated on the buffer version. Responses carry no ordering
//! guarantee relative to edits: a result computed against a superseded
//! version is dropped, never surfaced as an error.

use crate::widget::EditorWidget;
use codedock_workers::LintWorker;
use std::collections::HashSet;

/// Marker source tag for lint findings.
const MARKER_SOURCE: &str = "lint";

/// Coordinates the lint worker for one session.
pub struct DiagnosticsCoordinator {
    worker: Option<LintWorker>,
    languages: HashSet<String>,
}

impl DiagnosticsCoordinator {
    /// Creates a coordinator linting buffers whose language is in
    /// `languages`. Without a worker every call is a no-op.
    pub fn new(languages: HashSet<String>) -> Self {
        Self {
            worker: None,
            languages,
        }
    }

    /// Installs the lint worker.
    pub fn set_worker(&mut self, worker: LintWorker) {
        self.worker = Some(worker);
    }

    fn eligible(&self, language: Option<&str>) -> bool {
        language.map_or(false, |l| self.languages.contains(l))
    }

    /// Dispatches a lint job for a buffer. Clears the displayed markers
    /// immediately so stale findings never outlive the edit that
    /// invalidated them, even though they may briefly be empty.
    pub fn request<W: EditorWidget>(
        &mut self,
        widget: &mut W,
        handle: W::Handle,
        language: Option<&str>,
        code: &str,
        version: u64,
    ) {
        if !self.eligible(language) {
            return;
        }
        if widget.set_markers(handle, MARKER_SOURCE, Vec::new()).is_err() {
            return;
        }
        let Some(worker) = &self.worker else {
            return;
        };
        if let Err(e) = worker.lint(code.to_string(), version) {
            // Diagnostics are strictly additive; editing continues.
            log::warn!("lint dispatch failed: {}", e);
        }
    }

    /// Applies pending lint responses to the buffer, dropping any whose
    /// version no longer matches.
    pub fn pump<W: EditorWidget>(&mut self, widget: &mut W, handle: W::Handle) {
        let Some(worker) = &self.worker else {
            return;
        };
        while let Some(response) = worker.try_recv() {
            match widget.version(handle) {
                Ok(version) if version == response.version => {
                    let _ = widget.set_markers(handle, MARKER_SOURCE, response.markers);
                }
                _ => {
                    log::trace!("dropping stale lint response for version {}", response.version);
                }
            }
        }
    }

    /// Terminates the worker. Idempotent.
    pub fn shutdown(&mut self) {
        if let Some(worker) = self.worker.take() {
            worker.terminate();
        }
    }
}
