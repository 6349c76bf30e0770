//! Lint worker.
//!
//! Wraps the generic [`Worker`] with the lint protocol. The lint engine
//! itself is an external collaborator supplied through the [`Linter`]
//! trait; the worker only carries text and versions across the thread
//! boundary.

use crate::messages::{LintRequest, LintResponse, Version};
use crate::worker::Worker;
use codedock_core::{Marker, SessionError};

/// The lint engine invoked off-thread.
pub trait Linter: Send + 'static {
    /// Produces markers for the given source text.
    fn lint(&mut self, code: &str) -> Vec<Marker>;
}

impl<F> Linter for F
where
    F: FnMut(&str) -> Vec<Marker> + Send + 'static,
{
    fn lint(&mut self, code: &str) -> Vec<Marker> {
        self(code)
    }
}

/// Off-thread lint worker.
pub struct LintWorker {
    inner: Worker<LintRequest, LintResponse>,
}

impl LintWorker {
    /// Spawns a lint worker running `linter` for every request.
    pub fn spawn<L: Linter>(mut linter: L) -> Self {
        let inner = Worker::spawn("lint-worker", move |request: LintRequest| {
            let markers = linter.lint(&request.code);
            Some(LintResponse {
                markers,
                version: request.version,
            })
        });
        Self { inner }
    }

    /// Posts a lint request carrying the buffer text and the version it
    /// was read at.
    pub fn lint(&self, code: String, version: Version) -> Result<(), SessionError> {
        self.inner.post(LintRequest { code, version })
    }

    /// Tries to receive a lint response (non-blocking).
    pub fn try_recv(&self) -> Option<LintResponse> {
        self.inner.try_recv()
    }

    /// Returns whether the worker thread is running.
    pub fn is_running(&self) -> bool {
        self.inner.is_running()
    }

    /// Terminates the worker. Idempotent.
    pub fn terminate(&self) {
        self.inner.terminate();
    }
}
