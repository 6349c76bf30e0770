//! Typings worker.
//!
//! Fetches ambient type declarations for package dependencies. The
//! transport (registry lookup, network fetch) is an external collaborator
//! supplied through the [`TypingsFetcher`] trait. Typings are best-effort:
//! a failed fetch produces no response and editing continues unaffected.

use crate::messages::{TypingsRequest, TypingsResponse};
use crate::worker::Worker;
use codedock_core::SessionError;
use std::collections::HashMap;

/// Transport resolving ambient declarations for a package version.
pub trait TypingsFetcher: Send + 'static {
    /// Returns declaration text keyed by declaration path, or `None` when
    /// the package's typings are unavailable.
    fn fetch(&mut self, qualifier: &str, version: &str) -> Option<HashMap<String, String>>;
}

impl<F> TypingsFetcher for F
where
    F: FnMut(&str, &str) -> Option<HashMap<String, String>> + Send + 'static,
{
    fn fetch(&mut self, qualifier: &str, version: &str) -> Option<HashMap<String, String>> {
        self(qualifier, version)
    }
}

/// Off-thread typings worker.
pub struct TypingsWorker {
    inner: Worker<TypingsRequest, TypingsResponse>,
}

impl TypingsWorker {
    /// Spawns a typings worker running `fetcher` for every request.
    pub fn spawn<F: TypingsFetcher>(mut fetcher: F) -> Self {
        let inner = Worker::spawn("typings-worker", move |request: TypingsRequest| {
            fetcher
                .fetch(&request.qualifier, &request.version)
                .map(|typings| TypingsResponse {
                    qualifier: request.qualifier,
                    version: request.version,
                    typings,
                })
        });
        Self { inner }
    }

    /// Posts a fetch request for one package at one version.
    pub fn request(&self, qualifier: String, version: String) -> Result<(), SessionError> {
        self.inner.post(TypingsRequest { qualifier, version })
    }

    /// Tries to receive a typings response (non-blocking).
    pub fn try_recv(&self) -> Option<TypingsResponse> {
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

/// Reduces an import qualifier to its package root, so typings are fetched
/// once per package regardless of which internal module was imported.
///
/// Scoped packages keep their scope segment; deep-import suffixes are
/// dropped: `"@scope/pkg/lib/util"` becomes `"@scope/pkg"` and
/// `"lodash/fp/merge"` becomes `"lodash"`. Relative and absolute
/// specifiers are not packages and yield `None`.
pub fn package_root(qualifier: &str) -> Option<&str> {
    let qualifier = qualifier.trim();
    if qualifier.is_empty() || qualifier.starts_with('.') || qualifier.starts_with('/') {
        return None;
    }

    let mut segments = qualifier.split('/');
    if let Some(scope) = qualifier.strip_prefix('@') {
        let scope_len = scope.find('/')?;
        if scope_len == 0 {
            return None;
        }
        let name = segments.nth(1)?;
        if name.is_empty() {
            return None;
        }
        // '@' + scope + '/' + name
        Some(&qualifier[..1 + scope_len + 1 + name.len()])
    } else {
        let name = segments.next()?;
        if name.is_empty() {
            None
        } else {
            Some(name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_package() {
        assert_eq!(package_root("react"), Some("react"));
    }

    #[test]
    fn test_deep_import_drops_suffix() {
        assert_eq!(package_root("lodash/fp/merge"), Some("lodash"));
    }

    #[test]
    fn test_scoped_package() {
        assert_eq!(package_root("@types/react"), Some("@types/react"));
        assert_eq!(package_root("@scope/pkg/lib/util"), Some("@scope/pkg"));
    }

    #[test]
    fn test_invalid_qualifiers() {
        assert_eq!(package_root(""), None);
        assert_eq!(package_root("./local"), None);
        assert_eq!(package_root("/abs/path"), None);
        assert_eq!(package_root("@/x"), None);
        assert_eq!(package_root("@scope"), None);
        assert_eq!(package_root("@scope/"), None);
    }
}
