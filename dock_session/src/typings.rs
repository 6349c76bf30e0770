//! Ambient-declaration ("typings") coordination.
//!
//! Tracks which package versions have already been requested and pairs
//! every injection with the retraction of the declaration previously
//! injected at the same path, so ambient symbol tables never conflict.

use crate::widget::{AmbientLibHandle, EditorWidget};
use codedock_workers::{package_root, TypingsWorker};
use std::collections::{HashMap, HashSet};

/// Coordinates the typings worker for one session.
pub struct TypingsCoordinator {
    worker: Option<TypingsWorker>,
    requested: HashSet<(String, String)>,
    injected: HashMap<String, AmbientLibHandle>,
}

impl TypingsCoordinator {
    pub fn new() -> Self {
        Self {
            worker: None,
            requested: HashSet::new(),
            injected: HashMap::new(),
        }
    }

    /// Installs the typings worker.
    pub fn set_worker(&mut self, worker: TypingsWorker) {
        self.worker = Some(worker);
    }

    /// Synchronizes the dependency set. Each `(qualifier, version)` pair
    /// is reduced to its package root and fetched at most once per
    /// version; unparseable qualifiers are skipped.
    pub fn sync(&mut self, dependencies: &[(String, String)]) {
        let Some(worker) = &self.worker else {
            return;
        };
        for (qualifier, version) in dependencies {
            let Some(package) = package_root(qualifier) else {
                log::warn!("skipping unparseable typings qualifier {:?}", qualifier);
                continue;
            };
            let key = (package.to_string(), version.clone());
            if self.requested.contains(&key) {
                continue;
            }
            match worker.request(key.0.clone(), key.1.clone()) {
                Ok(()) => {
                    self.requested.insert(key);
                }
                Err(e) => {
                    log::warn!("typings fetch dispatch failed for {}: {}", package, e);
                }
            }
        }
    }

    /// Applies pending typings responses: for every declared path, the
    /// previously injected declaration is retracted before the new one is
    /// injected.
    pub fn pump<W: EditorWidget>(&mut self, widget: &mut W) {
        let Some(worker) = &self.worker else {
            return;
        };
        while let Some(response) = worker.try_recv() {
            log::debug!(
                "injecting typings for {}@{} ({} files)",
                response.qualifier,
                response.version,
                response.typings.len()
            );
            for (path, text) in response.typings {
                if let Some(previous) = self.injected.remove(&path) {
                    widget.remove_ambient_lib(previous);
                }
                let handle = widget.add_ambient_lib(&path, &text);
                self.injected.insert(path, handle);
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

impl Default for TypingsCoordinator {
    fn default() -> Self {
        Self::new()
    }
}
