//! Per-path view-state cache.
//!
//! Stores the opaque cursor/selection/scroll snapshot produced by the
//! widget, keyed by path. A snapshot is captured immediately before
//! switching away from a path and restored immediately after switching
//! back; an absent entry means "use the widget default".
//!
//! Unbounded by default; across a very long session this grows with the
//! number of distinct paths visited. Callers that care can set a capacity,
//! turning the store into an LRU.

use lru::LruCache;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

/// Key-value store of per-path view states. No async behavior.
pub struct ViewStateCache<S> {
    states: LruCache<PathBuf, S>,
}

impl<S: Clone> ViewStateCache<S> {
    /// Creates an unbounded cache.
    pub fn new() -> Self {
        Self {
            states: LruCache::unbounded(),
        }
    }

    /// Creates a cache that evicts the least-recently-used entry beyond
    /// `capacity`.
    pub fn with_capacity(capacity: NonZeroUsize) -> Self {
        Self {
            states: LruCache::new(capacity),
        }
    }

    /// Stores the view state for a path, replacing any previous entry.
    pub fn capture(&mut self, path: impl Into<PathBuf>, state: S) {
        self.states.put(path.into(), state);
    }

    /// Returns the stored view state for a path, if any.
    pub fn restore(&mut self, path: &Path) -> Option<S> {
        self.states.get(path).cloned()
    }

    /// Evicts the entry for a path. Idempotent.
    pub fn remove(&mut self, path: &Path) -> Option<S> {
        self.states.pop(path)
    }

    /// Moves the entry for `old` to `new`. When `old` has no entry, any
    /// stale entry at `new` is evicted so the new path starts from the
    /// widget default.
    pub fn rename(&mut self, old: &Path, new: impl Into<PathBuf>) {
        match self.states.pop(old) {
            Some(state) => {
                self.states.put(new.into(), state);
            }
            None => {
                self.states.pop(&new.into());
            }
        }
    }

    /// Returns the number of stored entries.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Returns true when no entries are stored.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

impl<S: Clone> Default for ViewStateCache<S> {
    fn default() -> Self {
        Self::new()
    }
}
