//! Path-to-buffer registry.
//!
//! Owns the path → handle mapping and the per-path view-state cache for
//! one session. Passive: every operation takes the widget explicitly, and
//! the session consults the registry on each path switch.

use crate::widget::EditorWidget;
use codedock_core::{SessionError, ViewStateCache};
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

/// Manages the buffers of one session, keyed by path.
pub struct ModelRegistry<W: EditorWidget> {
    handles: HashMap<PathBuf, W::Handle>,
    view_states: ViewStateCache<W::ViewState>,
}

impl<W: EditorWidget> ModelRegistry<W> {
    /// Creates a registry with an unbounded view-state cache.
    pub fn new() -> Self {
        Self {
            handles: HashMap::new(),
            view_states: ViewStateCache::new(),
        }
    }

    /// Creates a registry whose view-state cache evicts beyond `capacity`.
    pub fn with_view_state_capacity(capacity: NonZeroUsize) -> Self {
        Self {
            handles: HashMap::new(),
            view_states: ViewStateCache::with_capacity(capacity),
        }
    }

    /// Opens a buffer for `path`. A live buffer gets its content replaced
    /// through a full-range edit (undo history preserved, skipped when the
    /// content is already identical); otherwise a new buffer is created.
    /// A handle disposed out from under the registry is treated as absent
    /// and recreated.
    pub fn open(
        &mut self,
        widget: &mut W,
        path: &Path,
        content: &str,
        language: Option<&str>,
    ) -> Result<W::Handle, SessionError> {
        if let Some(&handle) = self.handles.get(path) {
            if widget.is_live(handle) {
                if widget.content(handle)? != content {
                    let range = widget.full_range(handle)?;
                    widget.apply_edit(handle, range, content)?;
                }
                return Ok(handle);
            }
            log::debug!("buffer for {} was disposed externally, recreating", path.display());
            self.handles.remove(path);
        }

        let handle = widget
            .create_buffer(Some(path), content, language)
            .map_err(|_| SessionError::OpenFailed {
                path: path.to_path_buf(),
            })?;
        self.handles.insert(path.to_path_buf(), handle);
        Ok(handle)
    }

    /// Disposes the buffer for `path` and evicts its view-state entry.
    /// Idempotent.
    pub fn remove(&mut self, widget: &mut W, path: &Path) {
        if let Some(handle) = self.handles.remove(path) {
            if widget.is_live(handle) {
                widget.dispose_buffer(handle);
            }
        }
        self.view_states.remove(path);
    }

    /// Moves the view-state entry from `old` to `new`, then disposes the
    /// buffer at `old`. The buffer is recreated at `new` by the next
    /// [`ModelRegistry::open`].
    pub fn rename(&mut self, widget: &mut W, old: &Path, new: &Path) {
        self.view_states.rename(old, new);
        if let Some(handle) = self.handles.remove(old) {
            if widget.is_live(handle) {
                widget.dispose_buffer(handle);
            }
        }
    }

    /// Returns the registered handle for a path.
    pub fn handle(&self, path: &Path) -> Option<W::Handle> {
        self.handles.get(path).copied()
    }

    /// Returns whether a buffer is registered for `path`.
    pub fn contains(&self, path: &Path) -> bool {
        self.handles.contains_key(path)
    }

    /// Returns the number of registered buffers.
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Stores the view state for a path.
    pub fn capture_view_state(&mut self, path: &Path, state: W::ViewState) {
        self.view_states.capture(path.to_path_buf(), state);
    }

    /// Returns the stored view state for a path, if any.
    pub fn restore_view_state(&mut self, path: &Path) -> Option<W::ViewState> {
        self.view_states.restore(path)
    }

    /// Disposes every registered buffer.
    pub fn clear(&mut self, widget: &mut W) {
        for (_, handle) in self.handles.drain() {
            if widget.is_live(handle) {
                widget.dispose_buffer(handle);
            }
        }
    }
}

impl<W: EditorWidget> Default for ModelRegistry<W> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mem::{MemViewState, MemoryWidget};
    use codedock_core::Position;

    #[test]
    fn test_open_creates_then_reuses() {
        let mut widget = MemoryWidget::new();
        let mut registry = ModelRegistry::new();
        let path = Path::new("a.js");

        let first = registry
            .open(&mut widget, path, "one", Some("javascript"))
            .unwrap();
        let second = registry
            .open(&mut widget, path, "two", Some("javascript"))
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(widget.content(first).unwrap(), "two");
        assert_eq!(widget.live_buffer_count(), 1);
    }

    #[test]
    fn test_open_with_identical_content_skips_edit() {
        let mut widget = MemoryWidget::new();
        let mut registry = ModelRegistry::new();
        let path = Path::new("a.js");

        let handle = registry.open(&mut widget, path, "same", None).unwrap();
        let version = widget.version(handle).unwrap();

        registry.open(&mut widget, path, "same", None).unwrap();
        assert_eq!(widget.version(handle).unwrap(), version);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut widget = MemoryWidget::new();
        let mut registry = ModelRegistry::new();
        let path = Path::new("a.js");

        let handle = registry.open(&mut widget, path, "x", None).unwrap();
        registry.remove(&mut widget, path);
        registry.remove(&mut widget, path);

        assert!(!widget.is_live(handle));
        assert!(!registry.contains(path));
    }

    #[test]
    fn test_externally_disposed_buffer_is_recreated() {
        let mut widget = MemoryWidget::new();
        let mut registry = ModelRegistry::new();
        let path = Path::new("a.js");

        let first = registry.open(&mut widget, path, "x", None).unwrap();
        widget.dispose_buffer(first);

        let second = registry.open(&mut widget, path, "y", None).unwrap();
        assert_ne!(first, second);
        assert_eq!(widget.content(second).unwrap(), "y");
    }

    #[test]
    fn test_rename_moves_view_state_and_disposes_old_buffer() {
        let mut widget = MemoryWidget::new();
        let mut registry = ModelRegistry::new();
        let old = Path::new("a.js");
        let new = Path::new("b.js");

        let handle = registry.open(&mut widget, old, "x", None).unwrap();
        let state = MemViewState {
            cursor: Position::new(2, 5),
            ..Default::default()
        };
        registry.capture_view_state(old, state.clone());

        registry.rename(&mut widget, old, new);

        assert!(!widget.is_live(handle));
        assert!(!registry.contains(old));
        assert_eq!(registry.restore_view_state(old), None);
        assert_eq!(registry.restore_view_state(new), Some(state));
    }
}
