//! The widget capability contract.
//!
//! The session layer drives an opaque text-editing widget through this
//! trait. Rendering, keybindings, syntax highlighting, and undo-stack
//! internals stay on the widget side; the session only decides which
//! buffer is shown, what it contains, and how the async side-channels
//! attach to it.
//!
//! Change notification is poll-based: the widget queues [`WidgetEvent`]s
//! and the session drains them with [`EditorWidget::take_events`] on every
//! pump.

use codedock_core::{Marker, Range, SessionError};
use std::fmt::Debug;
use std::hash::Hash;
use std::path::{Path, PathBuf};

/// Handle to an injected ambient declaration ("extra lib").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AmbientLibHandle(pub u64);

/// Events queued by the widget and drained by the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetEvent<H> {
    /// An edit (user keystroke or programmatic) mutated a buffer.
    /// `version` is the buffer version after the edit.
    ContentChanged { handle: H, version: u64 },
    /// The widget requests navigation to another file, e.g. from
    /// "go to definition".
    OpenRequested { path: PathBuf },
}

/// Display options forwarded to the widget. Applied idempotently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetOptions {
    pub tab_size: u32,
    pub insert_spaces: bool,
    pub read_only: bool,
    pub word_wrap: bool,
}

impl Default for WidgetOptions {
    fn default() -> Self {
        Self {
            tab_size: 2,
            insert_spaces: true,
            read_only: false,
            word_wrap: false,
        }
    }
}

/// Capability contract of the underlying text-editing widget.
///
/// Buffers are keyed immutably: renaming a path means disposing the old
/// buffer and creating a new one. Content and the monotonically
/// increasing version counter are owned by the widget. All methods taking
/// a handle fail with [`SessionError::InvalidBufferState`] (or report
/// non-liveness) once the buffer is disposed.
pub trait EditorWidget {
    /// Buffer handle. Cheap to copy, stable for the buffer's lifetime.
    type Handle: Copy + Eq + Hash + Debug;
    /// Opaque cursor/selection/scroll snapshot.
    type ViewState: Clone;

    /// Creates a buffer. Diff panes pass `None` for the path.
    fn create_buffer(
        &mut self,
        path: Option<&Path>,
        content: &str,
        language: Option<&str>,
    ) -> Result<Self::Handle, SessionError>;

    /// Disposes a buffer. Idempotent.
    fn dispose_buffer(&mut self, handle: Self::Handle);

    /// Returns whether the buffer is still live.
    fn is_live(&self, handle: Self::Handle) -> bool;

    /// Attaches a buffer as the visible one.
    fn attach(&mut self, handle: Self::Handle);

    /// Attaches an original/modified pair to the diff view. Both panes
    /// switch in one step.
    fn attach_pair(&mut self, original: Self::Handle, modified: Self::Handle);

    /// Returns the currently attached buffer (the modified pane in diff
    /// mode).
    fn active(&self) -> Option<Self::Handle>;

    fn content(&self, handle: Self::Handle) -> Result<String, SessionError>;

    /// Returns the buffer's current version.
    fn version(&self, handle: Self::Handle) -> Result<u64, SessionError>;

    /// Returns the range covering the entire buffer.
    fn full_range(&self, handle: Self::Handle) -> Result<Range, SessionError>;

    /// Replaces `range` with `text` as an edit operation, preserving the
    /// undo stack. The session always prefers this for programmatic
    /// updates.
    fn apply_edit(
        &mut self,
        handle: Self::Handle,
        range: Range,
        text: &str,
    ) -> Result<(), SessionError>;

    /// Replaces the whole buffer value, resetting the undo stack.
    fn replace_value(&mut self, handle: Self::Handle, text: &str) -> Result<(), SessionError>;

    /// Retags the buffer's language.
    fn set_language(&mut self, handle: Self::Handle, language: &str) -> Result<(), SessionError>;

    /// Snapshots cursor/selection/scroll state for the attached buffer.
    fn save_view_state(&self, handle: Self::Handle) -> Option<Self::ViewState>;

    /// Restores a previously saved snapshot.
    fn restore_view_state(&mut self, handle: Self::Handle, state: Self::ViewState);

    /// Replaces the markers shown for `source` on a buffer.
    fn set_markers(
        &mut self,
        handle: Self::Handle,
        source: &str,
        markers: Vec<Marker>,
    ) -> Result<(), SessionError>;

    /// Injects an ambient declaration, returning a handle for later
    /// retraction.
    fn add_ambient_lib(&mut self, path: &str, text: &str) -> AmbientLibHandle;

    /// Retracts a previously injected ambient declaration. Idempotent.
    fn remove_ambient_lib(&mut self, lib: AmbientLibHandle);

    /// Recomputes layout after a dimension change.
    fn layout(&mut self);

    /// Applies display options. Idempotent.
    fn update_options(&mut self, options: &WidgetOptions);

    /// Applies a theme. Idempotent.
    fn set_theme(&mut self, theme: &str);

    /// Moves keyboard focus into the widget.
    fn focus(&mut self);

    /// Disposes the widget instance and every resource it owns.
    /// Idempotent.
    fn dispose(&mut self);

    /// Drains the queued events.
    fn take_events(&mut self) -> Vec<WidgetEvent<Self::Handle>>;
}
