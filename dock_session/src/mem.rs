//! In-memory implementation of the widget contract.
//!
//! Backs each buffer with a rope and queues events the way a real widget
//! would. Used by the test suite and for running a session headless. It
//! implements only what the contract names; rendering, keybindings, and
//! undo live in real widgets.

use crate::widget::{AmbientLibHandle, EditorWidget, WidgetEvent, WidgetOptions};
use codedock_core::{Marker, Position, Range, SessionError};
use ropey::Rope;
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};

/// Buffer handle issued by [`MemoryWidget`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MemHandle(u64);

/// Cursor/selection/scroll snapshot of the memory widget.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemViewState {
    pub cursor: Position,
    pub selection: Range,
    pub scroll_top: u32,
}

/// Ambient-lib bookkeeping entry, ordered, for inspecting
/// retract-before-inject behavior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LibOp {
    Added(String),
    Removed(String),
}

#[derive(Debug)]
struct MemBuffer {
    path: Option<PathBuf>,
    rope: Rope,
    language: Option<String>,
    version: u64,
    live: bool,
}

/// A widget that exists entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryWidget {
    buffers: HashMap<u64, MemBuffer>,
    next_handle: u64,
    next_lib: u64,
    active: Option<MemHandle>,
    pair: Option<(MemHandle, MemHandle)>,
    // One view per widget; switching buffers resets it, like a real
    // editor resetting cursor and scroll on model change.
    current_view: MemViewState,
    events: VecDeque<WidgetEvent<MemHandle>>,
    markers: HashMap<(u64, String), Vec<Marker>>,
    ambient_libs: HashMap<u64, String>,
    lib_ops: Vec<LibOp>,
    options: WidgetOptions,
    theme: Option<String>,
    layout_calls: usize,
    focus_calls: usize,
    dispose_calls: usize,
    disposed: bool,
}

impl MemoryWidget {
    pub fn new() -> Self {
        Self::default()
    }

    fn buffer(&self, handle: MemHandle) -> Result<&MemBuffer, SessionError> {
        self.buffers
            .get(&handle.0)
            .filter(|b| b.live)
            .ok_or(SessionError::InvalidBufferState)
    }

    fn buffer_mut(&mut self, handle: MemHandle) -> Result<&mut MemBuffer, SessionError> {
        self.buffers
            .get_mut(&handle.0)
            .filter(|b| b.live)
            .ok_or(SessionError::InvalidBufferState)
    }

    fn char_index(rope: &Rope, pos: Position) -> usize {
        let line = (pos.line as usize).min(rope.len_lines().saturating_sub(1));
        let line_start = rope.line_to_char(line);
        let line_slice = rope.line(line);
        let mut line_len = line_slice.len_chars();
        if line_len > 0 && line_slice.char(line_len - 1) == '\n' {
            line_len -= 1;
        }
        line_start + (pos.character as usize).min(line_len)
    }

    /// Simulates the user typing `text` at the end of a buffer. Queues a
    /// content-change event like any other edit.
    pub fn type_text(&mut self, handle: MemHandle, text: &str) -> Result<(), SessionError> {
        let buffer = self.buffer_mut(handle)?;
        let end = buffer.rope.len_chars();
        buffer.rope.insert(end, text);
        buffer.version += 1;
        let version = buffer.version;
        self.events
            .push_back(WidgetEvent::ContentChanged { handle, version });
        Ok(())
    }

    /// Simulates the user moving cursor/selection/scroll.
    pub fn set_view_state(&mut self, state: MemViewState) {
        self.current_view = state;
    }

    /// Simulates a "go to definition" navigation request.
    pub fn push_open_request(&mut self, path: impl Into<PathBuf>) {
        self.events
            .push_back(WidgetEvent::OpenRequested { path: path.into() });
    }

    /// Returns the markers currently shown for a source on a buffer.
    pub fn markers(&self, handle: MemHandle, source: &str) -> &[Marker] {
        self.markers
            .get(&(handle.0, source.to_string()))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Returns the injected declaration texts, unordered.
    pub fn ambient_lib_count(&self) -> usize {
        self.ambient_libs.len()
    }

    /// Returns the ordered injection/retraction log.
    pub fn lib_ops(&self) -> &[LibOp] {
        &self.lib_ops
    }

    /// Returns the attached original/modified pair, if any.
    pub fn pair(&self) -> Option<(MemHandle, MemHandle)> {
        self.pair
    }

    pub fn live_buffer_count(&self) -> usize {
        self.buffers.values().filter(|b| b.live).count()
    }

    pub fn layout_calls(&self) -> usize {
        self.layout_calls
    }

    pub fn focus_calls(&self) -> usize {
        self.focus_calls
    }

    pub fn dispose_calls(&self) -> usize {
        self.dispose_calls
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn theme(&self) -> Option<&str> {
        self.theme.as_deref()
    }

    pub fn options(&self) -> &WidgetOptions {
        &self.options
    }

    pub fn language(&self, handle: MemHandle) -> Result<Option<String>, SessionError> {
        Ok(self.buffer(handle)?.language.clone())
    }

    pub fn path(&self, handle: MemHandle) -> Result<Option<PathBuf>, SessionError> {
        Ok(self.buffer(handle)?.path.clone())
    }
}

impl EditorWidget for MemoryWidget {
    type Handle = MemHandle;
    type ViewState = MemViewState;

    fn create_buffer(
        &mut self,
        path: Option<&Path>,
        content: &str,
        language: Option<&str>,
    ) -> Result<Self::Handle, SessionError> {
        if self.disposed {
            return Err(SessionError::InvalidBufferState);
        }
        let handle = MemHandle(self.next_handle);
        self.next_handle += 1;
        self.buffers.insert(
            handle.0,
            MemBuffer {
                path: path.map(Path::to_path_buf),
                rope: Rope::from_str(content),
                language: language.map(str::to_string),
                version: 1,
                live: true,
            },
        );
        Ok(handle)
    }

    fn dispose_buffer(&mut self, handle: Self::Handle) {
        if let Some(buffer) = self.buffers.get_mut(&handle.0) {
            buffer.live = false;
        }
        self.markers.retain(|(h, _), _| *h != handle.0);
        if self.active == Some(handle) {
            self.active = None;
        }
        if let Some((original, modified)) = self.pair {
            if original == handle || modified == handle {
                self.pair = None;
            }
        }
    }

    fn is_live(&self, handle: Self::Handle) -> bool {
        self.buffers.get(&handle.0).map_or(false, |b| b.live)
    }

    fn attach(&mut self, handle: Self::Handle) {
        if self.active != Some(handle) {
            self.active = Some(handle);
            self.current_view = MemViewState::default();
        }
    }

    fn attach_pair(&mut self, original: Self::Handle, modified: Self::Handle) {
        self.pair = Some((original, modified));
        if self.active != Some(modified) {
            self.active = Some(modified);
            self.current_view = MemViewState::default();
        }
    }

    fn active(&self) -> Option<Self::Handle> {
        self.active
    }

    fn content(&self, handle: Self::Handle) -> Result<String, SessionError> {
        Ok(self.buffer(handle)?.rope.to_string())
    }

    fn version(&self, handle: Self::Handle) -> Result<u64, SessionError> {
        Ok(self.buffer(handle)?.version)
    }

    fn full_range(&self, handle: Self::Handle) -> Result<Range, SessionError> {
        let rope = &self.buffer(handle)?.rope;
        let last_line = rope.len_lines().saturating_sub(1);
        let line_slice = rope.line(last_line);
        let mut line_len = line_slice.len_chars();
        if line_len > 0 && line_slice.char(line_len - 1) == '\n' {
            line_len -= 1;
        }
        Ok(Range::new(
            Position::new(0, 0),
            Position::new(last_line as u32, line_len as u32),
        ))
    }

    fn apply_edit(
        &mut self,
        handle: Self::Handle,
        range: Range,
        text: &str,
    ) -> Result<(), SessionError> {
        let buffer = self.buffer_mut(handle)?;
        let start = Self::char_index(&buffer.rope, range.start);
        let end = Self::char_index(&buffer.rope, range.end).max(start);
        if start < end {
            buffer.rope.remove(start..end);
        }
        buffer.rope.insert(start, text);
        buffer.version += 1;
        let version = buffer.version;
        self.events
            .push_back(WidgetEvent::ContentChanged { handle, version });
        Ok(())
    }

    fn replace_value(&mut self, handle: Self::Handle, text: &str) -> Result<(), SessionError> {
        let buffer = self.buffer_mut(handle)?;
        buffer.rope = Rope::from_str(text);
        buffer.version += 1;
        let version = buffer.version;
        self.events
            .push_back(WidgetEvent::ContentChanged { handle, version });
        Ok(())
    }

    fn set_language(&mut self, handle: Self::Handle, language: &str) -> Result<(), SessionError> {
        self.buffer_mut(handle)?.language = Some(language.to_string());
        Ok(())
    }

    fn save_view_state(&self, handle: Self::Handle) -> Option<Self::ViewState> {
        if self.active == Some(handle) {
            Some(self.current_view.clone())
        } else {
            None
        }
    }

    fn restore_view_state(&mut self, handle: Self::Handle, state: Self::ViewState) {
        if self.active == Some(handle) {
            self.current_view = state;
        }
    }

    fn set_markers(
        &mut self,
        handle: Self::Handle,
        source: &str,
        markers: Vec<Marker>,
    ) -> Result<(), SessionError> {
        self.buffer(handle)?;
        self.markers.insert((handle.0, source.to_string()), markers);
        Ok(())
    }

    fn add_ambient_lib(&mut self, path: &str, text: &str) -> AmbientLibHandle {
        let _ = text;
        let handle = AmbientLibHandle(self.next_lib);
        self.next_lib += 1;
        self.ambient_libs.insert(handle.0, path.to_string());
        self.lib_ops.push(LibOp::Added(path.to_string()));
        handle
    }

    fn remove_ambient_lib(&mut self, lib: AmbientLibHandle) {
        if let Some(path) = self.ambient_libs.remove(&lib.0) {
            self.lib_ops.push(LibOp::Removed(path));
        }
    }

    fn layout(&mut self) {
        self.layout_calls += 1;
    }

    fn update_options(&mut self, options: &WidgetOptions) {
        self.options = options.clone();
    }

    fn set_theme(&mut self, theme: &str) {
        self.theme = Some(theme.to_string());
    }

    fn focus(&mut self) {
        self.focus_calls += 1;
    }

    fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.dispose_calls += 1;
        for buffer in self.buffers.values_mut() {
            buffer.live = false;
        }
        self.active = None;
        self.pair = None;
        self.events.clear();
        self.markers.clear();
        self.ambient_libs.clear();
    }

    fn take_events(&mut self) -> Vec<WidgetEvent<Self::Handle>> {
        self.events.drain(..).collect()
    }
}
