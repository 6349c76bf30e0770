//! Side-by-side comparison sessions.
//!
//! Drives the widget's diff view with an original/modified buffer pair.
//! Prop-driven content updates replace the pair in one step: both buffers
//! are created first, attached together, and only then are the previous
//! buffers disposed, so the view never shows a half-updated pair. Only
//! the modified pane reports edits upward.

use crate::session::{Phase, SessionEvent};
use crate::widget::{EditorWidget, WidgetEvent, WidgetOptions};
use codedock_core::{Debouncer, SessionError};
use std::time::Instant;

/// Configuration for a diff session.
pub struct DiffOptions {
    pub theme: Option<String>,
    pub widget: WidgetOptions,
    pub layout_debounce: std::time::Duration,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            theme: None,
            widget: WidgetOptions::default(),
            layout_debounce: codedock_core::debounce::DEFAULT_DEBOUNCE_WINDOW,
        }
    }
}

/// A comparison session over one widget's diff view.
pub struct DiffSession<W: EditorWidget> {
    widget: W,
    phase: Phase,
    original: Option<W::Handle>,
    modified: Option<W::Handle>,
    language: Option<String>,
    last_reported: String,
    suppress: bool,
    layout_debounce: Debouncer,
    outbox: Vec<SessionEvent>,
}

impl<W: EditorWidget> DiffSession<W> {
    /// Creates an unmounted diff session around a caller-constructed
    /// widget.
    pub fn new(widget: W, options: DiffOptions) -> Self {
        let mut session = Self {
            widget,
            phase: Phase::Unmounted,
            original: None,
            modified: None,
            language: None,
            last_reported: String::new(),
            suppress: false,
            layout_debounce: Debouncer::new(options.layout_debounce),
            outbox: Vec::new(),
        };
        session.widget.update_options(&options.widget);
        if let Some(theme) = &options.theme {
            session.widget.set_theme(theme);
        }
        session
    }

    /// Mounts the session on an initial original/modified pair.
    pub fn mount(
        &mut self,
        original: &str,
        modified: &str,
        language: Option<&str>,
    ) -> Result<(), SessionError> {
        if self.phase != Phase::Unmounted {
            return Err(SessionError::AlreadyMounted);
        }
        self.phase = Phase::Mounting;
        match self.create_pair(original, modified, language) {
            Ok(()) => {
                self.widget.take_events();
                self.language = language.map(str::to_string);
                self.last_reported = modified.to_string();
                self.phase = Phase::Active;
                Ok(())
            }
            Err(e) => {
                self.phase = Phase::Unmounted;
                Err(e)
            }
        }
    }

    fn create_pair(
        &mut self,
        original: &str,
        modified: &str,
        language: Option<&str>,
    ) -> Result<(), SessionError> {
        // Diff panes are keyed by content, not by path.
        let original_handle = self.widget.create_buffer(None, original, language)?;
        let modified_handle = match self.widget.create_buffer(None, modified, language) {
            Ok(handle) => handle,
            Err(e) => {
                self.widget.dispose_buffer(original_handle);
                return Err(e);
            }
        };
        self.widget.attach_pair(original_handle, modified_handle);
        if let Some(old) = self.original.replace(original_handle) {
            self.widget.dispose_buffer(old);
        }
        if let Some(old) = self.modified.replace(modified_handle) {
            self.widget.dispose_buffer(old);
        }
        Ok(())
    }

    fn require_active(&self) -> Result<(W::Handle, W::Handle), SessionError> {
        if self.phase != Phase::Active {
            return Err(SessionError::NotMounted);
        }
        match (self.original, self.modified) {
            (Some(original), Some(modified)) => Ok((original, modified)),
            _ => Err(SessionError::NotMounted),
        }
    }

    /// Applies a prop-driven content update. No-op when both sides
    /// already match; otherwise the whole pair is replaced, attached as a
    /// unit, and the previous buffers disposed afterwards. Never reported
    /// back as a change event.
    pub fn set_contents(&mut self, original: &str, modified: &str) -> Result<(), SessionError> {
        let (original_handle, modified_handle) = self.require_active()?;
        if self.widget.content(original_handle)? == original
            && self.widget.content(modified_handle)? == modified
        {
            return Ok(());
        }

        self.collect_widget_events();
        self.suppress = true;
        let result = self.create_pair(original, modified, self.language.clone().as_deref());
        self.collect_widget_events();
        self.suppress = false;
        result?;
        self.last_reported = modified.to_string();
        Ok(())
    }

    /// Retags both panes with a new language.
    pub fn set_language(&mut self, language: &str) -> Result<(), SessionError> {
        let (original, modified) = self.require_active()?;
        self.widget.set_language(original, language)?;
        self.widget.set_language(modified, language)?;
        self.language = Some(language.to_string());
        Ok(())
    }

    /// Applies display options. Idempotent.
    pub fn set_options(&mut self, options: &WidgetOptions) {
        self.widget.update_options(options);
    }

    /// Applies a theme. Idempotent.
    pub fn set_theme(&mut self, theme: &str) {
        self.widget.set_theme(theme);
    }

    /// Records a dimension change, debounced like the single-pane
    /// session.
    pub fn resize(&mut self, now: Instant) {
        if self.phase != Phase::Active {
            return;
        }
        if self.layout_debounce.request(now) {
            self.widget.layout();
        }
    }

    /// Drains widget events. Only edits to the modified pane are
    /// reported.
    pub fn pump(&mut self, now: Instant) -> Vec<SessionEvent> {
        if self.phase != Phase::Active {
            return Vec::new();
        }
        if self.layout_debounce.poll(now) {
            self.widget.layout();
        }
        self.collect_widget_events();
        std::mem::take(&mut self.outbox)
    }

    fn collect_widget_events(&mut self) {
        for event in self.widget.take_events() {
            match event {
                WidgetEvent::ContentChanged { handle, .. } => {
                    if self.suppress || Some(handle) != self.modified {
                        continue;
                    }
                    let Ok(content) = self.widget.content(handle) else {
                        continue;
                    };
                    if content != self.last_reported {
                        self.last_reported = content.clone();
                        self.outbox.push(SessionEvent::ContentChanged { content });
                    }
                }
                WidgetEvent::OpenRequested { path } => {
                    self.outbox.push(SessionEvent::OpenRequested { path });
                }
            }
        }
    }

    /// Returns the modified pane's current content.
    pub fn modified_value(&self) -> Result<String, SessionError> {
        let (_, modified) = self.require_active()?;
        self.widget.content(modified)
    }

    /// Returns the original pane's current content.
    pub fn original_value(&self) -> Result<String, SessionError> {
        let (original, _) = self.require_active()?;
        self.widget.content(original)
    }

    pub fn is_active(&self) -> bool {
        self.phase == Phase::Active
    }

    pub fn widget(&self) -> &W {
        &self.widget
    }

    pub fn widget_mut(&mut self) -> &mut W {
        &mut self.widget
    }

    /// Tears the session down. Idempotent and safe on a never-mounted
    /// session.
    pub fn unmount(&mut self) {
        if matches!(self.phase, Phase::Unmounting) {
            return;
        }
        self.phase = Phase::Unmounting;
        self.widget.dispose();
        self.original = None;
        self.modified = None;
        self.outbox.clear();
        self.phase = Phase::Unmounted;
    }
}

impl<W: EditorWidget> Drop for DiffSession<W> {
    fn drop(&mut self) {
        self.unmount();
    }
}
