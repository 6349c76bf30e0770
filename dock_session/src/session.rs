//! The session controller.
//!
//! Owns one widget instance and mediates all reads and writes between the
//! externally controlled value/path props and the widget: one active
//! buffer at a time, per-path view state across switches, suppression of
//! self-inflicted change events, and the lint/typings side-channels.
//!
//! The controller is poll-driven: callers forward prop changes through the
//! setters and call [`Session::pump`] from their event loop to drain
//! widget events and worker responses.

use crate::diagnostics::DiagnosticsCoordinator;
use crate::registry::ModelRegistry;
use crate::typings::TypingsCoordinator;
use crate::widget::{EditorWidget, WidgetEvent, WidgetOptions};
use codedock_core::{language_id_from_path, Debouncer, SessionError};
use codedock_workers::{LintWorker, TypingsWorker};
use std::collections::HashSet;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Injected capability for handling widget navigation requests, replacing
/// global service mutation with an explicit interface.
pub trait ResourceOpener {
    fn open_path(&mut self, path: &Path);
}

/// Session lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Phase {
    Unmounted,
    Mounting,
    Active,
    Unmounting,
}

/// Events reported upward to the controlling caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A user-originated edit changed the active buffer's content.
    /// Never fired for prop-driven writes.
    ContentChanged { content: String },
    /// The widget requested navigation to another file and no
    /// [`ResourceOpener`] is installed.
    OpenRequested { path: PathBuf },
}

/// Session configuration.
pub struct SessionOptions {
    /// Initial theme, if any.
    pub theme: Option<String>,
    /// Display options forwarded to the widget.
    pub widget: WidgetOptions,
    /// Languages eligible for linting.
    pub lint_languages: HashSet<String>,
    /// Coalescing window for layout recomputes on resize.
    pub layout_debounce: Duration,
    /// Optional cap on the view-state cache; unbounded when `None`.
    pub view_state_capacity: Option<NonZeroUsize>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            theme: None,
            widget: WidgetOptions::default(),
            lint_languages: HashSet::from(["javascript".to_string()]),
            layout_debounce: codedock_core::debounce::DEFAULT_DEBOUNCE_WINDOW,
            view_state_capacity: None,
        }
    }
}

/// A multi-document editing session over one widget instance.
pub struct Session<W: EditorWidget> {
    widget: W,
    registry: ModelRegistry<W>,
    diagnostics: DiagnosticsCoordinator,
    typings: TypingsCoordinator,
    opener: Option<Box<dyn ResourceOpener>>,
    phase: Phase,
    path: PathBuf,
    language: Option<String>,
    active: Option<W::Handle>,
    /// Last value reported upward; change events matching it are not
    /// re-reported.
    last_reported: String,
    /// True only while the session itself is writing into the widget.
    suppress: bool,
    layout_debounce: Debouncer,
    outbox: Vec<SessionEvent>,
}

impl<W: EditorWidget> Session<W> {
    /// Creates an unmounted session around a caller-constructed widget.
    pub fn new(widget: W, options: SessionOptions) -> Self {
        let registry = match options.view_state_capacity {
            Some(capacity) => ModelRegistry::with_view_state_capacity(capacity),
            None => ModelRegistry::new(),
        };
        let mut session = Self {
            widget,
            registry,
            diagnostics: DiagnosticsCoordinator::new(options.lint_languages),
            typings: TypingsCoordinator::new(),
            opener: None,
            phase: Phase::Unmounted,
            path: PathBuf::new(),
            language: None,
            active: None,
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

    /// Installs the lint worker. Without one, diagnostics are no-ops.
    pub fn set_lint_worker(&mut self, worker: LintWorker) {
        self.diagnostics.set_worker(worker);
    }

    /// Installs the typings worker. Without one, typings are no-ops.
    pub fn set_typings_worker(&mut self, worker: TypingsWorker) {
        self.typings.set_worker(worker);
    }

    /// Installs the navigation capability. Without one, navigation
    /// requests surface as [`SessionEvent::OpenRequested`].
    pub fn set_opener(&mut self, opener: Box<dyn ResourceOpener>) {
        self.opener = Some(opener);
    }

    /// Mounts the session on an initial path and value.
    pub fn mount(&mut self, path: impl Into<PathBuf>, value: &str) -> Result<(), SessionError> {
        if self.phase != Phase::Unmounted {
            return Err(SessionError::AlreadyMounted);
        }
        self.phase = Phase::Mounting;
        let path = path.into();
        let language = language_id_from_path(&path).map(str::to_string);

        let handle = match self
            .registry
            .open(&mut self.widget, &path, value, language.as_deref())
        {
            Ok(handle) => handle,
            Err(e) => {
                self.phase = Phase::Unmounted;
                return Err(e);
            }
        };

        self.widget.attach(handle);
        self.widget.focus();
        // Buffer creation is not a user edit.
        self.widget.take_events();

        self.active = Some(handle);
        self.path = path;
        self.language = language;
        self.last_reported = value.to_string();
        self.phase = Phase::Active;
        log::info!("session mounted on {}", self.path.display());
        Ok(())
    }

    fn active_handle(&self) -> Result<W::Handle, SessionError> {
        if self.phase != Phase::Active {
            return Err(SessionError::NotMounted);
        }
        self.active.ok_or(SessionError::NotMounted)
    }

    /// Applies a prop-driven value change to the active buffer. No-op when
    /// the buffer already holds `value`; otherwise the content is replaced
    /// through a full-range edit under suppression, so no change event is
    /// reported back to the caller.
    pub fn set_value(&mut self, value: &str) -> Result<(), SessionError> {
        let handle = self.active_handle()?;
        if self.widget.content(handle)? == value {
            return Ok(());
        }

        // Drain anything the user did before this write first.
        self.collect_widget_events();

        self.suppress = true;
        let result = self
            .widget
            .full_range(handle)
            .and_then(|range| self.widget.apply_edit(handle, range, value));
        self.collect_widget_events();
        self.suppress = false;
        result?;

        self.last_reported = value.to_string();
        Ok(())
    }

    /// Switches the session to another path. The old path's view state is
    /// captured first and the new path's view state, if previously
    /// captured, is restored after attach. On failure the previously
    /// active buffer remains attached.
    pub fn set_path(&mut self, path: impl Into<PathBuf>, value: &str) -> Result<(), SessionError> {
        let old_handle = self.active_handle()?;
        let path = path.into();
        if path == self.path {
            return self.set_value(value);
        }

        self.collect_widget_events();
        if let Some(state) = self.widget.save_view_state(old_handle) {
            self.registry.capture_view_state(&self.path, state);
        }

        let language = language_id_from_path(&path).map(str::to_string);
        self.suppress = true;
        let opened = self
            .registry
            .open(&mut self.widget, &path, value, language.as_deref());
        let handle = match opened {
            Ok(handle) => handle,
            Err(e) => {
                self.collect_widget_events();
                self.suppress = false;
                return Err(e);
            }
        };

        self.widget.attach(handle);
        if let Some(state) = self.registry.restore_view_state(&path) {
            self.widget.restore_view_state(handle, state);
        }
        self.widget.focus();
        self.collect_widget_events();
        self.suppress = false;

        self.active = Some(handle);
        self.path = path;
        self.language = language;
        self.last_reported = value.to_string();
        Ok(())
    }

    /// Disposes the buffer for a path. Idempotent.
    pub fn remove_path(&mut self, path: &Path) {
        if Some(path) == self.active_path_if_active() {
            log::warn!("removing the active path {}", path.display());
        }
        self.registry.remove(&mut self.widget, path);
    }

    /// Renames a path, carrying its captured view state along. The buffer
    /// is recreated at the new path on the next switch to it.
    pub fn rename_path(&mut self, old: &Path, new: &Path) {
        self.registry.rename(&mut self.widget, old, new);
    }

    fn active_path_if_active(&self) -> Option<&Path> {
        (self.phase == Phase::Active).then_some(self.path.as_path())
    }

    /// Applies display options. Idempotent.
    pub fn set_options(&mut self, options: &WidgetOptions) {
        self.widget.update_options(options);
    }

    /// Applies a theme. Idempotent.
    pub fn set_theme(&mut self, theme: &str) {
        self.widget.set_theme(theme);
    }

    /// Records a dimension change. Layout recomputes are debounced:
    /// leading fire immediately, bursts coalesced into one trailing fire
    /// delivered by [`Session::pump`].
    pub fn resize(&mut self, now: Instant) {
        if self.phase != Phase::Active {
            return;
        }
        if self.layout_debounce.request(now) {
            self.widget.layout();
        }
    }

    /// Synchronizes the dependency set for typings fetches.
    pub fn sync_dependencies(&mut self, dependencies: &[(String, String)]) {
        self.typings.sync(dependencies);
    }

    /// Drains widget events and worker responses. Returns the events to
    /// report upward.
    pub fn pump(&mut self, now: Instant) -> Vec<SessionEvent> {
        if self.phase != Phase::Active {
            return Vec::new();
        }
        if self.layout_debounce.poll(now) {
            self.widget.layout();
        }
        self.collect_widget_events();
        if let Some(handle) = self.active {
            self.diagnostics.pump(&mut self.widget, handle);
        }
        self.typings.pump(&mut self.widget);
        std::mem::take(&mut self.outbox)
    }

    /// Processes queued widget events. Content changes drained while
    /// `suppress` is set were caused by the session's own writes and are
    /// not reported upward (and not re-linted; the prop-driven write is
    /// linted when its own change event would be, on the caller's next
    /// edit or value).
    fn collect_widget_events(&mut self) {
        for event in self.widget.take_events() {
            match event {
                WidgetEvent::ContentChanged { handle, version } => {
                    if self.suppress || Some(handle) != self.active {
                        continue;
                    }
                    let Ok(content) = self.widget.content(handle) else {
                        continue;
                    };
                    if content != self.last_reported {
                        self.last_reported = content.clone();
                        self.outbox.push(SessionEvent::ContentChanged {
                            content: content.clone(),
                        });
                    }
                    self.diagnostics.request(
                        &mut self.widget,
                        handle,
                        self.language.as_deref(),
                        &content,
                        version,
                    );
                }
                WidgetEvent::OpenRequested { path } => match &mut self.opener {
                    Some(opener) => opener.open_path(&path),
                    None => self.outbox.push(SessionEvent::OpenRequested { path }),
                },
            }
        }
    }

    /// Returns the active buffer's current content.
    pub fn value(&self) -> Result<String, SessionError> {
        let handle = self.active_handle()?;
        self.widget.content(handle)
    }

    /// Returns the active path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns whether the session is mounted and active.
    pub fn is_active(&self) -> bool {
        self.phase == Phase::Active
    }

    /// Returns the widget (the mounted-editor access point).
    pub fn widget(&self) -> &W {
        &self.widget
    }

    /// Returns the widget mutably.
    pub fn widget_mut(&mut self) -> &mut W {
        &mut self.widget
    }

    /// Tears the session down: workers first, then the widget. Idempotent
    /// and safe on a never-mounted session; partial teardown never leaks,
    /// since every step is itself idempotent.
    pub fn unmount(&mut self) {
        if matches!(self.phase, Phase::Unmounting) {
            return;
        }
        let was_active = self.phase == Phase::Active;
        self.phase = Phase::Unmounting;
        self.diagnostics.shutdown();
        self.typings.shutdown();
        self.widget.dispose();
        self.active = None;
        self.outbox.clear();
        self.phase = Phase::Unmounted;
        if was_active {
            log::info!("session unmounted");
        }
    }
}

impl<W: EditorWidget> Drop for Session<W> {
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mem::{MemViewState, MemoryWidget};
    use codedock_core::{Marker, MarkerSeverity, Position, Range};
    use codedock_workers::LintWorker;
    use crossbeam_channel::{bounded, Sender};
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use std::thread;

    fn mounted(path: &str, value: &str) -> Session<MemoryWidget> {
        let mut session = Session::new(MemoryWidget::new(), SessionOptions::default());
        session.mount(path, value).unwrap();
        session
    }

    fn now() -> Instant {
        Instant::now()
    }

    #[test]
    fn test_mount_reports_nothing() {
        let mut session = mounted("a.js", "initial");
        assert_eq!(session.pump(now()), Vec::new());
        assert_eq!(session.value().unwrap(), "initial");
    }

    #[test]
    fn test_mount_twice_fails() {
        let mut session = mounted("a.js", "x");
        assert!(matches!(
            session.mount("b.js", "y"),
            Err(SessionError::AlreadyMounted)
        ));
    }

    #[test]
    fn test_prop_driven_value_is_suppressed() {
        let mut session = mounted("a.js", "initial");

        session.set_value("external").unwrap();
        assert_eq!(session.pump(now()), Vec::new());
        assert_eq!(session.value().unwrap(), "external");
    }

    #[test]
    fn test_user_edit_is_reported() {
        let mut session = mounted("a.js", "fn()");

        let handle = session.widget().active().unwrap();
        session.widget_mut().type_text(handle, ";").unwrap();

        let events = session.pump(now());
        assert_eq!(
            events,
            vec![SessionEvent::ContentChanged {
                content: "fn();".to_string()
            }]
        );
        // Reported once, not again on the next pump.
        assert_eq!(session.pump(now()), Vec::new());
    }

    #[test]
    fn test_set_value_equal_to_content_is_noop() {
        let mut session = mounted("a.js", "same");
        let handle = session.widget().active().unwrap();
        let version = session.widget().version(handle).unwrap();

        session.set_value("same").unwrap();
        assert_eq!(session.widget().version(handle).unwrap(), version);
    }

    #[test]
    fn test_path_switch_round_trips_view_state() {
        let mut session = mounted("a.js", "aaa");
        let state = MemViewState {
            cursor: Position::new(5, 2),
            scroll_top: 40,
            ..Default::default()
        };
        session.widget_mut().set_view_state(state.clone());

        session.set_path("b.js", "bbb").unwrap();
        // Fresh path starts from the widget default.
        let b = session.widget().active().unwrap();
        assert_eq!(
            session.widget().save_view_state(b),
            Some(MemViewState::default())
        );

        session.set_path("a.js", "aaa").unwrap();
        let a = session.widget().active().unwrap();
        assert_eq!(session.widget().save_view_state(a), Some(state));
    }

    #[test]
    fn test_path_switch_keeps_buffers_alive() {
        let mut session = mounted("a.js", "aaa");
        session.set_path("b.js", "bbb").unwrap();

        assert_eq!(session.widget().live_buffer_count(), 2);
        assert_eq!(session.value().unwrap(), "bbb");

        session.set_path("a.js", "aaa").unwrap();
        assert_eq!(session.value().unwrap(), "aaa");
        // No change events from switching around.
        assert_eq!(session.pump(now()), Vec::new());
        // Focus follows every attach: once on mount, once per switch.
        assert_eq!(session.widget().focus_calls(), 3);
    }

    #[test]
    fn test_rename_carries_view_state_and_evicts_old_path() {
        let mut session = mounted("a.js", "aaa");
        let state = MemViewState {
            cursor: Position::new(9, 1),
            ..Default::default()
        };
        session.widget_mut().set_view_state(state.clone());
        // Switching away captures a.js's state.
        session.set_path("scratch.js", "").unwrap();

        session.rename_path(Path::new("a.js"), Path::new("b.js"));

        session.set_path("b.js", "aaa").unwrap();
        let b = session.widget().active().unwrap();
        assert_eq!(session.widget().save_view_state(b), Some(state));

        // The old path opens as a fresh buffer with default view state.
        session.set_path("a.js", "fresh").unwrap();
        let a = session.widget().active().unwrap();
        assert_eq!(
            session.widget().save_view_state(a),
            Some(MemViewState::default())
        );
    }

    #[test]
    fn test_unmount_is_idempotent() {
        let mut session = mounted("a.js", "x");
        session.unmount();
        session.unmount();
        assert_eq!(session.widget().dispose_calls(), 1);
        assert!(session.widget().is_disposed());
        assert!(!session.is_active());
    }

    #[test]
    fn test_unmount_without_mount_is_safe() {
        let mut session = Session::new(MemoryWidget::new(), SessionOptions::default());
        session.unmount();
        assert!(matches!(session.value(), Err(SessionError::NotMounted)));
    }

    #[test]
    fn test_theme_and_options_forwarded() {
        let options = SessionOptions {
            theme: Some("dark".to_string()),
            widget: WidgetOptions {
                tab_size: 4,
                ..Default::default()
            },
            ..Default::default()
        };
        let mut session = Session::new(MemoryWidget::new(), options);
        assert_eq!(session.widget().theme(), Some("dark"));
        assert_eq!(session.widget().options().tab_size, 4);

        session.set_theme("light");
        session.set_options(&WidgetOptions {
            read_only: true,
            ..Default::default()
        });
        assert_eq!(session.widget().theme(), Some("light"));
        assert!(session.widget().options().read_only);
    }

    #[test]
    fn test_resize_debounces_layout() {
        let mut session = mounted("a.js", "x");
        let t0 = now();
        let before = session.widget().layout_calls();

        session.resize(t0);
        session.resize(t0 + Duration::from_millis(10));
        session.resize(t0 + Duration::from_millis(20));
        assert_eq!(session.widget().layout_calls(), before + 1);

        session.pump(t0 + Duration::from_millis(120));
        assert_eq!(session.widget().layout_calls(), before + 2);
    }

    #[test]
    fn test_open_request_surfaces_without_opener() {
        let mut session = mounted("a.js", "x");
        session.widget_mut().push_open_request("lib/util.js");

        assert_eq!(
            session.pump(now()),
            vec![SessionEvent::OpenRequested {
                path: PathBuf::from("lib/util.js")
            }]
        );
    }

    #[test]
    fn test_open_request_routed_to_opener() {
        struct Recorder(Arc<Mutex<Vec<PathBuf>>>);
        impl ResourceOpener for Recorder {
            fn open_path(&mut self, path: &Path) {
                self.0.lock().unwrap().push(path.to_path_buf());
            }
        }

        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut session = mounted("a.js", "x");
        session.set_opener(Box::new(Recorder(seen.clone())));
        session.widget_mut().push_open_request("lib/util.js");

        assert_eq!(session.pump(now()), Vec::new());
        assert_eq!(seen.lock().unwrap().as_slice(), &[PathBuf::from("lib/util.js")]);
    }

    #[test]
    fn test_sync_dependencies_injects_typings() {
        let mut session = mounted("a.js", "x");
        session.set_typings_worker(TypingsWorker::spawn(
            |qualifier: &str, version: &str| {
                let mut map = HashMap::new();
                map.insert(
                    format!("/{}/index.d.ts", qualifier),
                    format!("// {} {}", qualifier, version),
                );
                Some(map)
            },
        ));

        // Deep import reduces to the package root before fetching.
        session.sync_dependencies(&[("lodash/fp/merge".to_string(), "4.17.0".to_string())]);

        let deadline = Instant::now() + Duration::from_secs(2);
        while session.widget().ambient_lib_count() == 0 {
            assert!(Instant::now() < deadline, "typings never injected");
            session.pump(Instant::now());
            thread::sleep(Duration::from_millis(2));
        }
        assert_eq!(session.widget().ambient_lib_count(), 1);
        assert_eq!(
            session.widget().lib_ops(),
            &[crate::mem::LibOp::Added("/lodash/index.d.ts".to_string())]
        );
    }

    /// Lint engine that blocks until the test releases it, so response
    /// timing is controlled from the test body.
    struct GatedLinter {
        gate: crossbeam_channel::Receiver<()>,
    }

    impl codedock_workers::Linter for GatedLinter {
        fn lint(&mut self, code: &str) -> Vec<Marker> {
            let _ = self.gate.recv();
            vec![Marker::new(
                Range::default(),
                MarkerSeverity::Warning,
                format!("lint of {:?}", code),
            )]
        }
    }

    fn gated_lint_session() -> (Session<MemoryWidget>, Sender<()>) {
        let (release, gate) = bounded(16);
        let mut session = mounted("a.js", "v1");
        session.set_lint_worker(LintWorker::spawn(GatedLinter { gate }));
        (session, release)
    }

    fn pump_until_markers(session: &mut Session<MemoryWidget>) -> Vec<Marker> {
        let deadline = Instant::now() + Duration::from_secs(2);
        loop {
            session.pump(Instant::now());
            let handle = session.widget().active().unwrap();
            let markers = session.widget().markers(handle, "lint");
            if !markers.is_empty() {
                return markers.to_vec();
            }
            assert!(Instant::now() < deadline, "markers never applied");
            thread::sleep(Duration::from_millis(2));
        }
    }

    #[test]
    fn test_matching_version_applies_markers() {
        let (mut session, release) = gated_lint_session();
        let handle = session.widget().active().unwrap();

        session.widget_mut().type_text(handle, "!").unwrap();
        session.pump(now());
        release.send(()).unwrap();

        let markers = pump_until_markers(&mut session);
        assert_eq!(markers[0].message, "lint of \"v1!\"");
    }

    #[test]
    fn test_stale_version_response_is_dropped() {
        let (mut session, release) = gated_lint_session();
        let handle = session.widget().active().unwrap();

        // Edit -> lint dispatched for the "v1!" content.
        session.widget_mut().type_text(handle, "!").unwrap();
        session.pump(now());

        // Advance the buffer before the response arrives.
        session.widget_mut().type_text(handle, "?").unwrap();
        session.pump(now());

        // Release both responses. The first is stale and must be dropped;
        // only the second may be displayed.
        release.send(()).unwrap();
        release.send(()).unwrap();

        let markers = pump_until_markers(&mut session);
        assert_eq!(markers[0].message, "lint of \"v1!?\"");

        // Drain any leftovers and confirm the stale result never lands.
        thread::sleep(Duration::from_millis(50));
        session.pump(now());
        let markers = session.widget().markers(handle, "lint").to_vec();
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].message, "lint of \"v1!?\"");
    }

    #[test]
    fn test_lint_skipped_for_ineligible_language() {
        let (release, gate) = bounded(16);
        let mut session = mounted("notes.md", "text");
        session.set_lint_worker(LintWorker::spawn(GatedLinter { gate }));
        let handle = session.widget().active().unwrap();

        session.widget_mut().type_text(handle, "!").unwrap();
        session.pump(now());
        drop(release);

        thread::sleep(Duration::from_millis(50));
        session.pump(now());
        assert!(session.widget().markers(handle, "lint").is_empty());
    }
}
