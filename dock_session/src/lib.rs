//! Session layer - multi-document editing sessions for CodeDock.
//!
//! This crate drives an opaque text-editing widget from externally
//! controlled path/value inputs: one buffer per path, view state carried
//! across switches, self-inflicted change events suppressed, and lint
//! and typings workers attached as side-channels. [`MemoryWidget`] is a
//! rope-backed implementation of the widget contract for tests and
//! headless use.

pub mod diagnostics;
pub mod diff;
pub mod mem;
pub mod registry;
pub mod session;
pub mod typings;
pub mod widget;

pub use diagnostics::DiagnosticsCoordinator;
pub use diff::{DiffOptions, DiffSession};
pub use mem::{MemHandle, MemViewState, MemoryWidget};
pub use registry::ModelRegistry;
pub use session::{ResourceOpener, Session, SessionEvent, SessionOptions};
pub use typings::TypingsCoordinator;
pub use widget::{AmbientLibHandle, EditorWidget, WidgetEvent, WidgetOptions};
