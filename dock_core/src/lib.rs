//! Session Core - Shared types and utilities for the session layer.
//!
//! This crate contains the pieces of the session layer that have no
//! dependency on any particular widget: marker and range types, error
//! types, the path-to-language map, the per-path view-state cache, and
//! the layout debouncer.

pub mod debounce;
pub mod error;
pub mod language;
pub mod types;
pub mod view_state;

pub use debounce::Debouncer;
pub use error::SessionError;
pub use language::language_id_from_path;
pub use types::{Marker, MarkerSeverity, Position, Range};
pub use view_state::ViewStateCache;
