//! Widget-independent marker types.
//!
//! These are simplified versions of lsp-types for use in the session layer
//! and the worker protocols.

use serde::{Deserialize, Serialize};

/// A position in a text document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    /// Line number (0-indexed).
    pub line: u32,
    /// Column (0-indexed).
    pub character: u32,
}

impl Position {
    pub fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

impl From<lsp_types::Position> for Position {
    fn from(pos: lsp_types::Position) -> Self {
        Self {
            line: pos.line,
            character: pos.character,
        }
    }
}

impl From<Position> for lsp_types::Position {
    fn from(pos: Position) -> Self {
        Self {
            line: pos.line,
            character: pos.character,
        }
    }
}

/// A range in a text document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }
}

impl From<lsp_types::Range> for Range {
    fn from(range: lsp_types::Range) -> Self {
        Self {
            start: range.start.into(),
            end: range.end.into(),
        }
    }
}

impl From<Range> for lsp_types::Range {
    fn from(range: Range) -> Self {
        Self {
            start: range.start.into(),
            end: range.end.into(),
        }
    }
}

/// Marker severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarkerSeverity {
    Error,
    Warning,
    Information,
    Hint,
}

impl From<lsp_types::DiagnosticSeverity> for MarkerSeverity {
    fn from(severity: lsp_types::DiagnosticSeverity) -> Self {
        match severity {
            lsp_types::DiagnosticSeverity::ERROR => Self::Error,
            lsp_types::DiagnosticSeverity::WARNING => Self::Warning,
            lsp_types::DiagnosticSeverity::INFORMATION => Self::Information,
            lsp_types::DiagnosticSeverity::HINT => Self::Hint,
            _ => Self::Information,
        }
    }
}

impl From<MarkerSeverity> for lsp_types::DiagnosticSeverity {
    fn from(severity: MarkerSeverity) -> Self {
        match severity {
            MarkerSeverity::Error => lsp_types::DiagnosticSeverity::ERROR,
            MarkerSeverity::Warning => lsp_types::DiagnosticSeverity::WARNING,
            MarkerSeverity::Information => lsp_types::DiagnosticSeverity::INFORMATION,
            MarkerSeverity::Hint => lsp_types::DiagnosticSeverity::HINT,
        }
    }
}

/// A marker displayed against a buffer (a lint finding, usually).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marker {
    /// Range the marker covers.
    pub range: Range,
    /// Severity of the marker.
    pub severity: MarkerSeverity,
    /// Human-readable message.
    pub message: String,
    /// Diagnostic code, if any.
    pub code: Option<String>,
}

impl Marker {
    pub fn new(range: Range, severity: MarkerSeverity, message: impl Into<String>) -> Self {
        Self {
            range,
            severity,
            message: message.into(),
            code: None,
        }
    }
}

impl From<lsp_types::Diagnostic> for Marker {
    fn from(diag: lsp_types::Diagnostic) -> Self {
        Self {
            range: diag.range.into(),
            severity: diag
                .severity
                .map(Into::into)
                .unwrap_or(MarkerSeverity::Information),
            message: diag.message,
            code: diag.code.map(|c| match c {
                lsp_types::NumberOrString::Number(n) => n.to_string(),
                lsp_types::NumberOrString::String(s) => s,
            }),
        }
    }
}

impl From<Marker> for lsp_types::Diagnostic {
    fn from(marker: Marker) -> Self {
        Self {
            range: marker.range.into(),
            severity: Some(marker.severity.into()),
            message: marker.message,
            code: marker.code.map(lsp_types::NumberOrString::String),
            ..Default::default()
        }
    }
}
