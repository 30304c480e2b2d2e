//! Diagnostics for LHC.
//!
//! Type errors found while unifying are collected as [`Diagnostic`] values
//! through a [`DiagnosticHandler`] so that one compilation unit can report
//! every failing definition at once. [`DiagnosticRenderer`] prints them in a
//! compact Cargo-like layout; [`explain`] holds the long-form description of
//! each error code.
//!
//! ```ignore
//! let diag = Diagnostic::error("type mismatch: expected `Int`, found `Char`")
//!     .with_code("E0001")
//!     .with_label(span, "type mismatch here");
//! handler.emit(diag);
//! ```

#![warn(missing_docs)]

pub mod explain;

use std::io::Write;

pub use explain::{all_error_codes, format_explanation, get_explanation};
pub use lhc_span::{FileId, FullSpan, SourceFile, Span};
use serde::{Deserialize, Serialize};

/// How serious a diagnostic is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// The checker broke one of its own invariants.
    Bug,
    /// A type error in the checked program.
    Error,
    /// Suspicious but accepted.
    Warning,
    /// Extra context attached to another diagnostic.
    Note,
}

impl Severity {
    /// ANSI color escape for terminal output.
    #[must_use]
    pub fn color(self) -> &'static str {
        match self {
            Self::Bug => "\x1b[1;35m",
            Self::Error => "\x1b[1;31m",
            Self::Warning => "\x1b[1;33m",
            Self::Note => "\x1b[1;36m",
        }
    }

    /// Header label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Bug => "internal compiler error",
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Note => "note",
        }
    }
}

/// A message attached to a source span.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Label {
    /// Where the label points.
    pub span: FullSpan,
    /// What it says.
    pub message: String,
    /// Primary labels mark the location of the error itself.
    pub primary: bool,
}

impl Label {
    /// Create a primary label.
    #[must_use]
    pub fn primary(span: FullSpan, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            primary: true,
        }
    }

    /// Create a secondary label.
    #[must_use]
    pub fn secondary(span: FullSpan, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            primary: false,
        }
    }
}

/// A diagnostic message with source locations and notes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    /// Severity.
    pub severity: Severity,
    /// Headline message.
    pub message: String,
    /// Error code such as `E0001`.
    pub code: Option<String>,
    /// Labelled spans.
    pub labels: Vec<Label>,
    /// Free-form notes printed after the labels.
    pub notes: Vec<String>,
}

impl Diagnostic {
    fn with_severity(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            code: None,
            labels: Vec::new(),
            notes: Vec::new(),
        }
    }

    /// Create an error diagnostic.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::with_severity(Severity::Error, message)
    }

    /// Create a warning diagnostic.
    #[must_use]
    pub fn warning(message: impl Into<String>) -> Self {
        Self::with_severity(Severity::Warning, message)
    }

    /// Create an internal compiler error.
    #[must_use]
    pub fn bug(message: impl Into<String>) -> Self {
        Self::with_severity(Severity::Bug, message)
    }

    /// Attach an error code.
    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Attach a primary label.
    #[must_use]
    pub fn with_label(mut self, span: FullSpan, message: impl Into<String>) -> Self {
        self.labels.push(Label::primary(span, message));
        self
    }

    /// Attach a secondary label.
    #[must_use]
    pub fn with_secondary_label(mut self, span: FullSpan, message: impl Into<String>) -> Self {
        self.labels.push(Label::secondary(span, message));
        self
    }

    /// Attach a note.
    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Returns true for errors and internal compiler errors.
    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self.severity, Severity::Error | Severity::Bug)
    }
}

/// Collects diagnostics for one compilation unit.
#[derive(Debug, Default)]
pub struct DiagnosticHandler {
    diagnostics: Vec<Diagnostic>,
    error_count: usize,
    warning_count: usize,
}

impl DiagnosticHandler {
    /// Create an empty handler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic.
    pub fn emit(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Error | Severity::Bug => self.error_count += 1,
            Severity::Warning => self.warning_count += 1,
            Severity::Note => {}
        }
        self.diagnostics.push(diagnostic);
    }

    /// Returns true if any error was recorded.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    /// Number of errors recorded.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.error_count
    }

    /// Number of warnings recorded.
    #[must_use]
    pub fn warning_count(&self) -> usize {
        self.warning_count
    }

    /// All recorded diagnostics, in emission order.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Drain the recorded diagnostics and reset the counters.
    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        self.error_count = 0;
        self.warning_count = 0;
        std::mem::take(&mut self.diagnostics)
    }
}

/// The files of a compilation unit, indexed by [`FileId`].
#[derive(Debug, Default)]
pub struct SourceMap {
    files: Vec<SourceFile>,
}

impl SourceMap {
    /// Create an empty source map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file and return its id.
    pub fn add_file(&mut self, name: String, src: String) -> FileId {
        #[allow(clippy::cast_possible_truncation)]
        let id = FileId::new(self.files.len() as u32);
        self.files.push(SourceFile::new(id, name, src));
        id
    }

    /// Look up a file.
    #[must_use]
    pub fn get_file(&self, id: FileId) -> Option<&SourceFile> {
        self.files.get(id.0 as usize)
    }
}

/// Renders diagnostics as text.
pub struct DiagnosticRenderer<'a> {
    source_map: &'a SourceMap,
    use_colors: bool,
}

impl<'a> DiagnosticRenderer<'a> {
    /// Create a renderer with colors enabled.
    #[must_use]
    pub fn new(source_map: &'a SourceMap) -> Self {
        Self {
            source_map,
            use_colors: true,
        }
    }

    /// Disable ANSI colors.
    #[must_use]
    pub fn without_colors(mut self) -> Self {
        self.use_colors = false;
        self
    }

    /// Render one diagnostic.
    ///
    /// # Errors
    ///
    /// Propagates write failures from `w`.
    pub fn render(&self, diagnostic: &Diagnostic, w: &mut impl Write) -> std::io::Result<()> {
        let (color, reset) = if self.use_colors {
            (diagnostic.severity.color(), "\x1b[0m")
        } else {
            ("", "")
        };

        write!(w, "{color}{}", diagnostic.severity.label())?;
        if let Some(code) = &diagnostic.code {
            write!(w, "[{code}]")?;
        }
        writeln!(w, "{reset}: {}", diagnostic.message)?;

        for label in &diagnostic.labels {
            let Some(file) = self.source_map.get_file(label.span.file) else {
                continue;
            };
            let loc = file.lookup_line_col(label.span.span.lo);
            let arrow = if label.primary { "-->" } else { "   " };
            writeln!(w, " {arrow} {}:{}:{}", file.name, loc.line, loc.col)?;
            if label.span.span.is_dummy() {
                continue;
            }
            let text = file.source_text(label.span.span);
            writeln!(w, "   |")?;
            writeln!(w, "   | {text}")?;
            writeln!(w, "   | {}", "^".repeat(text.len().max(1)))?;
            if !label.message.is_empty() {
                writeln!(w, "   | {}", label.message)?;
            }
        }

        for note in &diagnostic.notes {
            writeln!(w, " = note: {note}")?;
        }
        writeln!(w)
    }

    /// Render a batch of diagnostics to a string.
    #[must_use]
    pub fn render_to_string(&self, diagnostics: &[Diagnostic]) -> String {
        let mut out = Vec::new();
        for diag in diagnostics {
            // Writing into a Vec cannot fail.
            let _ = self.render(diag, &mut out);
        }
        String::from_utf8_lossy(&out).into_owned()
    }
}
