//! Diagnostics for recoverable lowering failures
//!
//! Every error node the engine produces is also recorded here, so the
//! driver can render what degraded after the translation finishes:
//! with source context on a terminal, or as JSON for IDE integration.

use codespan_reporting::diagnostic::{Diagnostic as CsDiagnostic, Label};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};
use naru_frontend::Span;
use serde::{Deserialize, Serialize};

/// One recoverable lowering failure, already rendered to a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Human-readable description, identical to the message carried by
    /// the corresponding error node.
    pub message: String,
    /// Source range of the construct that failed to lower.
    pub span: Span,
}

/// The ordered diagnostics one lowering pass produced.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    /// An empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn report(&mut self, message: impl Into<String>, span: Span) {
        self.items.push(Diagnostic {
            message: message.into(),
            span,
        });
    }

    /// Whether the pass produced no diagnostics.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of recorded diagnostics.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// The recorded diagnostics, in production order.
    pub fn items(&self) -> &[Diagnostic] {
        &self.items
    }

    /// Emit every diagnostic to stderr with source context and colors.
    pub fn emit(
        &self,
        file_name: &str,
        source: &str,
    ) -> Result<(), codespan_reporting::files::Error> {
        let mut files = SimpleFiles::new();
        let file_id = files.add(file_name.to_string(), source.to_string());
        let mut writer = StandardStream::stderr(ColorChoice::Auto);
        let config = term::Config::default();
        for item in &self.items {
            let diag = CsDiagnostic::error()
                .with_message(&item.message)
                .with_labels(vec![Label::primary(
                    file_id,
                    item.span.start..item.span.end,
                )]);
            term::emit(&mut writer, &config, &files, &diag)?;
        }
        Ok(())
    }

    /// Render the diagnostics as JSON for IDE integration.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let items: Vec<JsonDiagnostic> = self.items.iter().map(JsonDiagnostic::from).collect();
        serde_json::to_string_pretty(&items)
    }
}

/// JSON representation of one diagnostic.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonDiagnostic {
    /// Severity level; lowering only produces errors.
    pub severity: String,
    /// Human-readable description.
    pub message: String,
    /// Start byte offset into the source.
    pub start: usize,
    /// End byte offset into the source.
    pub end: usize,
    /// 1-based line of the start position.
    pub line: u32,
    /// 1-based column of the start position.
    pub column: u32,
}

impl From<&Diagnostic> for JsonDiagnostic {
    fn from(diag: &Diagnostic) -> Self {
        JsonDiagnostic {
            severity: "error".to_string(),
            message: diag.message.clone(),
            start: diag.span.start,
            end: diag.span.end,
            line: diag.span.line,
            column: diag.span.column,
        }
    }
}
