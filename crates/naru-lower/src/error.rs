//! Lowering errors
//!
//! Recoverable failures (unresolved references, arity mismatches,
//! missing accessors) never surface here: they degrade to error nodes
//! inside the produced tree. `LowerError` is reserved for internal
//! invariant violations, which abort the whole translation unit.

use naru_frontend::Span;
use thiserror::Error;

/// Result alias for lowering operations.
pub type LowerResult<T> = Result<T, LowerError>;

/// An unrecoverable lowering failure.
#[derive(Debug, Error)]
pub enum LowerError {
    /// A structural invariant did not hold, e.g. a statically required
    /// receiver could not be found. Indicates a bug upstream or in the
    /// engine, not malformed user code.
    #[error("Internal error: {message}")]
    Invariant {
        /// What went wrong.
        message: String,
    },

    /// Expression nesting exceeded the configured depth cap.
    #[error("Lowering recursion depth exceeded (limit {limit})")]
    DepthExceeded {
        /// The configured cap.
        limit: u32,
    },

    /// An invariant failure annotated with the node being lowered and
    /// its source position. Produced once, at the outermost lowering
    /// entry that observed the failure.
    #[error("Internal error while lowering {node} at {file}:{line}:{column}: {source}")]
    Fatal {
        /// Rendering of the frontend node under translation.
        node: String,
        /// Name of the containing file.
        file: String,
        /// 1-based source line.
        line: u32,
        /// 1-based source column.
        column: u32,
        /// The underlying failure.
        #[source]
        source: Box<LowerError>,
    },
}

impl LowerError {
    pub(crate) fn invariant(message: impl Into<String>) -> Self {
        LowerError::Invariant {
            message: message.into(),
        }
    }

    /// Attach node and file context. Errors that already carry context
    /// pass through unchanged, so the innermost failing node wins.
    pub(crate) fn in_context(self, node: String, file: &str, span: Span) -> Self {
        match self {
            LowerError::Fatal { .. } => self,
            other => LowerError::Fatal {
                node,
                file: file.to_string(),
                line: span.line,
                column: span.column,
                source: Box::new(other),
            },
        }
    }

    /// Whether this error has been annotated with node/file context.
    pub fn is_fatal(&self) -> bool {
        matches!(self, LowerError::Fatal { .. })
    }
}
