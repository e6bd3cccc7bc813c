//! Naru Lowering
//!
//! Translates the resolved, typed frontend tree into backend IR. The
//! center of the crate is call-and-reference lowering: every call-like
//! or reference-like construct (calls, property and field accesses,
//! assignments, annotation invocations, callable references, object
//! qualifiers) becomes the correctly-shaped backend node, with value
//! arguments, type arguments, and receivers bound according to the
//! target's declared shape.
//!
//! Failure handling is two-tiered. Anything caused by the input degrades
//! to an error node carrying a message and the lowered sub-expressions,
//! recorded in the pass diagnostics; only internal invariant violations
//! abort, annotated once with the failing node's rendering and file
//! position.

#![warn(missing_docs)]

mod args;
mod calls;
mod receivers;

pub mod adapt;
pub mod diagnostic;
pub mod error;

pub use adapt::{NoAdaptation, ReferenceAdapter};
pub use diagnostic::{Diagnostic, Diagnostics, JsonDiagnostic};
pub use error::{LowerError, LowerResult};

use naru_frontend::{Declarations, Expr, ExprKind, Interner, Span, TypeContext, TypeId};
use naru_ir as ir;

/// Behavior knobs for a lowering pass.
#[derive(Debug, Clone, Default)]
pub struct LowerOptions {
    /// Abort with a fatal error when expression nesting exceeds this
    /// depth. `None` (the default) disables the check; enable it when
    /// input trees can be adversarially deep.
    pub max_depth: Option<u32>,
}

static NO_ADAPTATION: NoAdaptation = NoAdaptation;

/// The expression-lowering visitor.
///
/// One `Lowerer` translates expressions of a single file against an
/// effectively-immutable view of the declaration tables. Backend nodes
/// and temporaries are freshly allocated per call and owned by the
/// caller; the lowerer keeps only the diagnostics it collected.
pub struct Lowerer<'a> {
    pub(crate) decls: &'a Declarations,
    pub(crate) types: &'a TypeContext,
    pub(crate) interner: &'a Interner,
    pub(crate) adapter: &'a dyn ReferenceAdapter,
    file: String,
    options: LowerOptions,
    diagnostics: Diagnostics,
    next_temp: u32,
    depth: u32,
}

impl<'a> Lowerer<'a> {
    /// Create a lowerer for one file's expressions.
    pub fn new(
        decls: &'a Declarations,
        types: &'a TypeContext,
        interner: &'a Interner,
        file: impl Into<String>,
    ) -> Self {
        Self {
            decls,
            types,
            interner,
            adapter: &NO_ADAPTATION,
            file: file.into(),
            options: LowerOptions::default(),
            diagnostics: Diagnostics::new(),
            next_temp: 0,
            depth: 0,
        }
    }

    /// Install a reference adaptation collaborator.
    pub fn with_adapter(mut self, adapter: &'a dyn ReferenceAdapter) -> Self {
        self.adapter = adapter;
        self
    }

    /// Override the default options.
    pub fn with_options(mut self, options: LowerOptions) -> Self {
        self.options = options;
        self
    }

    /// The diagnostics collected so far.
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Take the collected diagnostics, leaving the lowerer empty.
    pub fn take_diagnostics(&mut self) -> Diagnostics {
        std::mem::take(&mut self.diagnostics)
    }

    /// Lower one expression to a backend node.
    ///
    /// Never fails for malformed input; those cases produce error nodes
    /// inside the result. An `Err` means an internal invariant was
    /// violated and the translation unit cannot continue.
    pub fn lower_expr(&mut self, expr: &Expr) -> LowerResult<ir::Expr> {
        if let Some(limit) = self.options.max_depth {
            if self.depth >= limit {
                return Err(LowerError::DepthExceeded { limit });
            }
        }
        self.depth += 1;
        let result = self.lower_expr_inner(expr);
        self.depth -= 1;
        result.map_err(|err| {
            err.in_context(expr.describe(self.interner), &self.file, expr.span)
        })
    }

    fn lower_expr_inner(&mut self, expr: &Expr) -> LowerResult<ir::Expr> {
        match &expr.kind {
            ExprKind::IntLiteral(value) => Ok(ir::Expr::Const {
                value: ir::Const::Int(*value),
                ty: expr.ty,
            }),
            ExprKind::BoolLiteral(value) => Ok(ir::Expr::Const {
                value: ir::Const::Boolean(*value),
                ty: expr.ty,
            }),
            ExprKind::StringLiteral(sym) => Ok(ir::Expr::Const {
                value: ir::Const::String(self.interner.resolve(*sym).to_string()),
                ty: expr.ty,
            }),
            ExprKind::UnitLiteral => Ok(ir::Expr::Const {
                value: ir::Const::Unit,
                ty: expr.ty,
            }),
            ExprKind::Lambda { function } => Ok(ir::Expr::FunctionExpr {
                function: *function,
                ty: expr.ty,
            }),
            ExprKind::Access(access) => self.lower_access(access, expr.ty, expr.span),
            ExprKind::Call(call) => self.lower_call(call, expr.ty, expr.span),
            ExprKind::Assignment(assign) => self.lower_assignment(assign, expr.ty, expr.span),
            ExprKind::AnnotationCall(ann) => self.lower_annotation_call(ann, expr.ty, expr.span),
            ExprKind::CallableRef(cref) => {
                self.lower_callable_reference(cref, expr.ty, expr.span)
            }
            ExprKind::Qualifier(qualifier) => self
                .lower_object_qualifier(qualifier, calls::QualifierMode::Normal, expr.ty)
                .ok_or_else(|| {
                    LowerError::invariant("object qualifier produced no result outside reference mode")
                }),
            // `super` in value position evaluates to the enclosing
            // instance it dispatches on.
            ExprKind::Super(superref) => self.lower_expr(&superref.instance),
        }
    }

    /// Declare a fresh single-assignment temporary holding `init`,
    /// named after `hint` for debuggability.
    pub(crate) fn declare_temporary(&mut self, hint: &str, init: ir::Expr) -> ir::LocalVar {
        let id = ir::TempId::new(self.next_temp);
        self.next_temp += 1;
        ir::LocalVar {
            id,
            name: format!("tmp{}_{}", id.as_u32(), hint),
            ty: init.ty(),
            init,
        }
    }

    /// Build an error node and record the matching diagnostic.
    pub(crate) fn error_call(&mut self, message: String, ty: TypeId, span: Span) -> ir::ErrorCall {
        self.diagnostics.report(message.clone(), span);
        ir::ErrorCall::new(message, ty)
    }
}
