//! Reference adaptation collaborator
//!
//! A callable reference whose target shape does not structurally match
//! the expected functional type (arity or parameter-kind mismatch) must
//! be wrapped in a synthetic adapter function. Building that wrapper is
//! not this crate's job: the engine only asks the collaborator whether
//! adaptation is needed and, if so, hands the whole reference over.

use crate::error::LowerResult;
use crate::Lowerer;
use naru_frontend::{CallableRef, Declarations, Span, TypeContext, TypeId};
use naru_ir as ir;

/// Decides and performs callable-reference adaptation.
pub trait ReferenceAdapter {
    /// Whether `reference` needs a wrapper to conform to its expected
    /// functional type.
    fn needs_adaptation(
        &self,
        reference: &CallableRef,
        decls: &Declarations,
        types: &TypeContext,
    ) -> bool;

    /// Build the adapted expression. Called only when
    /// [`needs_adaptation`](Self::needs_adaptation) answered true; the
    /// engine performs no binding of its own on the result.
    fn adapt(
        &self,
        lowerer: &mut Lowerer<'_>,
        reference: &CallableRef,
        ty: TypeId,
        span: Span,
    ) -> LowerResult<ir::Expr>;
}

/// Default collaborator: references are taken as already conforming.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAdaptation;

impl ReferenceAdapter for NoAdaptation {
    fn needs_adaptation(
        &self,
        _reference: &CallableRef,
        _decls: &Declarations,
        _types: &TypeContext,
    ) -> bool {
        false
    }

    fn adapt(
        &self,
        _lowerer: &mut Lowerer<'_>,
        _reference: &CallableRef,
        _ty: TypeId,
        _span: Span,
    ) -> LowerResult<ir::Expr> {
        Err(crate::error::LowerError::invariant(
            "reference adaptation requested but no adapter is installed",
        ))
    }
}
