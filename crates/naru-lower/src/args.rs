//! Argument binding
//!
//! Maps a call site's ordered (and possibly named) argument list onto
//! the target's fixed parameter slots. Handles arity overflow, explicit
//! argument-to-parameter mappings, per-argument conversions, vararg
//! merging, and the side-effect-preserving reordering sequence for
//! non-monotonic mappings.

use crate::error::LowerResult;
use naru_frontend::{Argument, ArgumentMapping, Param, Span, TypeId};
use naru_ir as ir;

/// Which binding rules apply at this call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BindMode {
    /// Ordinary call: reordering temporaries are introduced when the
    /// mapping is non-monotonic.
    Call,
    /// Annotation invocation: arguments are compile-time constants, so
    /// no reordering happens, but unmapped vararg parameters receive an
    /// explicit empty placeholder.
    Annotation,
}

impl<'a> crate::Lowerer<'a> {
    /// Populate `node`'s value-argument slots from `args`.
    ///
    /// Every slot is filled at most once; failures produce an error
    /// node that retains every lowered argument. When reordering is
    /// required the returned node is a block evaluating hoisted
    /// temporaries in source order, with the call in trailing position.
    pub(crate) fn bind_arguments(
        &mut self,
        node: ir::Expr,
        args: &[Argument],
        mapping: Option<&ArgumentMapping>,
        mode: BindMode,
        ty: TypeId,
        span: Span,
    ) -> LowerResult<ir::Expr> {
        // A skeleton that already degraded keeps collecting the
        // arguments for diagnostics.
        let mut node = node;
        if let ir::Expr::ErrorCall(err) = &mut node {
            for arg in args {
                let lowered = self.lower_expr(&arg.value)?;
                err.append_argument(lowered);
            }
            return Ok(node);
        }

        let decls = self.decls;
        let params: &[Param] = match &node {
            ir::Expr::Call(call) => &decls.function(call.function).params,
            ir::Expr::ConstructorCall(call) => &decls.constructor(call.constructor).params,
            // Value and field reads take no arguments.
            _ => {
                if args.is_empty() {
                    return Ok(node);
                }
                let mut err = self.error_call(
                    format!("Cannot bind {} arguments to call with 0 parameters", args.len()),
                    ty,
                    span,
                );
                for arg in args {
                    let lowered = self.lower_expr(&arg.value)?;
                    err.append_argument(lowered);
                }
                return Ok(ir::Expr::ErrorCall(err));
            }
        };

        if args.len() > params.len() {
            let mut err = self.error_call(
                format!(
                    "Cannot bind {} arguments to call with {} parameters",
                    args.len(),
                    params.len()
                ),
                ty,
                span,
            );
            for arg in args {
                let lowered = self.lower_expr(&arg.value)?;
                err.append_argument(lowered);
            }
            return Ok(ir::Expr::ErrorCall(err));
        }

        // Use the resolved mapping when one exists (named arguments or
        // annotation context), otherwise bind strictly by position.
        let positional;
        let pairs: &[(usize, usize)] = match mapping {
            Some(m) => &m.pairs,
            None => {
                positional = (0..args.len()).map(|i| (i, i)).collect::<Vec<_>>();
                &positional
            }
        };

        let needs_reordering =
            mode == BindMode::Call && mapping.is_some_and(ArgumentMapping::needs_reordering);

        // Lower and convert every argument in source order. With
        // reordering in play, anything that could have an observable
        // effect is hoisted into a parameter-named temporary so source
        // evaluation order survives the slot permutation.
        let mut locals: Vec<ir::LocalVar> = Vec::new();
        let mut slot_values: Vec<Vec<(usize, ir::Expr)>> = vec![Vec::new(); params.len()];
        for &(arg_index, param_index) in pairs {
            let arg = &args[arg_index];
            let param = &params[param_index];
            let lowered = self.lower_expr(&arg.value)?;
            let mut converted = self.convert_argument(lowered, arg.value.ty, param.ty);
            if needs_reordering && !converted.has_no_side_effects() {
                let hint = self.interner.resolve(param.name).to_string();
                let local = self.declare_temporary(&hint, converted);
                converted = ir::Expr::GetValue(ir::GetValue {
                    target: ir::ValueRef::Temp(local.id),
                    ty: local.ty,
                    origin: None,
                });
                locals.push(local);
            }
            slot_values[param_index].push((arg_index, converted));
        }

        for (param_index, param) in params.iter().enumerate() {
            let values = std::mem::take(&mut slot_values[param_index]);
            if param.is_vararg {
                if values.is_empty() {
                    if mode == BindMode::Annotation {
                        set_value_argument(
                            &mut node,
                            param_index,
                            ir::Expr::Vararg(ir::Vararg::empty(param.ty)),
                        );
                    }
                    continue;
                }
                let mut vararg = ir::Vararg::empty(param.ty);
                for (arg_index, value) in values {
                    let arg = &args[arg_index];
                    let element = if arg.is_spread {
                        ir::VarargElement::Spread(value)
                    } else if arg.name.is_some() {
                        // Elements supplied in named form contribute as
                        // spread arrays, not scalar appends.
                        ir::VarargElement::NamedElement(value)
                    } else {
                        ir::VarargElement::Element(value)
                    };
                    vararg.elements.push(element);
                }
                set_value_argument(&mut node, param_index, ir::Expr::Vararg(vararg));
            } else {
                debug_assert!(values.len() <= 1, "non-vararg parameter bound twice");
                if let Some((_, value)) = values.into_iter().next() {
                    set_value_argument(&mut node, param_index, value);
                }
            }
        }

        if locals.is_empty() {
            return Ok(node);
        }

        let mut block = ir::Block::new(Some(ir::Origin::ArgumentsReordered), ty);
        for local in locals {
            block.stmts.push(ir::Stmt::Local(local));
        }
        block.stmts.push(ir::Stmt::Expr(node));
        Ok(ir::Expr::Block(block))
    }

    /// Apply per-argument conversions, in fixed order: single-abstract-
    /// method conversion first, then suspend conversion. Vararg element
    /// marking happens at the slot, after both.
    pub(crate) fn convert_argument(
        &mut self,
        lowered: ir::Expr,
        arg_ty: TypeId,
        param_ty: TypeId,
    ) -> ir::Expr {
        let types = self.types;
        let mut expr = lowered;
        if types.class_of(param_ty).is_some() && types.is_function(arg_ty) {
            expr = ir::Expr::TypeOp(ir::TypeOp {
                op: ir::TypeOperator::SamConversion,
                ty: param_ty,
                argument: Box::new(expr),
            });
        }
        if types.is_suspend_function(param_ty)
            && types.is_function(arg_ty)
            && !types.is_suspend_function(arg_ty)
        {
            expr = ir::Expr::TypeOp(ir::TypeOp {
                op: ir::TypeOperator::SuspendConversion,
                ty: param_ty,
                argument: Box::new(expr),
            });
        }
        expr
    }
}

/// Store `value` into a call-like node's argument slot.
fn set_value_argument(node: &mut ir::Expr, index: usize, value: ir::Expr) {
    let slots = match node {
        ir::Expr::Call(call) => &mut call.args,
        ir::Expr::ConstructorCall(call) => &mut call.args,
        _ => return,
    };
    slots[index] = Some(value);
}
