//! Receiver binding
//!
//! Populates a node's dispatch and extension receiver slots according
//! to the *target's* declared shape, not the reference's. Receivers
//! written at the call site are lowered once and reused; implicit
//! receivers go through the general visitor; qualifiers go through
//! object-qualifier lowering; `super` receivers additionally compute
//! the super-qualifier class.

use crate::calls::QualifierMode;
use crate::error::{LowerError, LowerResult};
use crate::Lowerer;
use naru_frontend::{
    Access, ClassId, Expr, ExprKind, ReceiverSlot, ResolvedTarget, SuperRef,
};
use naru_ir as ir;

/// Which receiver slot is being bound; only used for error reporting.
#[derive(Debug, Clone, Copy)]
enum ReceiverKind {
    Dispatch,
    Extension,
}

impl ReceiverKind {
    fn name(self) -> &'static str {
        match self {
            ReceiverKind::Dispatch => "dispatch",
            ReceiverKind::Extension => "extension",
        }
    }
}

impl<'a> Lowerer<'a> {
    /// Bind receivers on `node`, reaching through a reordering block to
    /// the real call in trailing position. `callable_ref` permits
    /// unbound receivers.
    pub(crate) fn bind_receivers(
        &mut self,
        mut node: ir::Expr,
        access: &Access,
        callable_ref: bool,
    ) -> LowerResult<ir::Expr> {
        {
            let target_node: &mut ir::Expr = match &mut node {
                ir::Expr::Block(block) => match block.result_mut() {
                    Some(inner) => inner,
                    None => {
                        return Err(LowerError::invariant(
                            "argument-reordering block has no trailing call",
                        ))
                    }
                },
                other => other,
            };
            self.bind_receivers_into(target_node, access, callable_ref)?;
        }
        Ok(node)
    }

    fn bind_receivers_into(
        &mut self,
        node: &mut ir::Expr,
        access: &Access,
        callable_ref: bool,
    ) -> LowerResult<()> {
        // Degraded nodes carry no receiver slots; forcing the shape
        // check on them would turn a diagnostic into an abort.
        if matches!(node, ir::Expr::ErrorCall(_)) {
            return Ok(());
        }

        let (needs_dispatch, needs_extension) = self.receiver_shape(&access.callee.target);

        // The explicit receiver is lowered at most once, however many
        // slots end up reading it.
        let mut explicit_lowered: Option<ir::Expr> = None;

        if needs_dispatch {
            let value = self.receiver_value(
                &access.dispatch_receiver,
                access,
                &mut explicit_lowered,
                callable_ref,
                ReceiverKind::Dispatch,
            )?;
            if let Some(value) = value {
                set_dispatch_receiver(node, value);
            }
        }
        if needs_extension {
            let value = self.receiver_value(
                &access.extension_receiver,
                access,
                &mut explicit_lowered,
                callable_ref,
                ReceiverKind::Extension,
            )?;
            if let Some(value) = value {
                set_extension_receiver(node, value);
            }
        }

        // A `super` receiver pins virtual dispatch to a supertype.
        if let Some(receiver) = access.explicit_receiver.as_deref() {
            if let ExprKind::Super(superref) = &receiver.kind {
                let qualifier = self.super_qualifier_for(superref, &access.callee.target);
                set_super_qualifier(node, qualifier);
            }
        }
        Ok(())
    }

    /// Receiver expectations of the resolved target. Properties follow
    /// their getter when one exists.
    fn receiver_shape(&self, target: &ResolvedTarget) -> (bool, bool) {
        let decls = self.decls;
        match *target {
            ResolvedTarget::Function(fid) => {
                let function = decls.function(fid);
                (
                    function.has_dispatch_receiver(),
                    function.has_extension_receiver(),
                )
            }
            ResolvedTarget::Constructor(_) => (false, false),
            ResolvedTarget::Property(pid) => {
                let property = decls.property(pid);
                match property.getter {
                    Some(getter) => {
                        let accessor = decls.function(getter);
                        (
                            accessor.has_dispatch_receiver(),
                            accessor.has_extension_receiver(),
                        )
                    }
                    None => (
                        property.parent_class.is_some() && !property.is_static,
                        property.extension_receiver.is_some(),
                    ),
                }
            }
            ResolvedTarget::Field(fid) => {
                let field = decls.field(fid);
                (field.parent_class.is_some() && !field.is_static, false)
            }
            ResolvedTarget::LocalProperty(_)
            | ResolvedTarget::EnumEntry(_)
            | ResolvedTarget::Variable(_)
            | ResolvedTarget::Unresolved => (false, false),
        }
    }

    /// Produce the value for one receiver slot, or `None` for a valid
    /// unbound receiver in callable-reference position.
    fn receiver_value(
        &mut self,
        slot: &ReceiverSlot,
        access: &Access,
        explicit_lowered: &mut Option<ir::Expr>,
        callable_ref: bool,
        kind: ReceiverKind,
    ) -> LowerResult<Option<ir::Expr>> {
        match slot {
            ReceiverSlot::Explicit => Ok(Some(self.lowered_explicit(access, explicit_lowered, callable_ref)?)),
            ReceiverSlot::Implicit(expr) => {
                Ok(Some(self.lower_receiver_expr(expr, callable_ref)?))
            }
            ReceiverSlot::None => {
                if access.explicit_receiver.is_some() {
                    Ok(Some(self.lowered_explicit(access, explicit_lowered, callable_ref)?))
                } else if callable_ref {
                    // Unbound receiver of a callable reference.
                    Ok(None)
                } else {
                    let name = self.interner.resolve(access.callee.name);
                    Err(LowerError::invariant(format!(
                        "No {} receiver found for call to '{}'",
                        kind.name(),
                        name
                    )))
                }
            }
        }
    }

    /// Lower the explicit receiver once and reuse the result.
    fn lowered_explicit(
        &mut self,
        access: &Access,
        cache: &mut Option<ir::Expr>,
        callable_ref: bool,
    ) -> LowerResult<ir::Expr> {
        if let Some(done) = cache {
            return Ok(done.clone());
        }
        let receiver = access.explicit_receiver.as_deref().ok_or_else(|| {
            LowerError::invariant("receiver slot points at an absent explicit receiver")
        })?;
        let lowered = self.lower_receiver_expr(receiver, callable_ref)?;
        *cache = Some(lowered.clone());
        Ok(lowered)
    }

    /// Lower one receiver expression. Qualifiers go through
    /// object-qualifier lowering; in callable-reference mode an
    /// identity mismatch falls back to ordinary lowering.
    fn lower_receiver_expr(&mut self, expr: &Expr, callable_ref: bool) -> LowerResult<ir::Expr> {
        if let ExprKind::Qualifier(qualifier) = &expr.kind {
            let mode = if callable_ref {
                QualifierMode::CallableReference
            } else {
                QualifierMode::Normal
            };
            if let Some(node) = self.lower_object_qualifier(qualifier, mode, expr.ty) {
                return Ok(node);
            }
        }
        self.lower_expr(expr)
    }

    /// The class a `super` access dispatches through: the single named
    /// supertype when it is a class, otherwise the resolved target's
    /// enclosing class.
    fn super_qualifier_for(
        &self,
        superref: &SuperRef,
        target: &ResolvedTarget,
    ) -> Option<ClassId> {
        if superref.supertypes.len() == 1 {
            if let Some(class) = self.types.class_of(superref.supertypes[0]) {
                return Some(class);
            }
        }
        self.enclosing_class(target)
    }

    fn enclosing_class(&self, target: &ResolvedTarget) -> Option<ClassId> {
        let decls = self.decls;
        match *target {
            ResolvedTarget::Function(fid) => decls.function(fid).parent_class,
            ResolvedTarget::Property(pid) => decls.property(pid).parent_class,
            ResolvedTarget::Field(fid) => decls.field(fid).parent_class,
            ResolvedTarget::Constructor(cid) => Some(decls.constructor(cid).class),
            ResolvedTarget::LocalProperty(_)
            | ResolvedTarget::EnumEntry(_)
            | ResolvedTarget::Variable(_)
            | ResolvedTarget::Unresolved => None,
        }
    }
}

fn set_dispatch_receiver(node: &mut ir::Expr, value: ir::Expr) {
    match node {
        ir::Expr::Call(call) => call.dispatch_receiver = Some(Box::new(value)),
        ir::Expr::ConstructorCall(call) => call.dispatch_receiver = Some(Box::new(value)),
        ir::Expr::GetField(get) => get.receiver = Some(Box::new(value)),
        ir::Expr::SetField(set) => set.receiver = Some(Box::new(value)),
        ir::Expr::FunctionReference(fref) => fref.dispatch_receiver = Some(Box::new(value)),
        ir::Expr::PropertyReference(pref) => pref.dispatch_receiver = Some(Box::new(value)),
        _ => {}
    }
}

fn set_extension_receiver(node: &mut ir::Expr, value: ir::Expr) {
    match node {
        ir::Expr::Call(call) => call.extension_receiver = Some(Box::new(value)),
        ir::Expr::FunctionReference(fref) => fref.extension_receiver = Some(Box::new(value)),
        ir::Expr::PropertyReference(pref) => pref.extension_receiver = Some(Box::new(value)),
        _ => {}
    }
}

fn set_super_qualifier(node: &mut ir::Expr, qualifier: Option<ClassId>) {
    match node {
        ir::Expr::Call(call) => call.super_qualifier = qualifier,
        ir::Expr::GetField(get) => get.super_qualifier = qualifier,
        ir::Expr::SetField(set) => set.super_qualifier = qualifier,
        _ => {}
    }
}
