//! Call and reference lowering
//!
//! The dispatch core: given a resolved reference, build the backend node
//! whose shape matches the target entity, then run it through the
//! argument binder, the type-argument binder, and the receiver binder,
//! in that order. Resolution failures degrade to error nodes; the only
//! aborting path is an internal invariant violation.

use crate::args::BindMode;
use crate::error::{LowerError, LowerResult};
use crate::Lowerer;
use naru_frontend::{
    Access, AnnotationCall, Argument, Assignment, Call, CallableRef, Expr, Qualifier,
    Reference, ReceiverSlot, ResolvedTarget, Span, TypeId,
};
use naru_ir as ir;

/// How an object qualifier is being lowered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum QualifierMode {
    /// Ordinary value or receiver position.
    Normal,
    /// Receiver of a callable reference: the resolved class must match
    /// the nominal class exactly, otherwise the qualifier produces no
    /// result and the caller falls back to ordinary receiver lowering.
    CallableReference,
}

impl<'a> Lowerer<'a> {
    /// Lower a call expression.
    pub(crate) fn lower_call(&mut self, call: &Call, ty: TypeId, span: Span) -> LowerResult<ir::Expr> {
        let reference = &call.access.callee;

        // A synthetic SAM-adapter constructor does not become a call:
        // its sole argument is wrapped in a conversion node instead.
        if let ResolvedTarget::Function(fid) = reference.target {
            if self.decls.function(fid).is_sam_constructor {
                return self.lower_sam_constructor(call, ty, span);
            }
        }

        // A call whose callee is `super` lowers to its receiver.
        if reference.is_super {
            return self.lower_super_shortcut(&call.access);
        }

        if let ResolvedTarget::Unresolved = reference.target {
            return self.unresolved_call(reference, &call.args, ty, span);
        }

        let node = self.reference_skeleton(reference, ty, span);
        let node = self.bind_arguments(
            node,
            &call.args,
            call.mapping.as_ref(),
            BindMode::Call,
            ty,
            span,
        )?;
        let node = bind_type_arguments(node, &call.type_args);
        self.bind_receivers(node, &call.access, false)
    }

    /// Lower a read access (property, field, variable, enum entry).
    pub(crate) fn lower_access(
        &mut self,
        access: &Access,
        ty: TypeId,
        span: Span,
    ) -> LowerResult<ir::Expr> {
        if access.callee.is_super {
            return self.lower_super_shortcut(access);
        }
        if let ResolvedTarget::Unresolved = access.callee.target {
            return self.unresolved_call(&access.callee, &[], ty, span);
        }
        let node = self.reference_skeleton(&access.callee, ty, span);
        self.bind_receivers(node, access, false)
    }

    /// Build the skeleton node a resolved reference lowers to, with
    /// unfilled slots sized to the target's declared shape.
    fn reference_skeleton(&mut self, reference: &Reference, ty: TypeId, span: Span) -> ir::Expr {
        let decls = self.decls;
        match reference.target {
            ResolvedTarget::Function(fid) => {
                let function = decls.function(fid);
                ir::Expr::Call(ir::Call::with_shape(
                    fid,
                    ty,
                    None,
                    function.type_params as usize,
                    function.params.len(),
                ))
            }
            ResolvedTarget::Constructor(cid) => {
                let constructor = decls.constructor(cid);
                ir::Expr::ConstructorCall(ir::ConstructorCall::with_shape(
                    cid,
                    constructor.class,
                    ty,
                    constructor.type_params as usize,
                    constructor.params.len(),
                ))
            }
            ResolvedTarget::Property(pid) => {
                let property = decls.property(pid);
                if let Some(getter) = property.getter {
                    let accessor = decls.function(getter);
                    ir::Expr::Call(ir::Call::with_shape(
                        getter,
                        ty,
                        Some(ir::Origin::PropertyGet),
                        accessor.type_params as usize,
                        accessor.params.len(),
                    ))
                } else if let Some(field) = property.backing_field {
                    let origin = if property.is_delegated {
                        ir::Origin::DelegateFieldAccess
                    } else {
                        ir::Origin::PropertyGet
                    };
                    ir::Expr::GetField(ir::GetField {
                        field,
                        ty,
                        origin: Some(origin),
                        receiver: None,
                        super_qualifier: None,
                    })
                } else {
                    let name = self.interner.resolve(reference.name).to_string();
                    ir::Expr::ErrorCall(self.error_call(
                        format!("Property '{name}' has no getter or backing field"),
                        ty,
                        span,
                    ))
                }
            }
            ResolvedTarget::Field(fid) => {
                let field = decls.field(fid);
                let origin = field.is_delegate.then_some(ir::Origin::DelegateFieldAccess);
                ir::Expr::GetField(ir::GetField {
                    field: fid,
                    ty,
                    origin,
                    receiver: None,
                    super_qualifier: None,
                })
            }
            ResolvedTarget::LocalProperty(lid) => {
                let property = decls.local_property(lid);
                let accessor = decls.function(property.getter);
                ir::Expr::Call(ir::Call::with_shape(
                    property.getter,
                    ty,
                    Some(ir::Origin::LocalPropertyGet),
                    accessor.type_params as usize,
                    accessor.params.len(),
                ))
            }
            ResolvedTarget::Variable(vid) => ir::Expr::GetValue(ir::GetValue {
                target: ir::ValueRef::Variable(vid),
                ty,
                origin: None,
            }),
            ResolvedTarget::EnumEntry(eid) => {
                ir::Expr::GetEnumValue(ir::GetEnumValue { entry: eid, ty })
            }
            ResolvedTarget::Unresolved => {
                let name = self.interner.resolve(reference.name).to_string();
                ir::Expr::ErrorCall(self.error_call(
                    format!("Unresolved reference: {name}"),
                    ty,
                    span,
                ))
            }
        }
    }

    /// Lower an assignment through a resolved reference. Exactly one
    /// value is bound: the right-hand side.
    pub(crate) fn lower_assignment(
        &mut self,
        assign: &Assignment,
        ty: TypeId,
        span: Span,
    ) -> LowerResult<ir::Expr> {
        let decls = self.decls;
        let reference = &assign.access.callee;
        let node = match reference.target {
            ResolvedTarget::Field(fid) => {
                let field = decls.field(fid);
                let origin = field.is_delegate.then_some(ir::Origin::DelegateFieldAccess);
                let value = self.lower_value_for(&assign.value, field.ty)?;
                ir::Expr::SetField(ir::SetField {
                    field: fid,
                    ty,
                    origin,
                    receiver: None,
                    super_qualifier: None,
                    value: Box::new(value),
                })
            }
            ResolvedTarget::Property(pid) => {
                let property = decls.property(pid);
                if let Some(setter) = property.setter {
                    self.single_argument_call(setter, Some(ir::Origin::PropertySet), &assign.value, ty, span)?
                } else if let Some(field) = property.backing_field {
                    let value = self.lower_value_for(&assign.value, property.ty)?;
                    ir::Expr::SetField(ir::SetField {
                        field,
                        ty,
                        origin: Some(ir::Origin::PropertySet),
                        receiver: None,
                        super_qualifier: None,
                        value: Box::new(value),
                    })
                } else {
                    let name = self.interner.resolve(reference.name).to_string();
                    let mut err = self.error_call(
                        format!("Property '{name}' has no setter or backing field"),
                        ty,
                        span,
                    );
                    let value = self.lower_expr(&assign.value)?;
                    err.append_argument(value);
                    ir::Expr::ErrorCall(err)
                }
            }
            ResolvedTarget::LocalProperty(lid) => {
                let property = decls.local_property(lid);
                match property.setter {
                    Some(setter) => self.single_argument_call(
                        setter,
                        Some(ir::Origin::LocalPropertySet),
                        &assign.value,
                        ty,
                        span,
                    )?,
                    None => {
                        let name = self.interner.resolve(reference.name).to_string();
                        let mut err = self.error_call(
                            format!("Local delegated property '{name}' has no setter"),
                            ty,
                            span,
                        );
                        let value = self.lower_expr(&assign.value)?;
                        err.append_argument(value);
                        ir::Expr::ErrorCall(err)
                    }
                }
            }
            // Assigning through a function reference calls it with the
            // value as sole argument.
            ResolvedTarget::Function(fid) => {
                self.single_argument_call(fid, None, &assign.value, ty, span)?
            }
            ResolvedTarget::Variable(vid) => {
                let variable = decls.variable(vid);
                let value = self.lower_value_for(&assign.value, variable.ty)?;
                ir::Expr::SetValue(ir::SetValue {
                    target: ir::ValueRef::Variable(vid),
                    ty,
                    origin: None,
                    value: Box::new(value),
                })
            }
            ResolvedTarget::Constructor(_) | ResolvedTarget::EnumEntry(_) => {
                let name = self.interner.resolve(reference.name).to_string();
                let mut err = self.error_call(format!("Cannot assign to '{name}'"), ty, span);
                let value = self.lower_expr(&assign.value)?;
                err.append_argument(value);
                ir::Expr::ErrorCall(err)
            }
            ResolvedTarget::Unresolved => {
                let name = self.interner.resolve(reference.name).to_string();
                let mut err =
                    self.error_call(format!("Unresolved reference: {name}"), ty, span);
                let value = self.lower_expr(&assign.value)?;
                err.append_argument(value);
                ir::Expr::ErrorCall(err)
            }
        };
        self.bind_receivers(node, &assign.access, false)
    }

    /// Lower an annotation-style constructor invocation. When the
    /// callee did not resolve to a constructor, fall back to the
    /// annotated class's primary constructor.
    pub(crate) fn lower_annotation_call(
        &mut self,
        ann: &AnnotationCall,
        ty: TypeId,
        span: Span,
    ) -> LowerResult<ir::Expr> {
        let constructor = match ann.callee.target {
            ResolvedTarget::Constructor(cid) => Some(cid),
            _ => self.decls.primary_constructor(ann.class),
        };
        let Some(cid) = constructor else {
            let name = self.interner.resolve(self.decls.class(ann.class).name).to_string();
            let mut err = self.error_call(
                format!("No annotation constructor found for class '{name}'"),
                ty,
                span,
            );
            for arg in &ann.args {
                let lowered = self.lower_expr(&arg.value)?;
                err.append_argument(lowered);
            }
            return Ok(ir::Expr::ErrorCall(err));
        };

        let constructor = self.decls.constructor(cid);
        let node = ir::Expr::ConstructorCall(ir::ConstructorCall::with_shape(
            cid,
            constructor.class,
            ty,
            constructor.type_params as usize,
            constructor.params.len(),
        ));
        // Annotation arguments are compile-time constants: no
        // reordering, but unmapped varargs get an explicit empty
        // placeholder.
        self.bind_arguments(
            node,
            &ann.args,
            ann.mapping.as_ref(),
            BindMode::Annotation,
            ty,
            span,
        )
    }

    /// Lower a callable reference. Shape mismatches are delegated to
    /// the adaptation collaborator wholesale.
    pub(crate) fn lower_callable_reference(
        &mut self,
        cref: &CallableRef,
        ty: TypeId,
        span: Span,
    ) -> LowerResult<ir::Expr> {
        let adapter = self.adapter;
        if adapter.needs_adaptation(cref, self.decls, self.types) {
            return adapter.adapt(self, cref, ty, span);
        }

        let decls = self.decls;
        let node = match cref.access.callee.target {
            ResolvedTarget::Function(fid) => {
                let function = decls.function(fid);
                ir::Expr::FunctionReference(ir::FunctionReference {
                    target: ir::CallableTarget::Function(fid),
                    ty,
                    type_args: vec![None; function.type_params as usize],
                    dispatch_receiver: None,
                    extension_receiver: None,
                })
            }
            ResolvedTarget::Constructor(cid) => {
                let constructor = decls.constructor(cid);
                ir::Expr::FunctionReference(ir::FunctionReference {
                    target: ir::CallableTarget::Constructor(cid),
                    ty,
                    type_args: vec![None; constructor.type_params as usize],
                    dispatch_receiver: None,
                    extension_receiver: None,
                })
            }
            ResolvedTarget::Property(pid) => {
                let property = decls.property(pid);
                let type_params = property
                    .getter
                    .map(|g| decls.function(g).type_params)
                    .unwrap_or(0);
                ir::Expr::PropertyReference(ir::PropertyReference {
                    property: Some(pid),
                    getter: property.getter,
                    setter: property.setter,
                    field: property.backing_field,
                    ty,
                    type_args: vec![None; type_params as usize],
                    dispatch_receiver: None,
                    extension_receiver: None,
                })
            }
            ResolvedTarget::Field(fid) => ir::Expr::PropertyReference(ir::PropertyReference {
                property: None,
                getter: None,
                setter: None,
                field: Some(fid),
                ty,
                type_args: Vec::new(),
                dispatch_receiver: None,
                extension_receiver: None,
            }),
            ResolvedTarget::LocalProperty(lid) => {
                let property = decls.local_property(lid);
                ir::Expr::LocalPropertyReference(ir::LocalPropertyReference {
                    property: lid,
                    delegate: property.delegate,
                    getter: property.getter,
                    setter: property.setter,
                    ty,
                })
            }
            ResolvedTarget::Variable(_) | ResolvedTarget::EnumEntry(_) => {
                let name = self.interner.resolve(cref.access.callee.name).to_string();
                let err = self.error_call(
                    format!("Unsupported callable reference target '{name}'"),
                    ty,
                    span,
                );
                return Ok(ir::Expr::ErrorCall(err));
            }
            ResolvedTarget::Unresolved => {
                let name = self.interner.resolve(cref.access.callee.name).to_string();
                let err =
                    self.error_call(format!("Unresolved reference: {name}"), ty, span);
                return Ok(ir::Expr::ErrorCall(err));
            }
        };
        let node = bind_type_arguments(node, &cref.type_args);
        self.bind_receivers(node, &cref.access, true)
    }

    /// Lower an object qualifier to a singleton read.
    ///
    /// In callable-reference mode the resolved class must be exactly
    /// the class the source names; a mismatch (e.g. a companion object
    /// standing in for its class) yields no result, which is a control
    /// signal, not an error.
    pub(crate) fn lower_object_qualifier(
        &mut self,
        qualifier: &Qualifier,
        mode: QualifierMode,
        ty: TypeId,
    ) -> Option<ir::Expr> {
        if mode == QualifierMode::CallableReference && qualifier.resolved != qualifier.nominal {
            return None;
        }
        Some(ir::Expr::GetObjectValue(ir::GetObjectValue {
            class: qualifier.resolved,
            ty,
        }))
    }

    /// Wrap the sole argument of a SAM-adapter constructor call in a
    /// conversion node.
    fn lower_sam_constructor(
        &mut self,
        call: &Call,
        ty: TypeId,
        span: Span,
    ) -> LowerResult<ir::Expr> {
        if call.args.len() != 1 {
            let name = self.interner.resolve(call.access.callee.name).to_string();
            let mut err = self.error_call(
                format!(
                    "Interface constructor '{}' expects one argument, got {}",
                    name,
                    call.args.len()
                ),
                ty,
                span,
            );
            for arg in &call.args {
                let lowered = self.lower_expr(&arg.value)?;
                err.append_argument(lowered);
            }
            return Ok(ir::Expr::ErrorCall(err));
        }
        let argument = self.lower_expr(&call.args[0].value)?;
        Ok(ir::Expr::TypeOp(ir::TypeOp {
            op: ir::TypeOperator::SamConversion,
            ty,
            argument: Box::new(argument),
        }))
    }

    /// Lower a `super`-callee access: the result is the receiver
    /// instance itself, not a call.
    fn lower_super_shortcut(&mut self, access: &Access) -> LowerResult<ir::Expr> {
        let receiver = match &access.dispatch_receiver {
            ReceiverSlot::Implicit(expr) => Some(&**expr),
            ReceiverSlot::Explicit | ReceiverSlot::None => access.explicit_receiver.as_deref(),
        };
        match receiver {
            Some(expr) => self.lower_expr(expr),
            None => Err(LowerError::invariant("super reference without a receiver")),
        }
    }

    /// Error node for an unresolved callee, retaining every argument.
    fn unresolved_call(
        &mut self,
        reference: &Reference,
        args: &[Argument],
        ty: TypeId,
        span: Span,
    ) -> LowerResult<ir::Expr> {
        let name = self.interner.resolve(reference.name).to_string();
        let mut err = self.error_call(format!("Unresolved reference: {name}"), ty, span);
        for arg in args {
            let lowered = self.lower_expr(&arg.value)?;
            err.append_argument(lowered);
        }
        Ok(ir::Expr::ErrorCall(err))
    }

    /// A call to `function` binding the lowered `value` as its sole
    /// argument (assignment through setters and function targets).
    fn single_argument_call(
        &mut self,
        function: naru_frontend::FunctionId,
        origin: Option<ir::Origin>,
        value: &Expr,
        ty: TypeId,
        span: Span,
    ) -> LowerResult<ir::Expr> {
        let decl = self.decls.function(function);
        if decl.params.is_empty() {
            let name = self.interner.resolve(decl.name).to_string();
            let mut err = self.error_call(
                format!("Cannot bind 1 argument to call to '{name}' with 0 parameters"),
                ty,
                span,
            );
            let lowered = self.lower_expr(value)?;
            err.append_argument(lowered);
            return Ok(ir::Expr::ErrorCall(err));
        }
        let param_ty = decl.params[0].ty;
        let mut call = ir::Call::with_shape(
            function,
            ty,
            origin,
            decl.type_params as usize,
            decl.params.len(),
        );
        let lowered = self.lower_value_for(value, param_ty)?;
        call.args[0] = Some(lowered);
        Ok(ir::Expr::Call(call))
    }

    /// Lower `value` and apply the argument conversions expected by a
    /// slot of type `target_ty`.
    fn lower_value_for(&mut self, value: &Expr, target_ty: TypeId) -> LowerResult<ir::Expr> {
        let lowered = self.lower_expr(value)?;
        Ok(self.convert_argument(lowered, value.ty, target_ty))
    }
}

/// Fill a node's type-argument slots index-wise from the supplied list,
/// reaching through a reordering block if the argument binder introduced
/// one. Surplus supplied arguments are ignored; missing trailing ones
/// stay unset.
pub(crate) fn bind_type_arguments(mut node: ir::Expr, type_args: &[TypeId]) -> ir::Expr {
    fn fill(node: &mut ir::Expr, type_args: &[TypeId]) {
        let slots = match node {
            ir::Expr::Call(call) => &mut call.type_args,
            ir::Expr::ConstructorCall(call) => &mut call.type_args,
            ir::Expr::FunctionReference(fref) => &mut fref.type_args,
            ir::Expr::PropertyReference(pref) => &mut pref.type_args,
            _ => return,
        };
        for (slot, ty) in slots.iter_mut().zip(type_args.iter()) {
            *slot = Some(*ty);
        }
    }

    match &mut node {
        ir::Expr::Block(block) => {
            if let Some(inner) = block.result_mut() {
                fill(inner, type_args);
            }
        }
        other => fill(other, type_args),
    }
    node
}
