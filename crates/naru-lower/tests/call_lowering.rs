//! Call lowering: dispatch over resolved targets.

mod common;

use common::{span, Fixture};
use naru_frontend::{
    Access, AnnotationCall, Argument, Assignment, ClassKind, Constructor, Expr, ExprKind, Field,
    LocalProperty, Property, Qualifier, Reference, ReceiverSlot, ResolvedTarget,
};
use naru_ir as ir;
use naru_lower::LowerOptions;

#[test]
fn test_property_with_getter_and_field_uses_getter() {
    let mut fx = Fixture::new();
    let int = fx.types.int();
    let getter = fx.function("get_p", vec![], int);
    let field_name = fx.sym("p");
    let field = fx.decls.add_field(Field {
        name: field_name,
        ty: int,
        parent_class: None,
        is_static: false,
        is_delegate: false,
    });
    let mut property = Property::new(fx.sym("p"), int);
    property.getter = Some(getter);
    property.backing_field = Some(field);
    let pid = fx.decls.add_property(property);

    let reference = Reference::new(fx.sym("p"), ResolvedTarget::Property(pid), span(1));
    let expr = Expr::new(
        ExprKind::Access(Box::new(Access::bare(reference))),
        int,
        span(1),
    );

    let mut lowerer = fx.lowerer();
    let lowered = lowerer.lower_expr(&expr).unwrap();
    match lowered {
        ir::Expr::Call(call) => {
            assert_eq!(call.function, getter);
            assert_eq!(call.origin, Some(ir::Origin::PropertyGet));
            assert!(call.args.is_empty());
        }
        other => panic!("expected getter call, got {other:?}"),
    }
}

#[test]
fn test_property_getter_only_reads_through_zero_arg_call() {
    let mut fx = Fixture::new();
    let int = fx.types.int();
    let getter = fx.function("get_p", vec![], int);
    let mut property = Property::new(fx.sym("p"), int);
    property.getter = Some(getter);
    let pid = fx.decls.add_property(property);

    let reference = Reference::new(fx.sym("p"), ResolvedTarget::Property(pid), span(1));
    let expr = Expr::new(
        ExprKind::Access(Box::new(Access::bare(reference))),
        int,
        span(1),
    );

    let mut lowerer = fx.lowerer();
    let lowered = lowerer.lower_expr(&expr).unwrap();
    match lowered {
        ir::Expr::Call(call) => {
            assert_eq!(call.function, getter);
            assert!(call.args.is_empty());
            assert!(call.dispatch_receiver.is_none());
        }
        other => panic!("expected getter call, got {other:?}"),
    }
}

#[test]
fn test_property_backing_field_only_reads_field() {
    let mut fx = Fixture::new();
    let int = fx.types.int();
    let field_name = fx.sym("p");
    let field = fx.decls.add_field(Field {
        name: field_name,
        ty: int,
        parent_class: None,
        is_static: false,
        is_delegate: false,
    });
    let mut property = Property::new(fx.sym("p"), int);
    property.backing_field = Some(field);
    let pid = fx.decls.add_property(property);

    let reference = Reference::new(fx.sym("p"), ResolvedTarget::Property(pid), span(1));
    let expr = Expr::new(
        ExprKind::Access(Box::new(Access::bare(reference))),
        int,
        span(1),
    );

    let mut lowerer = fx.lowerer();
    let lowered = lowerer.lower_expr(&expr).unwrap();
    match lowered {
        ir::Expr::GetField(get) => {
            assert_eq!(get.field, field);
            assert_eq!(get.origin, Some(ir::Origin::PropertyGet));
        }
        other => panic!("expected field read, got {other:?}"),
    }
}

#[test]
fn test_property_without_accessors_degrades_to_error() {
    let mut fx = Fixture::new();
    let int = fx.types.int();
    let property = Property::new(fx.sym("p"), int);
    let pid = fx.decls.add_property(property);

    let reference = Reference::new(fx.sym("p"), ResolvedTarget::Property(pid), span(1));
    let expr = Expr::new(
        ExprKind::Access(Box::new(Access::bare(reference))),
        int,
        span(1),
    );

    let mut lowerer = fx.lowerer();
    let lowered = lowerer.lower_expr(&expr).unwrap();
    match lowered {
        ir::Expr::ErrorCall(err) => {
            assert!(err.message.contains("no getter or backing field"));
        }
        other => panic!("expected error node, got {other:?}"),
    }
    assert_eq!(lowerer.diagnostics().len(), 1);
}

#[test]
fn test_unresolved_callee_keeps_lowered_arguments() {
    let mut fx = Fixture::new();
    let int = fx.types.int();
    let reference = Reference::new(fx.sym("g"), ResolvedTarget::Unresolved, span(2));
    let args = vec![
        Argument::positional(fx.int_lit(1)),
        Argument::positional(fx.int_lit(2)),
    ];
    let expr = fx.call_expr(Access::bare(reference), args, int);

    let mut lowerer = fx.lowerer();
    let lowered = lowerer.lower_expr(&expr).unwrap();
    match lowered {
        ir::Expr::ErrorCall(err) => {
            assert!(err.message.contains("Unresolved reference: g"));
            assert_eq!(err.args().len(), 2);
        }
        other => panic!("expected error node, got {other:?}"),
    }
    assert_eq!(lowerer.diagnostics().len(), 1);
}

#[test]
fn test_variable_read_lowers_to_get_value() {
    let mut fx = Fixture::new();
    let int = fx.types.int();
    let variable = fx.variable("x", int);
    let expr = fx.var_read(variable);

    let mut lowerer = fx.lowerer();
    let lowered = lowerer.lower_expr(&expr).unwrap();
    match lowered {
        ir::Expr::GetValue(get) => {
            assert_eq!(get.target, ir::ValueRef::Variable(variable));
            assert_eq!(get.origin, None);
        }
        other => panic!("expected value read, got {other:?}"),
    }
}

#[test]
fn test_enum_entry_read() {
    let mut fx = Fixture::new();
    let owner = fx.class("Color", ClassKind::Enum);
    let ty = fx.types.class(owner);
    let entry_name = fx.sym("RED");
    let entry = fx.decls.add_enum_entry(naru_frontend::EnumEntry {
        name: entry_name,
        owner,
        ty,
    });

    let reference = Reference::new(fx.sym("RED"), ResolvedTarget::EnumEntry(entry), span(3));
    let expr = Expr::new(
        ExprKind::Access(Box::new(Access::bare(reference))),
        ty,
        span(3),
    );

    let mut lowerer = fx.lowerer();
    let lowered = lowerer.lower_expr(&expr).unwrap();
    match lowered {
        ir::Expr::GetEnumValue(get) => assert_eq!(get.entry, entry),
        other => panic!("expected enum read, got {other:?}"),
    }
}

#[test]
fn test_delegate_field_read_is_tagged() {
    let mut fx = Fixture::new();
    let int = fx.types.int();
    let field_name = fx.sym("d$delegate");
    let field = fx.decls.add_field(Field {
        name: field_name,
        ty: int,
        parent_class: None,
        is_static: false,
        is_delegate: true,
    });

    let reference = Reference::new(fx.sym("d$delegate"), ResolvedTarget::Field(field), span(4));
    let expr = Expr::new(
        ExprKind::Access(Box::new(Access::bare(reference))),
        int,
        span(4),
    );

    let mut lowerer = fx.lowerer();
    let lowered = lowerer.lower_expr(&expr).unwrap();
    match lowered {
        ir::Expr::GetField(get) => {
            assert_eq!(get.origin, Some(ir::Origin::DelegateFieldAccess));
        }
        other => panic!("expected field read, got {other:?}"),
    }
}

#[test]
fn test_local_delegated_property_reads_through_getter() {
    let mut fx = Fixture::new();
    let int = fx.types.int();
    let getter = fx.function("get_d", vec![], int);
    let delegate = fx.variable("d$delegate", int);
    let prop_name = fx.sym("d");
    let lid = fx.decls.add_local_property(LocalProperty {
        name: prop_name,
        ty: int,
        getter,
        setter: None,
        delegate,
    });

    let reference = Reference::new(fx.sym("d"), ResolvedTarget::LocalProperty(lid), span(5));
    let expr = Expr::new(
        ExprKind::Access(Box::new(Access::bare(reference))),
        int,
        span(5),
    );

    let mut lowerer = fx.lowerer();
    let lowered = lowerer.lower_expr(&expr).unwrap();
    match lowered {
        ir::Expr::Call(call) => {
            assert_eq!(call.function, getter);
            assert_eq!(call.origin, Some(ir::Origin::LocalPropertyGet));
        }
        other => panic!("expected getter call, got {other:?}"),
    }
}

#[test]
fn test_constructor_call_binds_arguments() {
    let mut fx = Fixture::new();
    let int = fx.types.int();
    let class = fx.class("Box", ClassKind::Class);
    let value_param = fx.param("value", int);
    let ctor = fx.decls.add_constructor(Constructor {
        class,
        params: vec![value_param],
        type_params: 0,
        is_primary: true,
    });
    let ty = fx.types.class(class);

    let reference = Reference::new(fx.sym("Box"), ResolvedTarget::Constructor(ctor), span(6));
    let expr = fx.call_expr(
        Access::bare(reference),
        vec![Argument::positional(fx.int_lit(5))],
        ty,
    );

    let mut lowerer = fx.lowerer();
    let lowered = lowerer.lower_expr(&expr).unwrap();
    match lowered {
        ir::Expr::ConstructorCall(call) => {
            assert_eq!(call.constructor, ctor);
            assert_eq!(call.class, class);
            assert_eq!(
                call.args[0],
                Some(ir::Expr::Const {
                    value: ir::Const::Int(5),
                    ty: int,
                })
            );
        }
        other => panic!("expected constructor call, got {other:?}"),
    }
}

#[test]
fn test_sam_constructor_call_becomes_conversion() {
    let mut fx = Fixture::new();
    let unit = fx.types.unit();
    let iface = fx.class("Runner", ClassKind::Interface);
    let iface_ty = fx.types.class(iface);
    let fn_ty = fx.types.function(vec![], unit, false);

    let mut adapter = naru_frontend::Function::new(fx.sym("Runner"), vec![], iface_ty);
    adapter.is_sam_constructor = true;
    let adapter = fx.decls.add_function(adapter);
    let lambda_fn = fx.function("lambda$0", vec![], unit);

    let lambda = Expr::new(ExprKind::Lambda { function: lambda_fn }, fn_ty, span(7));
    let reference = Reference::new(fx.sym("Runner"), ResolvedTarget::Function(adapter), span(7));
    let expr = fx.call_expr(
        Access::bare(reference),
        vec![Argument::positional(lambda)],
        iface_ty,
    );

    let mut lowerer = fx.lowerer();
    let lowered = lowerer.lower_expr(&expr).unwrap();
    match lowered {
        ir::Expr::TypeOp(op) => {
            assert_eq!(op.op, ir::TypeOperator::SamConversion);
            assert_eq!(op.ty, iface_ty);
            assert!(matches!(*op.argument, ir::Expr::FunctionExpr { .. }));
        }
        other => panic!("expected conversion, got {other:?}"),
    }
}

#[test]
fn test_super_callee_lowers_to_receiver() {
    let mut fx = Fixture::new();
    let int = fx.types.int();
    let target = fx.function("ignored", vec![], int);
    let instance = fx.variable("this", int);

    let mut reference = fx.function_ref(target);
    reference.is_super = true;
    let mut access = Access::bare(reference);
    access.dispatch_receiver = ReceiverSlot::Implicit(Box::new(fx.var_read(instance)));
    let expr = fx.call_expr(access, vec![], int);

    let mut lowerer = fx.lowerer();
    let lowered = lowerer.lower_expr(&expr).unwrap();
    match lowered {
        ir::Expr::GetValue(get) => {
            assert_eq!(get.target, ir::ValueRef::Variable(instance));
        }
        other => panic!("expected receiver value, got {other:?}"),
    }
}

#[test]
fn test_object_qualifier_lowers_to_object_value() {
    let mut fx = Fixture::new();
    let object = fx.class("Registry", ClassKind::Object);
    let ty = fx.types.class(object);
    let expr = Expr::new(
        ExprKind::Qualifier(Qualifier {
            resolved: object,
            nominal: object,
        }),
        ty,
        span(8),
    );

    let mut lowerer = fx.lowerer();
    let lowered = lowerer.lower_expr(&expr).unwrap();
    match lowered {
        ir::Expr::GetObjectValue(get) => assert_eq!(get.class, object),
        other => panic!("expected object value, got {other:?}"),
    }
}

#[test]
fn test_assignment_to_variable() {
    let mut fx = Fixture::new();
    let int = fx.types.int();
    let unit = fx.types.unit();
    let variable = fx.variable("x", int);

    let reference = Reference::new(fx.sym("x"), ResolvedTarget::Variable(variable), span(9));
    let expr = Expr::new(
        ExprKind::Assignment(Box::new(Assignment {
            access: Access::bare(reference),
            value: fx.int_lit(3),
        })),
        unit,
        span(9),
    );

    let mut lowerer = fx.lowerer();
    let lowered = lowerer.lower_expr(&expr).unwrap();
    match lowered {
        ir::Expr::SetValue(set) => {
            assert_eq!(set.target, ir::ValueRef::Variable(variable));
            assert_eq!(
                *set.value,
                ir::Expr::Const {
                    value: ir::Const::Int(3),
                    ty: int,
                }
            );
        }
        other => panic!("expected variable write, got {other:?}"),
    }
}

#[test]
fn test_assignment_through_setter() {
    let mut fx = Fixture::new();
    let int = fx.types.int();
    let unit = fx.types.unit();
    let value_param = fx.param("value", int);
    let setter = fx.function("set_p", vec![value_param], unit);
    let mut property = Property::new(fx.sym("p"), int);
    property.setter = Some(setter);
    let pid = fx.decls.add_property(property);

    let reference = Reference::new(fx.sym("p"), ResolvedTarget::Property(pid), span(10));
    let expr = Expr::new(
        ExprKind::Assignment(Box::new(Assignment {
            access: Access::bare(reference),
            value: fx.int_lit(7),
        })),
        unit,
        span(10),
    );

    let mut lowerer = fx.lowerer();
    let lowered = lowerer.lower_expr(&expr).unwrap();
    match lowered {
        ir::Expr::Call(call) => {
            assert_eq!(call.function, setter);
            assert_eq!(call.origin, Some(ir::Origin::PropertySet));
            assert_eq!(
                call.args[0],
                Some(ir::Expr::Const {
                    value: ir::Const::Int(7),
                    ty: int,
                })
            );
        }
        other => panic!("expected setter call, got {other:?}"),
    }
}

#[test]
fn test_assignment_to_backing_field_only_property() {
    let mut fx = Fixture::new();
    let int = fx.types.int();
    let unit = fx.types.unit();
    let field_name = fx.sym("p");
    let field = fx.decls.add_field(Field {
        name: field_name,
        ty: int,
        parent_class: None,
        is_static: false,
        is_delegate: false,
    });
    let mut property = Property::new(fx.sym("p"), int);
    property.backing_field = Some(field);
    let pid = fx.decls.add_property(property);

    let reference = Reference::new(fx.sym("p"), ResolvedTarget::Property(pid), span(11));
    let expr = Expr::new(
        ExprKind::Assignment(Box::new(Assignment {
            access: Access::bare(reference),
            value: fx.int_lit(9),
        })),
        unit,
        span(11),
    );

    let mut lowerer = fx.lowerer();
    let lowered = lowerer.lower_expr(&expr).unwrap();
    match lowered {
        ir::Expr::SetField(set) => {
            assert_eq!(set.field, field);
            assert_eq!(set.origin, Some(ir::Origin::PropertySet));
        }
        other => panic!("expected field write, got {other:?}"),
    }
}

#[test]
fn test_assignment_to_read_only_property_errors() {
    let mut fx = Fixture::new();
    let int = fx.types.int();
    let unit = fx.types.unit();
    let getter = fx.function("get_p", vec![], int);
    let mut property = Property::new(fx.sym("p"), int);
    property.getter = Some(getter);
    let pid = fx.decls.add_property(property);

    let reference = Reference::new(fx.sym("p"), ResolvedTarget::Property(pid), span(12));
    let expr = Expr::new(
        ExprKind::Assignment(Box::new(Assignment {
            access: Access::bare(reference),
            value: fx.int_lit(4),
        })),
        unit,
        span(12),
    );

    let mut lowerer = fx.lowerer();
    let lowered = lowerer.lower_expr(&expr).unwrap();
    match lowered {
        ir::Expr::ErrorCall(err) => {
            assert!(err.message.contains("no setter or backing field"));
            // The right-hand side is retained for diagnostics.
            assert_eq!(err.args().len(), 1);
        }
        other => panic!("expected error node, got {other:?}"),
    }
}

#[test]
fn test_annotation_call_falls_back_to_primary_constructor() {
    let mut fx = Fixture::new();
    let class = fx.class("Marker", ClassKind::Annotation);
    let ctor = fx.decls.add_constructor(Constructor {
        class,
        params: vec![],
        type_params: 0,
        is_primary: true,
    });
    let ty = fx.types.class(class);

    // The callee itself did not resolve to a constructor.
    let reference = Reference::new(fx.sym("Marker"), ResolvedTarget::Unresolved, span(13));
    let expr = Expr::new(
        ExprKind::AnnotationCall(Box::new(AnnotationCall {
            callee: reference,
            class,
            args: vec![],
            mapping: None,
        })),
        ty,
        span(13),
    );

    let mut lowerer = fx.lowerer();
    let lowered = lowerer.lower_expr(&expr).unwrap();
    match lowered {
        ir::Expr::ConstructorCall(call) => assert_eq!(call.constructor, ctor),
        other => panic!("expected constructor call, got {other:?}"),
    }
}

#[test]
fn test_annotation_call_without_constructor_errors() {
    let mut fx = Fixture::new();
    let class = fx.class("Marker", ClassKind::Annotation);
    let ty = fx.types.class(class);

    let reference = Reference::new(fx.sym("Marker"), ResolvedTarget::Unresolved, span(14));
    let expr = Expr::new(
        ExprKind::AnnotationCall(Box::new(AnnotationCall {
            callee: reference,
            class,
            args: vec![Argument::positional(fx.int_lit(1))],
            mapping: None,
        })),
        ty,
        span(14),
    );

    let mut lowerer = fx.lowerer();
    let lowered = lowerer.lower_expr(&expr).unwrap();
    match lowered {
        ir::Expr::ErrorCall(err) => {
            assert!(err.message.contains("No annotation constructor found"));
            assert_eq!(err.args().len(), 1);
        }
        other => panic!("expected error node, got {other:?}"),
    }
}

#[test]
fn test_depth_cap_aborts_with_fatal_error() {
    let mut fx = Fixture::new();
    let int = fx.types.int();
    let inner_param = fx.param("n", int);
    let g = fx.function("g", vec![inner_param], int);
    let outer_param = fx.param("n", int);
    let f = fx.function("f", vec![outer_param], int);

    let inner = fx.call_expr(
        Access::bare(fx.function_ref(g)),
        vec![Argument::positional(fx.int_lit(1))],
        int,
    );
    let outer = fx.call_expr(
        Access::bare(fx.function_ref(f)),
        vec![Argument::positional(inner)],
        int,
    );

    let mut lowerer = fx.lowerer().with_options(LowerOptions { max_depth: Some(2) });
    let err = lowerer.lower_expr(&outer).unwrap_err();
    assert!(err.is_fatal());
    assert!(err.to_string().contains("recursion depth"));
}

#[test]
fn test_missing_receiver_is_fatal_with_context() {
    let mut fx = Fixture::new();
    let int = fx.types.int();
    let host = fx.class("Host", ClassKind::Class);
    let mut member = naru_frontend::Function::new(fx.sym("mf"), vec![], int);
    member.parent_class = Some(host);
    let member = fx.decls.add_function(member);

    // No dispatch receiver anywhere: a resolution invariant violation.
    let expr = fx.call_expr(Access::bare(fx.function_ref(member)), vec![], int);

    let mut lowerer = fx.lowerer();
    let err = lowerer.lower_expr(&expr).unwrap_err();
    assert!(err.is_fatal());
    let text = err.to_string();
    assert!(text.contains("call to 'mf'"));
    assert!(text.contains("test.naru"));
    assert!(text.contains("dispatch receiver"));
}

// Lowering is infallible for plain literals; make sure they map to
// constants without touching diagnostics.
#[test]
fn test_literals_lower_to_constants() {
    let mut fx = Fixture::new();
    let string = fx.types.string();
    let sym = fx.sym("hello");
    let expr = Expr::new(ExprKind::StringLiteral(sym), string, span(15));

    let mut lowerer = fx.lowerer();
    let lowered = lowerer.lower_expr(&expr).unwrap();
    assert_eq!(
        lowered,
        ir::Expr::Const {
            value: ir::Const::String("hello".to_string()),
            ty: string,
        }
    );
    assert!(lowerer.diagnostics().is_empty());
}
