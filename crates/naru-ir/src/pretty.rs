//! Pretty-printing for backend IR
//!
//! Human-readable output for debugging lowered trees.

use crate::expr::{Expr, Stmt, TypeOperator, VarargElement};
use std::fmt::Write;

/// Trait for pretty-printing IR constructs.
pub trait PrettyPrint {
    fn pretty_print(&self) -> String;
}

impl PrettyPrint for Expr {
    fn pretty_print(&self) -> String {
        let mut out = String::new();
        write_expr(&mut out, self, 0);
        out
    }
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

fn write_slot(out: &mut String, label: &str, slot: Option<&Expr>, depth: usize) {
    indent(out, depth);
    match slot {
        Some(expr) => {
            writeln!(out, "{}:", label).unwrap();
            write_expr(out, expr, depth + 1);
        }
        None => writeln!(out, "{}: <unset>", label).unwrap(),
    }
}

fn write_expr(out: &mut String, expr: &Expr, depth: usize) {
    match expr {
        Expr::Const { value, .. } => {
            indent(out, depth);
            writeln!(out, "const {:?}", value).unwrap();
        }
        Expr::FunctionExpr { function, .. } => {
            indent(out, depth);
            writeln!(out, "function-expr {}", function).unwrap();
        }
        Expr::Call(call) => {
            indent(out, depth);
            write!(out, "call {}", call.function).unwrap();
            if let Some(origin) = call.origin {
                write!(out, " [{:?}]", origin).unwrap();
            }
            if let Some(superq) = call.super_qualifier {
                write!(out, " [super={}]", superq).unwrap();
            }
            out.push('\n');
            write_slot(
                out,
                "dispatch",
                call.dispatch_receiver.as_deref(),
                depth + 1,
            );
            write_slot(
                out,
                "extension",
                call.extension_receiver.as_deref(),
                depth + 1,
            );
            for (i, arg) in call.args.iter().enumerate() {
                write_slot(out, &format!("arg{}", i), arg.as_ref(), depth + 1);
            }
        }
        Expr::ConstructorCall(call) => {
            indent(out, depth);
            writeln!(out, "new {} via {}", call.class, call.constructor).unwrap();
            for (i, arg) in call.args.iter().enumerate() {
                write_slot(out, &format!("arg{}", i), arg.as_ref(), depth + 1);
            }
        }
        Expr::GetField(get) => {
            indent(out, depth);
            write!(out, "get-field {}", get.field).unwrap();
            if let Some(origin) = get.origin {
                write!(out, " [{:?}]", origin).unwrap();
            }
            out.push('\n');
            if let Some(receiver) = &get.receiver {
                write_slot(out, "receiver", Some(receiver), depth + 1);
            }
        }
        Expr::SetField(set) => {
            indent(out, depth);
            writeln!(out, "set-field {}", set.field).unwrap();
            if let Some(receiver) = &set.receiver {
                write_slot(out, "receiver", Some(receiver), depth + 1);
            }
            write_slot(out, "value", Some(&set.value), depth + 1);
        }
        Expr::GetValue(get) => {
            indent(out, depth);
            writeln!(out, "get-value {:?}", get.target).unwrap();
        }
        Expr::SetValue(set) => {
            indent(out, depth);
            writeln!(out, "set-value {:?}", set.target).unwrap();
            write_slot(out, "value", Some(&set.value), depth + 1);
        }
        Expr::GetEnumValue(get) => {
            indent(out, depth);
            writeln!(out, "get-enum {}", get.entry).unwrap();
        }
        Expr::GetObjectValue(get) => {
            indent(out, depth);
            writeln!(out, "get-object {}", get.class).unwrap();
        }
        Expr::ErrorCall(err) => {
            indent(out, depth);
            writeln!(out, "error-call {:?}", err.message).unwrap();
            for arg in err.args() {
                write_expr(out, arg, depth + 1);
            }
        }
        Expr::FunctionReference(fref) => {
            indent(out, depth);
            writeln!(out, "function-ref {:?}", fref.target).unwrap();
        }
        Expr::PropertyReference(pref) => {
            indent(out, depth);
            writeln!(
                out,
                "property-ref getter={:?} setter={:?} field={:?}",
                pref.getter, pref.setter, pref.field
            )
            .unwrap();
        }
        Expr::LocalPropertyReference(lref) => {
            indent(out, depth);
            writeln!(out, "local-property-ref {}", lref.property).unwrap();
        }
        Expr::Block(block) => {
            indent(out, depth);
            match block.origin {
                Some(origin) => writeln!(out, "block [{:?}]", origin).unwrap(),
                None => writeln!(out, "block").unwrap(),
            }
            for stmt in &block.stmts {
                match stmt {
                    Stmt::Local(local) => {
                        indent(out, depth + 1);
                        writeln!(out, "let {} ({})", local.name, local.id).unwrap();
                        write_expr(out, &local.init, depth + 2);
                    }
                    Stmt::Expr(expr) => write_expr(out, expr, depth + 1),
                }
            }
        }
        Expr::TypeOp(op) => {
            indent(out, depth);
            let name = match op.op {
                TypeOperator::SamConversion => "sam-conversion",
                TypeOperator::SuspendConversion => "suspend-conversion",
            };
            writeln!(out, "{}", name).unwrap();
            write_expr(out, &op.argument, depth + 1);
        }
        Expr::Vararg(vararg) => {
            indent(out, depth);
            writeln!(out, "vararg ({} elements)", vararg.elements.len()).unwrap();
            for element in &vararg.elements {
                let (label, inner) = match element {
                    VarargElement::Element(e) => ("element", e),
                    VarargElement::Spread(e) => ("spread", e),
                    VarargElement::NamedElement(e) => ("named-element", e),
                };
                indent(out, depth + 1);
                writeln!(out, "{}:", label).unwrap();
                write_expr(out, inner, depth + 2);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{Call, Const};
    use naru_frontend::{FunctionId, TypeContext};

    #[test]
    fn test_pretty_print_call_shows_unset_slots() {
        let types = TypeContext::new();
        let mut call = Call::with_shape(FunctionId::new(3), types.int(), None, 0, 2);
        call.args[0] = Some(Expr::Const {
            value: Const::Int(7),
            ty: types.int(),
        });
        let text = Expr::Call(call).pretty_print();
        assert!(text.contains("call fn3"));
        assert!(text.contains("const Int(7)"));
        assert!(text.contains("arg1: <unset>"));
    }
}
