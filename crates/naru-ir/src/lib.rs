//! Naru Backend IR
//!
//! The execution-oriented expression tree produced by lowering and
//! consumed by later optimization and code generation passes. Nodes are
//! fully constructed before they escape: calls carry fixed-arity,
//! index-addressed argument and type-argument slots, and resolution
//! failures are represented as error nodes rather than absent structure.

pub mod expr;
pub mod pretty;

pub use expr::{
    Block, Call, CallableTarget, Const, ConstructorCall, ErrorCall, Expr, FunctionReference,
    GetEnumValue, GetField, GetObjectValue, GetValue, LocalPropertyReference, LocalVar, Origin,
    PropertyReference, SetField, SetValue, Stmt, TempId, TypeOp, TypeOperator, ValueRef, Vararg,
    VarargElement,
};
pub use pretty::PrettyPrint;
