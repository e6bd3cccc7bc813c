//! Shared fixtures for lowering tests.
//!
//! Builds declaration tables and resolved trees by hand, the way the
//! resolver would hand them to the lowerer.

#![allow(dead_code)]

use naru_frontend::{
    Access, Argument, Class, ClassId, ClassKind, Declarations, Expr, ExprKind, Function,
    FunctionId, Interner, Param, Reference, ResolvedTarget, Span, Symbol, TypeId, TypeContext,
    Variable, VariableId,
};
use naru_lower::Lowerer;

/// A distinct span for the `n`-th synthetic node.
pub fn span(n: usize) -> Span {
    Span::new(n * 10, n * 10 + 1, 1, n as u32 + 1)
}

/// Declaration tables plus interner and type context, built per test.
pub struct Fixture {
    pub interner: Interner,
    pub types: TypeContext,
    pub decls: Declarations,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            interner: Interner::new(),
            types: TypeContext::new(),
            decls: Declarations::new(),
        }
    }

    pub fn sym(&mut self, name: &str) -> Symbol {
        self.interner.intern(name)
    }

    pub fn param(&mut self, name: &str, ty: TypeId) -> Param {
        Param::new(self.interner.intern(name), ty)
    }

    pub fn function(&mut self, name: &str, params: Vec<Param>, ret: TypeId) -> FunctionId {
        let name = self.interner.intern(name);
        self.decls.add_function(Function::new(name, params, ret))
    }

    pub fn class(&mut self, name: &str, kind: ClassKind) -> ClassId {
        let name = self.interner.intern(name);
        self.decls.add_class(Class::new(name, kind))
    }

    pub fn variable(&mut self, name: &str, ty: TypeId) -> VariableId {
        let name = self.interner.intern(name);
        self.decls.add_variable(Variable {
            name,
            ty,
            is_mutable: true,
        })
    }

    pub fn lowerer(&self) -> Lowerer<'_> {
        Lowerer::new(&self.decls, &self.types, &self.interner, "test.naru")
    }

    /// A reference to a declared function.
    pub fn function_ref(&self, function: FunctionId) -> Reference {
        Reference::new(
            self.decls.function(function).name,
            ResolvedTarget::Function(function),
            span(0),
        )
    }

    pub fn int_lit(&self, value: i64) -> Expr {
        Expr::new(ExprKind::IntLiteral(value), self.types.int(), span(90))
    }

    /// A read of a declared variable (receiver-less access).
    pub fn var_read(&self, variable: VariableId) -> Expr {
        let decl = self.decls.variable(variable);
        let reference = Reference::new(decl.name, ResolvedTarget::Variable(variable), span(91));
        Expr::new(
            ExprKind::Access(Box::new(Access::bare(reference))),
            decl.ty,
            span(91),
        )
    }

    /// A bare zero-argument call to `function` (side-effecting by
    /// construction, useful for reordering tests).
    pub fn call_of(&self, function: FunctionId) -> Expr {
        let decl = self.decls.function(function);
        Expr::new(
            ExprKind::Call(Box::new(naru_frontend::Call {
                access: Access::bare(self.function_ref(function)),
                type_args: Vec::new(),
                args: Vec::new(),
                mapping: None,
            })),
            decl.return_ty,
            span(92),
        )
    }

    /// A call expression over an access with positional arguments.
    pub fn call_expr(&self, access: Access, args: Vec<Argument>, ty: TypeId) -> Expr {
        Expr::new(
            ExprKind::Call(Box::new(naru_frontend::Call {
                access,
                type_args: Vec::new(),
                args,
                mapping: None,
            })),
            ty,
            span(93),
        )
    }
}
