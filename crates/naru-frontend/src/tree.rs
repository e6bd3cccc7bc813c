//! Resolved expression tree
//!
//! Frontend expressions after resolution: every reference carries the
//! backend entity it denotes, every expression carries its static type
//! and source span. This is the input shape for lowering; no name lookup
//! happens past this point.

use crate::decl::{
    ClassId, ConstructorId, EnumEntryId, FieldId, FunctionId, LocalPropertyId, PropertyId,
    VariableId,
};
use crate::interner::{Interner, Symbol};
use crate::span::Span;
use crate::types::TypeId;

/// What a resolved reference denotes.
///
/// Dispatch in lowering is an exhaustive match over this union; adding a
/// variant forces every dispatch site to handle it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedTarget {
    Function(FunctionId),
    Constructor(ConstructorId),
    Property(PropertyId),
    Field(FieldId),
    LocalProperty(LocalPropertyId),
    EnumEntry(EnumEntryId),
    Variable(VariableId),
    /// Resolution failed; lowering degrades to an error node.
    Unresolved,
}

/// A use of a name: the callee of a call, the target of an assignment,
/// or the target of a callable reference.
#[derive(Debug, Clone, PartialEq)]
pub struct Reference {
    pub name: Symbol,
    pub target: ResolvedTarget,
    pub span: Span,
    /// True when the reference itself denotes `super`; such an access
    /// lowers to its receiver instead of a call.
    pub is_super: bool,
}

impl Reference {
    pub fn new(name: Symbol, target: ResolvedTarget, span: Span) -> Self {
        Self {
            name,
            target,
            span,
            is_super: false,
        }
    }
}

/// How resolution filled a receiver slot of an access.
#[derive(Debug, Clone, PartialEq)]
pub enum ReceiverSlot {
    /// The target does not take this receiver, or none was found.
    None,
    /// The slot is fed by the access's explicit (syntactic) receiver;
    /// lowering must evaluate that receiver only once.
    Explicit,
    /// Resolution synthesized an implicit receiver expression.
    Implicit(Box<Expr>),
}

impl ReceiverSlot {
    pub fn is_none(&self) -> bool {
        matches!(self, ReceiverSlot::None)
    }
}

/// A resolved qualified access: reference plus receiver information.
#[derive(Debug, Clone, PartialEq)]
pub struct Access {
    pub callee: Reference,
    /// The receiver written at the call site, if any.
    pub explicit_receiver: Option<Box<Expr>>,
    pub dispatch_receiver: ReceiverSlot,
    pub extension_receiver: ReceiverSlot,
}

impl Access {
    /// An access with no receivers at all.
    pub fn bare(callee: Reference) -> Self {
        Self {
            callee,
            explicit_receiver: None,
            dispatch_receiver: ReceiverSlot::None,
            extension_receiver: ReceiverSlot::None,
        }
    }
}

/// One call-site argument, possibly named and possibly a spread.
#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
    pub value: Expr,
    pub name: Option<Symbol>,
    pub is_spread: bool,
}

impl Argument {
    pub fn positional(value: Expr) -> Self {
        Self {
            value,
            name: None,
            is_spread: false,
        }
    }

    pub fn named(name: Symbol, value: Expr) -> Self {
        Self {
            value,
            name: Some(name),
            is_spread: false,
        }
    }
}

/// The resolved argument-to-parameter mapping of a call.
///
/// Pairs of (argument index, parameter index), listed in source argument
/// order. A vararg parameter may appear in several pairs; every other
/// parameter appears at most once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentMapping {
    pub pairs: Vec<(usize, usize)>,
}

impl ArgumentMapping {
    pub fn new(pairs: Vec<(usize, usize)>) -> Self {
        Self { pairs }
    }

    /// Whether the parameter indices decrease anywhere when the mapping
    /// is walked in source order. A non-monotonic mapping means slot
    /// order differs from evaluation order, so side-effecting arguments
    /// must be hoisted into temporaries.
    pub fn needs_reordering(&self) -> bool {
        self.pairs
            .windows(2)
            .any(|pair| pair[1].1 < pair[0].1)
    }
}

/// A function/constructor/property invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub access: Access,
    pub type_args: Vec<TypeId>,
    pub args: Vec<Argument>,
    /// Present when named arguments forced resolution to record an
    /// explicit mapping; absent means strictly positional.
    pub mapping: Option<ArgumentMapping>,
}

/// An assignment through a resolved reference.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub access: Access,
    pub value: Expr,
}

/// An annotation-style constructor invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationCall {
    pub callee: Reference,
    /// The annotated class; searched for a primary constructor when the
    /// callee did not resolve to one.
    pub class: ClassId,
    pub args: Vec<Argument>,
    pub mapping: Option<ArgumentMapping>,
}

/// A callable reference expression (`::name`).
#[derive(Debug, Clone, PartialEq)]
pub struct CallableRef {
    pub access: Access,
    pub type_args: Vec<TypeId>,
    /// The functional type the reference must conform to; shape
    /// mismatches are delegated to the reference adaptation collaborator.
    pub expected_ty: TypeId,
}

/// A qualifier that resolved to a class, used in receiver position for
/// singleton and companion objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Qualifier {
    /// The class the qualifier resolved to (possibly a companion).
    pub resolved: ClassId,
    /// The class the source text names.
    pub nominal: ClassId,
}

/// A `super` receiver expression.
#[derive(Debug, Clone, PartialEq)]
pub struct SuperRef {
    /// The enclosing instance the super access dispatches on.
    pub instance: Box<Expr>,
    /// Candidate supertypes visible to the reference; a single concrete
    /// class determines the super qualifier directly.
    pub supertypes: Vec<TypeId>,
}

/// Expression payloads.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    IntLiteral(i64),
    BoolLiteral(bool),
    StringLiteral(Symbol),
    UnitLiteral,
    /// An anonymous function value.
    Lambda { function: FunctionId },
    Access(Box<Access>),
    Call(Box<Call>),
    Assignment(Box<Assignment>),
    AnnotationCall(Box<AnnotationCall>),
    CallableRef(Box<CallableRef>),
    Qualifier(Qualifier),
    Super(Box<SuperRef>),
}

/// A resolved, typed expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub ty: TypeId,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, ty: TypeId, span: Span) -> Self {
        Self { kind, ty, span }
    }

    /// Short human-readable rendering used when wrapping internal errors
    /// with context.
    pub fn describe(&self, interner: &Interner) -> String {
        match &self.kind {
            ExprKind::IntLiteral(v) => format!("integer literal {v}"),
            ExprKind::BoolLiteral(v) => format!("boolean literal {v}"),
            ExprKind::StringLiteral(_) => "string literal".to_string(),
            ExprKind::UnitLiteral => "unit literal".to_string(),
            ExprKind::Lambda { .. } => "lambda expression".to_string(),
            ExprKind::Access(access) => {
                format!("access to '{}'", interner.resolve(access.callee.name))
            }
            ExprKind::Call(call) => {
                format!("call to '{}'", interner.resolve(call.access.callee.name))
            }
            ExprKind::Assignment(assign) => {
                format!(
                    "assignment to '{}'",
                    interner.resolve(assign.access.callee.name)
                )
            }
            ExprKind::AnnotationCall(ann) => {
                format!("annotation call '{}'", interner.resolve(ann.callee.name))
            }
            ExprKind::CallableRef(cref) => {
                format!(
                    "callable reference to '{}'",
                    interner.resolve(cref.access.callee.name)
                )
            }
            ExprKind::Qualifier(_) => "object qualifier".to_string(),
            ExprKind::Super(_) => "super reference".to_string(),
        }
    }
}
