//! Backend IR expressions
//!
//! Tree-shaped nodes built by lowering. Call-like nodes are sized to
//! their target's declared shape up front (`Vec<Option<_>>` slots filled
//! by the binders); sequences introduced for evaluation-order reasons are
//! blocks whose trailing expression is the wrapped call.

use naru_frontend::{
    ClassId, ConstructorId, EnumEntryId, FieldId, FunctionId, LocalPropertyId, PropertyId, TypeId,
    VariableId,
};
use std::fmt;

/// Identifier of a lowering-introduced temporary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TempId(u32);

impl TempId {
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    pub const fn as_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for TempId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tmp{}", self.0)
    }
}

/// Semantic shape tag consumed by later passes.
///
/// The tag records what source construct a node came from when the node
/// kind alone does not say (a getter call vs. a plain function call, a
/// delegate storage read vs. an ordinary field read).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    PropertyGet,
    PropertySet,
    LocalPropertyGet,
    LocalPropertySet,
    /// Read or write of a delegate's storage rather than a property
    /// value.
    DelegateFieldAccess,
    /// Block introduced to preserve argument evaluation order.
    ArgumentsReordered,
}

/// Conversion operators applied to arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeOperator {
    /// Wrap a function-shaped value to satisfy a single-abstract-method
    /// interface parameter.
    SamConversion,
    /// Wrap an ordinary function value where a suspending one is
    /// expected.
    SuspendConversion,
}

/// Constant values.
#[derive(Debug, Clone, PartialEq)]
pub enum Const {
    Int(i64),
    Boolean(bool),
    String(String),
    Unit,
}

/// What a value read/write refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueRef {
    /// A frontend-declared value or variable.
    Variable(VariableId),
    /// A lowering-introduced temporary.
    Temp(TempId),
}

/// One contribution to a vararg slot.
#[derive(Debug, Clone, PartialEq)]
pub enum VarargElement {
    /// A scalar element appended as-is.
    Element(Expr),
    /// An explicit spread (`*xs`) merged element-wise.
    Spread(Expr),
    /// A scalar supplied in named form; later passes treat it as a
    /// spread array contribution rather than a scalar append.
    NamedElement(Expr),
}

/// The merged contents of one vararg parameter slot. An empty element
/// list is the explicit empty-vararg placeholder.
#[derive(Debug, Clone, PartialEq)]
pub struct Vararg {
    pub elem_ty: TypeId,
    pub elements: Vec<VarargElement>,
}

impl Vararg {
    pub fn empty(elem_ty: TypeId) -> Self {
        Self {
            elem_ty,
            elements: Vec::new(),
        }
    }
}

/// A call to a function (including property accessors).
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub function: FunctionId,
    pub ty: TypeId,
    pub origin: Option<Origin>,
    pub type_args: Vec<Option<TypeId>>,
    pub args: Vec<Option<Expr>>,
    pub dispatch_receiver: Option<Box<Expr>>,
    pub extension_receiver: Option<Box<Expr>>,
    /// The supertype class a `super`-qualified call dispatches through.
    pub super_qualifier: Option<ClassId>,
}

impl Call {
    /// A call skeleton with unfilled slots sized to the target's shape.
    pub fn with_shape(
        function: FunctionId,
        ty: TypeId,
        origin: Option<Origin>,
        type_params: usize,
        value_params: usize,
    ) -> Self {
        Self {
            function,
            ty,
            origin,
            type_args: vec![None; type_params],
            args: vec![None; value_params],
            dispatch_receiver: None,
            extension_receiver: None,
            super_qualifier: None,
        }
    }
}

/// A constructor invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstructorCall {
    pub constructor: ConstructorId,
    pub class: ClassId,
    pub ty: TypeId,
    pub type_args: Vec<Option<TypeId>>,
    pub args: Vec<Option<Expr>>,
    pub dispatch_receiver: Option<Box<Expr>>,
}

impl ConstructorCall {
    /// A constructor-call skeleton with unfilled slots.
    pub fn with_shape(
        constructor: ConstructorId,
        class: ClassId,
        ty: TypeId,
        type_params: usize,
        value_params: usize,
    ) -> Self {
        Self {
            constructor,
            class,
            ty,
            type_args: vec![None; type_params],
            args: vec![None; value_params],
            dispatch_receiver: None,
        }
    }
}

/// A direct field read.
#[derive(Debug, Clone, PartialEq)]
pub struct GetField {
    pub field: FieldId,
    pub ty: TypeId,
    pub origin: Option<Origin>,
    pub receiver: Option<Box<Expr>>,
    pub super_qualifier: Option<ClassId>,
}

/// A direct field write.
#[derive(Debug, Clone, PartialEq)]
pub struct SetField {
    pub field: FieldId,
    pub ty: TypeId,
    pub origin: Option<Origin>,
    pub receiver: Option<Box<Expr>>,
    pub super_qualifier: Option<ClassId>,
    pub value: Box<Expr>,
}

/// A read of a value, variable, or temporary.
#[derive(Debug, Clone, PartialEq)]
pub struct GetValue {
    pub target: ValueRef,
    pub ty: TypeId,
    pub origin: Option<Origin>,
}

/// A write to a variable or temporary.
#[derive(Debug, Clone, PartialEq)]
pub struct SetValue {
    pub target: ValueRef,
    pub ty: TypeId,
    pub origin: Option<Origin>,
    pub value: Box<Expr>,
}

/// A read of an enum entry.
#[derive(Debug, Clone, PartialEq)]
pub struct GetEnumValue {
    pub entry: EnumEntryId,
    pub ty: TypeId,
}

/// A read of a singleton object instance.
#[derive(Debug, Clone, PartialEq)]
pub struct GetObjectValue {
    pub class: ClassId,
    pub ty: TypeId,
}

/// Diagnostic placeholder for a call that could not be lowered.
///
/// Sub-expressions are retained so diagnostics and later passes can
/// still inspect partial structure.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorCall {
    pub message: String,
    pub ty: TypeId,
    args: Vec<Expr>,
}

impl ErrorCall {
    pub fn new(message: impl Into<String>, ty: TypeId) -> Self {
        Self {
            message: message.into(),
            ty,
            args: Vec::new(),
        }
    }

    /// Attach a lowered sub-expression. Append-only: attached arguments
    /// are never dropped or replaced.
    pub fn append_argument(&mut self, arg: Expr) {
        self.args.push(arg);
    }

    pub fn args(&self) -> &[Expr] {
        &self.args
    }
}

/// What a function reference points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallableTarget {
    Function(FunctionId),
    Constructor(ConstructorId),
}

/// A reference to a function or constructor.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionReference {
    pub target: CallableTarget,
    pub ty: TypeId,
    pub type_args: Vec<Option<TypeId>>,
    pub dispatch_receiver: Option<Box<Expr>>,
    pub extension_receiver: Option<Box<Expr>>,
}

/// A reference to a property, carrying whichever accessors and backing
/// field the property declares.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyReference {
    pub property: Option<PropertyId>,
    pub getter: Option<FunctionId>,
    pub setter: Option<FunctionId>,
    pub field: Option<FieldId>,
    pub ty: TypeId,
    pub type_args: Vec<Option<TypeId>>,
    pub dispatch_receiver: Option<Box<Expr>>,
    pub extension_receiver: Option<Box<Expr>>,
}

/// A reference to a local delegated property.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalPropertyReference {
    pub property: LocalPropertyId,
    pub delegate: VariableId,
    pub getter: FunctionId,
    pub setter: Option<FunctionId>,
    pub ty: TypeId,
}

/// A single-assignment local introduced by lowering.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalVar {
    pub id: TempId,
    /// Debug name, derived from the parameter the temporary feeds.
    pub name: String,
    pub ty: TypeId,
    pub init: Expr,
}

/// A block statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Local(LocalVar),
    Expr(Expr),
}

/// A statement sequence whose trailing expression is the block's value.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub origin: Option<Origin>,
    pub ty: TypeId,
    pub stmts: Vec<Stmt>,
}

impl Block {
    pub fn new(origin: Option<Origin>, ty: TypeId) -> Self {
        Self {
            origin,
            ty,
            stmts: Vec::new(),
        }
    }

    /// The block's value-producing trailing expression.
    pub fn result(&self) -> Option<&Expr> {
        match self.stmts.last() {
            Some(Stmt::Expr(e)) => Some(e),
            _ => None,
        }
    }

    pub fn result_mut(&mut self) -> Option<&mut Expr> {
        match self.stmts.last_mut() {
            Some(Stmt::Expr(e)) => Some(e),
            _ => None,
        }
    }
}

/// An argument conversion wrapper.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeOp {
    pub op: TypeOperator,
    pub ty: TypeId,
    pub argument: Box<Expr>,
}

/// A backend expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Const { value: Const, ty: TypeId },
    /// An anonymous function value.
    FunctionExpr { function: FunctionId, ty: TypeId },
    Call(Call),
    ConstructorCall(ConstructorCall),
    GetField(GetField),
    SetField(SetField),
    GetValue(GetValue),
    SetValue(SetValue),
    GetEnumValue(GetEnumValue),
    GetObjectValue(GetObjectValue),
    ErrorCall(ErrorCall),
    FunctionReference(FunctionReference),
    PropertyReference(PropertyReference),
    LocalPropertyReference(LocalPropertyReference),
    Block(Block),
    TypeOp(TypeOp),
    Vararg(Vararg),
}

impl Expr {
    /// The node's result type.
    pub fn ty(&self) -> TypeId {
        match self {
            Expr::Const { ty, .. } => *ty,
            Expr::FunctionExpr { ty, .. } => *ty,
            Expr::Call(n) => n.ty,
            Expr::ConstructorCall(n) => n.ty,
            Expr::GetField(n) => n.ty,
            Expr::SetField(n) => n.ty,
            Expr::GetValue(n) => n.ty,
            Expr::SetValue(n) => n.ty,
            Expr::GetEnumValue(n) => n.ty,
            Expr::GetObjectValue(n) => n.ty,
            Expr::ErrorCall(n) => n.ty,
            Expr::FunctionReference(n) => n.ty,
            Expr::PropertyReference(n) => n.ty,
            Expr::LocalPropertyReference(n) => n.ty,
            Expr::Block(n) => n.ty,
            Expr::TypeOp(n) => n.ty,
            Expr::Vararg(n) => n.elem_ty,
        }
    }

    /// Whether re-evaluating this node can observe or produce effects.
    ///
    /// Drives argument reordering: effect-free arguments go straight
    /// into their slot, everything else is hoisted into a temporary
    /// evaluated in source order.
    pub fn has_no_side_effects(&self) -> bool {
        match self {
            Expr::Const { .. }
            | Expr::FunctionExpr { .. }
            | Expr::GetValue(_)
            | Expr::GetEnumValue(_)
            | Expr::GetObjectValue(_)
            | Expr::FunctionReference(_)
            | Expr::LocalPropertyReference(_) => true,
            Expr::TypeOp(op) => op.argument.has_no_side_effects(),
            _ => false,
        }
    }
}
