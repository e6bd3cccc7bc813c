//! Naru Frontend IR
//!
//! The semantically-resolved, typed tree that lowering consumes, together
//! with its supporting tables:
//! - Source spans and string interning
//! - The type context (interned types)
//! - Declaration tables (functions, constructors, properties, fields,
//!   enum entries, variables, classes)
//! - The resolved expression tree, where every reference already carries
//!   the entity it denotes
//!
//! Nothing in this crate performs resolution; trees arrive here with
//! resolution already done. Lowering reads these structures and never
//! mutates them.

pub mod decl;
pub mod interner;
pub mod span;
pub mod tree;
pub mod types;

pub use decl::{
    Class, ClassId, ClassKind, Constructor, ConstructorId, Declarations, EnumEntry, EnumEntryId,
    Field, FieldId, Function, FunctionId, LocalProperty, LocalPropertyId, Param, Property,
    PropertyId, Variable, VariableId,
};
pub use interner::{Interner, Symbol};
pub use span::Span;
pub use tree::{
    Access, AnnotationCall, Argument, ArgumentMapping, Assignment, Call, CallableRef, Expr,
    ExprKind, Qualifier, ReceiverSlot, Reference, ResolvedTarget, SuperRef,
};
pub use types::{PrimitiveType, TypeContext, TypeId, TypeKind};
