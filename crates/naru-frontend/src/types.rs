//! Type context
//!
//! Types are interned: structurally equal types share one `TypeId`. The
//! context pre-interns the primitives so well-known ids are available
//! without lookups, mirroring how declarations reference types everywhere
//! else in the pipeline.

use crate::decl::ClassId;
use rustc_hash::FxHashMap;
use std::fmt;

/// Unique identifier for an interned type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeId(u32);

impl TypeId {
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    pub const fn as_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "type{}", self.0)
    }
}

/// Built-in value types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    Int,
    Boolean,
    String,
    /// The single-value result type of statements and assignments.
    Unit,
    /// The empty type of expressions that never produce a value.
    Nothing,
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrimitiveType::Int => write!(f, "Int"),
            PrimitiveType::Boolean => write!(f, "Boolean"),
            PrimitiveType::String => write!(f, "String"),
            PrimitiveType::Unit => write!(f, "Unit"),
            PrimitiveType::Nothing => write!(f, "Nothing"),
        }
    }
}

/// Structure of an interned type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Primitive(PrimitiveType),
    /// A class, interface, object, enum, or annotation type.
    Class {
        class: ClassId,
        type_args: Vec<TypeId>,
    },
    /// A function type `(params) -> ret`, possibly suspending.
    Function {
        params: Vec<TypeId>,
        ret: TypeId,
        is_suspend: bool,
    },
    /// Placeholder produced for unresolvable type references.
    Error,
}

/// Interning arena for types.
///
/// The primitives and the error type are interned at construction, in a
/// fixed order, so their ids are stable.
#[derive(Debug, Clone)]
pub struct TypeContext {
    types: Vec<TypeKind>,
    map: FxHashMap<TypeKind, TypeId>,
}

impl TypeContext {
    pub fn new() -> Self {
        let mut ctx = Self {
            types: Vec::new(),
            map: FxHashMap::default(),
        };
        // Pre-interned in declaration order: Int=0, Boolean=1, String=2,
        // Unit=3, Nothing=4, Error=5.
        ctx.intern(TypeKind::Primitive(PrimitiveType::Int));
        ctx.intern(TypeKind::Primitive(PrimitiveType::Boolean));
        ctx.intern(TypeKind::Primitive(PrimitiveType::String));
        ctx.intern(TypeKind::Primitive(PrimitiveType::Unit));
        ctx.intern(TypeKind::Primitive(PrimitiveType::Nothing));
        ctx.intern(TypeKind::Error);
        ctx
    }

    /// Intern a type, returning the existing id for structurally equal
    /// types.
    pub fn intern(&mut self, kind: TypeKind) -> TypeId {
        if let Some(&id) = self.map.get(&kind) {
            return id;
        }
        let id = TypeId::new(self.types.len() as u32);
        self.types.push(kind.clone());
        self.map.insert(kind, id);
        id
    }

    /// Look up the structure of an interned type.
    pub fn kind(&self, id: TypeId) -> &TypeKind {
        &self.types[id.as_u32() as usize]
    }

    pub fn int(&self) -> TypeId {
        TypeId::new(0)
    }

    pub fn boolean(&self) -> TypeId {
        TypeId::new(1)
    }

    pub fn string(&self) -> TypeId {
        TypeId::new(2)
    }

    pub fn unit(&self) -> TypeId {
        TypeId::new(3)
    }

    pub fn nothing(&self) -> TypeId {
        TypeId::new(4)
    }

    pub fn error(&self) -> TypeId {
        TypeId::new(5)
    }

    /// Intern a class type with no type arguments.
    pub fn class(&mut self, class: ClassId) -> TypeId {
        self.intern(TypeKind::Class {
            class,
            type_args: Vec::new(),
        })
    }

    /// Intern a function type.
    pub fn function(&mut self, params: Vec<TypeId>, ret: TypeId, is_suspend: bool) -> TypeId {
        self.intern(TypeKind::Function {
            params,
            ret,
            is_suspend,
        })
    }

    /// Whether `id` is a function type (suspending or not).
    pub fn is_function(&self, id: TypeId) -> bool {
        matches!(self.kind(id), TypeKind::Function { .. })
    }

    /// Whether `id` is a suspending function type.
    pub fn is_suspend_function(&self, id: TypeId) -> bool {
        matches!(self.kind(id), TypeKind::Function { is_suspend, .. } if *is_suspend)
    }

    /// The class a type names, if it is a class type.
    pub fn class_of(&self, id: TypeId) -> Option<ClassId> {
        match self.kind(id) {
            TypeKind::Class { class, .. } => Some(*class),
            _ => None,
        }
    }
}

impl Default for TypeContext {
    fn default() -> Self {
        Self::new()
    }
}
