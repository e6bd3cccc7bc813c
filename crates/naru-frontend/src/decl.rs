//! Declaration tables
//!
//! The externally-owned symbol tables lowering reads: every declaration a
//! resolved reference can denote, with exactly the shape data the backend
//! node construction needs (parameter counts, accessor presence, backing
//! fields, receiver expectations). Lowering treats these tables as an
//! effectively-immutable view and never writes to them.

use crate::interner::Symbol;
use crate::types::TypeId;

macro_rules! decl_id {
    ($(#[$doc:meta])* $name:ident, $prefix:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(u32);

        impl $name {
            pub const fn new(id: u32) -> Self {
                Self(id)
            }

            pub const fn as_u32(&self) -> u32 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }
    };
}

decl_id!(
    /// Identifier of a function declaration (including accessors).
    FunctionId,
    "fn"
);
decl_id!(
    /// Identifier of a constructor declaration.
    ConstructorId,
    "ctor"
);
decl_id!(
    /// Identifier of a property declaration.
    PropertyId,
    "prop"
);
decl_id!(
    /// Identifier of a field declaration.
    FieldId,
    "field"
);
decl_id!(
    /// Identifier of a local delegated property.
    LocalPropertyId,
    "localprop"
);
decl_id!(
    /// Identifier of an enum entry.
    EnumEntryId,
    "entry"
);
decl_id!(
    /// Identifier of a value or variable declaration.
    VariableId,
    "var"
);
decl_id!(
    /// Identifier of a class-like declaration.
    ClassId,
    "class"
);

/// A declared value parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: Symbol,
    /// For vararg parameters this is the per-element type.
    pub ty: TypeId,
    pub is_vararg: bool,
    pub has_default: bool,
}

impl Param {
    pub fn new(name: Symbol, ty: TypeId) -> Self {
        Self {
            name,
            ty,
            is_vararg: false,
            has_default: false,
        }
    }

    pub fn vararg(name: Symbol, elem_ty: TypeId) -> Self {
        Self {
            name,
            ty: elem_ty,
            is_vararg: true,
            has_default: false,
        }
    }
}

/// A function declaration (free function, member, or property accessor).
#[derive(Debug, Clone)]
pub struct Function {
    pub name: Symbol,
    pub params: Vec<Param>,
    pub type_params: u32,
    pub return_ty: TypeId,
    /// The class this function is declared in, if any.
    pub parent_class: Option<ClassId>,
    /// Static members have a parent class but no dispatch receiver.
    pub is_static: bool,
    /// Present when the function is an extension; the receiver's type.
    pub extension_receiver: Option<TypeId>,
    /// Synthetic single-abstract-method adapter constructor.
    pub is_sam_constructor: bool,
    pub is_suspend: bool,
}

impl Function {
    pub fn new(name: Symbol, params: Vec<Param>, return_ty: TypeId) -> Self {
        Self {
            name,
            params,
            type_params: 0,
            return_ty,
            parent_class: None,
            is_static: false,
            extension_receiver: None,
            is_sam_constructor: false,
            is_suspend: false,
        }
    }

    /// Whether call sites must supply an instance receiver.
    pub fn has_dispatch_receiver(&self) -> bool {
        self.parent_class.is_some() && !self.is_static
    }

    pub fn has_extension_receiver(&self) -> bool {
        self.extension_receiver.is_some()
    }
}

/// A constructor declaration.
#[derive(Debug, Clone)]
pub struct Constructor {
    pub class: ClassId,
    pub params: Vec<Param>,
    pub type_params: u32,
    pub is_primary: bool,
}

/// A property declaration with optional accessors and backing field.
#[derive(Debug, Clone)]
pub struct Property {
    pub name: Symbol,
    pub ty: TypeId,
    pub getter: Option<FunctionId>,
    pub setter: Option<FunctionId>,
    pub backing_field: Option<FieldId>,
    pub parent_class: Option<ClassId>,
    pub is_static: bool,
    pub extension_receiver: Option<TypeId>,
    /// Delegated properties read through delegate storage.
    pub is_delegated: bool,
}

impl Property {
    pub fn new(name: Symbol, ty: TypeId) -> Self {
        Self {
            name,
            ty,
            getter: None,
            setter: None,
            backing_field: None,
            parent_class: None,
            is_static: false,
            extension_receiver: None,
            is_delegated: false,
        }
    }
}

/// A field declaration (a property's backing storage, or raw storage).
#[derive(Debug, Clone)]
pub struct Field {
    pub name: Symbol,
    pub ty: TypeId,
    pub parent_class: Option<ClassId>,
    pub is_static: bool,
    /// Whether this field stores a property delegate rather than the
    /// property value itself.
    pub is_delegate: bool,
}

/// A local delegated property with a synthesized getter (and setter for
/// mutable ones) reading through a delegate variable.
#[derive(Debug, Clone)]
pub struct LocalProperty {
    pub name: Symbol,
    pub ty: TypeId,
    pub getter: FunctionId,
    pub setter: Option<FunctionId>,
    pub delegate: VariableId,
}

/// An enum entry declaration.
#[derive(Debug, Clone)]
pub struct EnumEntry {
    pub name: Symbol,
    pub owner: ClassId,
    pub ty: TypeId,
}

/// A value or variable declaration.
#[derive(Debug, Clone)]
pub struct Variable {
    pub name: Symbol,
    pub ty: TypeId,
    pub is_mutable: bool,
}

/// Kinds of class-like declarations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassKind {
    Class,
    Interface,
    /// A singleton object (including companion objects).
    Object,
    Enum,
    Annotation,
}

/// A class-like declaration.
#[derive(Debug, Clone)]
pub struct Class {
    pub name: Symbol,
    pub kind: ClassKind,
    pub constructors: Vec<ConstructorId>,
    pub supertypes: Vec<TypeId>,
    pub companion: Option<ClassId>,
}

impl Class {
    pub fn new(name: Symbol, kind: ClassKind) -> Self {
        Self {
            name,
            kind,
            constructors: Vec::new(),
            supertypes: Vec::new(),
            companion: None,
        }
    }
}

/// Arena-style store for all declarations a translation unit can
/// reference.
///
/// Ids are indices into the arenas; lookups with a foreign id panic,
/// which is an invariant violation rather than a user error.
#[derive(Debug, Clone, Default)]
pub struct Declarations {
    functions: Vec<Function>,
    constructors: Vec<Constructor>,
    properties: Vec<Property>,
    fields: Vec<Field>,
    local_properties: Vec<LocalProperty>,
    enum_entries: Vec<EnumEntry>,
    variables: Vec<Variable>,
    classes: Vec<Class>,
}

impl Declarations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_function(&mut self, function: Function) -> FunctionId {
        let id = FunctionId::new(self.functions.len() as u32);
        self.functions.push(function);
        id
    }

    pub fn add_constructor(&mut self, constructor: Constructor) -> ConstructorId {
        let id = ConstructorId::new(self.constructors.len() as u32);
        let class = constructor.class;
        self.constructors.push(constructor);
        self.classes[class.as_u32() as usize].constructors.push(id);
        id
    }

    pub fn add_property(&mut self, property: Property) -> PropertyId {
        let id = PropertyId::new(self.properties.len() as u32);
        self.properties.push(property);
        id
    }

    pub fn add_field(&mut self, field: Field) -> FieldId {
        let id = FieldId::new(self.fields.len() as u32);
        self.fields.push(field);
        id
    }

    pub fn add_local_property(&mut self, property: LocalProperty) -> LocalPropertyId {
        let id = LocalPropertyId::new(self.local_properties.len() as u32);
        self.local_properties.push(property);
        id
    }

    pub fn add_enum_entry(&mut self, entry: EnumEntry) -> EnumEntryId {
        let id = EnumEntryId::new(self.enum_entries.len() as u32);
        self.enum_entries.push(entry);
        id
    }

    pub fn add_variable(&mut self, variable: Variable) -> VariableId {
        let id = VariableId::new(self.variables.len() as u32);
        self.variables.push(variable);
        id
    }

    pub fn add_class(&mut self, class: Class) -> ClassId {
        let id = ClassId::new(self.classes.len() as u32);
        self.classes.push(class);
        id
    }

    pub fn function(&self, id: FunctionId) -> &Function {
        &self.functions[id.as_u32() as usize]
    }

    pub fn constructor(&self, id: ConstructorId) -> &Constructor {
        &self.constructors[id.as_u32() as usize]
    }

    pub fn property(&self, id: PropertyId) -> &Property {
        &self.properties[id.as_u32() as usize]
    }

    pub fn field(&self, id: FieldId) -> &Field {
        &self.fields[id.as_u32() as usize]
    }

    pub fn local_property(&self, id: LocalPropertyId) -> &LocalProperty {
        &self.local_properties[id.as_u32() as usize]
    }

    pub fn enum_entry(&self, id: EnumEntryId) -> &EnumEntry {
        &self.enum_entries[id.as_u32() as usize]
    }

    pub fn variable(&self, id: VariableId) -> &Variable {
        &self.variables[id.as_u32() as usize]
    }

    pub fn class(&self, id: ClassId) -> &Class {
        &self.classes[id.as_u32() as usize]
    }

    /// The primary constructor of `class`, if it declares one.
    pub fn primary_constructor(&self, class: ClassId) -> Option<ConstructorId> {
        self.class(class)
            .constructors
            .iter()
            .copied()
            .find(|&id| self.constructor(id).is_primary)
    }
}
