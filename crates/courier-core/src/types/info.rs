//! Live type and member handles.
//!
//! `Type` and `Member` are cheap `Arc` clones. Members refer to other types
//! through descriptors, so self-referencing types (a `String` method
//! returning `String`) need no cycles.

use std::fmt;
use std::sync::Arc;

use crate::catalog::SymbolError;
use crate::value::{InvokeError, Value};

use super::descriptor::{MemberKind, TypeDescriptor, module_simple_name};
use super::universe::is_std_module;

pub type Type = Arc<TypeInfo>;
pub type Member = Arc<MemberInfo>;

/// Native implementation of a member: `(receiver, arguments) -> value`.
///
/// Static members and constructors receive `None` as the receiver.
pub type NativeFn =
    Arc<dyn Fn(Option<&Value>, &[Value]) -> Result<Value, InvokeError> + Send + Sync>;

/// Built-in scalar types of the standard module.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Primitive {
    Object,
    Void,
    Boolean,
    Byte,
    Int16,
    Int32,
    Int64,
    Single,
    Double,
    String,
    DateTime,
}

impl Primitive {
    pub const ALL: [Primitive; 11] = [
        Primitive::Object,
        Primitive::Void,
        Primitive::Boolean,
        Primitive::Byte,
        Primitive::Int16,
        Primitive::Int32,
        Primitive::Int64,
        Primitive::Single,
        Primitive::Double,
        Primitive::String,
        Primitive::DateTime,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Primitive::Object => "Object",
            Primitive::Void => "Void",
            Primitive::Boolean => "Boolean",
            Primitive::Byte => "Byte",
            Primitive::Int16 => "Int16",
            Primitive::Int32 => "Int32",
            Primitive::Int64 => "Int64",
            Primitive::Single => "Single",
            Primitive::Double => "Double",
            Primitive::String => "String",
            Primitive::DateTime => "DateTime",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }

    /// Primitive named by a standard-module descriptor.
    pub fn from_descriptor(desc: &TypeDescriptor) -> Option<Self> {
        if !is_std_module(&desc.module) || !desc.generic_arguments.is_empty() {
            return None;
        }
        Self::from_name(&desc.type_name)
    }

    pub fn is_integral(self) -> bool {
        matches!(
            self,
            Primitive::Byte | Primitive::Int16 | Primitive::Int32 | Primitive::Int64
        )
    }

    pub fn is_floating(self) -> bool {
        matches!(self, Primitive::Single | Primitive::Double)
    }

    pub fn is_numeric(self) -> bool {
        self.is_integral() || self.is_floating()
    }

    pub fn descriptor(self) -> TypeDescriptor {
        TypeDescriptor::std(self.name())
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeKind {
    Primitive(Primitive),
    Record,
    Nullable,
    Array,
    List,
    Function,
    /// Holder of static members only (`Math`, `Enumerable`).
    Static,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Visibility {
    #[default]
    Public,
    NonPublic,
}

/// Where a member's value comes from.
#[derive(Clone)]
pub enum MemberBody {
    /// Named slot of a record value.
    Slot(String),
    Native(NativeFn),
}

impl fmt::Debug for MemberBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberBody::Slot(name) => f.debug_tuple("Slot").field(name).finish(),
            MemberBody::Native(_) => f.write_str("Native"),
        }
    }
}

/// A live type.
pub struct TypeInfo {
    pub(crate) descriptor: TypeDescriptor,
    pub(crate) kind: TypeKind,
    /// Generic parameter names of a generic definition (`["T"]`).
    pub(crate) generic_params: Vec<String>,
    /// Accepts any number of generic arguments (`Func<...>`).
    pub(crate) variadic: bool,
    pub(crate) members: Vec<Member>,
}

impl TypeInfo {
    pub(crate) fn new(descriptor: TypeDescriptor, kind: TypeKind) -> Self {
        Self {
            descriptor,
            kind,
            generic_params: Vec::new(),
            variadic: false,
            members: Vec::new(),
        }
    }

    pub fn descriptor(&self) -> &TypeDescriptor {
        &self.descriptor
    }

    pub fn name(&self) -> &str {
        &self.descriptor.type_name
    }

    pub fn module(&self) -> &str {
        &self.descriptor.module
    }

    pub fn module_name(&self) -> &str {
        module_simple_name(&self.descriptor.module)
    }

    pub fn kind(&self) -> &TypeKind {
        &self.kind
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn generic_arguments(&self) -> &[TypeDescriptor] {
        &self.descriptor.generic_arguments
    }

    pub fn generic_params(&self) -> &[String] {
        &self.generic_params
    }

    pub fn primitive(&self) -> Option<Primitive> {
        match self.kind {
            TypeKind::Primitive(p) => Some(p),
            _ => None,
        }
    }

    /// Primitive of `T` or `Nullable<T>`.
    pub fn underlying_primitive(&self) -> Option<Primitive> {
        match self.kind {
            TypeKind::Primitive(p) => Some(p),
            TypeKind::Nullable => self
                .generic_arguments()
                .first()
                .and_then(Primitive::from_descriptor),
            _ => None,
        }
    }

    pub fn is_primitive(&self, p: Primitive) -> bool {
        self.primitive() == Some(p)
    }

    pub fn is_generic_definition(&self) -> bool {
        (self.variadic || !self.generic_params.is_empty())
            && self.descriptor.generic_arguments.is_empty()
    }

    pub fn is_nullable(&self) -> bool {
        self.kind == TypeKind::Nullable
    }

    pub fn is_collection(&self) -> bool {
        matches!(self.kind, TypeKind::Array | TypeKind::List)
    }

    pub fn is_function(&self) -> bool {
        self.kind == TypeKind::Function
    }

    pub fn is_record(&self) -> bool {
        self.kind == TypeKind::Record
    }

    /// Whether `null` is a legal value of this type.
    pub fn admits_null(&self) -> bool {
        match self.kind {
            TypeKind::Primitive(p) => matches!(p, Primitive::Object | Primitive::String),
            TypeKind::Static => false,
            _ => true,
        }
    }

    /// Element type of `Nullable<T>`, `Array<T>` and `List<T>`.
    pub fn element(&self) -> Option<&TypeDescriptor> {
        match self.kind {
            TypeKind::Nullable | TypeKind::Array | TypeKind::List => {
                self.generic_arguments().first()
            }
            _ => None,
        }
    }

    /// Parameter and return types of a constructed function type.
    pub fn function_signature(&self) -> Option<(&[TypeDescriptor], &TypeDescriptor)> {
        if !self.is_function() {
            return None;
        }
        let (ret, params) = self.generic_arguments().split_last()?;
        Some((params, ret))
    }

    pub fn members_named<'a>(
        &'a self,
        name: &str,
        kind: MemberKind,
    ) -> impl Iterator<Item = &'a Member> {
        self.members
            .iter()
            .filter(move |m| m.kind == kind && m.name == name)
    }

    /// Public, non-indexed property with the given name.
    pub fn property(&self, name: &str) -> Option<&Member> {
        self.members_named(name, MemberKind::Property)
            .find(|m| m.visibility == Visibility::Public && m.parameters.is_empty())
    }

    /// Field with the given name, public or not.
    pub fn field(&self, name: &str) -> Option<&Member> {
        self.members_named(name, MemberKind::Field).next()
    }

    /// Indexer (`Item[...]`) property, if any.
    pub fn indexer(&self) -> Option<&Member> {
        self.members_named("Item", MemberKind::Property)
            .find(|m| !m.parameters.is_empty())
    }

    /// Build a constructed generic type from this definition.
    pub fn construct(&self, args: Vec<TypeDescriptor>) -> Result<TypeInfo, SymbolError> {
        if !self.is_generic_definition() {
            return Err(SymbolError::NotGeneric(self.descriptor.to_string()));
        }
        if !self.variadic && args.len() != self.generic_params.len() {
            return Err(SymbolError::GenericArity {
                name: self.descriptor.to_string(),
                expected: self.generic_params.len(),
                actual: args.len(),
            });
        }

        let descriptor = self.descriptor.clone().with_args(args);
        let members = self
            .members
            .iter()
            .map(|m| {
                Arc::new(m.substituted(
                    &descriptor,
                    &self.generic_params,
                    &descriptor.generic_arguments,
                ))
            })
            .collect();

        Ok(TypeInfo {
            descriptor,
            kind: self.kind.clone(),
            generic_params: self.generic_params.clone(),
            variadic: self.variadic,
            members,
        })
    }
}

impl fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeInfo")
            .field("descriptor", &self.descriptor)
            .field("kind", &self.kind)
            .field("members", &self.members.len())
            .finish()
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.descriptor, f)
    }
}

/// A live member.
#[derive(Clone, Debug)]
pub struct MemberInfo {
    pub(crate) declaring: TypeDescriptor,
    pub(crate) kind: MemberKind,
    pub(crate) name: String,
    pub(crate) signature: String,
    pub(crate) value_type: TypeDescriptor,
    pub(crate) parameters: Vec<TypeDescriptor>,
    pub(crate) is_static: bool,
    pub(crate) visibility: Visibility,
    pub(crate) generic_params: Vec<String>,
    pub(crate) generic_arguments: Vec<TypeDescriptor>,
    pub(crate) body: MemberBody,
}

impl MemberInfo {
    pub(crate) fn from_def(declaring: &TypeDescriptor, def: MemberDef) -> Self {
        let signature = render_signature(
            def.kind,
            &def.name,
            &def.value_type,
            &def.parameters,
            &def.generic_params,
        );
        Self {
            declaring: declaring.clone(),
            kind: def.kind,
            name: def.name,
            signature,
            value_type: def.value_type,
            parameters: def.parameters,
            is_static: def.is_static,
            visibility: def.visibility,
            generic_params: def.generic_params,
            generic_arguments: Vec::new(),
            body: def.body,
        }
    }

    pub fn declaring_type(&self) -> &TypeDescriptor {
        &self.declaring
    }

    pub fn kind(&self) -> MemberKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Canonical signature, e.g. `Boolean Contains(String)`.
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// Property/field type, method return type, or `Void` for constructors.
    pub fn value_type(&self) -> &TypeDescriptor {
        &self.value_type
    }

    pub fn parameters(&self) -> &[TypeDescriptor] {
        &self.parameters
    }

    pub fn is_static(&self) -> bool {
        self.is_static
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn body(&self) -> &MemberBody {
        &self.body
    }

    pub fn generic_params(&self) -> &[String] {
        &self.generic_params
    }

    pub fn generic_arguments(&self) -> &[TypeDescriptor] {
        &self.generic_arguments
    }

    pub fn is_generic_definition(&self) -> bool {
        !self.generic_params.is_empty() && self.generic_arguments.is_empty()
    }

    /// Instantiate a generic method definition.
    ///
    /// The signature stays the definition's; the arguments ride alongside.
    pub fn instantiate(&self, args: Vec<TypeDescriptor>) -> Result<MemberInfo, SymbolError> {
        if !self.is_generic_definition() {
            return Err(SymbolError::NotGeneric(self.signature.clone()));
        }
        if args.len() != self.generic_params.len() {
            return Err(SymbolError::GenericArity {
                name: self.signature.clone(),
                expected: self.generic_params.len(),
                actual: args.len(),
            });
        }

        let mut inst = self.clone();
        inst.value_type = self.value_type.substitute(&self.generic_params, &args);
        inst.parameters = self
            .parameters
            .iter()
            .map(|p| p.substitute(&self.generic_params, &args))
            .collect();
        inst.generic_arguments = args;
        Ok(inst)
    }

    /// Copy onto a constructed declaring type, substituting its type parameters.
    fn substituted(
        &self,
        declaring: &TypeDescriptor,
        params: &[String],
        args: &[TypeDescriptor],
    ) -> MemberInfo {
        let value_type = self.value_type.substitute(params, args);
        let parameters: Vec<_> = self
            .parameters
            .iter()
            .map(|p| p.substitute(params, args))
            .collect();
        let signature = render_signature(
            self.kind,
            &self.name,
            &value_type,
            &parameters,
            &self.generic_params,
        );
        MemberInfo {
            declaring: declaring.clone(),
            signature,
            value_type,
            parameters,
            ..self.clone()
        }
    }
}

/// Member definition used while building modules.
#[derive(Clone, Debug)]
pub struct MemberDef {
    pub kind: MemberKind,
    pub name: String,
    pub value_type: TypeDescriptor,
    pub parameters: Vec<TypeDescriptor>,
    pub is_static: bool,
    pub visibility: Visibility,
    pub generic_params: Vec<String>,
    pub body: MemberBody,
}

impl MemberDef {
    fn new(kind: MemberKind, name: impl Into<String>, value_type: TypeDescriptor, body: MemberBody) -> Self {
        Self {
            kind,
            name: name.into(),
            value_type,
            parameters: Vec::new(),
            is_static: false,
            visibility: Visibility::Public,
            generic_params: Vec::new(),
            body,
        }
    }

    /// Record property stored in a slot of the same name.
    pub fn property(name: impl Into<String>, ty: TypeDescriptor) -> Self {
        let name = name.into();
        let body = MemberBody::Slot(name.clone());
        Self::new(MemberKind::Property, name, ty, body)
    }

    /// Record field stored in a slot of the same name.
    pub fn field(name: impl Into<String>, ty: TypeDescriptor) -> Self {
        let name = name.into();
        let body = MemberBody::Slot(name.clone());
        Self::new(MemberKind::Field, name, ty, body)
    }

    /// Property computed by a native getter.
    pub fn getter(name: impl Into<String>, ty: TypeDescriptor, f: NativeFn) -> Self {
        Self::new(MemberKind::Property, name, ty, MemberBody::Native(f))
    }

    /// Indexed `Item[...]` property.
    pub fn indexer(ty: TypeDescriptor, parameters: Vec<TypeDescriptor>, f: NativeFn) -> Self {
        let mut def = Self::new(MemberKind::Property, "Item", ty, MemberBody::Native(f));
        def.parameters = parameters;
        def
    }

    pub fn method(
        name: impl Into<String>,
        ret: TypeDescriptor,
        parameters: Vec<TypeDescriptor>,
        f: NativeFn,
    ) -> Self {
        let mut def = Self::new(MemberKind::Method, name, ret, MemberBody::Native(f));
        def.parameters = parameters;
        def
    }

    pub fn constructor(parameters: Vec<TypeDescriptor>, f: NativeFn) -> Self {
        let mut def = Self::new(
            MemberKind::Constructor,
            ".ctor",
            TypeDescriptor::std("Void"),
            MemberBody::Native(f),
        );
        def.parameters = parameters;
        def.is_static = true;
        def
    }

    pub fn into_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn non_public(mut self) -> Self {
        self.visibility = Visibility::NonPublic;
        self
    }

    pub fn generic(mut self, params: &[&str]) -> Self {
        self.generic_params = params.iter().map(|p| (*p).to_owned()).collect();
        self
    }
}

/// Canonical signature string for a member.
///
/// - property/field: `Int32 Age`
/// - indexer: `String Item[Int32]`
/// - method: `Boolean Contains(String)`, generic `Boolean Contains<T>(Array<T>, T)`
/// - constructor: `Void .ctor(Int32, Int32, Int32)`
pub fn render_signature(
    kind: MemberKind,
    name: &str,
    value_type: &TypeDescriptor,
    parameters: &[TypeDescriptor],
    generic_params: &[String],
) -> String {
    let params = parameters
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    match kind {
        MemberKind::Property if !parameters.is_empty() => format!("{value_type} {name}[{params}]"),
        MemberKind::Property | MemberKind::Field => format!("{value_type} {name}"),
        MemberKind::Method if generic_params.is_empty() => {
            format!("{value_type} {name}({params})")
        }
        MemberKind::Method => {
            format!("{value_type} {name}<{}>({params})", generic_params.join(", "))
        }
        MemberKind::Constructor => format!("Void .ctor({params})"),
    }
}
