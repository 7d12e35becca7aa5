//! Structural names for types and members.
//!
//! Descriptors are what travels on the wire instead of live handles.
//! Two descriptors are equal iff module, qualified name and generic
//! arguments all match.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::universe::STD_MODULE;

/// Module id used by generic parameter placeholders (`T` in `Nullable<T>`).
const GENERIC_PARAM_MODULE: &str = "";

/// Structural name of a type: `(module, qualified name, generic arguments)`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeDescriptor {
    pub module: String,
    pub type_name: String,
    #[serde(default)]
    pub generic_arguments: Vec<TypeDescriptor>,
}

impl TypeDescriptor {
    pub fn new(module: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            type_name: type_name.into(),
            generic_arguments: Vec::new(),
        }
    }

    /// Descriptor of a standard-module type, e.g. `TypeDescriptor::std("Int32")`.
    pub fn std(type_name: impl Into<String>) -> Self {
        Self::new(STD_MODULE, type_name)
    }

    /// `Nullable<inner>` in the standard module.
    pub fn nullable(inner: TypeDescriptor) -> Self {
        Self::std("Nullable").with_args(vec![inner])
    }

    /// `Array<element>` in the standard module.
    pub fn array(element: TypeDescriptor) -> Self {
        Self::std("Array").with_args(vec![element])
    }

    /// `List<element>` in the standard module.
    pub fn list(element: TypeDescriptor) -> Self {
        Self::std("List").with_args(vec![element])
    }

    /// Placeholder for a generic parameter inside a generic definition.
    pub fn generic_param(name: impl Into<String>) -> Self {
        Self::new(GENERIC_PARAM_MODULE, name)
    }

    pub fn with_args(mut self, args: Vec<TypeDescriptor>) -> Self {
        self.generic_arguments = args;
        self
    }

    pub fn is_generic_param(&self) -> bool {
        self.module == GENERIC_PARAM_MODULE
    }

    /// Module name without any `, Version=...` qualifier.
    pub fn module_name(&self) -> &str {
        module_simple_name(&self.module)
    }

    /// Last segment of the qualified name.
    pub fn simple_name(&self) -> &str {
        simple_type_name(&self.type_name)
    }

    /// Same type with generic arguments stripped.
    pub fn definition(&self) -> TypeDescriptor {
        Self::new(self.module.clone(), self.type_name.clone())
    }

    /// Replace generic parameter placeholders named in `params` with `args`.
    pub fn substitute(&self, params: &[String], args: &[TypeDescriptor]) -> TypeDescriptor {
        if self.is_generic_param() {
            if let Some(pos) = params.iter().position(|p| *p == self.type_name) {
                if let Some(arg) = args.get(pos) {
                    return arg.clone();
                }
            }
            return self.clone();
        }

        Self {
            module: self.module.clone(),
            type_name: self.type_name.clone(),
            generic_arguments: self
                .generic_arguments
                .iter()
                .map(|a| a.substitute(params, args))
                .collect(),
        }
    }

    /// True if a generic parameter placeholder appears anywhere inside.
    pub fn is_open(&self) -> bool {
        self.is_generic_param() || self.generic_arguments.iter().any(Self::is_open)
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.type_name)?;
        if self.generic_arguments.is_empty() {
            return Ok(());
        }
        f.write_str("<")?;
        for (i, arg) in self.generic_arguments.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{arg}")?;
        }
        f.write_str(">")
    }
}

/// Strip `, Version=...` and similar qualifiers from a module id.
pub fn module_simple_name(module: &str) -> &str {
    module.split(',').next().unwrap_or(module).trim()
}

/// Last `.`-separated segment of a qualified type name.
pub fn simple_type_name(qualified: &str) -> &str {
    qualified.rsplit('.').next().unwrap_or(qualified)
}

/// Kind of a type member.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MemberKind {
    Property,
    Field,
    Method,
    Constructor,
}

impl MemberKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MemberKind::Property => "property",
            MemberKind::Field => "field",
            MemberKind::Method => "method",
            MemberKind::Constructor => "constructor",
        }
    }
}

impl fmt::Display for MemberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structural name of a method, constructor, property or field.
///
/// The canonical `signature` is the sole overload disambiguator.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SymbolDescriptor {
    pub owner: TypeDescriptor,
    pub kind: MemberKind,
    pub name: String,
    pub signature: String,
    /// Generic arguments of an instantiated generic method. Empty otherwise.
    pub generic_arguments: Vec<TypeDescriptor>,
}

impl SymbolDescriptor {
    pub fn new(
        owner: TypeDescriptor,
        kind: MemberKind,
        name: impl Into<String>,
        signature: impl Into<String>,
    ) -> Self {
        Self {
            owner,
            kind,
            name: name.into(),
            signature: signature.into(),
            generic_arguments: Vec::new(),
        }
    }

    pub fn with_generic_arguments(mut self, args: Vec<TypeDescriptor>) -> Self {
        self.generic_arguments = args;
        self
    }
}

impl fmt::Display for SymbolDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.owner, self.signature)
    }
}
