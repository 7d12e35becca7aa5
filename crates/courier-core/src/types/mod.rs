//! Runtime type model.
//!
//! Stands in for ambient reflection: a [`Universe`] holds modules of types,
//! each type exposes members with canonical signatures and native bodies.

mod descriptor;
mod info;
mod std_module;
mod universe;

#[cfg(test)]
mod types_tests;

pub use descriptor::{
    MemberKind, SymbolDescriptor, TypeDescriptor, module_simple_name, simple_type_name,
};
pub use info::{
    Member, MemberBody, MemberDef, MemberInfo, NativeFn, Primitive, Type, TypeInfo, TypeKind,
    Visibility, render_signature,
};
pub use universe::{
    Flavor, LEGACY_STD_MODULE, Module, ModuleBuilder, RecordBuilder, STD_MODULE, Universe,
    is_std_module,
};
