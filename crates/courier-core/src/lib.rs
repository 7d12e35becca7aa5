//! Core data structures for Courier.
//!
//! This crate contains the shared building blocks used by the evaluator,
//! the wire schema and the transcoder passes:
//! - Values and records
//! - The runtime type model (modules, types, members)
//! - The Symbol Catalog resolving descriptors to live handles
//! - The predicate AST and its typed builder

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod ast;
pub mod catalog;
pub mod types;
pub mod value;

#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;

pub use ast::{BuildError, Expr, ExprBuilder, ExprKind, Lambda, NodeCategory, NodeType, Param};
pub use catalog::{AliasTable, Catalog, SymbolCatalog, SymbolError};
pub use types::{
    Flavor, Member, MemberBody, MemberDef, MemberInfo, MemberKind, Module, ModuleBuilder,
    NativeFn, Primitive, RecordBuilder, SymbolDescriptor, Type, TypeDescriptor, TypeInfo,
    TypeKind, Universe, Visibility,
};
pub use value::{Closure, InvokeError, Record, Value};
