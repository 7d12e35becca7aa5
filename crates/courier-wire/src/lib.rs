//! Portable tree: the document form of a predicate.
//!
//! Nodes reference types and members only through descriptors, so a tree
//! can be produced in one process and rebuilt in another.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

mod dump;
mod error;
mod json;
mod schema;

#[cfg(test)]
mod dump_tests;
#[cfg(test)]
mod schema_tests;

pub use dump::{Colors, dump};
pub use error::{Result, WireError};
pub use json::{from_json, to_json, to_json_pretty};
pub use schema::{
    ConstantValue, ConstructorRef, FORMAT_VERSION, MemberRef, MethodRef, NodeBody, PortableNode,
    PortableTree,
};
