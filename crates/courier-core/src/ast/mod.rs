//! Predicate AST.
//!
//! `node` holds the data model; `build` constructs well-typed trees.

mod build;
mod node;


pub use build::{BuildError, ExprBuilder};
pub use node::{Expr, ExprKind, Lambda, NodeCategory, NodeType, Param};
