//! Evaluator for Courier predicate trees.
//!
//! Runs typed [`courier_core::Expr`] trees directly: the constant folder uses
//! it to collapse closed subtrees, and receivers use [`Predicate`] to apply
//! a decoded filter to records.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod engine;

pub use engine::{Evaluator, FuelLimits, Predicate, RuntimeError};
