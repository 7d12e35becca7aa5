//! Courier compiler: the passes between a predicate tree and its portable form.
//!
//! - `fold` - constant folding of free-variable-independent subtrees
//! - `encode` - predicate tree to portable tree
//! - `decode` - portable tree back to a predicate tree
//! - `retarget` - rebinding the free variable to another record type
//! - `constant` - JSON form of constant values

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod constant;
pub mod decode;
pub mod encode;
mod error;
pub mod fold;
pub mod retarget;

#[cfg(test)]
pub mod test_utils;

#[cfg(test)]
mod fold_tests;

pub use constant::ConstantError;
pub use decode::{Decoder, decode};
pub use encode::{Encoder, encode};
pub use error::{DecodeError, EncodeError, RetargetError};
pub use fold::{ConstantFolder, fold};
pub use retarget::retarget;
