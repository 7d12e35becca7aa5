//! Tree-walking evaluation engine.

mod error;
mod eval;
mod limits;
mod ops;
mod predicate;


pub use error::RuntimeError;
pub use eval::Evaluator;
pub use limits::FuelLimits;
pub use predicate::Predicate;
