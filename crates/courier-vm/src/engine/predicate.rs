//! Compiled single-input boolean predicates.

use std::sync::Arc;

use courier_core::{Lambda, Param, Value};

use super::error::RuntimeError;
use super::eval::Evaluator;
use super::limits::FuelLimits;

/// A validated predicate lambda, ready to test records.
#[derive(Clone, Debug)]
pub struct Predicate {
    lambda: Arc<Lambda>,
    limits: FuelLimits,
}

impl Predicate {
    /// Fails unless `lambda` has exactly one parameter and a `Boolean` body.
    pub fn new(lambda: Lambda) -> Result<Self, RuntimeError> {
        if !lambda.is_predicate() {
            return Err(RuntimeError::NotPredicate);
        }
        Ok(Self {
            lambda: Arc::new(lambda),
            limits: FuelLimits::default(),
        })
    }

    pub fn with_limits(mut self, limits: FuelLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn lambda(&self) -> &Lambda {
        &self.lambda
    }

    pub fn parameter(&self) -> &Param {
        &self.lambda.parameters[0]
    }

    /// Test one record. A `null` result counts as `false`.
    pub fn evaluate(&self, record: &Value) -> Result<bool, RuntimeError> {
        let mut evaluator = Evaluator::with_limits(self.limits);
        evaluator.bind(self.parameter(), record.clone());
        let result = match evaluator.evaluate(&self.lambda.body)? {
            Value::Boolean(b) => b,
            Value::Null => false,
            other => {
                return Err(RuntimeError::type_error(format!(
                    "predicate produced {}",
                    other.kind_name()
                )));
            }
        };
        tracing::trace!(result, "predicate evaluated");
        Ok(result)
    }
}
