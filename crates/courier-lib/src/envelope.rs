use serde::{Deserialize, Serialize};

/// JSON body a transport carries: the encrypted predicate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredicateEnvelope {
    pub expression: String,
}

impl PredicateEnvelope {
    pub fn new(expression: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
        }
    }
}
