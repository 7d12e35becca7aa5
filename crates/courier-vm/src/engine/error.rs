use courier_core::{InvokeError, NodeType};

/// Errors during evaluation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RuntimeError {
    #[error("parameter `{0}` is not bound")]
    UnboundParameter(String),

    #[error("type error: {0}")]
    Type(String),

    #[error("division by zero")]
    DivideByZero,

    #[error("null reference")]
    NullReference,

    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange { index: i64, len: usize },

    #[error("`{member}` failed: {source}")]
    Invocation { member: String, source: InvokeError },

    #[error("{0} is not supported by the evaluator")]
    Unsupported(NodeType),

    #[error("lambda is not a single-parameter boolean predicate")]
    NotPredicate,

    #[error("execution exceeded fuel limit of {0} steps")]
    ExecFuelExhausted(u32),

    #[error("recursion limit exceeded (depth {0})")]
    RecursionLimitExceeded(u32),

    #[error("array of {len} elements exceeds the limit of {limit}")]
    ArrayTooLarge { len: i64, limit: u32 },
}

impl RuntimeError {
    pub(crate) fn type_error(message: impl Into<String>) -> Self {
        Self::Type(message.into())
    }
}
