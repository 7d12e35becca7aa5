use courier_core::{MemberKind, NodeType, SymbolError};
use courier_vm::RuntimeError;

use crate::constant::ConstantError;

/// Failures while folding and encoding a predicate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EncodeError {
    #[error("invalid predicate shape: {0}")]
    InvalidShape(String),

    /// The call cannot be replayed on the receiving side.
    #[error("`{method}` takes the free variable `{parameter}` as an argument")]
    UnsupportedCapture { method: String, parameter: String },

    #[error("unsupported construct: {0}")]
    UnsupportedConstruct(String),

    #[error("unsupported constant: {0}")]
    Constant(#[from] ConstantError),

    #[error("fold evaluation failed: {0}")]
    FoldEvaluation(#[from] RuntimeError),
}

/// Failures while rebuilding a predicate from a portable tree.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DecodeError {
    #[error("unsupported portable tree version {0}")]
    UnsupportedVersion(u32),

    #[error("invalid predicate shape: {0}")]
    InvalidShape(String),

    #[error("unsupported construct: {0}")]
    UnsupportedConstruct(String),

    #[error(transparent)]
    Symbol(#[from] SymbolError),

    #[error("malformed constant: {0}")]
    Constant(#[from] ConstantError),
}

impl DecodeError {
    pub(crate) fn tag_mismatch(node_type: NodeType, kind: &str) -> Self {
        Self::UnsupportedConstruct(format!("{node_type} is not valid on a `{kind}` node"))
    }
}

/// Failures while rebinding a predicate to a new record type.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RetargetError {
    #[error("invalid predicate shape: {0}")]
    InvalidShape(String),

    #[error("unsupported deep access `{path}`: only direct members of the parameter can be rebound")]
    UnsupportedDeepAccess { path: String },

    #[error("unsupported member: `{name}` not found on target type `{ty}`")]
    MemberNotFound { ty: String, name: String },

    #[error("unsupported member kind: `{ty}.{name}` is a {kind}, expected a property")]
    UnsupportedMemberKind {
        ty: String,
        name: String,
        kind: MemberKind,
    },

    #[error("unsupported receiver: `{0}` is applied to the parameter itself")]
    UnsupportedReceiver(String),

    #[error(transparent)]
    Symbol(#[from] SymbolError),
}
