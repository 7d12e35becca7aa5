//! Symbol resolution errors.

/// Failure to turn a descriptor into a live handle.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SymbolError {
    #[error("type `{name}` not found in module `{module}`")]
    TypeNotFound { module: String, name: String },

    #[error("member `{signature}` not found on `{owner}`")]
    SymbolNotFound { owner: String, signature: String },

    /// Canonical signatures are unique per type; seeing this is a bug in a module definition.
    #[error("member `{signature}` on `{owner}` matches {count} candidates")]
    AmbiguousSymbol {
        owner: String,
        signature: String,
        count: usize,
    },

    #[error("`{0}` is not a generic definition")]
    NotGeneric(String),

    #[error("`{name}` expects {expected} generic arguments, got {actual}")]
    GenericArity {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("open generic parameter `{0}` cannot be resolved")]
    OpenGeneric(String),

    #[error("module `{0}` is already loaded")]
    DuplicateModule(String),
}
