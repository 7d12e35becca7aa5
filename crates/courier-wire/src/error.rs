/// Errors reading or writing the text form of a portable tree.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    #[error("malformed portable tree: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, WireError>;
