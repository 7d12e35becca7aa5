use crate::secret::SecretError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CipherError {
    #[error("configuration: {0}")]
    Configuration(#[from] SecretError),

    /// Bad padding, a truncated payload, or plaintext that is not UTF-8.
    #[error("decryption failed: {0}")]
    Cryptographic(&'static str),

    #[error("payload is not base64: {0}")]
    Encoding(#[from] base64::DecodeError),
}

pub type Result<T> = std::result::Result<T, CipherError>;
