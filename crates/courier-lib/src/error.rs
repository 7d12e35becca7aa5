use courier_cipher::{CipherError, SecretError};
use courier_compiler::{ConstantError, DecodeError, EncodeError, RetargetError};
use courier_wire::WireError;

/// Broad failure categories, independent of the pass that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or weak secret. Never retried.
    Configuration,
    /// Decryption failed under every known payload layout.
    Cryptographic,
    /// A type or member descriptor did not resolve.
    SymbolResolution,
    /// A construct the wire format or the retargeter cannot carry.
    UnsupportedConstruct,
    /// A folded subtree failed while being evaluated.
    FoldEvaluation,
    /// Text that is not a portable tree, or a tree with bad constants.
    Malformed,
    /// Not a single-parameter Boolean predicate.
    InvalidShape,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Configuration(#[from] SecretError),

    #[error(transparent)]
    Cipher(CipherError),

    #[error(transparent)]
    Malformed(#[from] WireError),

    #[error("encode failed: {0}")]
    Encode(#[from] EncodeError),

    #[error("decode failed: {0}")]
    Decode(#[from] DecodeError),

    #[error("retarget failed: {0}")]
    Retarget(#[from] RetargetError),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<CipherError> for Error {
    fn from(err: CipherError) -> Self {
        match err {
            CipherError::Configuration(secret) => Error::Configuration(secret),
            other => Error::Cipher(other),
        }
    }
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Configuration(_) => ErrorKind::Configuration,
            Error::Cipher(CipherError::Configuration(_)) => ErrorKind::Configuration,
            Error::Cipher(CipherError::Cryptographic(_)) => ErrorKind::Cryptographic,
            Error::Cipher(CipherError::Encoding(_)) => ErrorKind::Malformed,
            Error::Malformed(_) => ErrorKind::Malformed,
            Error::Encode(err) => match err {
                EncodeError::InvalidShape(_) => ErrorKind::InvalidShape,
                EncodeError::UnsupportedCapture { .. } | EncodeError::UnsupportedConstruct(_) => {
                    ErrorKind::UnsupportedConstruct
                }
                EncodeError::Constant(err) => constant_kind(err),
                EncodeError::FoldEvaluation(_) => ErrorKind::FoldEvaluation,
            },
            Error::Decode(err) => match err {
                DecodeError::UnsupportedVersion(_) => ErrorKind::Malformed,
                DecodeError::InvalidShape(_) => ErrorKind::InvalidShape,
                DecodeError::UnsupportedConstruct(_) => ErrorKind::UnsupportedConstruct,
                DecodeError::Symbol(_) => ErrorKind::SymbolResolution,
                DecodeError::Constant(err) => constant_kind(err),
            },
            Error::Retarget(err) => match err {
                RetargetError::InvalidShape(_) => ErrorKind::InvalidShape,
                RetargetError::Symbol(_) => ErrorKind::SymbolResolution,
                RetargetError::UnsupportedDeepAccess { .. }
                | RetargetError::MemberNotFound { .. }
                | RetargetError::UnsupportedMemberKind { .. }
                | RetargetError::UnsupportedReceiver(_) => ErrorKind::UnsupportedConstruct,
            },
        }
    }

    /// Whether [`crate::Transcoder::try_deserialize`] propagates this error.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Configuration | ErrorKind::Cryptographic
        )
    }
}

fn constant_kind(err: &ConstantError) -> ErrorKind {
    match err {
        ConstantError::Unsupported(_) => ErrorKind::UnsupportedConstruct,
        ConstantError::Mismatch { .. } | ConstantError::UnknownSlot { .. } => ErrorKind::Malformed,
        ConstantError::Symbol(_) => ErrorKind::SymbolResolution,
    }
}
