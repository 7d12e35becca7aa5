use courier_cipher::{CipherError, SecretError};
use courier_compiler::{DecodeError, EncodeError, RetargetError};
use courier_core::SymbolError;
use courier_vm::RuntimeError;

use crate::error::{Error, ErrorKind};

#[test]
fn cipher_configuration_is_lifted() {
    let err = Error::from(CipherError::Configuration(SecretError::Whitespace));

    assert!(matches!(err, Error::Configuration(SecretError::Whitespace)));
    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert!(err.is_fatal());
}

#[test]
fn kinds_follow_the_failure() {
    let cases = [
        (
            Error::from(CipherError::Cryptographic("bad padding")),
            ErrorKind::Cryptographic,
        ),
        (
            Error::from(EncodeError::UnsupportedCapture {
                method: "Boolean Contains<T>(Array<T>, T)".into(),
                parameter: "x".into(),
            }),
            ErrorKind::UnsupportedConstruct,
        ),
        (
            Error::from(EncodeError::FoldEvaluation(RuntimeError::NullReference)),
            ErrorKind::FoldEvaluation,
        ),
        (
            Error::from(DecodeError::Symbol(SymbolError::TypeNotFound {
                module: "contracts".into(),
                name: "Sample.Ghost".into(),
            })),
            ErrorKind::SymbolResolution,
        ),
        (
            Error::from(DecodeError::UnsupportedVersion(9)),
            ErrorKind::Malformed,
        ),
        (
            Error::from(RetargetError::UnsupportedDeepAccess {
                path: "x.Address.City".into(),
            }),
            ErrorKind::UnsupportedConstruct,
        ),
        (
            Error::from(RetargetError::InvalidShape("two parameters".into())),
            ErrorKind::InvalidShape,
        ),
    ];

    for (err, kind) in cases {
        assert_eq!(err.kind(), kind, "{err}");
        assert_eq!(err.is_fatal(), kind == ErrorKind::Cryptographic, "{err}");
    }
}

#[test]
fn messages_name_the_pass() {
    let err = Error::from(RetargetError::UnsupportedDeepAccess {
        path: "x.Address.City".into(),
    });

    assert_eq!(
        err.to_string(),
        "retarget failed: unsupported deep access `x.Address.City`: \
         only direct members of the parameter can be rebound"
    );
}
