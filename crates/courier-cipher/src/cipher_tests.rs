use base64::{Engine, prelude::BASE64_STANDARD};
use proptest::prelude::*;

use crate::cipher::{Layout, decrypt, encrypt, encrypt_with};
use crate::error::CipherError;
use crate::secret::SecretError;

const SECRET: &str = "4-S3cr3t-v4lu3";

#[test]
fn round_trip() {
    let ciphertext = encrypt(r#"{"version":1}"#, SECRET).unwrap();

    assert_eq!(decrypt(&ciphertext, SECRET).unwrap(), r#"{"version":1}"#);
}

#[test]
fn payload_layout() {
    let ciphertext = encrypt("hello", SECRET).unwrap();

    let bytes = BASE64_STANDARD.decode(ciphertext).unwrap();
    // salt, iv, one padded block
    assert_eq!(bytes.len(), 16 + 16 + 16);
}

#[test]
fn salt_and_iv_are_fresh() {
    assert_ne!(encrypt("same", SECRET).unwrap(), encrypt("same", SECRET).unwrap());
}

#[test]
fn wide_payload_decrypts() {
    let ciphertext = encrypt_with(Layout::Wide, "from an older sender", SECRET).unwrap();

    let bytes = BASE64_STANDARD.decode(&ciphertext).unwrap();
    assert_eq!(bytes.len(), 32 + 16 + 32);
    assert_eq!(decrypt(&ciphertext, SECRET).unwrap(), "from an older sender");
}

#[test]
fn weak_secret_is_a_configuration_error() {
    let ciphertext = encrypt("x", SECRET).unwrap();

    assert_eq!(
        encrypt("x", "short").unwrap_err(),
        CipherError::Configuration(SecretError::TooShort(5))
    );
    assert!(matches!(
        decrypt(&ciphertext, "no-digits-Here"),
        Err(CipherError::Configuration(SecretError::Missing(_)))
    ));
}

#[test]
fn wrong_secret_fails() {
    let ciphertext = encrypt("a payload long enough to span blocks", SECRET).unwrap();

    let err = decrypt(&ciphertext, "An0ther-S3cret").unwrap_err();

    assert!(matches!(err, CipherError::Cryptographic(_)));
}

#[test]
fn truncated_payload_fails() {
    let short = BASE64_STANDARD.encode([0u8; 20]);

    assert_eq!(
        decrypt(&short, SECRET).unwrap_err(),
        CipherError::Cryptographic("truncated payload")
    );
}

#[test]
fn non_base64_is_an_encoding_error() {
    assert!(matches!(
        decrypt("not base64 at all!", SECRET),
        Err(CipherError::Encoding(_))
    ));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn any_text_round_trips(text in any::<String>()) {
        let ciphertext = encrypt(&text, SECRET).unwrap();
        prop_assert_eq!(decrypt(&ciphertext, SECRET).unwrap(), text);
    }
}
