//! Password-based cipher for portable tree payloads.
//!
//! Payloads are `base64(salt ‖ iv ‖ ciphertext)`, keyed by PBKDF2 over a
//! shared secret. The secret must pass [`validate`] before any call.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

mod cipher;
mod error;
mod secret;

#[cfg(test)]
mod cipher_tests;

pub use cipher::{ITERATIONS, Layout, decrypt, encrypt, encrypt_with};
pub use error::{CipherError, Result};
pub use secret::{CharClass, SYMBOLS, SecretError, validate};
