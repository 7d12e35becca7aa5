use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit, block_padding::Pkcs7};
use aes::{Aes128, Aes256};
use base64::{Engine, prelude::BASE64_STANDARD};
use rand::RngCore;
use rand::rngs::OsRng;
use sha1::Sha1;

use crate::error::{CipherError, Result};
use crate::secret::validate;

/// PBKDF2 rounds for both layouts.
pub const ITERATIONS: u32 = 2048;

const IV_LEN: usize = 16;
const BLOCK_LEN: usize = 16;

/// Byte layout of an encrypted payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Layout {
    /// 16-byte salt, AES-128.
    #[default]
    Current,
    /// 32-byte salt, AES-256 with a 32-byte key. Block size stays at 128 bits,
    /// so payloads sealed with a 256-bit Rijndael block do not open here.
    Wide,
}

impl Layout {
    pub fn salt_len(self) -> usize {
        match self {
            Layout::Current => 16,
            Layout::Wide => 32,
        }
    }

    pub fn key_len(self) -> usize {
        match self {
            Layout::Current => 16,
            Layout::Wide => 32,
        }
    }

    fn derive_key(self, secret: &str, salt: &[u8]) -> Vec<u8> {
        let mut key = vec![0u8; self.key_len()];
        pbkdf2::pbkdf2_hmac::<Sha1>(secret.as_bytes(), salt, ITERATIONS, &mut key);
        key
    }

    fn seal(self, key: &[u8], iv: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
        Ok(match self {
            Layout::Current => cbc::Encryptor::<Aes128>::new_from_slices(key, iv)
                .map_err(|_| bad_key())?
                .encrypt_padded_vec_mut::<Pkcs7>(plaintext),
            Layout::Wide => cbc::Encryptor::<Aes256>::new_from_slices(key, iv)
                .map_err(|_| bad_key())?
                .encrypt_padded_vec_mut::<Pkcs7>(plaintext),
        })
    }

    fn unseal(self, key: &[u8], iv: &[u8], body: &[u8]) -> Result<Vec<u8>> {
        let plain = match self {
            Layout::Current => cbc::Decryptor::<Aes128>::new_from_slices(key, iv)
                .map_err(|_| bad_key())?
                .decrypt_padded_vec_mut::<Pkcs7>(body),
            Layout::Wide => cbc::Decryptor::<Aes256>::new_from_slices(key, iv)
                .map_err(|_| bad_key())?
                .decrypt_padded_vec_mut::<Pkcs7>(body),
        };
        plain.map_err(|_| CipherError::Cryptographic("bad padding"))
    }
}

/// Encrypt `plaintext` with the current layout.
pub fn encrypt(plaintext: &str, secret: &str) -> Result<String> {
    encrypt_with(Layout::Current, plaintext, secret)
}

#[tracing::instrument(skip(plaintext, secret), fields(len = plaintext.len()))]
pub fn encrypt_with(layout: Layout, plaintext: &str, secret: &str) -> Result<String> {
    validate(secret)?;

    let mut salt = vec![0u8; layout.salt_len()];
    OsRng.fill_bytes(&mut salt);
    let mut iv = [0u8; IV_LEN];
    OsRng.fill_bytes(&mut iv);

    let key = layout.derive_key(secret, &salt);
    let body = layout.seal(&key, &iv, plaintext.as_bytes())?;

    let mut payload = Vec::with_capacity(salt.len() + IV_LEN + body.len());
    payload.extend_from_slice(&salt);
    payload.extend_from_slice(&iv);
    payload.extend_from_slice(&body);
    Ok(BASE64_STANDARD.encode(payload))
}

/// Decrypt a payload written with either layout.
///
/// The current layout is tried first; the wide layout only when that
/// attempt fails cryptographically.
#[tracing::instrument(skip_all, fields(len = ciphertext.len()))]
pub fn decrypt(ciphertext: &str, secret: &str) -> Result<String> {
    validate(secret)?;
    let payload = BASE64_STANDARD.decode(ciphertext.trim())?;

    match open(Layout::Current, &payload, secret) {
        Err(CipherError::Cryptographic(reason)) => {
            tracing::warn!(reason, "current layout failed, retrying with wide layout");
            open(Layout::Wide, &payload, secret)
        }
        other => other,
    }
}

fn open(layout: Layout, payload: &[u8], secret: &str) -> Result<String> {
    let header = layout.salt_len() + IV_LEN;
    if payload.len() < header + BLOCK_LEN || (payload.len() - header) % BLOCK_LEN != 0 {
        return Err(CipherError::Cryptographic("truncated payload"));
    }
    let (salt, rest) = payload.split_at(layout.salt_len());
    let (iv, body) = rest.split_at(IV_LEN);

    let key = layout.derive_key(secret, salt);
    let plain = layout.unseal(&key, iv, body)?;
    String::from_utf8(plain).map_err(|_| CipherError::Cryptographic("plaintext is not UTF-8"))
}

fn bad_key() -> CipherError {
    CipherError::Cryptographic("invalid key or IV length")
}
