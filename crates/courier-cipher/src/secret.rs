//! Shared-secret strength policy.

use std::fmt;

/// Punctuation accepted as the symbol class.
pub const SYMBOLS: &str = "^$*.[]{}()?-\"!@#%&/,><':;|_~`";

const MIN_LEN: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    Lowercase,
    Uppercase,
    Digit,
    Symbol,
}

impl CharClass {
    const ALL: [CharClass; 4] = [
        CharClass::Lowercase,
        CharClass::Uppercase,
        CharClass::Digit,
        CharClass::Symbol,
    ];

    fn matches(self, c: char) -> bool {
        match self {
            CharClass::Lowercase => c.is_ascii_lowercase(),
            CharClass::Uppercase => c.is_ascii_uppercase(),
            CharClass::Digit => c.is_ascii_digit(),
            CharClass::Symbol => SYMBOLS.contains(c),
        }
    }
}

impl fmt::Display for CharClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CharClass::Lowercase => "a lowercase letter",
            CharClass::Uppercase => "an uppercase letter",
            CharClass::Digit => "a digit",
            CharClass::Symbol => "a symbol",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SecretError {
    #[error("secret variable `{0}` is not set")]
    Unset(String),

    #[error("secret has {0} characters, at least 12 are required")]
    TooShort(usize),

    #[error("secret contains whitespace")]
    Whitespace,

    #[error("secret must contain {0}")]
    Missing(CharClass),
}

/// Check `secret` against the strength policy.
pub fn validate(secret: &str) -> Result<(), SecretError> {
    let len = secret.chars().count();
    if len < MIN_LEN {
        return Err(SecretError::TooShort(len));
    }
    if secret.chars().any(char::is_whitespace) {
        return Err(SecretError::Whitespace);
    }
    if let Some(class) = CharClass::ALL
        .into_iter()
        .find(|class| !secret.chars().any(|c| class.matches(c)))
    {
        return Err(SecretError::Missing(class));
    }
    Ok(())
}
