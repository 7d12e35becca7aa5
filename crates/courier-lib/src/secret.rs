use std::fmt;

use courier_cipher::{SecretError, validate};

/// Environment variable read by [`SecretSource::default`].
pub const DEFAULT_SECRET_ENV: &str = "COURIER_SECRET_KEY";

/// Where the shared secret comes from. Read on every call, never cached.
#[derive(Clone, PartialEq, Eq)]
pub enum SecretSource {
    Value(String),
    Env(String),
}

impl SecretSource {
    pub fn env(variable: impl Into<String>) -> Self {
        Self::Env(variable.into())
    }

    /// The secret, checked against the strength policy.
    pub fn resolve(&self) -> Result<String, SecretError> {
        let secret = match self {
            SecretSource::Value(value) => value.clone(),
            SecretSource::Env(variable) => {
                std::env::var(variable).map_err(|_| SecretError::Unset(variable.clone()))?
            }
        };
        validate(&secret)?;
        Ok(secret)
    }
}

impl Default for SecretSource {
    fn default() -> Self {
        Self::env(DEFAULT_SECRET_ENV)
    }
}

impl fmt::Debug for SecretSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SecretSource::Value(_) => f.write_str("Value(<redacted>)"),
            SecretSource::Env(variable) => f.debug_tuple("Env").field(variable).finish(),
        }
    }
}
