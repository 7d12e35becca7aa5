use std::sync::Arc;

use courier_compiler::{Decoder, Encoder, retarget};
use courier_core::{Catalog, Lambda, Type};
use courier_vm::FuelLimits;
use courier_wire::PortableTree;

use crate::error::Result;
use crate::secret::SecretSource;

/// Encrypts predicates for transport and rebuilds them on the other side.
///
/// Cheap to clone; clones share the catalog and its caches.
#[derive(Clone, Debug)]
pub struct Transcoder {
    catalog: Arc<Catalog>,
    secret: SecretSource,
    limits: FuelLimits,
}

#[derive(Debug)]
pub struct TranscoderBuilder {
    catalog: Arc<Catalog>,
    secret: SecretSource,
    limits: FuelLimits,
}

impl TranscoderBuilder {
    /// Use `secret` directly instead of reading the environment.
    pub fn secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = SecretSource::Value(secret.into());
        self
    }

    /// Read the secret from `variable` on every call.
    pub fn secret_env(mut self, variable: impl Into<String>) -> Self {
        self.secret = SecretSource::env(variable);
        self
    }

    pub fn secret_source(mut self, source: SecretSource) -> Self {
        self.secret = source;
        self
    }

    /// Limits for evaluating folded subtrees at encode time.
    pub fn limits(mut self, limits: FuelLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn build(self) -> Transcoder {
        Transcoder {
            catalog: self.catalog,
            secret: self.secret,
            limits: self.limits,
        }
    }
}

impl Transcoder {
    pub fn builder(catalog: Arc<Catalog>) -> TranscoderBuilder {
        TranscoderBuilder {
            catalog,
            secret: SecretSource::default(),
            limits: FuelLimits::folding(),
        }
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn secret_source(&self) -> &SecretSource {
        &self.secret
    }

    /// The configured secret, validated.
    pub fn secret(&self) -> Result<String> {
        Ok(self.secret.resolve()?)
    }

    /// Fold, encode and encrypt `predicate`.
    #[tracing::instrument(skip_all)]
    pub fn serialize(&self, predicate: &Lambda) -> Result<String> {
        let secret = self.secret()?;
        let tree = Encoder::new(self.catalog.as_ref())
            .with_limits(self.limits)
            .encode(predicate)?;
        self.seal(&tree, &secret)
    }

    /// Decrypt, decode against `declaring` and retarget to `target`.
    ///
    /// Retargeting runs even when both types are the same, so deep member
    /// chains and field reads are rejected regardless of the target.
    #[tracing::instrument(skip_all, fields(declaring = %declaring, target = %target))]
    pub fn deserialize(&self, ciphertext: &str, declaring: &Type, target: &Type) -> Result<Lambda> {
        let tree = self.decrypt_tree(ciphertext)?;
        let decoded = Decoder::new(self.catalog.as_ref(), declaring).decode(&tree)?;
        Ok(retarget(&decoded, target, self.catalog.as_ref())?)
    }

    /// [`Self::deserialize`], with undecodable predicates reported as `None`.
    ///
    /// Configuration and cryptographic failures still propagate. Callers that
    /// must tell a malformed predicate from one that never matches should use
    /// [`Self::deserialize`].
    pub fn try_deserialize(
        &self,
        ciphertext: &str,
        declaring: &Type,
        target: &Type,
    ) -> Result<Option<Lambda>> {
        match self.deserialize(ciphertext, declaring, target) {
            Ok(lambda) => Ok(Some(lambda)),
            Err(err) if err.is_fatal() => Err(err),
            Err(err) => {
                tracing::debug!(error = %err, kind = ?err.kind(), "predicate dropped");
                Ok(None)
            }
        }
    }

    /// Encrypt an already encoded tree.
    pub fn encrypt_tree(&self, tree: &PortableTree) -> Result<String> {
        let secret = self.secret()?;
        self.seal(tree, &secret)
    }

    /// Decrypt and parse a tree without decoding it.
    pub fn decrypt_tree(&self, ciphertext: &str) -> Result<PortableTree> {
        let secret = self.secret()?;
        let text = courier_cipher::decrypt(ciphertext, &secret)?;
        Ok(courier_wire::from_json(&text)?)
    }

    fn seal(&self, tree: &PortableTree, secret: &str) -> Result<String> {
        let text = courier_wire::to_json(tree)?;
        Ok(courier_cipher::encrypt(&text, secret)?)
    }
}
