//! Courier: encrypted, portable transport of typed record predicates.
//!
//! A sender encodes a predicate over one of its record types into a
//! portable tree and encrypts it with a shared secret. A receiver decrypts
//! and decodes it against the same contract type, then retargets it to its
//! own record type and evaluates it with [`Predicate`].
//!
//! [`Transcoder::deserialize`] propagates every failure.
//! [`Transcoder::try_deserialize`] reports undecodable predicates as `None`
//! and still propagates configuration and cryptographic failures.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

mod envelope;
mod error;
mod secret;
mod transcoder;

#[cfg(test)]
mod envelope_tests;
#[cfg(test)]
mod error_tests;
#[cfg(test)]
mod transcoder_tests;

pub use envelope::PredicateEnvelope;
pub use error::{Error, ErrorKind, Result};
pub use secret::{DEFAULT_SECRET_ENV, SecretSource};
pub use transcoder::{Transcoder, TranscoderBuilder};

pub use courier_cipher::{self as cipher, SecretError};
pub use courier_core::{Catalog, ExprBuilder, Lambda, Type, Value};
pub use courier_vm::{FuelLimits, Predicate};
pub use courier_wire::{self as wire, Colors, PortableTree, dump};
