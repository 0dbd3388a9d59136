//! # Envelope Core
//!
//! Pure primitives for Envelope documents: digests, canonical CBOR, and
//! Ed25519 signing.
//!
//! This crate contains no I/O and no encryption. It is pure computation
//! over cryptographic values.
//!
//! ## Key Types
//!
//! - [`Digest`] - Content identity (Blake3), totally ordered by bytes
//! - [`SigningKeypair`] / [`SigningPublicKey`] / [`Signature`] - Ed25519 over digests
//! - [`CborEncode`] / [`CborDecode`] - Typed conversion to and from CBOR values
//!
//! ## Canonicalization
//!
//! Everything that is hashed or sent on the wire goes through the
//! deterministic encoder in [`canonical`].

pub mod canonical;
pub mod cbor;
pub mod digest;
pub mod error;
pub mod signing;
pub mod tags;

pub use cbor::{CborDecode, CborEncode};
pub use ciborium::value::Value;
pub use digest::Digest;
pub use error::{CoreError, Result};
pub use signing::{Signature, SigningKeypair, SigningPublicKey};
