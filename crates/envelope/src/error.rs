//! Error types for envelope operations.

use envelope_core::CoreError;
use envelope_seal::{SealError, SskrError};
use thiserror::Error;

/// Errors that can occur while building, transforming, or reading envelopes.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    /// Wire bytes or a leaf value could not be decoded as expected.
    #[error("invalid format: {0}")]
    InvalidFormat(String),

    /// The operation does not apply to this subject variant.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// Authenticated decryption failed.
    #[error("invalid key")]
    InvalidKey,

    /// Decrypted content does not match its committed digest.
    #[error("invalid digest")]
    InvalidDigest,

    /// A required signature is missing or does not verify.
    #[error("invalid signature")]
    InvalidSignature,

    /// None of the sealed messages could be opened with the given keys.
    #[error("invalid recipient")]
    InvalidRecipient,

    /// Shares are missing, inconsistent, or below threshold.
    #[error("invalid shares")]
    InvalidShares,

    /// Expected exactly one assertion with a predicate.
    #[error("ambiguous assertion: expected exactly one match, found {count}")]
    AmbiguousAssertion { count: usize },
}

impl From<CoreError> for EnvelopeError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::InvalidSignature | CoreError::InvalidPublicKey => {
                EnvelopeError::InvalidSignature
            }
            other => EnvelopeError::InvalidFormat(other.to_string()),
        }
    }
}

impl From<SealError> for EnvelopeError {
    fn from(e: SealError) -> Self {
        match e {
            SealError::DecryptionError => EnvelopeError::InvalidKey,
            SealError::EncryptionError(msg) => EnvelopeError::InvalidOperation(msg),
            SealError::MissingDigest => {
                EnvelopeError::InvalidFormat("encrypted message has no digest".into())
            }
            SealError::Core(e) => e.into(),
        }
    }
}

impl From<SskrError> for EnvelopeError {
    fn from(e: SskrError) -> Self {
        match e {
            SskrError::SecretLength(_) | SskrError::InvalidSpec(_) => {
                EnvelopeError::InvalidOperation(e.to_string())
            }
            _ => EnvelopeError::InvalidShares,
        }
    }
}

/// Result type for envelope operations.
pub type Result<T> = std::result::Result<T, EnvelopeError>;
