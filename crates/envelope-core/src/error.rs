//! Error types for Envelope core primitives.

use thiserror::Error;

/// Errors raised while hashing, encoding, decoding, or verifying core values.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid signature")]
    InvalidSignature,

    #[error("invalid public key")]
    InvalidPublicKey,

    #[error("invalid {what} length: expected {expected}, got {actual}")]
    InvalidLength {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("unexpected tag: expected {expected}, got {actual:?}")]
    UnexpectedTag { expected: u64, actual: Option<u64> },

    #[error("malformed {0}")]
    Malformed(String),

    #[error("{0} trailing bytes after CBOR item")]
    TrailingBytes(usize),

    #[error("decoding error: {0}")]
    DecodingError(String),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
