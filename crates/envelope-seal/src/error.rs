//! Error types for encryption, sealing, and secret sharing.

use thiserror::Error;

/// Errors that can occur during symmetric or sealed-message operations.
#[derive(Debug, Error)]
pub enum SealError {
    /// Encryption error.
    #[error("encryption error: {0}")]
    EncryptionError(String),

    /// Authentication failed: wrong key, or the message was tampered with.
    #[error("decryption failed")]
    DecryptionError,

    /// Encrypted message carries no digest in its associated data.
    #[error("encrypted message has no digest")]
    MissingDigest,

    /// Core error.
    #[error("core error: {0}")]
    Core(#[from] envelope_core::CoreError),
}

/// Errors from splitting or recombining secret shares.
#[derive(Debug, Error)]
pub enum SskrError {
    #[error("secret length {0} must be even and between 16 and 32 bytes")]
    SecretLength(usize),

    #[error("invalid split spec: {0}")]
    InvalidSpec(String),

    #[error("no shares provided")]
    EmptyShareSet,

    #[error("malformed share: {0}")]
    MalformedShare(String),

    #[error("shares belong to different split sets")]
    MixedShareSets,

    #[error("share metadata is inconsistent")]
    InconsistentMetadata,

    #[error("conflicting shares with index {0}")]
    DuplicateShare(u8),

    #[error("not enough shares: need {required}, have {found}")]
    InsufficientShares { required: usize, found: usize },

    #[error("not enough groups: need {required}, have {found}")]
    NotEnoughGroups { required: usize, found: usize },

    #[error("share checksum mismatch")]
    ChecksumFailure,
}

/// Result type for seal operations.
pub type Result<T> = std::result::Result<T, SealError>;
