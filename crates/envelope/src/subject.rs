//! The subject at the center of an envelope.

use std::collections::HashSet;
use std::fmt;

use ciborium::value::Value;
use envelope_core::{canonical, CborEncode, Digest};
use envelope_seal::EncryptedMessage;

use crate::envelope::Envelope;

/// What an envelope is about.
///
/// Every variant carries the digest of the content it stands for, and that
/// digest is the same whether the content is present, encrypted, or
/// redacted. Build leaves with [`Subject::leaf`] so the stored digest
/// matches the value.
#[derive(Clone)]
pub enum Subject {
    /// A CBOR value and the digest of its canonical encoding.
    Leaf(Value, Digest),
    /// A nested envelope.
    Envelope(Envelope),
    /// Encrypted content; the digest travels in the message's associated data.
    Encrypted(EncryptedMessage, Digest),
    /// Content removed, only its digest remains.
    Redacted(Digest),
}

impl Subject {
    pub fn leaf(value: impl CborEncode) -> Self {
        Self::leaf_value(value.to_cbor())
    }

    pub(crate) fn leaf_value(value: Value) -> Self {
        let digest = Digest::from_image(&canonical::encode(&value));
        Subject::Leaf(value, digest)
    }

    pub fn digest(&self) -> Digest {
        match self {
            Subject::Leaf(_, digest) => *digest,
            Subject::Envelope(envelope) => envelope.digest(),
            Subject::Encrypted(_, digest) => *digest,
            Subject::Redacted(digest) => *digest,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Subject::Leaf(..))
    }

    pub fn is_envelope(&self) -> bool {
        matches!(self, Subject::Envelope(_))
    }

    pub fn is_encrypted(&self) -> bool {
        matches!(self, Subject::Encrypted(..))
    }

    pub fn is_redacted(&self) -> bool {
        matches!(self, Subject::Redacted(_))
    }

    pub fn leaf_cbor(&self) -> Option<&Value> {
        match self {
            Subject::Leaf(value, _) => Some(value),
            _ => None,
        }
    }

    pub fn envelope(&self) -> Option<&Envelope> {
        match self {
            Subject::Envelope(envelope) => Some(envelope),
            _ => None,
        }
    }

    pub fn encrypted_message(&self) -> Option<&EncryptedMessage> {
        match self {
            Subject::Encrypted(message, _) => Some(message),
            _ => None,
        }
    }

    pub(crate) fn collect_deep_digests(&self, out: &mut HashSet<Digest>) {
        match self {
            Subject::Envelope(envelope) => envelope.collect_deep_digests(out),
            other => {
                out.insert(other.digest());
            }
        }
    }

    /// True if `other` is this subject, unchanged, after a transformation
    /// that preserves digests.
    pub(crate) fn is_same(&self, other: &Subject) -> bool {
        match (self, other) {
            (Subject::Envelope(a), Subject::Envelope(b)) => a.ptr_eq(b),
            (Subject::Leaf(..), Subject::Leaf(..))
            | (Subject::Encrypted(..), Subject::Encrypted(..))
            | (Subject::Redacted(_), Subject::Redacted(_)) => self.digest() == other.digest(),
            _ => false,
        }
    }
}

impl From<Envelope> for Subject {
    fn from(envelope: Envelope) -> Self {
        Subject::Envelope(envelope)
    }
}

impl PartialEq for Subject {
    fn eq(&self, other: &Self) -> bool {
        self.digest() == other.digest()
    }
}

impl Eq for Subject {}

impl fmt::Debug for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subject::Leaf(value, digest) => f
                .debug_tuple("Leaf")
                .field(value)
                .field(digest)
                .finish(),
            Subject::Envelope(envelope) => f.debug_tuple("Envelope").field(envelope).finish(),
            Subject::Encrypted(_, digest) => f.debug_tuple("Encrypted").field(digest).finish(),
            Subject::Redacted(digest) => f.debug_tuple("Redacted").field(digest).finish(),
        }
    }
}
