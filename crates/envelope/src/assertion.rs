//! Predicate-object claims about a subject.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};

use envelope_core::{CborEncode, Digest, Signature};
use envelope_seal::{PublicKeyBase, SealedMessage, SskrShare, SymmetricKey};

use crate::envelope::{Envelope, IntoEnvelope};
use crate::error::Result;
use crate::predicate::KnownPredicate;

/// A `predicate: object` pair. Both sides are envelopes, so either can carry
/// assertions of its own or be redacted independently.
///
/// Assertions order and compare by digest.
#[derive(Clone, Debug)]
pub struct Assertion {
    predicate: Envelope,
    object: Envelope,
    digest: Digest,
}

impl Assertion {
    pub fn new(predicate: impl IntoEnvelope, object: impl IntoEnvelope) -> Self {
        let predicate = predicate.into_envelope();
        let object = object.into_envelope();
        let digest = Digest::from_digests(&[predicate.digest(), object.digest()]);
        Self {
            predicate,
            object,
            digest,
        }
    }

    pub fn predicate(&self) -> &Envelope {
        &self.predicate
    }

    pub fn object(&self) -> &Envelope {
        &self.object
    }

    pub fn digest(&self) -> Digest {
        self.digest
    }

    /// `isA: class`
    pub fn is_a(class: impl IntoEnvelope) -> Self {
        Self::new(KnownPredicate::IsA, class)
    }

    /// `id: identifier`
    pub fn id(identifier: impl IntoEnvelope) -> Self {
        Self::new(KnownPredicate::Id, identifier)
    }

    /// `verifiedBy: signature`, with an optional note on the signature.
    pub fn verified_by(signature: Signature, note: Option<&str>) -> Self {
        let object = Envelope::new(signature).add_optional(KnownPredicate::Note, note);
        Self::new(KnownPredicate::VerifiedBy, object)
    }

    /// `hasRecipient: sealed content key`
    pub fn has_recipient(recipient: &PublicKeyBase, content_key: &SymmetricKey) -> Result<Self> {
        let sealed = SealedMessage::seal(&content_key.to_cbor_bytes(), recipient)?;
        Ok(Self::new(KnownPredicate::HasRecipient, sealed))
    }

    /// `sskrShare: share`
    pub fn sskr_share(share: SskrShare) -> Self {
        Self::new(KnownPredicate::SskrShare, share)
    }

    pub(crate) fn collect_deep_digests(&self, out: &mut HashSet<Digest>) {
        out.insert(self.digest);
        self.predicate.collect_deep_digests(out);
        self.object.collect_deep_digests(out);
    }

    /// Digests that reveal this assertion's predicate and object subjects,
    /// but nothing nested inside them.
    pub fn shallow_digests(&self) -> HashSet<Digest> {
        HashSet::from([
            self.digest,
            self.predicate.digest(),
            self.predicate.subject().digest(),
            self.object.digest(),
            self.object.subject().digest(),
        ])
    }

    pub fn deep_digests(&self) -> HashSet<Digest> {
        let mut out = HashSet::new();
        self.collect_deep_digests(&mut out);
        out
    }

    pub(crate) fn is_same(&self, other: &Assertion) -> bool {
        self.predicate.ptr_eq(&other.predicate) && self.object.ptr_eq(&other.object)
    }
}

impl PartialEq for Assertion {
    fn eq(&self, other: &Self) -> bool {
        self.digest == other.digest
    }
}

impl Eq for Assertion {}

impl PartialOrd for Assertion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Assertion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.digest.cmp(&other.digest)
    }
}

impl Hash for Assertion {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.digest.hash(state);
    }
}
