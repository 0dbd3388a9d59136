//! The envelope type, its construction, and structural queries.

use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use envelope_core::{CborDecode, CborEncode, Digest};

use crate::assertion::Assertion;
use crate::error::{EnvelopeError, Result};
use crate::subject::Subject;

/// An immutable, content-addressed document: a subject plus a set of
/// assertions about it.
///
/// Envelopes are cheap to clone and share structure. Every transformation
/// returns a new envelope and leaves the original untouched. Two envelopes
/// are equal when their digests are equal, so an envelope and any redacted,
/// encrypted, or otherwise elided form of it compare equal.
#[derive(Clone)]
pub struct Envelope(Arc<Node>);

struct Node {
    subject: Subject,
    /// Sorted by digest, no duplicates.
    assertions: Vec<Assertion>,
    digest: Digest,
}

/// Conversion into an envelope.
///
/// Any CBOR-encodable value becomes a leaf envelope; an envelope converts to
/// itself. This lets predicates and objects be given as plain values.
pub trait IntoEnvelope {
    fn into_envelope(self) -> Envelope;
}

impl<T: CborEncode> IntoEnvelope for T {
    fn into_envelope(self) -> Envelope {
        Envelope::new(self)
    }
}

impl IntoEnvelope for Envelope {
    fn into_envelope(self) -> Envelope {
        self
    }
}

impl IntoEnvelope for &Envelope {
    fn into_envelope(self) -> Envelope {
        self.clone()
    }
}

impl IntoEnvelope for Subject {
    fn into_envelope(self) -> Envelope {
        Envelope::from_subject(self)
    }
}

impl Envelope {
    /// A leaf envelope around `value`.
    pub fn new(value: impl CborEncode) -> Self {
        Self::from_subject(Subject::leaf(value))
    }

    /// An envelope with no assertions. Its digest is the subject's digest.
    pub fn from_subject(subject: Subject) -> Self {
        Self::with_assertions(subject, Vec::new())
    }

    /// An envelope with the given assertions, sorted and deduplicated.
    pub fn with_assertions(subject: Subject, mut assertions: Vec<Assertion>) -> Self {
        assertions.sort_by_key(Assertion::digest);
        assertions.dedup_by_key(|a| a.digest());

        let digest = if assertions.is_empty() {
            subject.digest()
        } else {
            let subject_digest = subject.digest();
            let digests: Vec<Digest> = std::iter::once(subject_digest)
                .chain(assertions.iter().map(Assertion::digest))
                .collect();
            Digest::from_digests(&digests)
        };

        Envelope(Arc::new(Node {
            subject,
            assertions,
            digest,
        }))
    }

    /// A fully redacted envelope standing in for content with `digest`.
    pub fn from_digest(digest: Digest) -> Self {
        Self::from_subject(Subject::Redacted(digest))
    }

    pub fn subject(&self) -> &Subject {
        &self.0.subject
    }

    /// Assertions in digest order.
    pub fn assertions(&self) -> &[Assertion] {
        &self.0.assertions
    }

    pub fn has_assertions(&self) -> bool {
        !self.0.assertions.is_empty()
    }

    pub fn digest(&self) -> Digest {
        self.0.digest
    }

    pub(crate) fn ptr_eq(&self, other: &Envelope) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Add an assertion. Adding one already present returns an equal envelope.
    pub fn add_assertion(&self, assertion: Assertion) -> Self {
        if self.find_assertion(&assertion.digest()).is_some() {
            return self.clone();
        }
        let mut assertions = self.assertions().to_vec();
        assertions.push(assertion);
        Self::with_assertions(self.subject().clone(), assertions)
    }

    /// Add every assertion in `assertions`.
    pub fn add_assertions(&self, assertions: impl IntoIterator<Item = Assertion>) -> Self {
        let mut all = self.assertions().to_vec();
        let before = all.len();
        all.extend(assertions);
        if all.len() == before {
            return self.clone();
        }
        Self::with_assertions(self.subject().clone(), all)
    }

    /// Add the assertion `predicate: object`.
    pub fn add(&self, predicate: impl IntoEnvelope, object: impl IntoEnvelope) -> Self {
        self.add_assertion(Assertion::new(predicate, object))
    }

    /// Add `predicate: object` only when `object` is present.
    pub fn add_optional<O: IntoEnvelope>(
        &self,
        predicate: impl IntoEnvelope,
        object: Option<O>,
    ) -> Self {
        match object {
            Some(object) => self.add(predicate, object),
            None => self.clone(),
        }
    }

    /// Remove the assertion with `digest`, if present.
    pub fn revoke(&self, digest: &Digest) -> Self {
        match self.find_assertion(digest) {
            Some(index) => {
                let mut assertions = self.assertions().to_vec();
                assertions.remove(index);
                Self::with_assertions(self.subject().clone(), assertions)
            }
            None => self.clone(),
        }
    }

    fn find_assertion(&self, digest: &Digest) -> Option<usize> {
        self.assertions()
            .binary_search_by(|a| a.digest().cmp(digest))
            .ok()
    }

    /// Wrap this envelope as the subject of a new one, so that later
    /// assertions (such as signatures) cover the whole of it.
    ///
    /// Wrapping does not change identity: the result has this envelope's
    /// digest, so a signature over `e.enclose()` is a signature over
    /// `e.digest()`.
    pub fn enclose(&self) -> Self {
        Self::from_subject(Subject::Envelope(self.clone()))
    }

    /// The enclosed envelope, if the subject is one.
    pub fn extract_envelope(&self) -> Result<Envelope> {
        self.subject().envelope().cloned().ok_or_else(|| {
            EnvelopeError::InvalidFormat("subject is not an enclosed envelope".into())
        })
    }

    /// Decode the leaf subject as `T`.
    pub fn extract<T: CborDecode>(&self) -> Result<T> {
        let value = self
            .subject()
            .leaf_cbor()
            .ok_or_else(|| EnvelopeError::InvalidFormat("subject is not a leaf".into()))?;
        Ok(T::from_cbor(value)?)
    }

    /// Assertions whose predicate has the same digest as `predicate`.
    ///
    /// Redacted predicates still match.
    pub fn assertions_with_predicate(&self, predicate: impl IntoEnvelope) -> Vec<Assertion> {
        let digest = predicate.into_envelope().digest();
        self.assertions()
            .iter()
            .filter(|a| a.predicate().digest() == digest)
            .cloned()
            .collect()
    }

    /// The single assertion with `predicate`.
    pub fn assertion_with_predicate(&self, predicate: impl IntoEnvelope) -> Result<Assertion> {
        let mut matches = self.assertions_with_predicate(predicate);
        if matches.len() != 1 {
            return Err(EnvelopeError::AmbiguousAssertion {
                count: matches.len(),
            });
        }
        Ok(matches.remove(0))
    }

    /// The object of the single assertion with `predicate`.
    pub fn object_for_predicate(&self, predicate: impl IntoEnvelope) -> Result<Envelope> {
        Ok(self.assertion_with_predicate(predicate)?.object().clone())
    }

    /// The object of the single assertion with `predicate`, decoded as `T`.
    pub fn extract_object<T: CborDecode>(&self, predicate: impl IntoEnvelope) -> Result<T> {
        self.object_for_predicate(predicate)?.extract()
    }

    /// Digests of every element reachable from this envelope.
    ///
    /// Passing the result to `redact_revealing` reproduces this envelope.
    pub fn deep_digests(&self) -> HashSet<Digest> {
        let mut out = HashSet::new();
        self.collect_deep_digests(&mut out);
        out
    }

    pub(crate) fn collect_deep_digests(&self, out: &mut HashSet<Digest>) {
        out.insert(self.digest());
        self.subject().collect_deep_digests(out);
        for assertion in self.assertions() {
            assertion.collect_deep_digests(out);
        }
    }

    /// Digests needed to reveal this envelope and its subject, but nothing
    /// inside its assertions.
    pub fn shallow_digests(&self) -> HashSet<Digest> {
        HashSet::from([self.digest(), self.subject().digest()])
    }
}

impl PartialEq for Envelope {
    fn eq(&self, other: &Self) -> bool {
        self.digest() == other.digest()
    }
}

impl Eq for Envelope {}

impl Hash for Envelope {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.digest().hash(state);
    }
}

impl fmt::Debug for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Envelope")
            .field("digest", &self.digest())
            .field("subject", self.subject())
            .field("assertions", &self.assertions())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicate::KnownPredicate;

    #[test]
    fn test_bare_envelope_digest_matches_subject() {
        let envelope = Envelope::new("hello");
        assert_eq!(envelope.digest(), Subject::leaf("hello").digest());
        assert!(!envelope.has_assertions());
    }

    #[test]
    fn test_digest_with_assertions() {
        let subject = Envelope::new("Alice");
        let envelope = subject.add("knows", "Bob");
        let assertion = Assertion::new("knows", "Bob");

        let expected = Digest::from_digests(&[subject.digest(), assertion.digest()]);
        assert_eq!(envelope.digest(), expected);
        assert_ne!(envelope.digest(), subject.digest());
    }

    #[test]
    fn test_assertion_order_does_not_matter() {
        let a = Envelope::new("Alice").add("knows", "Bob").add("knows", "Carol");
        let b = Envelope::new("Alice").add("knows", "Carol").add("knows", "Bob");
        assert_eq!(a.digest(), b.digest());

        let digests: Vec<Digest> = a.assertions().iter().map(Assertion::digest).collect();
        let mut sorted = digests.clone();
        sorted.sort();
        assert_eq!(digests, sorted);
    }

    #[test]
    fn test_duplicate_assertions_collapse() {
        let once = Envelope::new("Alice").add("knows", "Bob");
        let twice = once.add("knows", "Bob");
        assert_eq!(twice.assertions().len(), 1);
        assert_eq!(once, twice);

        let built = Envelope::with_assertions(
            Subject::leaf("Alice"),
            vec![Assertion::new("knows", "Bob"), Assertion::new("knows", "Bob")],
        );
        assert_eq!(built, once);
    }

    #[test]
    fn test_revoke() {
        let base = Envelope::new("Alice");
        let with = base.add("knows", "Bob");
        let digest = Assertion::new("knows", "Bob").digest();

        assert_eq!(with.revoke(&digest), base);
        assert_eq!(base.revoke(&digest), base);
    }

    #[test]
    fn test_add_optional() {
        let base = Envelope::new("Alice");
        assert_eq!(base.add_optional("nick", None::<&str>), base);
        assert_eq!(base.add_optional("nick", Some("Al")), base.add("nick", "Al"));
    }

    #[test]
    fn test_from_digest_equals_original() {
        let original = Envelope::new("Alice").add("knows", "Bob");
        let placeholder = Envelope::from_digest(original.digest());
        assert_eq!(placeholder, original);
        assert!(placeholder.subject().is_redacted());
    }

    #[test]
    fn test_enclose_and_extract() {
        let inner = Envelope::new("Alice").add("knows", "Bob");
        let outer = inner.enclose();
        assert_ne!(outer.digest(), Envelope::new("Alice").digest());
        assert_eq!(outer.digest(), inner.digest());
        assert_eq!(outer.extract_envelope().unwrap(), inner);

        let wrapped = outer.add(KnownPredicate::Note, "wrapped");
        assert_ne!(wrapped.digest(), inner.digest());
        assert!(Envelope::new("x").extract_envelope().is_err());
    }

    #[test]
    fn test_enclose_keeps_identity() {
        let bare = Envelope::new("hello");
        assert_eq!(bare.enclose(), bare);
        assert_eq!(bare.enclose().enclose().digest(), bare.digest());

        let alice = envelope_seal::PrivateKeyBase::from_seed(b"alice");
        let inner = Envelope::new("Alice").add("knows", "Bob");
        let signed = inner.enclose().sign(&alice);
        let signature = signed.signatures().unwrap()[0];
        assert!(alice
            .public_keys()
            .signing_public_key()
            .verify(&inner.digest(), &signature)
            .is_ok());
    }

    #[test]
    fn test_extract_leaf() {
        let envelope = Envelope::new(42u64).add("unit", "answers");
        assert_eq!(envelope.extract::<u64>().unwrap(), 42);
        assert!(matches!(
            envelope.extract::<String>(),
            Err(EnvelopeError::InvalidFormat(_))
        ));
        assert!(matches!(
            Envelope::from_digest(envelope.digest()).extract::<u64>(),
            Err(EnvelopeError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_predicate_queries() {
        let envelope = Envelope::new("Alice")
            .add("knows", "Bob")
            .add("knows", "Carol")
            .add(KnownPredicate::Note, "friendly");

        assert_eq!(envelope.assertions_with_predicate("knows").len(), 2);
        assert!(matches!(
            envelope.assertion_with_predicate("knows"),
            Err(EnvelopeError::AmbiguousAssertion { count: 2 })
        ));
        assert!(matches!(
            envelope.assertion_with_predicate("likes"),
            Err(EnvelopeError::AmbiguousAssertion { count: 0 })
        ));
        assert_eq!(
            envelope
                .extract_object::<String>(KnownPredicate::Note)
                .unwrap(),
            "friendly"
        );
    }

    #[test]
    fn test_shallow_and_deep_digests() {
        let envelope = Envelope::new("Alice").add("knows", "Bob");
        let shallow = envelope.shallow_digests();
        assert_eq!(shallow.len(), 2);
        assert!(shallow.contains(&envelope.digest()));
        assert!(shallow.contains(&envelope.subject().digest()));

        let deep = envelope.deep_digests();
        let assertion = &envelope.assertions()[0];
        for digest in [
            envelope.digest(),
            envelope.subject().digest(),
            assertion.digest(),
            assertion.predicate().digest(),
            assertion.object().digest(),
        ] {
            assert!(deep.contains(&digest));
        }
        assert_eq!(deep.len(), 5);
    }

    #[test]
    fn test_envelope_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Envelope>();
    }
}
