//! Redaction: replacing parts of an envelope with their digests.
//!
//! Every redaction preserves the root digest, so signatures over the
//! original remain valid over any redacted form. Subtrees left untouched
//! are shared with the source envelope.

use std::collections::HashSet;

use envelope_core::Digest;

use crate::assertion::Assertion;
use crate::envelope::Envelope;
use crate::subject::Subject;

#[derive(Clone, Copy)]
enum Mode {
    /// Redact elements whose digest is in the set.
    Remove,
    /// Redact elements whose digest is not in the set.
    Reveal,
}

impl Mode {
    fn redacts(self, digest: &Digest, items: &HashSet<Digest>) -> bool {
        match self {
            Mode::Remove => items.contains(digest),
            Mode::Reveal => !items.contains(digest),
        }
    }
}

impl Envelope {
    /// Replace this whole envelope with its digest.
    pub fn redact(&self) -> Envelope {
        Envelope::from_digest(self.digest())
    }

    /// Redact every element whose digest is in `items`.
    pub fn redact_items(&self, items: &HashSet<Digest>) -> Envelope {
        self.redact_with(items, Mode::Remove)
    }

    /// Redact every element whose digest is not in `items`.
    ///
    /// Revealing a nested element requires revealing each enclosing element
    /// too; [`Envelope::deep_digests`] and [`Envelope::shallow_digests`] build
    /// such sets.
    pub fn redact_revealing(&self, items: &HashSet<Digest>) -> Envelope {
        self.redact_with(items, Mode::Reveal)
    }

    fn redact_with(&self, items: &HashSet<Digest>, mode: Mode) -> Envelope {
        if mode.redacts(&self.digest(), items) {
            return self.redact();
        }

        let subject = self.subject().redact_with(items, mode);
        let assertions: Vec<Assertion> = self
            .assertions()
            .iter()
            .map(|a| a.redact_with(items, mode))
            .collect();

        let unchanged = subject.is_same(self.subject())
            && assertions
                .iter()
                .zip(self.assertions())
                .all(|(new, old)| new.is_same(old));
        if unchanged {
            return self.clone();
        }

        let redacted = Envelope::with_assertions(subject, assertions);
        debug_assert_eq!(redacted.digest(), self.digest());
        redacted
    }
}

impl Subject {
    pub fn redact(&self) -> Subject {
        Subject::Redacted(self.digest())
    }

    fn redact_with(&self, items: &HashSet<Digest>, mode: Mode) -> Subject {
        let digest = self.digest();
        if mode.redacts(&digest, items) {
            return Subject::Redacted(digest);
        }
        match self {
            Subject::Envelope(envelope) => Subject::Envelope(envelope.redact_with(items, mode)),
            other => other.clone(),
        }
    }
}

impl Assertion {
    /// Redact both the predicate and the object. The assertion's own digest
    /// is unchanged.
    pub fn redact(&self) -> Assertion {
        let redacted = Assertion::new(self.predicate().redact(), self.object().redact());
        debug_assert_eq!(redacted.digest(), self.digest());
        redacted
    }

    fn redact_with(&self, items: &HashSet<Digest>, mode: Mode) -> Assertion {
        if mode.redacts(&self.digest(), items) {
            return self.redact();
        }
        let predicate = self.predicate().redact_with(items, mode);
        let object = self.object().redact_with(items, mode);
        if predicate.ptr_eq(self.predicate()) && object.ptr_eq(self.object()) {
            return self.clone();
        }
        Assertion::new(predicate, object)
    }
}
