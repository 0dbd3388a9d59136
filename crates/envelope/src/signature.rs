//! Signing envelope subjects and checking signatures.
//!
//! A signature covers the subject's digest only. To sign an envelope
//! together with its assertions, enclose it first.

use envelope_core::{Signature, SigningPublicKey};
use envelope_seal::{PrivateKeyBase, PublicKeyBase};
use tracing::{debug, trace};

use crate::assertion::Assertion;
use crate::envelope::Envelope;
use crate::error::{EnvelopeError, Result};
use crate::predicate::KnownPredicate;

/// A key that can check envelope signatures.
pub trait Verifier {
    fn signing_key(&self) -> &SigningPublicKey;
}

impl Verifier for SigningPublicKey {
    fn signing_key(&self) -> &SigningPublicKey {
        self
    }
}

impl Verifier for PublicKeyBase {
    fn signing_key(&self) -> &SigningPublicKey {
        self.signing_public_key()
    }
}

impl Envelope {
    /// Sign the subject and attach `verifiedBy: signature`.
    pub fn sign(&self, signer: &PrivateKeyBase) -> Envelope {
        self.sign_with_note(signer, None)
    }

    /// Sign the subject; the note, if any, is attached to the signature.
    pub fn sign_with_note(&self, signer: &PrivateKeyBase, note: Option<&str>) -> Envelope {
        let subject = self.subject().digest();
        trace!(subject = %subject, "signing subject");
        let signature = signer.sign(&subject);
        self.add_assertion(Assertion::verified_by(signature, note))
    }

    /// Sign the subject once per signer.
    pub fn sign_all(&self, signers: &[PrivateKeyBase]) -> Envelope {
        signers
            .iter()
            .fold(self.clone(), |envelope, signer| envelope.sign(signer))
    }

    /// Signatures carried by `verifiedBy` assertions.
    ///
    /// Redacted or encrypted signature objects are skipped; a leaf that is
    /// not a signature is an error.
    pub fn signatures(&self) -> Result<Vec<Signature>> {
        self.assertions_with_predicate(KnownPredicate::VerifiedBy)
            .iter()
            .map(Assertion::object)
            .filter(|object| object.subject().is_leaf())
            .map(|object| object.extract::<Signature>())
            .collect()
    }

    /// Whether `signature` is a valid signature of the subject by `key`.
    pub fn is_valid_signature(&self, signature: &Signature, key: &impl Verifier) -> bool {
        key.signing_key()
            .verify(&self.subject().digest(), signature)
            .is_ok()
    }

    /// Whether any attached signature verifies under `key`.
    pub fn has_valid_signature(&self, key: &impl Verifier) -> Result<bool> {
        let signatures = self.signatures()?;
        Ok(signatures.iter().any(|s| self.is_valid_signature(s, key)))
    }

    pub fn validate_signature(&self, key: &impl Verifier) -> Result<&Self> {
        if self.has_valid_signature(key)? {
            Ok(self)
        } else {
            Err(EnvelopeError::InvalidSignature)
        }
    }

    /// Whether at least `threshold` of `keys` have a valid signature
    /// attached. `None` requires all of them.
    ///
    /// An empty key list or a threshold of zero never validates, even
    /// though zero valid signatures would trivially reach a zero threshold.
    pub fn has_valid_signatures<K: Verifier>(
        &self,
        keys: &[K],
        threshold: Option<usize>,
    ) -> Result<bool> {
        let threshold = threshold.unwrap_or(keys.len());
        if threshold == 0 || threshold > keys.len() {
            return Ok(false);
        }

        let signatures = self.signatures()?;
        let mut count = 0;
        for key in keys {
            if signatures.iter().any(|s| self.is_valid_signature(s, key)) {
                count += 1;
                if count >= threshold {
                    trace!(count, threshold, "signature threshold met");
                    return Ok(true);
                }
            }
        }
        debug!(
            count,
            threshold,
            signatures = signatures.len(),
            "signature threshold not met"
        );
        Ok(false)
    }

    pub fn validate_signatures<K: Verifier>(
        &self,
        keys: &[K],
        threshold: Option<usize>,
    ) -> Result<&Self> {
        if self.has_valid_signatures(keys, threshold)? {
            Ok(self)
        } else {
            Err(EnvelopeError::InvalidSignature)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn keys() -> (PrivateKeyBase, PrivateKeyBase, PrivateKeyBase) {
        (
            PrivateKeyBase::from_seed(b"alice"),
            PrivateKeyBase::from_seed(b"bob"),
            PrivateKeyBase::from_seed(b"carol"),
        )
    }

    #[test]
    fn test_sign_and_verify() {
        let (alice, _, carol) = keys();
        let signed = Envelope::new("Hello.").sign(&alice);

        assert!(signed.has_valid_signature(&alice.public_keys()).unwrap());
        assert!(!signed.has_valid_signature(&carol.public_keys()).unwrap());
        assert!(signed.validate_signature(&alice.public_keys()).is_ok());
        assert!(matches!(
            signed.validate_signature(&carol.public_keys()),
            Err(EnvelopeError::InvalidSignature)
        ));
    }

    #[test]
    fn test_signing_changes_digest_not_subject() {
        let (alice, _, _) = keys();
        let plain = Envelope::new("Hello.");
        let signed = plain.sign(&alice);
        assert_ne!(signed.digest(), plain.digest());
        assert_eq!(signed.subject().digest(), plain.subject().digest());
    }

    #[test]
    fn test_signature_with_note() {
        let (alice, _, _) = keys();
        let signed = Envelope::new("Hello.").sign_with_note(&alice, Some("Made by Alice."));

        let object = signed
            .object_for_predicate(KnownPredicate::VerifiedBy)
            .unwrap();
        assert_eq!(
            object.extract_object::<String>(KnownPredicate::Note).unwrap(),
            "Made by Alice."
        );
        assert!(signed.has_valid_signature(alice.public_keys().signing_public_key()).unwrap());
    }

    #[test]
    fn test_threshold() {
        let (alice, bob, carol) = keys();
        let signed = Envelope::new("Hello.").sign_all(&[alice.clone(), carol.clone()]);
        let all = [alice.public_keys(), bob.public_keys(), carol.public_keys()];

        assert_eq!(signed.signatures().unwrap().len(), 2);
        assert!(signed.has_valid_signatures(&all, Some(2)).unwrap());
        assert!(!signed.has_valid_signatures(&all, Some(3)).unwrap());
        assert!(!signed.has_valid_signatures(&all, None).unwrap());
        assert!(signed
            .validate_signatures(&[alice.public_keys(), carol.public_keys()], None)
            .is_ok());
        assert!(!signed.has_valid_signatures(&all, Some(0)).unwrap());
        assert!(!signed
            .has_valid_signatures::<PublicKeyBase>(&[], None)
            .unwrap());
    }

    #[test]
    fn test_redacted_signature_is_skipped() {
        let (alice, _, _) = keys();
        let signed = Envelope::new("Hello.").sign(&alice);
        let object = signed
            .object_for_predicate(KnownPredicate::VerifiedBy)
            .unwrap();
        let redacted = signed.redact_items(&HashSet::from([object.digest()]));

        assert_eq!(redacted.digest(), signed.digest());
        assert!(redacted.signatures().unwrap().is_empty());
        assert!(!redacted.has_valid_signature(&alice.public_keys()).unwrap());
    }

    #[test]
    fn test_non_signature_object_is_an_error() {
        let envelope = Envelope::new("Hello.").add(KnownPredicate::VerifiedBy, "not a signature");
        assert!(matches!(
            envelope.signatures(),
            Err(EnvelopeError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_enclosed_signature_covers_assertions() {
        let (alice, _, _) = keys();
        let envelope = Envelope::new("Alice").add("knows", "Bob");
        let signed = envelope.enclose().sign(&alice);

        assert!(signed.has_valid_signature(&alice.public_keys()).unwrap());
        assert_eq!(signed.extract_envelope().unwrap(), envelope);

        let tampered = envelope.add("knows", "Mallory").enclose();
        let signature = signed.signatures().unwrap()[0];
        assert!(!tampered.is_valid_signature(&signature, &alice.public_keys()));
    }
}
