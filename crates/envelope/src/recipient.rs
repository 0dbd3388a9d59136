//! Public-key encryption to one or more recipients.
//!
//! The subject is encrypted once under a random content key, and that key
//! is sealed separately to each recipient in a `hasRecipient` assertion.

use envelope_core::CborDecode;
use envelope_seal::{PrivateKeyBase, PublicKeyBase, SealedMessage, SymmetricKey};
use tracing::debug;

use crate::assertion::Assertion;
use crate::envelope::Envelope;
use crate::error::{EnvelopeError, Result};
use crate::predicate::KnownPredicate;

impl Envelope {
    /// Seal `content_key` to `recipient` and attach it.
    pub fn add_recipient(
        &self,
        recipient: &PublicKeyBase,
        content_key: &SymmetricKey,
    ) -> Result<Envelope> {
        Ok(self.add_assertion(Assertion::has_recipient(recipient, content_key)?))
    }

    /// Encrypt the subject under a fresh content key readable by each of
    /// `recipients`.
    pub fn encrypt_subject_to_recipients(&self, recipients: &[PublicKeyBase]) -> Result<Envelope> {
        let content_key = SymmetricKey::generate();
        let mut envelope = self.encrypt_subject(&content_key)?;
        for recipient in recipients {
            envelope = envelope.add_recipient(recipient, &content_key)?;
        }
        Ok(envelope)
    }

    /// Sealed messages from `hasRecipient` assertions, skipping redacted or
    /// encrypted objects.
    pub fn recipients(&self) -> Result<Vec<SealedMessage>> {
        self.assertions_with_predicate(KnownPredicate::HasRecipient)
            .iter()
            .map(Assertion::object)
            .filter(|object| object.subject().is_leaf())
            .map(|object| object.extract::<SealedMessage>())
            .collect()
    }

    /// Decrypt the subject with whichever sealed content key opens under
    /// `recipient`.
    pub fn decrypt_to(&self, recipient: &PrivateKeyBase) -> Result<Envelope> {
        let sealed = self.recipients()?;
        for (index, message) in sealed.iter().enumerate() {
            let Ok(plaintext) = message.unseal(recipient) else {
                continue;
            };
            debug!(index, "opened sealed content key");
            let content_key = SymmetricKey::from_cbor_bytes(&plaintext)?;
            return self.decrypt_subject(&content_key);
        }
        debug!(candidates = sealed.len(), "no sealed message opened");
        Err(EnvelopeError::InvalidRecipient)
    }
}
