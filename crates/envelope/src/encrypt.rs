//! Symmetric encryption of envelope subjects.
//!
//! The subject's wire encoding is encrypted under a content key with the
//! subject's digest as associated data. The envelope digest is unchanged, so
//! signatures made before encryption still verify after decryption.

use envelope_core::canonical;
use envelope_seal::{Nonce, SymmetricKey};

use crate::envelope::Envelope;
use crate::error::{EnvelopeError, Result};
use crate::subject::Subject;

impl Subject {
    /// Encrypt a leaf or nested envelope subject.
    pub fn encrypt(&self, key: &SymmetricKey, nonce: Option<Nonce>) -> Result<Subject> {
        match self {
            Subject::Leaf(..) | Subject::Envelope(_) => {}
            Subject::Encrypted(..) => {
                return Err(EnvelopeError::InvalidOperation(
                    "subject is already encrypted".into(),
                ))
            }
            Subject::Redacted(_) => {
                return Err(EnvelopeError::InvalidOperation(
                    "cannot encrypt a redacted subject".into(),
                ))
            }
        }

        let digest = self.digest();
        let plaintext = canonical::encode(&self.to_wire());
        let message = key.encrypt_with_digest(&plaintext, &digest, nonce)?;
        Ok(Subject::Encrypted(message, digest))
    }

    /// Decrypt an encrypted subject and check it against its digest.
    pub fn decrypt(&self, key: &SymmetricKey) -> Result<Subject> {
        let Subject::Encrypted(message, digest) = self else {
            return Err(EnvelopeError::InvalidOperation(
                "subject is not encrypted".into(),
            ));
        };

        let plaintext = key.decrypt(message)?;
        let value = canonical::decode(&plaintext)?;
        let subject = Subject::from_wire(&value)?;
        if !(subject.is_leaf() || subject.is_envelope()) {
            return Err(EnvelopeError::InvalidFormat(
                "decrypted subject is not a leaf or envelope".into(),
            ));
        }

        if subject.digest() != *digest {
            return Err(EnvelopeError::InvalidDigest);
        }
        Ok(subject)
    }
}

impl Envelope {
    /// Encrypt the subject with a random nonce. Assertions stay readable.
    pub fn encrypt_subject(&self, key: &SymmetricKey) -> Result<Envelope> {
        self.encrypt_subject_inner(key, None)
    }

    /// Encrypt the subject with a caller-chosen nonce, for reproducible
    /// output. Never reuse a nonce with the same key.
    pub fn encrypt_subject_with_nonce(&self, key: &SymmetricKey, nonce: Nonce) -> Result<Envelope> {
        self.encrypt_subject_inner(key, Some(nonce))
    }

    fn encrypt_subject_inner(&self, key: &SymmetricKey, nonce: Option<Nonce>) -> Result<Envelope> {
        let subject = self.subject().encrypt(key, nonce)?;
        let encrypted = Envelope::with_assertions(subject, self.assertions().to_vec());
        debug_assert_eq!(encrypted.digest(), self.digest());
        Ok(encrypted)
    }

    /// Decrypt the subject, restoring the original envelope.
    pub fn decrypt_subject(&self, key: &SymmetricKey) -> Result<Envelope> {
        let subject = self.subject().decrypt(key)?;
        let decrypted = Envelope::with_assertions(subject, self.assertions().to_vec());
        debug_assert_eq!(decrypted.digest(), self.digest());
        Ok(decrypted)
    }
}
