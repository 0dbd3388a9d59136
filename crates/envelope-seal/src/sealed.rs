//! Messages sealed to a single recipient.
//!
//! The sender generates an ephemeral X25519 key, agrees a shared secret with
//! the recipient's agreement key, and encrypts under a key derived from it.
//! Only the ephemeral public key travels with the ciphertext.

use ciborium::value::Value;

use envelope_core::cbor::{expect_array, tagged, untag};
use envelope_core::{tags, CborDecode, CborEncode, CoreError};

use crate::agreement::{AgreementPublicKey, EphemeralKeyPair};
use crate::error::Result;
use crate::keys::{PrivateKeyBase, PublicKeyBase};
use crate::symmetric::EncryptedMessage;

/// Ciphertext readable only by the holder of one agreement private key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedMessage {
    message: EncryptedMessage,
    ephemeral_public_key: AgreementPublicKey,
}

impl SealedMessage {
    /// Seal `plaintext` to `recipient`.
    pub fn seal(plaintext: &[u8], recipient: &PublicKeyBase) -> Result<Self> {
        let ephemeral = EphemeralKeyPair::generate();
        let ephemeral_public_key = ephemeral.public_key();
        let recipient_key = recipient.agreement_public_key();

        let shared = ephemeral.diffie_hellman(recipient_key);
        let wrap_key = shared.derive_symmetric_key(&context(&ephemeral_public_key, recipient_key));
        let message = wrap_key.encrypt(plaintext, b"", None)?;

        Ok(Self {
            message,
            ephemeral_public_key,
        })
    }

    /// Open with the recipient's private keys.
    ///
    /// Fails with a decryption error for any other recipient.
    pub fn unseal(&self, private_keys: &PrivateKeyBase) -> Result<Vec<u8>> {
        let agreement = private_keys.agreement_private_key();
        let shared = agreement.diffie_hellman(&self.ephemeral_public_key);
        let wrap_key = shared
            .derive_symmetric_key(&context(&self.ephemeral_public_key, &agreement.public_key()));
        wrap_key.decrypt(&self.message)
    }

    pub fn ephemeral_public_key(&self) -> &AgreementPublicKey {
        &self.ephemeral_public_key
    }
}

/// Both public halves bind the derived key to this exchange.
fn context(ephemeral: &AgreementPublicKey, recipient: &AgreementPublicKey) -> [u8; 64] {
    let mut context = [0u8; 64];
    context[..32].copy_from_slice(ephemeral.as_bytes());
    context[32..].copy_from_slice(recipient.as_bytes());
    context
}

impl CborEncode for SealedMessage {
    fn to_cbor(&self) -> Value {
        tagged(
            tags::SEALED_MESSAGE,
            Value::Array(vec![
                self.message.to_cbor(),
                self.ephemeral_public_key.to_cbor(),
            ]),
        )
    }
}

impl CborDecode for SealedMessage {
    fn from_cbor(value: &Value) -> envelope_core::Result<Self> {
        let items = expect_array(untag(tags::SEALED_MESSAGE, value)?, "sealed message")?;
        match items {
            [message, ephemeral] => Ok(Self {
                message: EncryptedMessage::from_cbor(message)?,
                ephemeral_public_key: AgreementPublicKey::from_cbor(ephemeral)?,
            }),
            _ => Err(CoreError::Malformed(
                "sealed message: expected 2 elements".into(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SealError;

    #[test]
    fn test_seal_unseal() {
        let bob = PrivateKeyBase::generate();
        let sealed = SealedMessage::seal(b"content key", &bob.public_keys()).unwrap();

        assert_eq!(sealed.unseal(&bob).unwrap(), b"content key");
    }

    #[test]
    fn test_wrong_recipient_fails() {
        let bob = PrivateKeyBase::generate();
        let carol = PrivateKeyBase::generate();
        let sealed = SealedMessage::seal(b"content key", &bob.public_keys()).unwrap();

        // Wrong recipient should fail
        assert!(matches!(sealed.unseal(&carol), Err(SealError::DecryptionError)));
    }

    #[test]
    fn test_each_seal_uses_fresh_ephemeral_key() {
        let bob = PrivateKeyBase::generate();
        let s1 = SealedMessage::seal(b"same", &bob.public_keys()).unwrap();
        let s2 = SealedMessage::seal(b"same", &bob.public_keys()).unwrap();
        assert_ne!(s1.ephemeral_public_key(), s2.ephemeral_public_key());
    }

    #[test]
    fn test_sealed_cbor() {
        let bob = PrivateKeyBase::from_seed(b"bob");
        let sealed = SealedMessage::seal(b"secret", &bob.public_keys()).unwrap();

        let decoded = SealedMessage::from_cbor_bytes(&sealed.to_cbor_bytes()).unwrap();
        assert_eq!(decoded, sealed);
        assert_eq!(decoded.unseal(&bob).unwrap(), b"secret");
    }
}
