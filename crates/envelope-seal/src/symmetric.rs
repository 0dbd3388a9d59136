//! Symmetric authenticated encryption.
//!
//! IETF ChaCha20-Poly1305 with a 256-bit key, 96-bit nonce, and detached
//! 128-bit authentication tag.

use bytes::Bytes;
use chacha20poly1305::{
    aead::{AeadInPlace, KeyInit},
    ChaCha20Poly1305, Nonce as AeadNonce, Tag,
};
use ciborium::value::Value;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;

use envelope_core::cbor::{expect_array, expect_bytes, fixed_bytes, tagged, untag};
use envelope_core::{tags, CborDecode, CborEncode, CoreError, Digest};

use crate::error::{Result, SealError};

/// A 256-bit symmetric key.
#[derive(Clone, PartialEq, Eq)]
pub struct SymmetricKey([u8; 32]);

impl SymmetricKey {
    /// Generate a new random key.
    pub fn generate() -> Self {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Create from a slice that must be exactly 32 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let arr: [u8; 32] = bytes.try_into().map_err(|_| CoreError::InvalidLength {
            what: "symmetric key",
            expected: 32,
            actual: bytes.len(),
        })?;
        Ok(Self(arr))
    }

    /// Get the raw bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Encrypt `plaintext`, authenticating `aad` alongside it.
    ///
    /// A random nonce is drawn when `nonce` is `None`.
    pub fn encrypt(
        &self,
        plaintext: &[u8],
        aad: &[u8],
        nonce: Option<Nonce>,
    ) -> Result<EncryptedMessage> {
        let cipher = ChaCha20Poly1305::new_from_slice(&self.0)
            .map_err(|e| SealError::EncryptionError(e.to_string()))?;
        let nonce = nonce.unwrap_or_else(Nonce::generate);

        let mut buffer = plaintext.to_vec();
        let tag = cipher
            .encrypt_in_place_detached(AeadNonce::from_slice(&nonce.0), aad, &mut buffer)
            .map_err(|e| SealError::EncryptionError(e.to_string()))?;
        let mut auth = [0u8; 16];
        auth.copy_from_slice(&tag);

        Ok(EncryptedMessage {
            ciphertext: Bytes::from(buffer),
            aad: Bytes::copy_from_slice(aad),
            nonce,
            auth,
        })
    }

    /// Encrypt with the tagged encoding of `digest` as associated data.
    pub fn encrypt_with_digest(
        &self,
        plaintext: &[u8],
        digest: &Digest,
        nonce: Option<Nonce>,
    ) -> Result<EncryptedMessage> {
        self.encrypt(plaintext, &digest.to_cbor_bytes(), nonce)
    }

    /// Decrypt and authenticate a message.
    pub fn decrypt(&self, message: &EncryptedMessage) -> Result<Vec<u8>> {
        let cipher =
            ChaCha20Poly1305::new_from_slice(&self.0).map_err(|_| SealError::DecryptionError)?;

        let mut buffer = message.ciphertext.to_vec();
        cipher
            .decrypt_in_place_detached(
                AeadNonce::from_slice(&message.nonce.0),
                &message.aad,
                &mut buffer,
                Tag::from_slice(&message.auth),
            )
            .map_err(|_| SealError::DecryptionError)?;
        Ok(buffer)
    }
}

impl fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SymmetricKey(..)")
    }
}

impl CborEncode for SymmetricKey {
    fn to_cbor(&self) -> Value {
        tagged(tags::SYMMETRIC_KEY, Value::Bytes(self.0.to_vec()))
    }
}

impl CborDecode for SymmetricKey {
    fn from_cbor(value: &Value) -> envelope_core::Result<Self> {
        let inner = untag(tags::SYMMETRIC_KEY, value)?;
        Ok(Self(fixed_bytes(inner, "symmetric key")?))
    }
}

/// A 96-bit nonce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nonce(pub [u8; 12]);

impl Nonce {
    /// Generate a new random nonce.
    pub fn generate() -> Self {
        let mut bytes = [0u8; 12];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 12]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 12] {
        &self.0
    }
}

impl AsRef<[u8]> for Nonce {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Ciphertext with everything except the key needed to open it.
///
/// The ciphertext buffer is reference counted, so clones of a message
/// share one allocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedMessage {
    ciphertext: Bytes,
    aad: Bytes,
    nonce: Nonce,
    auth: [u8; 16],
}

impl EncryptedMessage {
    /// The encrypted bytes, without the authentication tag.
    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }

    /// Associated data authenticated with the ciphertext.
    pub fn aad(&self) -> &[u8] {
        &self.aad
    }

    pub fn nonce(&self) -> &Nonce {
        &self.nonce
    }

    pub fn auth(&self) -> &[u8; 16] {
        &self.auth
    }

    /// The plaintext digest carried in the associated data.
    pub fn digest(&self) -> Result<Digest> {
        if self.aad.is_empty() {
            return Err(SealError::MissingDigest);
        }
        Ok(Digest::from_cbor_bytes(&self.aad)?)
    }
}

impl CborEncode for EncryptedMessage {
    fn to_cbor(&self) -> Value {
        let mut items = vec![
            Value::Bytes(self.ciphertext.to_vec()),
            Value::Bytes(self.nonce.0.to_vec()),
            Value::Bytes(self.auth.to_vec()),
        ];
        if !self.aad.is_empty() {
            items.push(Value::Bytes(self.aad.to_vec()));
        }
        tagged(tags::ENCRYPTED, Value::Array(items))
    }
}

impl CborDecode for EncryptedMessage {
    fn from_cbor(value: &Value) -> envelope_core::Result<Self> {
        let items = expect_array(untag(tags::ENCRYPTED, value)?, "encrypted message")?;
        if items.len() != 3 && items.len() != 4 {
            return Err(CoreError::Malformed(format!(
                "encrypted message: expected 3 or 4 elements, got {}",
                items.len()
            )));
        }

        let ciphertext = Bytes::copy_from_slice(expect_bytes(&items[0], "ciphertext")?);
        let nonce = Nonce(fixed_bytes(&items[1], "nonce")?);
        let auth = fixed_bytes(&items[2], "auth")?;
        let aad = match items.get(3) {
            Some(item) => {
                let aad = expect_bytes(item, "aad")?;
                if aad.is_empty() {
                    return Err(CoreError::Malformed("encrypted message: empty aad".into()));
                }
                Bytes::copy_from_slice(aad)
            }
            None => Bytes::new(),
        };

        Ok(Self {
            ciphertext,
            aad,
            nonce,
            auth,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encrypt_decrypt() {
        let key = SymmetricKey::generate();
        let plaintext = b"hello, world!";

        let message = key.encrypt(plaintext, b"", None).unwrap();
        assert_ne!(message.ciphertext(), plaintext);
        assert_eq!(message.ciphertext().len(), plaintext.len());

        let decrypted = key.decrypt(&message).unwrap();
        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn test_decrypt_wrong_key_fails() {
        let key1 = SymmetricKey::generate();
        let key2 = SymmetricKey::generate();

        let message = key1.encrypt(b"secret", b"", None).unwrap();

        // Wrong key should fail
        assert!(matches!(key2.decrypt(&message), Err(SealError::DecryptionError)));
    }

    #[test]
    fn test_aad_is_authenticated() {
        let key = SymmetricKey::generate();
        let digest = Digest::from_image(b"secret");
        let message = key.encrypt_with_digest(b"secret", &digest, None).unwrap();
        assert_eq!(message.digest().unwrap(), digest);

        let mut tampered = message.clone();
        tampered.aad = Bytes::from(Digest::from_image(b"other").to_cbor_bytes());
        assert!(key.decrypt(&tampered).is_err());
    }

    #[test]
    fn test_fixed_nonce_is_deterministic() {
        let key = SymmetricKey::from_bytes([0x11; 32]);
        let nonce = Nonce::from_bytes([0x22; 12]);

        let m1 = key.encrypt(b"same", b"aad", Some(nonce)).unwrap();
        let m2 = key.encrypt(b"same", b"aad", Some(nonce)).unwrap();
        assert_eq!(m1, m2);
    }

    #[test]
    fn test_message_cbor() {
        let key = SymmetricKey::generate();
        let digest = Digest::from_image(b"payload");
        let message = key.encrypt_with_digest(b"payload", &digest, None).unwrap();

        let decoded = EncryptedMessage::from_cbor_bytes(&message.to_cbor_bytes()).unwrap();
        assert_eq!(decoded, message);
        assert_eq!(key.decrypt(&decoded).unwrap(), b"payload");

        // No aad means three elements and no digest
        let bare = key.encrypt(b"payload", b"", None).unwrap();
        let decoded = EncryptedMessage::from_cbor_bytes(&bare.to_cbor_bytes()).unwrap();
        assert!(matches!(decoded.digest(), Err(SealError::MissingDigest)));
    }

    #[test]
    fn test_message_cbor_rejects_bad_nonce() {
        let value = tagged(
            tags::ENCRYPTED,
            Value::Array(vec![
                Value::Bytes(vec![1, 2, 3]),
                Value::Bytes(vec![0; 11]),
                Value::Bytes(vec![0; 16]),
            ]),
        );
        assert!(EncryptedMessage::from_cbor(&value).is_err());
    }

    #[test]
    fn test_key_cbor() {
        let key = SymmetricKey::generate();
        let decoded = SymmetricKey::from_cbor_bytes(&key.to_cbor_bytes()).unwrap();
        assert_eq!(decoded, key);
    }
}
