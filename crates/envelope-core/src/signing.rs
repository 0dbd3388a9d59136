//! Signing primitives.
//!
//! Wraps Ed25519 with strong types. Envelopes sign the 32 bytes of a
//! subject digest, never arbitrary messages.

use ciborium::value::Value;
use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::cbor::{fixed_bytes, tagged, untag, CborDecode, CborEncode};
use crate::digest::Digest;
use crate::error::{CoreError, Result};
use crate::tags;

/// A 32-byte Ed25519 public key.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SigningPublicKey(pub [u8; 32]);

impl SigningPublicKey {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Verify a signature over a digest.
    pub fn verify(&self, digest: &Digest, signature: &Signature) -> Result<()> {
        let verifying_key =
            VerifyingKey::from_bytes(&self.0).map_err(|_| CoreError::InvalidPublicKey)?;
        let sig = ed25519_dalek::Signature::from_bytes(&signature.0);

        verifying_key
            .verify(digest.as_bytes(), &sig)
            .map_err(|_| CoreError::InvalidSignature)
    }
}

impl fmt::Debug for SigningPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SigningPublicKey({})", &self.to_hex()[..16])
    }
}

impl AsRef<[u8]> for SigningPublicKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for SigningPublicKey {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl CborEncode for SigningPublicKey {
    fn to_cbor(&self) -> Value {
        tagged(tags::SIGNING_PUBLIC_KEY, Value::Bytes(self.0.to_vec()))
    }
}

impl CborDecode for SigningPublicKey {
    fn from_cbor(value: &Value) -> Result<Self> {
        let inner = untag(tags::SIGNING_PUBLIC_KEY, value)?;
        Ok(Self(fixed_bytes(inner, "signing public key")?))
    }
}

/// A 64-byte Ed25519 signature.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Signature(pub [u8; 64]);

impl Signature {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({}...)", &self.to_hex()[..16])
    }
}

impl AsRef<[u8]> for Signature {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 64]> for Signature {
    fn from(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }
}

impl CborEncode for Signature {
    fn to_cbor(&self) -> Value {
        tagged(tags::SIGNATURE, Value::Bytes(self.0.to_vec()))
    }
}

impl CborDecode for Signature {
    fn from_cbor(value: &Value) -> Result<Self> {
        let inner = untag(tags::SIGNATURE, value)?;
        Ok(Self(fixed_bytes(inner, "signature")?))
    }
}

/// An Ed25519 keypair.
#[derive(Clone)]
pub struct SigningKeypair {
    signing_key: SigningKey,
}

impl SigningKeypair {
    /// Generate a new random keypair.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        Self {
            signing_key: SigningKey::generate(&mut rng),
        }
    }

    /// Create from a 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    /// Get the public key.
    pub fn public_key(&self) -> SigningPublicKey {
        SigningPublicKey(self.signing_key.verifying_key().to_bytes())
    }

    /// Sign a digest.
    pub fn sign(&self, digest: &Digest) -> Signature {
        Signature(self.signing_key.sign(digest.as_bytes()).to_bytes())
    }
}

impl fmt::Debug for SigningKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SigningKeypair({:?})", self.public_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_verify() {
        let keypair = SigningKeypair::generate();
        let digest = Digest::from_image(b"hello world");
        let signature = keypair.sign(&digest);

        keypair
            .public_key()
            .verify(&digest, &signature)
            .expect("valid signature should verify");

        // Different digest should fail
        let other = Digest::from_image(b"hello worlD");
        assert!(matches!(
            keypair.public_key().verify(&other, &signature),
            Err(CoreError::InvalidSignature)
        ));
    }

    #[test]
    fn test_deterministic_from_seed() {
        let kp1 = SigningKeypair::from_seed(&[0x42; 32]);
        let kp2 = SigningKeypair::from_seed(&[0x42; 32]);
        assert_eq!(kp1.public_key(), kp2.public_key());

        // Ed25519 signatures are deterministic
        let digest = Digest::from_image(b"same");
        assert_eq!(kp1.sign(&digest), kp2.sign(&digest));
    }

    #[test]
    fn test_wrong_key_rejects() {
        let alice = SigningKeypair::from_seed(&[0x01; 32]);
        let carol = SigningKeypair::from_seed(&[0x03; 32]);
        let digest = Digest::from_image(b"message");

        let signature = alice.sign(&digest);
        assert!(carol.public_key().verify(&digest, &signature).is_err());
    }

    #[test]
    fn test_signature_cbor() {
        let keypair = SigningKeypair::from_seed(&[0x42; 32]);
        let signature = keypair.sign(&Digest::from_image(b"x"));

        let decoded = Signature::from_cbor_bytes(&signature.to_cbor_bytes()).unwrap();
        assert_eq!(decoded, signature);

        // A public key is not a signature
        let pk_bytes = keypair.public_key().to_cbor_bytes();
        assert!(Signature::from_cbor_bytes(&pk_bytes).is_err());
    }
}
