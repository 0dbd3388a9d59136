//! Key bases: one signing key and one agreement key derived from one seed.

use ciborium::value::Value;
use rand::RngCore;
use std::fmt;

use envelope_core::cbor::{expect_array, tagged, untag};
use envelope_core::{
    tags, CborDecode, CborEncode, CoreError, Digest, Signature, SigningKeypair, SigningPublicKey,
};

use crate::agreement::{AgreementPrivateKey, AgreementPublicKey};

const SIGNING_CONTEXT: &str = "envelope-seal v1 signing key";
const AGREEMENT_CONTEXT: &str = "envelope-seal v1 agreement key";

/// A party's private keys.
#[derive(Clone)]
pub struct PrivateKeyBase {
    signing: SigningKeypair,
    agreement: AgreementPrivateKey,
}

impl PrivateKeyBase {
    /// Generate from a fresh random seed.
    pub fn generate() -> Self {
        let mut seed = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut seed);
        Self::from_seed(&seed)
    }

    /// Derive both keys from seed material of any length.
    pub fn from_seed(seed: &[u8]) -> Self {
        let signing_seed = blake3::derive_key(SIGNING_CONTEXT, seed);
        let agreement_seed = blake3::derive_key(AGREEMENT_CONTEXT, seed);
        Self {
            signing: SigningKeypair::from_seed(&signing_seed),
            agreement: AgreementPrivateKey::from_bytes(agreement_seed),
        }
    }

    pub fn signing_keypair(&self) -> &SigningKeypair {
        &self.signing
    }

    pub fn agreement_private_key(&self) -> &AgreementPrivateKey {
        &self.agreement
    }

    /// The matching public keys.
    pub fn public_keys(&self) -> PublicKeyBase {
        PublicKeyBase {
            signing: self.signing.public_key(),
            agreement: self.agreement.public_key(),
        }
    }

    /// Sign a digest with the signing key.
    pub fn sign(&self, digest: &Digest) -> Signature {
        self.signing.sign(digest)
    }
}

impl fmt::Debug for PrivateKeyBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PrivateKeyBase({:?})", self.signing.public_key())
    }
}

/// A party's public keys, shareable with anyone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKeyBase {
    signing: SigningPublicKey,
    agreement: AgreementPublicKey,
}

impl PublicKeyBase {
    pub fn new(signing: SigningPublicKey, agreement: AgreementPublicKey) -> Self {
        Self { signing, agreement }
    }

    pub fn signing_public_key(&self) -> &SigningPublicKey {
        &self.signing
    }

    pub fn agreement_public_key(&self) -> &AgreementPublicKey {
        &self.agreement
    }
}

impl CborEncode for PublicKeyBase {
    fn to_cbor(&self) -> Value {
        tagged(
            tags::PUBLIC_KEY_BASE,
            Value::Array(vec![self.signing.to_cbor(), self.agreement.to_cbor()]),
        )
    }
}

impl CborDecode for PublicKeyBase {
    fn from_cbor(value: &Value) -> envelope_core::Result<Self> {
        let items = expect_array(untag(tags::PUBLIC_KEY_BASE, value)?, "public key base")?;
        match items {
            [signing, agreement] => Ok(Self {
                signing: SigningPublicKey::from_cbor(signing)?,
                agreement: AgreementPublicKey::from_cbor(agreement)?,
            }),
            _ => Err(CoreError::Malformed(
                "public key base: expected 2 elements".into(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_derivation_is_deterministic() {
        let a = PrivateKeyBase::from_seed(b"alice seed");
        let b = PrivateKeyBase::from_seed(b"alice seed");
        assert_eq!(a.public_keys(), b.public_keys());

        let other = PrivateKeyBase::from_seed(b"bob seed");
        assert_ne!(a.public_keys(), other.public_keys());
    }

    #[test]
    fn test_signing_and_agreement_keys_differ() {
        let keys = PrivateKeyBase::from_seed(&[0x42; 32]).public_keys();
        assert_ne!(
            keys.signing_public_key().as_bytes(),
            keys.agreement_public_key().as_bytes()
        );
    }

    #[test]
    fn test_sign_with_key_base() {
        let keys = PrivateKeyBase::generate();
        let digest = Digest::from_image(b"subject");
        let signature = keys.sign(&digest);
        keys.public_keys()
            .signing_public_key()
            .verify(&digest, &signature)
            .unwrap();
    }

    #[test]
    fn test_public_key_base_cbor() {
        let keys = PrivateKeyBase::from_seed(b"carol").public_keys();
        let decoded = PublicKeyBase::from_cbor_bytes(&keys.to_cbor_bytes()).unwrap();
        assert_eq!(decoded, keys);
    }
}
