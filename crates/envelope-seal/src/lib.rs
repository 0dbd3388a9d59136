//! # Envelope Seal
//!
//! Confidentiality primitives for Envelope documents.
//!
//! ## Encryption Model
//!
//! Content is encrypted once under a random content key
//! ([`SymmetricKey`], ChaCha20-Poly1305). The content key then reaches
//! readers in one of two ways:
//!
//! 1. **Sealed messages**: the key is encrypted to each recipient's X25519
//!    agreement key with an ephemeral sender key ([`SealedMessage`]).
//! 2. **Secret sharing**: the key is split into threshold shares across
//!    groups of holders ([`sskr::generate`], [`sskr::combine`]).
//!
//! Adding a recipient or a share holder never re-encrypts the content.
//!
//! ## Usage
//!
//! ```rust
//! use envelope_seal::{PrivateKeyBase, SealedMessage, SymmetricKey};
//!
//! let bob = PrivateKeyBase::from_seed(b"bob");
//! let content_key = SymmetricKey::generate();
//!
//! let sealed = SealedMessage::seal(content_key.as_bytes(), &bob.public_keys()).unwrap();
//! assert_eq!(sealed.unseal(&bob).unwrap(), content_key.as_bytes());
//! ```

pub mod agreement;
pub mod error;
pub mod keys;
pub mod sealed;
pub mod shamir;
pub mod sskr;
pub mod symmetric;

pub use agreement::{AgreementPrivateKey, AgreementPublicKey, EphemeralKeyPair, SharedKey};
pub use error::{Result, SealError, SskrError};
pub use keys::{PrivateKeyBase, PublicKeyBase};
pub use sealed::SealedMessage;
pub use sskr::{GroupSpec, SskrShare, SskrSpec};
pub use symmetric::{EncryptedMessage, Nonce, SymmetricKey};
