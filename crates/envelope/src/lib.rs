//! # Envelope
//!
//! Content-addressed documents built from a subject and assertions about
//! it, where any part can be removed, encrypted, or signed without
//! changing what the document commits to.
//!
//! ## Model
//!
//! Every element has a digest. A leaf's digest is the hash of its
//! canonical CBOR; an envelope's digest combines its subject's digest with
//! its assertions' digests in sorted order, and an envelope without
//! assertions has its subject's digest. Replacing any element with its
//! digest ([`Envelope::redact_items`]) or its ciphertext
//! ([`Envelope::encrypt_subject`]) leaves every digest above it unchanged,
//! which is what keeps signatures valid across those transformations.
//!
//! ## Usage
//!
//! ```rust
//! use envelope::{Envelope, KnownPredicate};
//! use envelope::seal::PrivateKeyBase;
//! use std::collections::HashSet;
//!
//! let alice = PrivateKeyBase::from_seed(b"alice");
//! let envelope = Envelope::new("Alice")
//!     .add("knows", "Bob")
//!     .add(KnownPredicate::Note, "private")
//!     .enclose()
//!     .sign(&alice);
//!
//! let inner = envelope.extract_envelope().unwrap();
//! let note = inner.assertion_with_predicate(KnownPredicate::Note).unwrap();
//! let elided = inner.redact_items(&HashSet::from([note.digest()]));
//!
//! assert_eq!(elided.digest(), inner.digest());
//! assert!(envelope.has_valid_signature(&alice.public_keys()).unwrap());
//! ```

pub mod assertion;
pub mod encrypt;
pub mod envelope;
pub mod error;
pub mod format;
pub mod predicate;
pub mod recipient;
pub mod redact;
pub mod share;
pub mod signature;
pub mod subject;
pub mod wire;

pub use envelope_seal as seal;

pub use assertion::Assertion;
pub use envelope::{Envelope, IntoEnvelope};
pub use envelope_core::{Digest, Signature};
pub use envelope_seal::{PrivateKeyBase, PublicKeyBase, SskrSpec, SymmetricKey};
pub use error::{EnvelopeError, Result};
pub use format::FormatOptions;
pub use predicate::KnownPredicate;
pub use signature::Verifier;
pub use subject::Subject;
