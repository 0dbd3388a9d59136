//! # Envelope Testkit
//!
//! Testing utilities for Envelope.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: fixed envelopes with pinned encodings for
//!   cross-implementation checks
//! - **Generators**: proptest strategies for envelopes, digest selections,
//!   and keys
//! - **Fixtures**: named parties with deterministic keys and sample documents
//!
//! ## Golden Vectors
//!
//! ```rust
//! use envelope_testkit::vectors::verify_all_vectors;
//!
//! for (name, matches, hex) in verify_all_vectors() {
//!     assert!(matches, "{name}: {hex}");
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use envelope_testkit::generators::envelope_with_selection;
//!
//! proptest! {
//!     #[test]
//!     fn redaction_keeps_digest((envelope, selection) in envelope_with_selection()) {
//!         prop_assert_eq!(envelope.redact_items(&selection).digest(), envelope.digest());
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use envelope_testkit::fixtures::{alice, credential};
//!
//! let issuer = alice();
//! let document = credential(&issuer, "holder-1");
//! assert!(document.has_valid_signature(&issuer.public_keys()).unwrap());
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{alice, bob, carol, credential, dan, multi_party, Party};
pub use generators::{envelope, envelope_with_selection, leaf};
pub use vectors::{all_vectors, verify_all_vectors, GoldenVector};
