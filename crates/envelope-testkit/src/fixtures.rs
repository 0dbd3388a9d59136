//! Test fixtures and helpers.
//!
//! Named parties with deterministic keys, and sample documents built from
//! them.

use envelope::{Envelope, KnownPredicate, PrivateKeyBase, PublicKeyBase};

/// A participant with deterministic keys.
#[derive(Debug, Clone)]
pub struct Party {
    pub name: &'static str,
    pub keys: PrivateKeyBase,
}

impl Party {
    /// Keys derived from the party's name.
    pub fn named(name: &'static str) -> Self {
        Self {
            name,
            keys: PrivateKeyBase::from_seed(name.as_bytes()),
        }
    }

    pub fn with_seed(name: &'static str, seed: [u8; 32]) -> Self {
        Self {
            name,
            keys: PrivateKeyBase::from_seed(&seed),
        }
    }

    pub fn public_keys(&self) -> PublicKeyBase {
        self.keys.public_keys()
    }
}

pub fn alice() -> Party {
    Party::named("alice")
}

pub fn bob() -> Party {
    Party::named("bob")
}

pub fn carol() -> Party {
    Party::named("carol")
}

pub fn dan() -> Party {
    Party::named("dan")
}

/// Parties with distinct keys for multi-signer and multi-recipient tests.
pub fn multi_party(count: usize) -> Vec<Party> {
    (0..count)
        .map(|i| {
            let mut seed = [0u8; 32];
            seed[0] = i as u8;
            Party::with_seed("party", seed)
        })
        .collect()
}

/// A signed credential issued by `issuer` to `holder`:
///
/// ```text
/// {
///     "credential-1" [
///         isA: "Certificate"
///         issuer: "<issuer>"
///         holder: { "<holder>" [ ... personal details ... ] }
///         ...
///     ]
/// } [
///     verifiedBy: Signature
/// ]
/// ```
pub fn credential(issuer: &Party, holder: &str) -> Envelope {
    let holder = Envelope::new(holder)
        .add("firstName", "James")
        .add("lastName", "Maxwell")
        .add("birthDate", "1831-06-13")
        .add("dateOfIssue", "2026-01-01");

    Envelope::new("credential-1")
        .add(KnownPredicate::IsA, "Certificate")
        .add(KnownPredicate::Issuer, issuer.name)
        .add(KnownPredicate::Holder, holder)
        .add("subject", "Electromagnetism")
        .add("expirationDate", "2031-01-01")
        .add(KnownPredicate::Note, "Issued for testing.")
        .enclose()
        .sign_with_note(&issuer.keys, Some("Signed by the issuer."))
}
