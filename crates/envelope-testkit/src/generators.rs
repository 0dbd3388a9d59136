//! Proptest generators for property-based testing.

use std::collections::HashSet;

use ciborium::value::Value;
use proptest::prelude::*;

use envelope::{Digest, Envelope, KnownPredicate, PrivateKeyBase, SymmetricKey};
use envelope_seal::Nonce;

/// A CBOR value suitable for a leaf.
pub fn leaf_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        "[a-zA-Z0-9 ]{0,24}".prop_map(Value::Text),
        any::<i64>().prop_map(|n| Value::Integer(n.into())),
        any::<u64>().prop_map(|n| Value::Integer(n.into())),
        any::<bool>().prop_map(Value::Bool),
        prop::collection::vec(any::<u8>(), 0..48).prop_map(Value::Bytes),
        Just(Value::Null),
    ]
}

pub fn known_predicate() -> impl Strategy<Value = KnownPredicate> {
    (1u64..=14).prop_map(|n| KnownPredicate::from_u64(n).unwrap_or(KnownPredicate::Note))
}

/// A leaf envelope.
pub fn leaf() -> impl Strategy<Value = Envelope> {
    leaf_value().prop_map(|value| Envelope::new(value))
}

/// A predicate, either well-known or an arbitrary leaf.
pub fn predicate() -> impl Strategy<Value = Envelope> {
    prop_oneof![known_predicate().prop_map(|p| Envelope::new(p)), leaf()]
}

/// Envelopes nested a few levels deep: assertions on subjects, predicates,
/// and objects, and enclosed envelopes.
pub fn envelope() -> impl Strategy<Value = Envelope> {
    leaf().prop_recursive(3, 32, 4, |inner| {
        prop_oneof![
            (
                inner.clone(),
                prop::collection::vec((predicate(), inner.clone()), 1..4)
            )
                .prop_map(|(subject, pairs)| {
                    pairs
                        .into_iter()
                        .fold(subject, |envelope, (p, o)| envelope.add(p, o))
                }),
            inner.prop_map(|envelope| envelope.enclose()),
        ]
    })
}

/// An envelope with a random subset of its digests selected by `mask`.
pub fn envelope_with_selection() -> impl Strategy<Value = (Envelope, HashSet<Digest>)> {
    (envelope(), any::<u64>()).prop_map(|(envelope, mask)| {
        let selection = select(&envelope.deep_digests(), mask);
        (envelope, selection)
    })
}

/// Pick digests from `digests` by bits of `mask`, in digest order.
pub fn select(digests: &HashSet<Digest>, mask: u64) -> HashSet<Digest> {
    let mut sorted: Vec<Digest> = digests.iter().copied().collect();
    sorted.sort();
    sorted
        .into_iter()
        .enumerate()
        .filter(|(i, _)| (mask >> (i % 64)) & 1 == 1)
        .map(|(_, digest)| digest)
        .collect()
}

pub fn private_keys() -> impl Strategy<Value = PrivateKeyBase> {
    any::<[u8; 32]>().prop_map(|seed| PrivateKeyBase::from_seed(&seed))
}

pub fn symmetric_key() -> impl Strategy<Value = SymmetricKey> {
    any::<[u8; 32]>().prop_map(SymmetricKey::from_bytes)
}

pub fn nonce() -> impl Strategy<Value = Nonce> {
    any::<[u8; 12]>().prop_map(Nonce::from_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn test_assertion_order_independent(
            subject in leaf(),
            pairs in prop::collection::vec((predicate(), leaf()), 1..6),
        ) {
            let forward = pairs
                .iter()
                .fold(subject.clone(), |e, (p, o)| e.add(p, o));
            let backward = pairs
                .iter()
                .rev()
                .fold(subject, |e, (p, o)| e.add(p, o));

            prop_assert_eq!(forward.digest(), backward.digest());
            prop_assert_eq!(forward.to_bytes(), backward.to_bytes());
        }

        #[test]
        fn test_redaction_preserves_digest((envelope, selection) in envelope_with_selection()) {
            prop_assert_eq!(envelope.redact_items(&selection).digest(), envelope.digest());
            prop_assert_eq!(envelope.redact_revealing(&selection).digest(), envelope.digest());
        }

        #[test]
        fn test_redaction_idempotent((envelope, selection) in envelope_with_selection()) {
            let once = envelope.redact_items(&selection);
            let twice = once.redact_items(&selection);
            prop_assert_eq!(once.to_bytes(), twice.to_bytes());
        }

        #[test]
        fn test_remove_reveal_duality((envelope, selection) in envelope_with_selection()) {
            let keep: HashSet<Digest> = envelope
                .deep_digests()
                .difference(&selection)
                .copied()
                .collect();
            prop_assert_eq!(
                envelope.redact_items(&selection).to_bytes(),
                envelope.redact_revealing(&keep).to_bytes()
            );
        }

        #[test]
        fn test_reveal_everything_is_identity(envelope in envelope()) {
            let revealed = envelope.redact_revealing(&envelope.deep_digests());
            prop_assert_eq!(revealed.to_bytes(), envelope.to_bytes());
        }

        #[test]
        fn test_wire_roundtrip((envelope, selection) in envelope_with_selection()) {
            for candidate in [envelope.clone(), envelope.redact_items(&selection)] {
                let bytes = candidate.to_bytes();
                let decoded = Envelope::from_bytes(&bytes).unwrap();
                prop_assert_eq!(decoded.digest(), candidate.digest());
                prop_assert_eq!(decoded.to_bytes(), bytes);
            }
        }

        #[test]
        fn test_encrypt_decrypt(
            envelope in envelope(),
            key in symmetric_key(),
            nonce in nonce(),
        ) {
            let encrypted = envelope.encrypt_subject_with_nonce(&key, nonce).unwrap();
            prop_assert_eq!(encrypted.digest(), envelope.digest());

            let decoded = Envelope::from_bytes(&encrypted.to_bytes()).unwrap();
            let decrypted = decoded.decrypt_subject(&key).unwrap();
            prop_assert_eq!(decrypted.to_bytes(), envelope.to_bytes());
        }

        #[test]
        fn test_signature_survives_redaction(
            (envelope, selection) in envelope_with_selection(),
            signer in private_keys(),
        ) {
            let signed = envelope.enclose().sign(&signer);
            let signature_digests: HashSet<Digest> = signed
                .assertions()
                .iter()
                .flat_map(|a| a.deep_digests())
                .collect();
            // Keep the signature itself readable; redact anything else.
            let selection: HashSet<Digest> = selection
                .difference(&signature_digests)
                .copied()
                .filter(|d| *d != signed.digest())
                .collect();

            let redacted = signed.redact_items(&selection);
            prop_assert_eq!(redacted.digest(), signed.digest());
            prop_assert!(redacted.has_valid_signature(&signer.public_keys()).unwrap());
        }
    }
}
