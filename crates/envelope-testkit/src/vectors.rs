//! Golden test vectors for deterministic verification.
//!
//! Each vector builds an envelope without randomness and pins its canonical
//! encoding, so independent implementations can check they agree byte for
//! byte.

use envelope::{Digest, Envelope, KnownPredicate};

/// A golden test vector.
#[derive(Debug, Clone)]
pub struct GoldenVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// Builds the envelope.
    pub build: fn() -> Envelope,
    /// Expected canonical encoding (hex). Empty means report only.
    pub expected_hex: &'static str,
}

/// Get all golden test vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    vec![
        GoldenVector {
            name: "text leaf",
            build: || Envelope::new("hello"),
            expected_hex: "d831d83c6568656c6c6f",
        },
        GoldenVector {
            name: "integer leaf",
            build: || Envelope::new(42u64),
            expected_hex: "d831d83c182a",
        },
        GoldenVector {
            name: "known predicate leaf",
            build: || Envelope::new(KnownPredicate::Note),
            expected_hex: "d831d83cd83b04",
        },
        GoldenVector {
            name: "redacted placeholder",
            build: || Envelope::from_digest(Digest::from_bytes([0x11; 32])),
            expected_hex: "d831d8385820\
                           1111111111111111111111111111111111111111111111111111111111111111",
        },
        GoldenVector {
            name: "single assertion",
            build: || Envelope::new("Alice").add("knows", "Bob"),
            expected_hex: "d83182d83c65416c69636582\
                           d831d83c656b6e6f7773d831d83c63426f62",
        },
        GoldenVector {
            name: "enclosed leaf",
            build: || Envelope::new("hello").enclose(),
            expected_hex: "d831d831d83c6568656c6c6f",
        },
        GoldenVector {
            name: "several assertions",
            build: || {
                Envelope::new("Alice")
                    .add("knows", "Bob")
                    .add("knows", "Carol")
                    .add(KnownPredicate::IsA, "Person")
            },
            expected_hex: "",
        },
    ]
}

/// Check every vector's encoding against its expectation.
///
/// Returns `(name, matches, actual hex)`. Vectors without an expectation
/// always match and just report what was produced.
pub fn verify_all_vectors() -> Vec<(String, bool, String)> {
    all_vectors()
        .iter()
        .map(|v| {
            let hex = (v.build)().to_hex();
            let matches = v.expected_hex.is_empty() || hex == v.expected_hex;
            (v.name.to_string(), matches, hex)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_vectors_match() {
        for (name, matches, hex) in verify_all_vectors() {
            assert!(matches, "vector '{name}' produced {hex}");
        }
    }

    #[test]
    fn test_vectors_are_deterministic() {
        for vector in all_vectors() {
            let a = (vector.build)();
            let b = (vector.build)();
            assert_eq!(
                a.to_bytes(),
                b.to_bytes(),
                "vector '{}' produced different bytes",
                vector.name
            );
        }
    }

    #[test]
    fn test_vectors_decode_to_same_digest() {
        for vector in all_vectors() {
            let envelope = (vector.build)();
            let decoded = Envelope::from_bytes(&envelope.to_bytes()).unwrap();
            assert_eq!(decoded.digest(), envelope.digest(), "vector '{}'", vector.name);
        }
    }

    #[test]
    fn test_bare_and_enclosed_share_digest() {
        let vectors = all_vectors();
        let find = |name: &str| {
            vectors
                .iter()
                .find(|v| v.name == name)
                .map(|v| (v.build)())
                .unwrap()
        };
        assert_eq!(find("text leaf").digest(), find("enclosed leaf").digest());
        assert_ne!(find("text leaf").to_bytes(), find("enclosed leaf").to_bytes());
    }
}
