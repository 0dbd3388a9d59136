//! Well-known predicates.
//!
//! These encode as compact tagged integers rather than text, so the same
//! predicate always has the same digest.

use ciborium::value::Value;
use std::fmt;

use envelope_core::cbor::{expect_uint, tagged, untag};
use envelope_core::{tags, CborDecode, CborEncode, CoreError};

/// Predicates with a fixed meaning across all envelopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u64)]
pub enum KnownPredicate {
    Id = 1,
    IsA = 2,
    VerifiedBy = 3,
    Note = 4,
    HasRecipient = 5,
    SskrShare = 6,
    Controller = 7,
    PublicKeys = 8,
    DereferenceVia = 9,
    Entity = 10,
    HasName = 11,
    Language = 12,
    Issuer = 13,
    Holder = 14,
}

impl KnownPredicate {
    pub fn from_u64(n: u64) -> Option<Self> {
        use KnownPredicate::*;
        let predicate = match n {
            1 => Id,
            2 => IsA,
            3 => VerifiedBy,
            4 => Note,
            5 => HasRecipient,
            6 => SskrShare,
            7 => Controller,
            8 => PublicKeys,
            9 => DereferenceVia,
            10 => Entity,
            11 => HasName,
            12 => Language,
            13 => Issuer,
            14 => Holder,
            _ => return None,
        };
        Some(predicate)
    }

    pub fn to_u64(self) -> u64 {
        self as u64
    }

    /// Display name.
    pub fn name(self) -> &'static str {
        match self {
            KnownPredicate::Id => "id",
            KnownPredicate::IsA => "isA",
            KnownPredicate::VerifiedBy => "verifiedBy",
            KnownPredicate::Note => "note",
            KnownPredicate::HasRecipient => "hasRecipient",
            KnownPredicate::SskrShare => "sskrShare",
            KnownPredicate::Controller => "controller",
            KnownPredicate::PublicKeys => "publicKeys",
            KnownPredicate::DereferenceVia => "dereferenceVia",
            KnownPredicate::Entity => "entity",
            KnownPredicate::HasName => "hasName",
            KnownPredicate::Language => "language",
            KnownPredicate::Issuer => "issuer",
            KnownPredicate::Holder => "holder",
        }
    }
}

impl fmt::Display for KnownPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl CborEncode for KnownPredicate {
    fn to_cbor(&self) -> Value {
        tagged(tags::PREDICATE, Value::Integer(self.to_u64().into()))
    }
}

impl CborDecode for KnownPredicate {
    fn from_cbor(value: &Value) -> envelope_core::Result<Self> {
        let n = expect_uint(untag(tags::PREDICATE, value)?, "predicate")?;
        Self::from_u64(n).ok_or_else(|| CoreError::Malformed(format!("unknown predicate {n}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predicate_values_are_stable() {
        assert_eq!(KnownPredicate::Id.to_u64(), 1);
        assert_eq!(KnownPredicate::VerifiedBy.to_u64(), 3);
        assert_eq!(KnownPredicate::Holder.to_u64(), 14);

        for n in 1..=14 {
            let predicate = KnownPredicate::from_u64(n).unwrap();
            assert_eq!(predicate.to_u64(), n);
        }
        assert!(KnownPredicate::from_u64(0).is_none());
        assert!(KnownPredicate::from_u64(15).is_none());
    }

    #[test]
    fn test_predicate_encoding() {
        // tag 59, integer 4
        assert_eq!(KnownPredicate::Note.to_cbor_bytes(), vec![0xd8, 59, 0x04]);
        let decoded = KnownPredicate::from_cbor_bytes(&[0xd8, 59, 0x04]).unwrap();
        assert_eq!(decoded, KnownPredicate::Note);
    }

    #[test]
    fn test_unknown_predicate_rejected() {
        assert!(KnownPredicate::from_cbor_bytes(&[0xd8, 59, 0x18, 99]).is_err());
    }
}
