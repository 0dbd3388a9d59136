//! Conversions between Rust values and CBOR values.
//!
//! Any type implementing [`CborEncode`] can become the content of an
//! envelope leaf; [`CborDecode`] is the typed way back out.

use bytes::Bytes;
use ciborium::value::Value;

use crate::canonical;
use crate::error::{CoreError, Result};

/// A value with a CBOR representation.
pub trait CborEncode {
    /// Convert to a CBOR value.
    fn to_cbor(&self) -> Value;

    /// Canonical bytes of [`CborEncode::to_cbor`].
    fn to_cbor_bytes(&self) -> Vec<u8> {
        canonical::encode(&self.to_cbor())
    }
}

/// A value that can be recovered from its CBOR representation.
pub trait CborDecode: Sized {
    /// Parse from a CBOR value.
    fn from_cbor(value: &Value) -> Result<Self>;

    /// Parse from encoded bytes.
    fn from_cbor_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_cbor(&canonical::decode(bytes)?)
    }
}

/// Wrap a value in a CBOR tag.
pub fn tagged(tag: u64, value: Value) -> Value {
    Value::Tag(tag, Box::new(value))
}

/// The tag of a tagged value, if any.
pub fn tag_of(value: &Value) -> Option<u64> {
    match value {
        Value::Tag(tag, _) => Some(*tag),
        _ => None,
    }
}

/// Strip an expected tag, failing on any other tag or an untagged value.
pub fn untag(expected: u64, value: &Value) -> Result<&Value> {
    match value {
        Value::Tag(tag, inner) if *tag == expected => Ok(inner),
        other => Err(CoreError::UnexpectedTag {
            expected,
            actual: tag_of(other),
        }),
    }
}

/// Borrow a byte string.
pub fn expect_bytes<'a>(value: &'a Value, what: &str) -> Result<&'a [u8]> {
    match value {
        Value::Bytes(b) => Ok(b),
        _ => Err(CoreError::Malformed(format!("{what}: expected byte string"))),
    }
}

/// Borrow an array.
pub fn expect_array<'a>(value: &'a Value, what: &str) -> Result<&'a [Value]> {
    match value {
        Value::Array(items) => Ok(items),
        _ => Err(CoreError::Malformed(format!("{what}: expected array"))),
    }
}

/// Read a non-negative integer that fits in a `u64`.
pub fn expect_uint(value: &Value, what: &str) -> Result<u64> {
    match value {
        Value::Integer(i) => {
            let n: i128 = (*i).into();
            u64::try_from(n).map_err(|_| CoreError::Malformed(format!("{what}: out of range")))
        }
        _ => Err(CoreError::Malformed(format!("{what}: expected unsigned integer"))),
    }
}

/// Read a byte string of exactly `N` bytes.
pub fn fixed_bytes<const N: usize>(value: &Value, what: &'static str) -> Result<[u8; N]> {
    let bytes = expect_bytes(value, what)?;
    bytes.try_into().map_err(|_| CoreError::InvalidLength {
        what,
        expected: N,
        actual: bytes.len(),
    })
}

impl CborEncode for Value {
    fn to_cbor(&self) -> Value {
        self.clone()
    }
}

impl CborDecode for Value {
    fn from_cbor(value: &Value) -> Result<Self> {
        Ok(value.clone())
    }
}

impl CborEncode for String {
    fn to_cbor(&self) -> Value {
        Value::Text(self.clone())
    }
}

impl CborEncode for &str {
    fn to_cbor(&self) -> Value {
        Value::Text((*self).to_string())
    }
}

impl CborDecode for String {
    fn from_cbor(value: &Value) -> Result<Self> {
        match value {
            Value::Text(s) => Ok(s.clone()),
            _ => Err(CoreError::Malformed("expected text string".into())),
        }
    }
}

impl CborEncode for bool {
    fn to_cbor(&self) -> Value {
        Value::Bool(*self)
    }
}

impl CborDecode for bool {
    fn from_cbor(value: &Value) -> Result<Self> {
        match value {
            Value::Bool(b) => Ok(*b),
            _ => Err(CoreError::Malformed("expected boolean".into())),
        }
    }
}

impl CborEncode for u64 {
    fn to_cbor(&self) -> Value {
        Value::Integer((*self).into())
    }
}

impl CborDecode for u64 {
    fn from_cbor(value: &Value) -> Result<Self> {
        expect_uint(value, "integer")
    }
}

impl CborEncode for i64 {
    fn to_cbor(&self) -> Value {
        Value::Integer((*self).into())
    }
}

impl CborDecode for i64 {
    fn from_cbor(value: &Value) -> Result<Self> {
        match value {
            Value::Integer(i) => {
                let n: i128 = (*i).into();
                i64::try_from(n).map_err(|_| CoreError::Malformed("integer out of range".into()))
            }
            _ => Err(CoreError::Malformed("expected integer".into())),
        }
    }
}

impl CborEncode for Vec<u8> {
    fn to_cbor(&self) -> Value {
        Value::Bytes(self.clone())
    }
}

impl CborDecode for Vec<u8> {
    fn from_cbor(value: &Value) -> Result<Self> {
        expect_bytes(value, "bytes").map(<[u8]>::to_vec)
    }
}

impl CborEncode for Bytes {
    fn to_cbor(&self) -> Value {
        Value::Bytes(self.to_vec())
    }
}

impl CborDecode for Bytes {
    fn from_cbor(value: &Value) -> Result<Self> {
        expect_bytes(value, "bytes").map(Bytes::copy_from_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_untag_checks_tag() {
        let value = tagged(60, Value::Text("hello".into()));
        assert_eq!(untag(60, &value).unwrap(), &Value::Text("hello".into()));

        // Wrong tag should fail
        assert!(matches!(
            untag(49, &value),
            Err(CoreError::UnexpectedTag {
                expected: 49,
                actual: Some(60)
            })
        ));

        // Untagged should fail
        assert!(matches!(
            untag(49, &Value::Null),
            Err(CoreError::UnexpectedTag { actual: None, .. })
        ));
    }

    #[test]
    fn test_shared_bytes_codec() {
        let bytes = Bytes::from_static(b"ciphertext");
        let value = bytes.to_cbor();
        assert_eq!(value, Value::Bytes(b"ciphertext".to_vec()));
        assert_eq!(Bytes::from_cbor(&value).unwrap(), bytes);
        assert!(Bytes::from_cbor(&Value::Text("nope".into())).is_err());
    }

    #[test]
    fn test_fixed_bytes_length() {
        let value = Value::Bytes(vec![7; 12]);
        let arr: [u8; 12] = fixed_bytes(&value, "nonce").unwrap();
        assert_eq!(arr, [7; 12]);

        assert!(matches!(
            fixed_bytes::<32>(&value, "digest"),
            Err(CoreError::InvalidLength {
                expected: 32,
                actual: 12,
                ..
            })
        ));
    }

    #[test]
    fn test_integer_range() {
        assert_eq!(u64::from_cbor(&42u64.to_cbor()).unwrap(), 42);
        assert!(u64::from_cbor(&(-1i64).to_cbor()).is_err());
        assert_eq!(i64::from_cbor(&(-1i64).to_cbor()).unwrap(), -1);
    }

    #[test]
    fn test_text_from_bytes() {
        let bytes = "hello".to_cbor_bytes();
        assert_eq!(String::from_cbor_bytes(&bytes).unwrap(), "hello");
        assert!(bool::from_cbor_bytes(&bytes).is_err());
    }
}
