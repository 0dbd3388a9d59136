//! Canonical CBOR encoding for deterministic serialization.
//!
//! Every digest in an envelope is computed over bytes produced here, so the
//! encoding follows RFC 8949 Core Deterministic Encoding:
//! - Map keys sorted by encoded byte comparison
//! - Integers and tags use the smallest valid head
//! - Definite lengths only
//! - Floats always use the 64-bit form
//!
//! **CRITICAL**: This encoding is FROZEN. Changing it changes every digest.

use ciborium::value::Value;
use std::io::Cursor;

use crate::error::{CoreError, Result};

/// Encode a CBOR value to canonical bytes.
pub fn encode(value: &Value) -> Vec<u8> {
    let mut buf = Vec::new();
    encode_value(&mut buf, value);
    buf
}

/// Decode exactly one CBOR item from `bytes`.
///
/// Trailing bytes after the first item are rejected.
pub fn decode(bytes: &[u8]) -> Result<Value> {
    let mut cursor = Cursor::new(bytes);
    let value: Value =
        ciborium::from_reader(&mut cursor).map_err(|e| CoreError::DecodingError(e.to_string()))?;

    let consumed = cursor.position() as usize;
    if consumed != bytes.len() {
        return Err(CoreError::TrailingBytes(bytes.len() - consumed));
    }
    Ok(value)
}

/// Decode one CBOR item and require that `bytes` is its canonical encoding.
pub fn decode_canonical(bytes: &[u8]) -> Result<Value> {
    let value = decode(bytes)?;
    if encode(&value) != bytes {
        return Err(CoreError::Malformed("non-canonical CBOR encoding".into()));
    }
    Ok(value)
}

/// Recursively encode a CBOR value.
fn encode_value(buf: &mut Vec<u8>, value: &Value) {
    match value {
        Value::Integer(i) => encode_integer(buf, *i),
        Value::Bytes(b) => encode_bytes(buf, b),
        Value::Text(s) => encode_text(buf, s),
        Value::Array(arr) => encode_array(buf, arr),
        Value::Map(entries) => encode_map(buf, entries),
        Value::Tag(tag, inner) => {
            encode_uint(buf, 6, *tag);
            encode_value(buf, inner);
        }
        Value::Bool(b) => buf.push(if *b { 0xf5 } else { 0xf4 }),
        Value::Null => buf.push(0xf6),
        Value::Float(f) => {
            buf.push(0xfb);
            buf.extend_from_slice(&f.to_bits().to_be_bytes());
        }
        _ => unreachable!("ciborium value variant without a canonical form"),
    }
}

fn encode_integer(buf: &mut Vec<u8>, i: ciborium::value::Integer) {
    let n: i128 = i.into();
    if n >= 0 {
        encode_uint(buf, 0, n as u64);
    } else {
        // CBOR encodes -1 as 0, -2 as 1, etc.
        encode_uint(buf, 1, (-1 - n) as u64);
    }
}

/// Encode an unsigned integer head with the given major type.
pub(crate) fn encode_uint(buf: &mut Vec<u8>, major: u8, n: u64) {
    let mt = major << 5;
    if n < 24 {
        buf.push(mt | (n as u8));
    } else if n <= 0xff {
        buf.push(mt | 24);
        buf.push(n as u8);
    } else if n <= 0xffff {
        buf.push(mt | 25);
        buf.extend_from_slice(&(n as u16).to_be_bytes());
    } else if n <= 0xffffffff {
        buf.push(mt | 26);
        buf.extend_from_slice(&(n as u32).to_be_bytes());
    } else {
        buf.push(mt | 27);
        buf.extend_from_slice(&n.to_be_bytes());
    }
}

fn encode_bytes(buf: &mut Vec<u8>, bytes: &[u8]) {
    encode_uint(buf, 2, bytes.len() as u64);
    buf.extend_from_slice(bytes);
}

fn encode_text(buf: &mut Vec<u8>, s: &str) {
    encode_uint(buf, 3, s.len() as u64);
    buf.extend_from_slice(s.as_bytes());
}

fn encode_array(buf: &mut Vec<u8>, arr: &[Value]) {
    encode_uint(buf, 4, arr.len() as u64);
    for item in arr {
        encode_value(buf, item);
    }
}

/// Keys are sorted by their encoded bytes.
fn encode_map(buf: &mut Vec<u8>, entries: &[(Value, Value)]) {
    let mut sorted: Vec<(Vec<u8>, &Value)> = entries
        .iter()
        .map(|(k, v)| {
            let mut key_bytes = Vec::new();
            encode_value(&mut key_bytes, k);
            (key_bytes, v)
        })
        .collect();

    sorted.sort_by(|a, b| a.0.cmp(&b.0));

    encode_uint(buf, 5, sorted.len() as u64);
    for (key_bytes, v) in sorted {
        buf.extend_from_slice(&key_bytes);
        encode_value(buf, v);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_encoding() {
        let mut buf = Vec::new();

        // 0-23: single byte
        encode_uint(&mut buf, 0, 0);
        assert_eq!(buf, vec![0x00]);

        buf.clear();
        encode_uint(&mut buf, 0, 23);
        assert_eq!(buf, vec![0x17]);

        // 24-255: two bytes
        buf.clear();
        encode_uint(&mut buf, 0, 24);
        assert_eq!(buf, vec![0x18, 24]);

        // 256-65535: three bytes
        buf.clear();
        encode_uint(&mut buf, 0, 256);
        assert_eq!(buf, vec![0x19, 0x01, 0x00]);

        buf.clear();
        encode_uint(&mut buf, 0, 0x1_0000_0000);
        assert_eq!(buf, vec![0x1b, 0, 0, 0, 1, 0, 0, 0, 0]);
    }

    #[test]
    fn test_negative_integers() {
        assert_eq!(encode(&Value::Integer((-1).into())), vec![0x20]);
        assert_eq!(encode(&Value::Integer((-25).into())), vec![0x38, 24]);
    }

    #[test]
    fn test_tag_encoding() {
        let value = Value::Tag(60, Box::new(Value::Text("hello".into())));
        assert_eq!(encode(&value), vec![0xd8, 60, 0x65, b'h', b'e', b'l', b'l', b'o']);

        let value = Value::Tag(309, Box::new(Value::Bytes(vec![1])));
        assert_eq!(encode(&value), vec![0xd9, 0x01, 0x35, 0x41, 0x01]);
    }

    #[test]
    fn test_map_key_ordering() {
        let entries = vec![
            (Value::Integer(8.into()), Value::Integer(80.into())),
            (Value::Integer(0.into()), Value::Integer(0.into())),
            (Value::Integer(5.into()), Value::Integer(50.into())),
        ];
        let buf = encode(&Value::Map(entries));

        assert_eq!(buf[0], 0xa3);
        // Keys should be in order: 0, 5, 8
        assert_eq!(buf[1], 0x00);
        assert_eq!(buf[3], 0x05);
        assert_eq!(buf[6], 0x08);
    }

    #[test]
    fn test_map_order_independent() {
        let a = Value::Map(vec![
            (Value::Text("b".into()), Value::Bool(true)),
            (Value::Text("a".into()), Value::Null),
        ]);
        let b = Value::Map(vec![
            (Value::Text("a".into()), Value::Null),
            (Value::Text("b".into()), Value::Bool(true)),
        ]);
        assert_eq!(encode(&a), encode(&b));
    }

    #[test]
    fn test_float_always_64_bit() {
        let buf = encode(&Value::Float(1.5));
        assert_eq!(buf.len(), 9);
        assert_eq!(buf[0], 0xfb);
    }

    #[test]
    fn test_decode_roundtrip() {
        let value = Value::Tag(
            49,
            Box::new(Value::Array(vec![
                Value::Text("subject".into()),
                Value::Bytes(vec![1, 2, 3]),
            ])),
        );
        let bytes = encode(&value);
        assert_eq!(decode(&bytes).unwrap(), value);
        assert_eq!(decode_canonical(&bytes).unwrap(), value);
    }

    #[test]
    fn test_decode_rejects_trailing_bytes() {
        let mut bytes = encode(&Value::Text("hello".into()));
        bytes.push(0x00);
        assert!(matches!(decode(&bytes), Err(CoreError::TrailingBytes(1))));
    }

    #[test]
    fn test_decode_canonical_rejects_long_head() {
        // 5 encoded with a one-byte argument instead of inline
        let bytes = [0x18, 0x05];
        assert!(decode(&bytes).is_ok());
        assert!(matches!(decode_canonical(&bytes), Err(CoreError::Malformed(_))));
    }
}
