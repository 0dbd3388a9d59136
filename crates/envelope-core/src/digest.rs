//! Content digests.
//!
//! A [`Digest`] is the identity of every envelope node. Leaves hash their
//! canonical encoding; composite nodes hash the concatenation of their
//! children's digests.

use ciborium::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::cbor::{fixed_bytes, tagged, untag, CborDecode, CborEncode};
use crate::error::{CoreError, Result};
use crate::tags;

/// A 32-byte Blake3 digest.
///
/// Ordered lexicographically by bytes; assertion order within an envelope
/// follows this ordering.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Digest(pub [u8; 32]);

impl Digest {
    /// Hash the given data.
    pub fn from_image(data: &[u8]) -> Self {
        Self(*blake3::hash(data).as_bytes())
    }

    /// Hash the concatenation of several digests.
    pub fn from_digests<'a>(digests: impl IntoIterator<Item = &'a Digest>) -> Self {
        let mut hasher = blake3::Hasher::new();
        for digest in digests {
            hasher.update(&digest.0);
        }
        Self(*hasher.finalize().as_bytes())
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Whether this digest is the hash of `image`.
    pub fn validate(&self, image: &[u8]) -> bool {
        *self == Self::from_image(image)
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex string.
    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes = hex::decode(s).map_err(|e| CoreError::DecodingError(e.to_string()))?;
        let arr: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| CoreError::InvalidLength {
                what: "digest",
                expected: 32,
                actual: bytes.len(),
            })?;
        Ok(Self(arr))
    }

    /// First four bytes as hex, for compact display.
    pub fn short_description(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex()[..16])
    }
}

impl AsRef<[u8]> for Digest {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for Digest {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl CborEncode for Digest {
    fn to_cbor(&self) -> Value {
        tagged(tags::DIGEST, Value::Bytes(self.0.to_vec()))
    }
}

impl CborDecode for Digest {
    fn from_cbor(value: &Value) -> Result<Self> {
        let inner = untag(tags::DIGEST, value)?;
        Ok(Self(fixed_bytes(inner, "digest")?))
    }
}
