//! Binary encoding of envelopes.
//!
//! An envelope is tag 49 around either its bare subject (no assertions) or
//! an array of the subject followed by its assertions in digest order. Each
//! assertion is a two-element array of tagged predicate and object
//! envelopes. Subjects are distinguished by tag:
//!
//! | Subject   | Encoding              |
//! |-----------|-----------------------|
//! | leaf      | tag 60 (value)        |
//! | envelope  | tag 49 (...)          |
//! | encrypted | tag 48 [ct, n, a, ad] |
//! | redacted  | tag 56 (digest)       |
//!
//! Decoding is strict: non-canonical bytes, unsorted or duplicated
//! assertions, and trailing data are all rejected.

use std::cmp::Ordering;

use ciborium::value::Value;
use envelope_core::cbor::{tag_of, tagged, untag};
use envelope_core::{canonical, tags, CborDecode, CborEncode, Digest};
use envelope_seal::EncryptedMessage;
use tracing::debug;

use crate::assertion::Assertion;
use crate::envelope::Envelope;
use crate::error::{EnvelopeError, Result};
use crate::subject::Subject;

impl Envelope {
    /// The envelope body without its outer tag.
    pub fn to_untagged_cbor(&self) -> Value {
        if self.assertions().is_empty() {
            return self.subject().to_wire();
        }
        let mut items = Vec::with_capacity(self.assertions().len() + 1);
        items.push(self.subject().to_wire());
        items.extend(self.assertions().iter().map(Assertion::to_wire));
        Value::Array(items)
    }

    pub fn to_tagged_cbor(&self) -> Value {
        tagged(tags::ENVELOPE, self.to_untagged_cbor())
    }

    /// Canonical encoding. Equal envelopes always produce equal bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        canonical::encode(&self.to_tagged_cbor())
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Decode and validate an encoded envelope.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let value = canonical::decode_canonical(bytes).map_err(|e| {
            debug!(len = bytes.len(), error = %e, "rejected envelope bytes");
            EnvelopeError::InvalidFormat(e.to_string())
        })?;
        Self::from_tagged_cbor(&value)
    }

    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes = hex::decode(s).map_err(|e| EnvelopeError::InvalidFormat(e.to_string()))?;
        Self::from_bytes(&bytes)
    }

    pub fn from_tagged_cbor(value: &Value) -> Result<Self> {
        let inner = untag(tags::ENVELOPE, value)?;
        Self::from_untagged_cbor(inner)
    }

    pub fn from_untagged_cbor(value: &Value) -> Result<Self> {
        let Value::Array(items) = value else {
            return Ok(Self::from_subject(Subject::from_wire(value)?));
        };
        let Some((subject, rest)) = items.split_first() else {
            return Err(EnvelopeError::InvalidFormat("empty envelope array".into()));
        };
        if rest.is_empty() {
            return Err(EnvelopeError::InvalidFormat(
                "envelope array without assertions".into(),
            ));
        }

        let subject = Subject::from_wire(subject)?;
        let assertions = rest
            .iter()
            .map(Assertion::from_wire)
            .collect::<Result<Vec<_>>>()?;

        for pair in assertions.windows(2) {
            match pair[0].digest().cmp(&pair[1].digest()) {
                Ordering::Less => {}
                Ordering::Equal => {
                    return Err(EnvelopeError::InvalidFormat("duplicate assertion".into()))
                }
                Ordering::Greater => {
                    return Err(EnvelopeError::InvalidFormat(
                        "assertions out of order".into(),
                    ))
                }
            }
        }

        Ok(Self::with_assertions(subject, assertions))
    }
}

impl Subject {
    pub(crate) fn to_wire(&self) -> Value {
        match self {
            Subject::Leaf(value, _) => tagged(tags::LEAF, value.clone()),
            Subject::Envelope(envelope) => envelope.to_tagged_cbor(),
            Subject::Encrypted(message, _) => message.to_cbor(),
            Subject::Redacted(digest) => digest.to_cbor(),
        }
    }

    pub(crate) fn from_wire(value: &Value) -> Result<Self> {
        match tag_of(value) {
            Some(tags::LEAF) => Ok(Subject::leaf_value(untag(tags::LEAF, value)?.clone())),
            Some(tags::ENVELOPE) => Ok(Subject::Envelope(Envelope::from_tagged_cbor(value)?)),
            Some(tags::ENCRYPTED) => {
                let message = EncryptedMessage::from_cbor(value)?;
                let digest = message.digest()?;
                Ok(Subject::Encrypted(message, digest))
            }
            Some(tags::DIGEST) => Ok(Subject::Redacted(Digest::from_cbor(value)?)),
            Some(tag) => Err(EnvelopeError::InvalidFormat(format!(
                "unknown subject tag {tag}"
            ))),
            None => Err(EnvelopeError::InvalidFormat("untagged subject".into())),
        }
    }
}

impl Assertion {
    pub(crate) fn to_wire(&self) -> Value {
        Value::Array(vec![
            self.predicate().to_tagged_cbor(),
            self.object().to_tagged_cbor(),
        ])
    }

    pub(crate) fn from_wire(value: &Value) -> Result<Self> {
        match value {
            Value::Array(items) => match items.as_slice() {
                [predicate, object] => Ok(Assertion::new(
                    Envelope::from_tagged_cbor(predicate)?,
                    Envelope::from_tagged_cbor(object)?,
                )),
                _ => Err(EnvelopeError::InvalidFormat(format!(
                    "assertion with {} elements",
                    items.len()
                ))),
            },
            _ => Err(EnvelopeError::InvalidFormat(
                "assertion is not an array".into(),
            )),
        }
    }
}
