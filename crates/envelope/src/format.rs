//! Human-readable rendering of envelopes.
//!
//! ```text
//! "Alice" [
//!     "knows": "Bob"
//!     verifiedBy: Signature
//! ]
//! ```
//!
//! The notation is for people; nothing parses it back.

use std::fmt;

use ciborium::value::Value;
use envelope_core::{tags, Digest};

use crate::envelope::Envelope;
use crate::predicate::KnownPredicate;
use crate::subject::Subject;

/// Layout settings for [`Envelope::format_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatOptions {
    /// Spaces per nesting level.
    pub indent: usize,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self { indent: 4 }
    }
}

impl Envelope {
    pub fn format(&self) -> String {
        self.format_with(&FormatOptions::default())
    }

    pub fn format_with(&self, options: &FormatOptions) -> String {
        let pad = " ".repeat(options.indent);
        let subject = format_subject(self.subject(), options, &pad);
        if !self.has_assertions() {
            return subject;
        }

        let mut out = subject;
        out.push_str(" [\n");
        for assertion in self.assertions() {
            let line = format!(
                "{}: {}",
                assertion.predicate().format_with(options),
                assertion.object().format_with(options)
            );
            out.push_str(&indent(&line, &pad));
            out.push('\n');
        }
        out.push(']');
        out
    }
}

impl fmt::Display for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format())
    }
}

fn format_subject(subject: &Subject, options: &FormatOptions, pad: &str) -> String {
    match subject {
        Subject::Leaf(value, _) => format_value(value),
        Subject::Envelope(envelope) => {
            format!("{{\n{}\n}}", indent(&envelope.format_with(options), pad))
        }
        Subject::Encrypted(..) => "ENCRYPTED".to_string(),
        Subject::Redacted(_) => "REDACTED".to_string(),
    }
}

fn indent(text: &str, pad: &str) -> String {
    text.lines()
        .map(|line| format!("{pad}{line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_value(value: &Value) -> String {
    match value {
        Value::Text(s) => format!("{s:?}"),
        Value::Integer(n) => i128::from(*n).to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Float(x) => x.to_string(),
        Value::Bytes(bytes) => format!("Bytes({})", bytes.len()),
        Value::Array(items) => {
            let items: Vec<String> = items.iter().map(format_value).collect();
            format!("[{}]", items.join(", "))
        }
        Value::Map(entries) => {
            let entries: Vec<String> = entries
                .iter()
                .map(|(k, v)| format!("{}: {}", format_value(k), format_value(v)))
                .collect();
            format!("{{{}}}", entries.join(", "))
        }
        Value::Tag(tag, inner) => format_tagged(*tag, inner),
        _ => "?".to_string(),
    }
}

fn format_tagged(tag: u64, inner: &Value) -> String {
    match tag {
        tags::PREDICATE => {
            let known = match inner {
                Value::Integer(n) => u64::try_from(*n).ok().and_then(KnownPredicate::from_u64),
                _ => None,
            };
            match known {
                Some(predicate) => predicate.name().to_string(),
                None => format!("Predicate({})", format_value(inner)),
            }
        }
        tags::DIGEST => match inner {
            Value::Bytes(bytes) => match <[u8; 32]>::try_from(bytes.as_slice()) {
                Ok(bytes) => format!("Digest({})", Digest::from_bytes(bytes).short_description()),
                Err(_) => "Digest".to_string(),
            },
            _ => "Digest".to_string(),
        },
        tags::SIGNATURE => "Signature".to_string(),
        tags::SEALED_MESSAGE => "SealedMessage".to_string(),
        tags::SSKR_SHARE => "SskrShare".to_string(),
        tags::PUBLIC_KEY_BASE => "PublicKeyBase".to_string(),
        tags::SIGNING_PUBLIC_KEY => "SigningPublicKey".to_string(),
        tags::AGREEMENT_PUBLIC_KEY => "AgreementPublicKey".to_string(),
        tags::SYMMETRIC_KEY => "SymmetricKey".to_string(),
        tags::ENCRYPTED => "EncryptedMessage".to_string(),
        other => format!("{other}({})", format_value(inner)),
    }
}
