//! CBOR tag numbers used on the wire.
//!
//! Tags distinguish node kinds that share the same digest combination rule,
//! so they are part of the frozen encoding.

pub const ENCRYPTED: u64 = 48;
pub const ENVELOPE: u64 = 49;
pub const PUBLIC_KEY_BASE: u64 = 51;
pub const SEALED_MESSAGE: u64 = 55;
pub const DIGEST: u64 = 56;
pub const SYMMETRIC_KEY: u64 = 57;
pub const PREDICATE: u64 = 59;
pub const LEAF: u64 = 60;
pub const SIGNATURE: u64 = 61;
pub const AGREEMENT_PUBLIC_KEY: u64 = 62;
pub const SSKR_SHARE: u64 = 309;
pub const SIGNING_PUBLIC_KEY: u64 = 705;
