//! Two-level threshold secret sharing.
//!
//! A secret is first split across groups, then each group's piece is split
//! across that group's members. Recovery needs `group_threshold` groups,
//! each reconstructed from its own `member_threshold` shares.
//!
//! Each share carries a five byte header:
//!
//! | byte | content |
//! |------|---------|
//! | 0-1  | share-set identifier (big endian) |
//! | 2    | `(group_threshold - 1) << 4 \| (group_count - 1)` |
//! | 3    | `group_index << 4 \| (member_threshold - 1)` |
//! | 4    | `member_index` (low nibble) |

use ciborium::value::Value;
use rand::{CryptoRng, RngCore};
use std::collections::BTreeMap;
use std::fmt;

use envelope_core::cbor::{expect_bytes, tagged, untag};
use envelope_core::{tags, CborDecode, CborEncode, CoreError};

use crate::error::SskrError;
use crate::shamir::{self, MAX_SHARE_COUNT, MIN_SECRET_LEN};

const METADATA_LEN: usize = 5;

/// Member layout of one group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupSpec {
    member_threshold: usize,
    member_count: usize,
}

impl GroupSpec {
    /// A group of `member_count` shares, any `member_threshold` of which suffice.
    pub fn new(member_threshold: usize, member_count: usize) -> Result<Self, SskrError> {
        if member_count == 0 || member_count > MAX_SHARE_COUNT {
            return Err(SskrError::InvalidSpec(format!(
                "member count {member_count} must be between 1 and {MAX_SHARE_COUNT}"
            )));
        }
        if member_threshold == 0 || member_threshold > member_count {
            return Err(SskrError::InvalidSpec(format!(
                "member threshold {member_threshold} must be between 1 and {member_count}"
            )));
        }
        if member_threshold == 1 && member_count > 1 {
            return Err(SskrError::InvalidSpec(
                "a 1-of-n group must have exactly one member".into(),
            ));
        }
        Ok(Self {
            member_threshold,
            member_count,
        })
    }

    pub fn member_threshold(&self) -> usize {
        self.member_threshold
    }

    pub fn member_count(&self) -> usize {
        self.member_count
    }
}

/// How to split a secret: which groups exist and how many must cooperate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SskrSpec {
    group_threshold: usize,
    groups: Vec<GroupSpec>,
}

impl SskrSpec {
    pub fn new(group_threshold: usize, groups: Vec<GroupSpec>) -> Result<Self, SskrError> {
        if groups.is_empty() || groups.len() > MAX_SHARE_COUNT {
            return Err(SskrError::InvalidSpec(format!(
                "group count {} must be between 1 and {MAX_SHARE_COUNT}",
                groups.len()
            )));
        }
        if group_threshold == 0 || group_threshold > groups.len() {
            return Err(SskrError::InvalidSpec(format!(
                "group threshold {group_threshold} must be between 1 and {}",
                groups.len()
            )));
        }
        Ok(Self {
            group_threshold,
            groups,
        })
    }

    /// Build from `(member_threshold, member_count)` pairs.
    pub fn from_pairs(group_threshold: usize, groups: &[(usize, usize)]) -> Result<Self, SskrError> {
        let groups = groups
            .iter()
            .map(|&(threshold, count)| GroupSpec::new(threshold, count))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(group_threshold, groups)
    }

    pub fn group_threshold(&self) -> usize {
        self.group_threshold
    }

    pub fn groups(&self) -> &[GroupSpec] {
        &self.groups
    }

    pub fn share_count(&self) -> usize {
        self.groups.iter().map(GroupSpec::member_count).sum()
    }
}

/// One share of a split secret, header included.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SskrShare(Vec<u8>);

impl SskrShare {
    /// Parse raw share bytes, validating the header.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, SskrError> {
        if bytes.len() < METADATA_LEN + MIN_SECRET_LEN {
            return Err(SskrError::MalformedShare(format!(
                "{} bytes is too short",
                bytes.len()
            )));
        }
        let share = Self(bytes);
        if share.group_threshold() > share.group_count() {
            return Err(SskrError::MalformedShare(
                "group threshold exceeds group count".into(),
            ));
        }
        if share.group_index() >= share.group_count() {
            return Err(SskrError::MalformedShare(
                "group index out of range".into(),
            ));
        }
        if share.bytes()[4] & 0xf0 != 0 {
            return Err(SskrError::MalformedShare("reserved bits set".into()));
        }
        Ok(share)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.0
    }

    /// Random identifier shared by every share of one split.
    pub fn identifier(&self) -> u16 {
        u16::from_be_bytes([self.0[0], self.0[1]])
    }

    pub fn group_threshold(&self) -> usize {
        usize::from(self.0[2] >> 4) + 1
    }

    pub fn group_count(&self) -> usize {
        usize::from(self.0[2] & 0x0f) + 1
    }

    pub fn group_index(&self) -> usize {
        usize::from(self.0[3] >> 4)
    }

    pub fn member_threshold(&self) -> usize {
        usize::from(self.0[3] & 0x0f) + 1
    }

    pub fn member_index(&self) -> usize {
        usize::from(self.0[4] & 0x0f)
    }

    /// The share value, without the header.
    pub fn value(&self) -> &[u8] {
        &self.0[METADATA_LEN..]
    }
}

impl fmt::Debug for SskrShare {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SskrShare(id={:04x}, group={}/{}, member={})",
            self.identifier(),
            self.group_index() + 1,
            self.group_count(),
            self.member_index() + 1
        )
    }
}

impl CborEncode for SskrShare {
    fn to_cbor(&self) -> Value {
        tagged(tags::SSKR_SHARE, Value::Bytes(self.0.clone()))
    }
}

impl CborDecode for SskrShare {
    fn from_cbor(value: &Value) -> envelope_core::Result<Self> {
        let bytes = expect_bytes(untag(tags::SSKR_SHARE, value)?, "sskr share")?;
        SskrShare::from_bytes(bytes.to_vec()).map_err(|e| CoreError::Malformed(e.to_string()))
    }
}

/// Split `secret` according to `spec`.
///
/// Returns one vector of shares per group, in group order.
pub fn generate<R: RngCore + CryptoRng>(
    spec: &SskrSpec,
    secret: &[u8],
    rng: &mut R,
) -> Result<Vec<Vec<SskrShare>>, SskrError> {
    shamir::validate_secret(secret)?;

    let mut id = [0u8; 2];
    rng.fill_bytes(&mut id);

    let group_secrets = shamir::split_secret(spec.group_threshold, spec.groups.len(), secret, rng)?;

    let mut result = Vec::with_capacity(spec.groups.len());
    for (group_index, (group, group_secret)) in spec.groups.iter().zip(&group_secrets).enumerate() {
        let member_secrets =
            shamir::split_secret(group.member_threshold, group.member_count, group_secret, rng)?;

        let shares = member_secrets
            .into_iter()
            .enumerate()
            .map(|(member_index, value)| {
                let mut bytes = Vec::with_capacity(METADATA_LEN + value.len());
                bytes.extend_from_slice(&id);
                bytes.push((((spec.group_threshold - 1) << 4) | (spec.groups.len() - 1)) as u8);
                bytes.push(((group_index << 4) | (group.member_threshold - 1)) as u8);
                bytes.push((member_index & 0x0f) as u8);
                bytes.extend_from_slice(&value);
                SskrShare(bytes)
            })
            .collect();
        result.push(shares);
    }

    Ok(result)
}

/// Recover the secret from shares of a single split.
///
/// Shares may arrive in any order; duplicates are ignored. Groups without
/// enough members are skipped.
pub fn combine(shares: &[SskrShare]) -> Result<Vec<u8>, SskrError> {
    let first = shares.first().ok_or(SskrError::EmptyShareSet)?;

    struct Group<'a> {
        member_threshold: usize,
        members: BTreeMap<usize, &'a [u8]>,
    }

    let mut groups: BTreeMap<usize, Group<'_>> = BTreeMap::new();
    for share in shares {
        if share.identifier() != first.identifier() {
            return Err(SskrError::MixedShareSets);
        }
        if share.group_threshold() != first.group_threshold()
            || share.group_count() != first.group_count()
            || share.value().len() != first.value().len()
        {
            return Err(SskrError::InconsistentMetadata);
        }

        let group = groups.entry(share.group_index()).or_insert_with(|| Group {
            member_threshold: share.member_threshold(),
            members: BTreeMap::new(),
        });
        if group.member_threshold != share.member_threshold() {
            return Err(SskrError::InconsistentMetadata);
        }
        match group.members.get(&share.member_index()) {
            Some(existing) if *existing != share.value() => {
                return Err(SskrError::DuplicateShare(share.member_index() as u8));
            }
            Some(_) => {}
            None => {
                group.members.insert(share.member_index(), share.value());
            }
        }
    }

    let mut recovered: Vec<(u8, Vec<u8>)> = Vec::new();
    for (group_index, group) in &groups {
        if group.members.len() < group.member_threshold {
            continue;
        }
        let points: Vec<(u8, Vec<u8>)> = group
            .members
            .iter()
            .map(|(index, value)| (*index as u8, value.to_vec()))
            .collect();
        let group_secret = shamir::recover_secret(group.member_threshold, &points)?;
        recovered.push((*group_index as u8, group_secret));
    }

    let group_threshold = first.group_threshold();
    if recovered.len() < group_threshold {
        return Err(SskrError::NotEnoughGroups {
            required: group_threshold,
            found: recovered.len(),
        });
    }

    shamir::recover_secret(group_threshold, &recovered)
}
