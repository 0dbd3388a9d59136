//! Threshold sharing of an encrypted envelope's content key.
//!
//! Splitting produces one copy of the encrypted envelope per share, each
//! carrying a single `sskrShare` assertion. Any set of copies that meets the
//! group and member thresholds restores the original envelope.

use std::collections::BTreeMap;

use envelope_seal::{sskr, SskrShare, SskrSpec, SymmetricKey};
use rand::{CryptoRng, RngCore};
use tracing::debug;

use crate::assertion::Assertion;
use crate::envelope::Envelope;
use crate::error::{EnvelopeError, Result};
use crate::predicate::KnownPredicate;

impl Envelope {
    /// Split `content_key` per `spec`, returning one envelope per share
    /// grouped as in the spec.
    ///
    /// The subject must already be encrypted under `content_key`.
    pub fn split(&self, spec: &SskrSpec, content_key: &SymmetricKey) -> Result<Vec<Vec<Envelope>>> {
        self.split_with_rng(spec, content_key, &mut rand::thread_rng())
    }

    pub fn split_with_rng<R: RngCore + CryptoRng>(
        &self,
        spec: &SskrSpec,
        content_key: &SymmetricKey,
        rng: &mut R,
    ) -> Result<Vec<Vec<Envelope>>> {
        if !self.subject().is_encrypted() {
            return Err(EnvelopeError::InvalidOperation(
                "only an encrypted subject can be split".into(),
            ));
        }

        let groups = sskr::generate(spec, content_key.as_bytes(), rng)?;
        Ok(groups
            .into_iter()
            .map(|group| {
                group
                    .into_iter()
                    .map(|share| self.add_assertion(Assertion::sskr_share(share)))
                    .collect()
            })
            .collect())
    }

    /// Shares found on `envelopes`, keyed by split identifier.
    pub fn shares_by_identifier(envelopes: &[Envelope]) -> BTreeMap<u16, Vec<SskrShare>> {
        collect_shares(envelopes)
            .into_iter()
            .map(|(identifier, (shares, _))| (identifier, shares))
            .collect()
    }

    /// Restore the envelope that was split, from enough share envelopes.
    pub fn from_shares(envelopes: &[Envelope]) -> Result<Envelope> {
        if envelopes.is_empty() {
            return Err(EnvelopeError::InvalidShares);
        }

        for (identifier, (shares, container)) in collect_shares(envelopes) {
            match sskr::combine(&shares) {
                Ok(secret) => {
                    debug!(identifier, shares = shares.len(), "recombined content key");
                    let content_key =
                        SymmetricKey::from_slice(&secret).map_err(|_| EnvelopeError::InvalidShares)?;
                    return container.without_shares().decrypt_subject(&content_key);
                }
                Err(e) => {
                    debug!(identifier, error = %e, "shares did not combine");
                }
            }
        }
        Err(EnvelopeError::InvalidShares)
    }

    fn without_shares(&self) -> Envelope {
        let shares = self.assertions_with_predicate(KnownPredicate::SskrShare);
        shares
            .iter()
            .fold(self.clone(), |envelope, share| envelope.revoke(&share.digest()))
    }
}

/// Readable shares grouped by identifier, each with the first envelope that
/// carried one.
fn collect_shares(envelopes: &[Envelope]) -> BTreeMap<u16, (Vec<SskrShare>, &Envelope)> {
    let mut groups: BTreeMap<u16, (Vec<SskrShare>, &Envelope)> = BTreeMap::new();
    for envelope in envelopes {
        for assertion in envelope.assertions_with_predicate(KnownPredicate::SskrShare) {
            let share = match assertion.object().extract::<SskrShare>() {
                Ok(share) => share,
                Err(e) => {
                    debug!(error = %e, "skipping unreadable share");
                    continue;
                }
            };
            groups
                .entry(share.identifier())
                .or_insert_with(|| (Vec::new(), envelope))
                .0
                .push(share);
        }
    }
    groups
}
