//! Shamir secret sharing over GF(256).
//!
//! Arithmetic uses the AES field (x^8 + x^4 + x^3 + x + 1). Each secret byte
//! is shared with its own polynomial. Two reserved evaluation points carry
//! the secret (x = 255) and a checksum of it (x = 254), so recovery from an
//! inconsistent share set fails instead of yielding garbage.

use rand::{CryptoRng, RngCore};

use crate::error::SskrError;

pub const MIN_SECRET_LEN: usize = 16;
pub const MAX_SECRET_LEN: usize = 32;
pub const MAX_SHARE_COUNT: usize = 16;

const SECRET_INDEX: u8 = 255;
const DIGEST_INDEX: u8 = 254;
const DIGEST_LEN: usize = 4;
const DIGEST_CONTEXT: &str = "envelope-seal v1 shamir checksum";

/// Check a secret is an even number of bytes in `16..=32`.
pub fn validate_secret(secret: &[u8]) -> Result<(), SskrError> {
    let len = secret.len();
    if !(MIN_SECRET_LEN..=MAX_SECRET_LEN).contains(&len) || len % 2 != 0 {
        return Err(SskrError::SecretLength(len));
    }
    Ok(())
}

/// Split `secret` into `count` shares, any `threshold` of which recover it.
///
/// Share `i` is the polynomial evaluated at `x = i`.
pub fn split_secret<R: RngCore + CryptoRng>(
    threshold: usize,
    count: usize,
    secret: &[u8],
    rng: &mut R,
) -> Result<Vec<Vec<u8>>, SskrError> {
    validate_secret(secret)?;
    if count == 0 || count > MAX_SHARE_COUNT {
        return Err(SskrError::InvalidSpec(format!(
            "share count {count} must be between 1 and {MAX_SHARE_COUNT}"
        )));
    }
    if threshold == 0 || threshold > count {
        return Err(SskrError::InvalidSpec(format!(
            "threshold {threshold} must be between 1 and {count}"
        )));
    }

    if threshold == 1 {
        return Ok(vec![secret.to_vec(); count]);
    }

    let mut shares = Vec::with_capacity(count);
    let mut points: Vec<(u8, Vec<u8>)> = Vec::with_capacity(threshold);

    for x in 0..threshold - 2 {
        let mut share = vec![0u8; secret.len()];
        rng.fill_bytes(&mut share);
        points.push((x as u8, share.clone()));
        shares.push(share);
    }

    let mut digest_share = vec![0u8; secret.len()];
    rng.fill_bytes(&mut digest_share[DIGEST_LEN..]);
    let checksum = checksum(&digest_share[DIGEST_LEN..], secret);
    digest_share[..DIGEST_LEN].copy_from_slice(&checksum);

    points.push((DIGEST_INDEX, digest_share));
    points.push((SECRET_INDEX, secret.to_vec()));

    for x in threshold - 2..count {
        shares.push(interpolate(&points, x as u8));
    }

    Ok(shares)
}

/// Recover a secret from at least `threshold` shares given as `(x, value)`.
pub fn recover_secret(threshold: usize, shares: &[(u8, Vec<u8>)]) -> Result<Vec<u8>, SskrError> {
    if threshold == 0 || shares.len() < threshold {
        return Err(SskrError::InsufficientShares {
            required: threshold,
            found: shares.len(),
        });
    }

    let points = &shares[..threshold];
    let len = points[0].1.len();
    if points.iter().any(|(_, value)| value.len() != len) {
        return Err(SskrError::InconsistentMetadata);
    }
    for (i, (x, _)) in points.iter().enumerate() {
        if points[..i].iter().any(|(other, _)| other == x) {
            return Err(SskrError::DuplicateShare(*x));
        }
    }

    if threshold == 1 {
        return Ok(points[0].1.clone());
    }

    let secret = interpolate(points, SECRET_INDEX);
    let digest_share = interpolate(points, DIGEST_INDEX);
    if len < DIGEST_LEN
        || checksum(&digest_share[DIGEST_LEN..], &secret) != digest_share[..DIGEST_LEN]
    {
        return Err(SskrError::ChecksumFailure);
    }

    Ok(secret)
}

fn checksum(random: &[u8], secret: &[u8]) -> [u8; DIGEST_LEN] {
    let mut hasher = blake3::Hasher::new_derive_key(DIGEST_CONTEXT);
    hasher.update(random);
    hasher.update(secret);
    let mut out = [0u8; DIGEST_LEN];
    out.copy_from_slice(&hasher.finalize().as_bytes()[..DIGEST_LEN]);
    out
}

/// Lagrange interpolation of the polynomial through `points`, evaluated at `x`.
///
/// The x coordinates must be distinct.
fn interpolate<V: AsRef<[u8]>>(points: &[(u8, V)], x: u8) -> Vec<u8> {
    let len = points[0].1.as_ref().len();
    let mut result = vec![0u8; len];

    for (i, (xi, yi)) in points.iter().enumerate() {
        let mut numerator = 1u8;
        let mut denominator = 1u8;
        for (j, (xj, _)) in points.iter().enumerate() {
            if i != j {
                numerator = gf_mul(numerator, x ^ xj);
                denominator = gf_mul(denominator, xi ^ xj);
            }
        }
        let basis = gf_mul(numerator, gf_inv(denominator));

        for (out, y) in result.iter_mut().zip(yi.as_ref()) {
            *out ^= gf_mul(basis, *y);
        }
    }

    result
}

/// Multiplication in GF(256), reducing by 0x11B.
fn gf_mul(mut a: u8, mut b: u8) -> u8 {
    let mut product = 0u8;
    for _ in 0..8 {
        if b & 1 != 0 {
            product ^= a;
        }
        let carry = a & 0x80;
        a <<= 1;
        if carry != 0 {
            a ^= 0x1b;
        }
        b >>= 1;
    }
    product
}

/// Multiplicative inverse as a^254. Zero maps to zero.
fn gf_inv(a: u8) -> u8 {
    let mut result = 1u8;
    let mut base = a;
    let mut exp = 254u8;
    while exp > 0 {
        if exp & 1 != 0 {
            result = gf_mul(result, base);
        }
        base = gf_mul(base, base);
        exp >>= 1;
    }
    result
}
