// Copyright (c) Facebook, Inc. and its affiliates.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

use crate::errors::{InternalError, Result};
use libpaillier::unknown_order::BigNumber;
use num_bigint::{BigInt, Sign};
use rand::{CryptoRng, RngCore};
use tracing::trace;

/// Upper bound on the number of draws made by rejection samplers before
/// giving up.
pub(crate) const CRYPTOGRAPHIC_RETRY_MAX: usize = 500;

/// Computes a^e (mod n)
#[cfg_attr(feature = "flame_it", flame("utils"))]
pub(crate) fn modpow(a: &BigNumber, e: &BigNumber, n: &BigNumber) -> BigNumber {
    a.modpow(e, n)
}

/// Computes n (mod p), in the range [0, p)
pub(crate) fn bn_mod(n: &BigNumber, p: &BigNumber) -> BigNumber {
    n.modadd(&BigNumber::zero(), p)
}

/// Number of significant bits of a non-negative value (0 for zero).
pub(crate) fn bit_length(n: &BigNumber) -> usize {
    let bytes = n.to_bytes();
    match bytes.iter().position(|b| *b != 0) {
        Some(i) => (bytes.len() - i) * 8 - bytes[i].leading_zeros() as usize,
        None => 0,
    }
}

/// Renders a value in base 10, keeping its sign.
pub(crate) fn to_decimal(n: &BigNumber) -> String {
    let zero = BigNumber::zero();
    let (sign, magnitude) = if n < &zero {
        (Sign::Minus, &zero - n)
    } else {
        (Sign::Plus, n.clone())
    };
    BigInt::from_bytes_be(sign, &magnitude.to_bytes()).to_string()
}

/// Fills a big-endian buffer with exactly `bits` random bits, the most
/// significant of which is set.
fn random_bytes_with_top_bit<R: RngCore + CryptoRng>(rng: &mut R, bits: usize) -> Vec<u8> {
    let len = (bits + 7) / 8;
    let excess = len * 8 - bits;
    let mut buf = vec![0u8; len];
    rng.fill_bytes(&mut buf);
    buf[0] &= 0xff >> excess;
    buf[0] |= 0x80 >> excess;
    buf
}

/// Generate a uniformly random BigNumber in the range [lower, upper)
pub(crate) fn random_bn_in_range<R: RngCore + CryptoRng>(
    rng: &mut R,
    lower: &BigNumber,
    upper: &BigNumber,
) -> Result<BigNumber> {
    if upper <= lower {
        return arg_err!("random_bn_in_range requires lower < upper");
    }
    let width = upper - lower;
    let bits = bit_length(&width);
    let len = (bits + 7) / 8;
    let excess = len * 8 - bits;
    let mut buf = vec![0u8; len];
    // Each draw lands below `width` with probability at least 1/2.
    for _ in 0..CRYPTOGRAPHIC_RETRY_MAX {
        rng.fill_bytes(&mut buf);
        buf[0] &= 0xff >> excess;
        let offset = BigNumber::from_slice(buf.as_slice());
        if offset < width {
            return Ok(lower + &offset);
        }
    }
    Err(InternalError::RetryFailed)
}

/// Samples an odd value coprime to `target`.
///
/// The value has exactly `b` bits, where `b` is `floor(log2(target))` capped
/// at `max_bits`, so it lies in `[2^(b-1) + 1, 2^b)` and is smaller than
/// `target`. Candidates with more than `shortcut_bits` bits are returned
/// without checking the gcd; a random value that large shares a factor with
/// an RSA modulus only with negligible probability. Pass `None` to always
/// check.
#[cfg_attr(feature = "flame_it", flame("utils"))]
pub fn sample_coprime<R: RngCore + CryptoRng>(
    rng: &mut R,
    target: &BigNumber,
    max_bits: usize,
    shortcut_bits: Option<usize>,
) -> Result<BigNumber> {
    let bits = bit_length(target).saturating_sub(1).min(max_bits);
    if bits < 2 {
        return arg_err!(format!(
            "cannot sample an odd coprime of {} bits; target or bit length too small",
            bits
        ));
    }
    let skip_gcd = matches!(shortcut_bits, Some(limit) if bits > limit);

    for _ in 0..CRYPTOGRAPHIC_RETRY_MAX {
        let mut buf = random_bytes_with_top_bit(rng, bits);
        if let Some(last) = buf.last_mut() {
            *last |= 1;
        }
        let candidate = BigNumber::from_slice(buf.as_slice());
        if skip_gcd || candidate.gcd(target) == BigNumber::one() {
            return Ok(candidate);
        }
        trace!("Sampled value shares a factor with the target; retrying");
    }
    Err(InternalError::RetryFailed)
}

#[cfg(test)]
pub(crate) fn get_test_rng() -> rand::rngs::StdRng {
    use rand::{Rng, SeedableRng};

    let mut seeder = rand::rngs::OsRng;
    let seed = seeder.gen();
    eprintln!("seed: {:?}", seed);
    rand::rngs::StdRng::from_seed(seed)
}
