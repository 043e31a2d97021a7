// Copyright (c) Facebook, Inc. and its affiliates.
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

//! The Paillier encryption primitive the membership proof is built on.
//!
//! Key generation and decryption are delegated to [`libpaillier`]; they are
//! only exposed so that callers (and tests) can obtain a key and check a
//! ciphertext.

use crate::{
    errors::{InternalError, Result},
    utils::{modpow, random_bn_in_range, CRYPTOGRAPHIC_RETRY_MAX},
};
use libpaillier::unknown_order::BigNumber;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};

/// A Paillier public key `(n, g)` along with the cached square `n^2`.
///
/// Only `(n, g)` is serialized; decoding goes through
/// [`PublicKey::from_parts`], so a decoded key passes the same checks.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PublicKeyParts", into = "PublicKeyParts")]
pub struct PublicKey {
    n: BigNumber,
    g: BigNumber,
    nn: BigNumber,
}

impl PublicKey {
    /// Builds a public key from a modulus and a generator.
    ///
    /// The generator must be a unit modulo `n^2`.
    pub fn from_parts(n: BigNumber, g: BigNumber) -> Result<Self> {
        if n <= BigNumber::one() {
            return arg_err!("Paillier modulus must be greater than 1");
        }
        let nn = &n * &n;
        if g <= BigNumber::zero() || g >= nn {
            return arg_err!("Paillier generator must lie in (0, n^2)");
        }
        if g.gcd(&nn) != BigNumber::one() {
            return arg_err!("Paillier generator must be coprime to n^2");
        }
        Ok(Self { n, g, nn })
    }

    /// The modulus `n`.
    pub fn n(&self) -> &BigNumber {
        &self.n
    }

    /// The generator `g`.
    pub fn g(&self) -> &BigNumber {
        &self.g
    }

    /// The square of the modulus, `n^2`.
    pub fn nn(&self) -> &BigNumber {
        &self.nn
    }

    /// Encrypts `plaintext` with the caller-chosen `nonce`, computing
    /// `g^m * r^n mod n^2`.
    ///
    /// The plaintext must lie in `[0, n)` and the nonce in `Z*_n`.
    pub fn encrypt_with_nonce(&self, plaintext: &BigNumber, nonce: &Nonce) -> Result<Ciphertext> {
        if plaintext < &BigNumber::zero() || plaintext >= &self.n {
            return arg_err!("Paillier plaintext must lie in [0, n)");
        }
        if !self.is_unit(nonce.as_bn()) {
            return arg_err!("Paillier nonce must lie in Z*_n");
        }
        let a = modpow(&self.g, plaintext, &self.nn);
        let b = modpow(nonce.as_bn(), &self.n, &self.nn);
        Ok(Ciphertext(a.modmul(&b, &self.nn)))
    }

    /// Samples a fresh nonce in `Z*_n`.
    pub fn random_nonce<R: RngCore + CryptoRng>(&self, rng: &mut R) -> Result<Nonce> {
        for _ in 0..CRYPTOGRAPHIC_RETRY_MAX {
            let r = random_bn_in_range(rng, &BigNumber::one(), &self.n)?;
            if r.gcd(&self.n) == BigNumber::one() {
                return Ok(Nonce(r));
            }
        }
        Err(InternalError::RetryFailed)
    }

    /// Removes a candidate plaintext from a ciphertext: `c * g^{-m} mod n^2`.
    ///
    /// If `ciphertext` encrypts `m` the result is an `n`-th residue.
    pub(crate) fn strip_plaintext(
        &self,
        ciphertext: &Ciphertext,
        plaintext: &BigNumber,
    ) -> Result<BigNumber> {
        let g_m = modpow(&self.g, plaintext, &self.nn);
        let g_m_inv = g_m
            .invert(&self.nn)
            .ok_or(InternalError::CouldNotInvertBigNumber)?;
        Ok(ciphertext.0.modmul(&g_m_inv, &self.nn))
    }

    fn is_unit(&self, value: &BigNumber) -> bool {
        value > &BigNumber::zero() && value < &self.n && value.gcd(&self.n) == BigNumber::one()
    }
}

/// Serialized form of a [`PublicKey`].
#[derive(Serialize, Deserialize)]
struct PublicKeyParts {
    n: BigNumber,
    g: BigNumber,
}

impl TryFrom<PublicKeyParts> for PublicKey {
    type Error = InternalError;

    fn try_from(parts: PublicKeyParts) -> Result<Self> {
        Self::from_parts(parts.n, parts.g)
    }
}

impl From<PublicKey> for PublicKeyParts {
    fn from(key: PublicKey) -> Self {
        Self { n: key.n, g: key.g }
    }
}

impl From<&libpaillier::EncryptionKey> for PublicKey {
    fn from(key: &libpaillier::EncryptionKey) -> Self {
        let n = key.n().clone();
        let g = BigNumber::one() + key.n();
        Self {
            n,
            g,
            nn: key.nn().clone(),
        }
    }
}

/// A Paillier ciphertext, an element of `Z*_{n^2}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ciphertext(pub(crate) BigNumber);

impl Ciphertext {
    /// The ciphertext as an integer modulo `n^2`.
    pub fn as_bn(&self) -> &BigNumber {
        &self.0
    }

    /// Big-endian encoding of the ciphertext.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.0.to_bytes()
    }
}

impl From<BigNumber> for Ciphertext {
    fn from(value: BigNumber) -> Self {
        Self(value)
    }
}

/// The randomness `r` used to encrypt a plaintext.
///
/// This is part of the prover's witness and must never be shared.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nonce(BigNumber);

impl Nonce {
    /// Wraps a caller-chosen nonce; it is validated when used.
    pub fn new(value: BigNumber) -> Self {
        Self(value)
    }

    /// The nonce as an integer modulo `n`.
    pub fn as_bn(&self) -> &BigNumber {
        &self.0
    }
}

/// A Paillier decryption key, with generator `g = n + 1`.
#[derive(Clone, Debug)]
pub struct DecryptionKey(libpaillier::DecryptionKey);

impl DecryptionKey {
    /// Generates a key from two fresh safe primes of `prime_bits` bits each.
    pub fn generate(prime_bits: usize) -> Result<Self> {
        if prime_bits < 16 {
            return arg_err!("Paillier primes must have at least 16 bits");
        }
        let p = BigNumber::safe_prime(prime_bits);
        let mut q = BigNumber::safe_prime(prime_bits);
        while p == q {
            q = BigNumber::safe_prime(prime_bits);
        }
        Self::from_primes(&p, &q)
    }

    /// Builds a key from two distinct primes.
    pub fn from_primes(p: &BigNumber, q: &BigNumber) -> Result<Self> {
        if p == q || !p.is_prime() || !q.is_prime() {
            return arg_err!("Paillier key requires two distinct primes");
        }
        libpaillier::DecryptionKey::with_safe_primes_unchecked(p, q)
            .map(Self)
            .ok_or_else(|| {
                InternalError::InvalidArgument(String::from(
                    "could not build a Paillier key from the given primes",
                ))
            })
    }

    /// The public key matching this decryption key.
    pub fn public_key(&self) -> PublicKey {
        PublicKey::from(&libpaillier::EncryptionKey::from(&self.0))
    }

    /// Decrypts `ciphertext` to its plaintext in `[0, n)`.
    pub fn decrypt(&self, ciphertext: &Ciphertext) -> Result<BigNumber> {
        let bytes = self
            .0
            .decrypt(&ciphertext.0)
            .ok_or(InternalError::PaillierDecryptionFailed)?;
        Ok(BigNumber::from_slice(bytes.as_slice()))
    }
}

#[cfg(test)]
pub(crate) const TEST_PRIME_BITS: usize = 256;

#[cfg(test)]
lazy_static::lazy_static! {
    static ref TEST_KEY: DecryptionKey =
        DecryptionKey::generate(TEST_PRIME_BITS).expect("test key generation failed");
}

/// A key shared by the tests of this crate; safe prime generation is slow.
#[cfg(test)]
pub(crate) fn test_key() -> &'static DecryptionKey {
    &TEST_KEY
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::get_test_rng;

    #[test]
    fn encryption_roundtrips_through_decryption() -> Result<()> {
        let mut rng = get_test_rng();
        let dk = test_key();
        let pk = dk.public_key();
        assert_eq!(pk.g(), &(pk.n() + &BigNumber::one()));
        assert_eq!(pk.nn(), &(pk.n() * pk.n()));

        for value in [0u64, 15, 48468] {
            let plaintext = BigNumber::from(value);
            let nonce = pk.random_nonce(&mut rng)?;
            let ciphertext = pk.encrypt_with_nonce(&plaintext, &nonce)?;
            assert_eq!(dk.decrypt(&ciphertext)?, plaintext);
        }
        Ok(())
    }

    #[test]
    fn encryption_is_deterministic_given_nonce() -> Result<()> {
        let pk = test_key().public_key();
        let nonce = Nonce::new(BigNumber::from(1_234_567u64));
        let plaintext = BigNumber::from(184u64);
        assert_eq!(
            pk.encrypt_with_nonce(&plaintext, &nonce)?,
            pk.encrypt_with_nonce(&plaintext, &nonce)?
        );
        Ok(())
    }

    #[test]
    fn encryption_rejects_bad_inputs() {
        let pk = test_key().public_key();
        let nonce = Nonce::new(BigNumber::from(3u64));
        assert!(pk.encrypt_with_nonce(pk.n(), &nonce).is_err());
        assert!(pk
            .encrypt_with_nonce(&BigNumber::one(), &Nonce::new(BigNumber::zero()))
            .is_err());
        assert!(pk
            .encrypt_with_nonce(&BigNumber::one(), &Nonce::new(pk.n().clone()))
            .is_err());
    }

    #[test]
    fn stripping_the_plaintext_leaves_an_nth_residue() -> Result<()> {
        let pk = test_key().public_key();
        let nonce = Nonce::new(BigNumber::from(987_654_321u64));
        let plaintext = BigNumber::from(454u64);
        let ciphertext = pk.encrypt_with_nonce(&plaintext, &nonce)?;

        let stripped = pk.strip_plaintext(&ciphertext, &plaintext)?;
        assert_eq!(stripped, modpow(nonce.as_bn(), pk.n(), pk.nn()));
        Ok(())
    }

    #[test]
    fn public_key_parts_are_validated() {
        let n = BigNumber::from(35u64);
        assert!(PublicKey::from_parts(n.clone(), BigNumber::from(36u64)).is_ok());
        assert!(PublicKey::from_parts(n.clone(), BigNumber::zero()).is_err());
        assert!(PublicKey::from_parts(n.clone(), BigNumber::from(1225u64)).is_err());
        assert!(PublicKey::from_parts(n, BigNumber::from(5u64)).is_err());
        assert!(PublicKey::from_parts(BigNumber::one(), BigNumber::one()).is_err());
    }

    #[test]
    fn decoded_public_keys_are_validated() -> Result<()> {
        let pk = test_key().public_key();
        let bytes = bincode::serialize(&pk).unwrap();
        let decoded: PublicKey = bincode::deserialize(&bytes).unwrap();
        assert_eq!(decoded, pk);
        assert_eq!(decoded.nn(), &(pk.n() * pk.n()));

        let forged = [
            PublicKeyParts {
                n: BigNumber::one(),
                g: BigNumber::one(),
            },
            PublicKeyParts {
                n: pk.n().clone(),
                g: pk.nn().clone(),
            },
            PublicKeyParts {
                n: pk.n().clone(),
                g: pk.n().clone(),
            },
        ];
        for parts in forged {
            let bytes = bincode::serialize(&parts).unwrap();
            assert!(bincode::deserialize::<PublicKey>(&bytes).is_err());
        }
        Ok(())
    }
}
