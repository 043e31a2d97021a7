// Copyright (c) Facebook, Inc. and its affiliates.
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

//! Security parameter definitions.
//!
//! The set-membership proof is the disjunctive Paillier proof described in
//! \[1\], made non-interactive with a Fiat-Shamir challenge derived from the
//! prover's commitments.
//!
//! ## References
//! 1. Paillier Zero-Knowledge Proof. Daylighting Society.
//!    [PDF](https://paillier.daylightingsociety.org/Paillier_Zero_Knowledge_Proof.pdf)

use crate::errors::Result;
use serde::{Deserialize, Serialize};

/// Default bit-length of the blinding values and simulated responses, and of
/// the simulated challenges.
pub const SECURITY_BITS: usize = 512;

/// Largest accepted security parameter. Blinding values are capped by the
/// modulus anyway, so this only bounds the simulated challenges.
pub const MAX_SECURITY_BITS: usize = 16384;

/// Bit size of the Fiat-Shamir challenge. The challenges of all branches must
/// sum to the SHA-256 digest of the commitments modulo `2^CHALLENGE_BITS`.
pub const CHALLENGE_BITS: usize = 256;

/// Sampled coprime candidates with more bits than this are accepted without a
/// gcd check.
///
/// A random odd value of this size shares a factor with an RSA modulus only
/// with negligible probability. This is a relaxation, not a proven bound.
pub const COPRIME_SHORTCUT_BITS: usize = 1024;

/// Width of the I2OSP length prefix in front of every commitment in the
/// Fiat-Shamir transcript.
pub(crate) const LENGTH_PREFIX_BYTES: usize = 4;

/// Tunable parameters for proof generation.
///
/// Verification does not depend on these values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofParameters {
    security_bits: usize,
    coprime_shortcut_bits: Option<usize>,
}

impl Default for ProofParameters {
    fn default() -> Self {
        Self {
            security_bits: SECURITY_BITS,
            coprime_shortcut_bits: Some(COPRIME_SHORTCUT_BITS),
        }
    }
}

impl ProofParameters {
    /// Sets the bit-length used for blinding values and simulated challenges.
    ///
    /// The real branch's challenge is reduced modulo `2^CHALLENGE_BITS` and its
    /// response modulo `n`, while simulated branches use `security_bits`-sized
    /// values. With the default of 512 both sizes differ, and a proof reveals
    /// which candidate is real. Setting this to [`CHALLENGE_BITS`] makes the
    /// challenge sizes agree; responses still differ in size unless
    /// `security_bits` is at least `floor(log2 n)`.
    pub fn with_security_bits(self, security_bits: usize) -> Self {
        Self {
            security_bits,
            ..self
        }
    }

    /// Sets the size above which sampled coprimes skip the gcd check.
    /// `None` always runs the check.
    pub fn with_coprime_shortcut_bits(self, coprime_shortcut_bits: Option<usize>) -> Self {
        Self {
            coprime_shortcut_bits,
            ..self
        }
    }

    /// Bit-length used for blinding values and simulated challenges.
    pub fn security_bits(&self) -> usize {
        self.security_bits
    }

    /// Size above which sampled coprimes skip the gcd check, if any.
    pub fn coprime_shortcut_bits(&self) -> Option<usize> {
        self.coprime_shortcut_bits
    }

    /// Checks that the parameters can produce a proof.
    ///
    /// Simulated challenges are drawn from `[2, 2^security_bits - 1)`, which
    /// is empty below 3 bits. Values above [`MAX_SECURITY_BITS`] are rejected.
    pub fn validate(&self) -> Result<()> {
        if self.security_bits < 3 {
            return arg_err!(format!(
                "security_bits must be at least 3, got {}",
                self.security_bits
            ));
        }
        if self.security_bits > MAX_SECURITY_BITS {
            return arg_err!(format!(
                "security_bits must be at most {}, got {}",
                MAX_SECURITY_BITS, self.security_bits
            ));
        }
        Ok(())
    }
}
