// Copyright (c) Facebook, Inc. and its affiliates.
// Modifications Copyright (c) 2022-2023 Bolt Labs Holdings, Inc
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

//! Implements a zero-knowledge proof that the plaintext of a Paillier
//! ciphertext is one of a public list of candidates.
//!
//! The proof is a disjunction of Schnorr-style proofs of `n`-th residuosity,
//! one branch per candidate (Cramer, Damgård and Schoenmakers). For the true
//! candidate `m_i`, `c * g^{-m_i}` is the `n`-th power of the encryption nonce
//! and the prover answers honestly; every other branch is simulated by picking
//! its challenge and response first and solving for the commitment.
//!
//! The real branch's challenge is reduced modulo `2^256` and its response
//! modulo `n`, while simulated branches draw both at `security_bits` bits. The
//! branches are only alike in size when `security_bits` equals
//! [`CHALLENGE_BITS`](crate::CHALLENGE_BITS) and is at least `floor(log2 n)`,
//! which no single value satisfies for moduli above 257 bits. Under the
//! default parameters the sizes of `e_k` and `z_k` reveal which candidate is
//! the plaintext; see [`ProofParameters::with_security_bits`].
//!
//! The proof is made non-interactive with a Fiat-Shamir transformation: the
//! challenges of all branches must add up, modulo `2^256`, to the SHA-256
//! digest of the commitments. Each commitment enters the digest with an I2OSP
//! length prefix so that the transcript cannot be re-split.
//!
//! The construction follows the Paillier zero-knowledge proof write-up of the
//! Daylighting Society[^cite].
//!
//! [^cite]: [Paillier Zero-Knowledge Proof](https://paillier.daylightingsociety.org/Paillier_Zero_Knowledge_Proof.pdf).

use super::Proof;
use crate::{
    errors::*,
    paillier::{Ciphertext, Nonce, PublicKey},
    parameters::{ProofParameters, CHALLENGE_BITS, LENGTH_PREFIX_BYTES},
    serialization::serialize,
    utils::{bn_mod, modpow, random_bn_in_range, sample_coprime, to_decimal},
};
use libpaillier::unknown_order::BigNumber;
use rand::{CryptoRng, RngCore};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use tracing::{debug, instrument};

/// Proof that a ciphertext encrypts one of a list of candidate plaintexts.
///
/// The three sequences are aligned with the candidate list: entry `k` is the
/// branch for candidate `k`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipProof {
    /// Commitments, elements of `Z*_{n^2}` (`a_k` in the paper).
    commitments: Vec<BigNumber>,
    /// Per-branch challenges (`e_k` in the paper).
    challenges: Vec<BigNumber>,
    /// Per-branch responses (`z_k` in the paper).
    responses: Vec<BigNumber>,
}

/// Common input known to both the prover and verifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MembershipInput {
    /// The encryption key of the ciphertext.
    public_key: PublicKey,
    /// Ciphertext about which we are proving membership (`c` in the paper).
    ciphertext: Ciphertext,
    /// Allowed plaintexts, in the order the proof entries follow.
    candidates: Vec<BigNumber>,
}

impl MembershipInput {
    /// Collect the public statement: `ciphertext` under `public_key` encrypts
    /// one of `candidates`.
    pub fn new(public_key: PublicKey, ciphertext: Ciphertext, candidates: Vec<BigNumber>) -> Self {
        Self {
            public_key,
            ciphertext,
            candidates,
        }
    }

    /// The encryption key.
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// The ciphertext.
    pub fn ciphertext(&self) -> &Ciphertext {
        &self.ciphertext
    }

    /// The candidate plaintexts.
    pub fn candidates(&self) -> &[BigNumber] {
        &self.candidates
    }
}

/// The prover's secret knowledge: the plaintext of the ciphertext and the
/// nonce it was encrypted with.
pub struct MembershipSecret {
    plaintext: BigNumber,
    nonce: Nonce,
}

impl MembershipSecret {
    /// Collect secret knowledge for proving a [`MembershipProof`].
    pub fn new(plaintext: BigNumber, nonce: Nonce) -> Self {
        Self { plaintext, nonce }
    }
}

/// Why a proof was rejected.
#[derive(Debug, Clone, PartialEq, Eq, displaydoc::Display)]
pub(crate) enum Rejection {
    /// the candidate list is empty
    NoCandidates,
    /// proof has {commitments} commitments, {challenges} challenges and {responses} responses for {candidates} candidates
    ShapeMismatch {
        candidates: usize,
        commitments: usize,
        challenges: usize,
        responses: usize,
    },
    /// ciphertext is not in (0, n^2)
    CiphertextOutOfRange,
    /// proof or candidate value out of range at index {0}
    ValueOutOfRange(usize),
    /// commitments could not be encoded into the transcript
    MalformedTranscript,
    /// challenges do not sum to the Fiat-Shamir digest
    Binding,
    /// verification equation failed for candidate {0}
    Branch(usize),
}

impl Proof for MembershipProof {
    type CommonInput = MembershipInput;
    type ProverSecret = MembershipSecret;

    /// Proves membership with the default [`ProofParameters`].
    fn prove<R: RngCore + CryptoRng>(
        rng: &mut R,
        input: &Self::CommonInput,
        secret: &Self::ProverSecret,
    ) -> Result<Self> {
        Self::prove_with_parameters(rng, input, secret, &ProofParameters::default())
    }

    #[cfg_attr(feature = "flame_it", flame("MembershipProof"))]
    #[instrument(skip_all, fields(candidates = input.candidates.len()))]
    fn verify(&self, input: &Self::CommonInput) -> Result<()> {
        match self.find_rejection(input) {
            Some(rejection) => {
                debug!(%rejection, "Rejected set-membership proof");
                verify_err!(rejection)
            }
            None => Ok(()),
        }
    }
}

impl MembershipProof {
    /// Proves that `input.ciphertext` encrypts one of `input.candidates`.
    ///
    /// Fails if the plaintext is not exactly one of the candidates, if the
    /// candidates are not distinct values in `[0, n)`, or if the ciphertext is
    /// not the encryption of the plaintext under the nonce.
    #[cfg_attr(feature = "flame_it", flame("MembershipProof"))]
    #[instrument(skip_all, fields(candidates = input.candidates.len()))]
    pub fn prove_with_parameters<R: RngCore + CryptoRng>(
        rng: &mut R,
        input: &MembershipInput,
        secret: &MembershipSecret,
        params: &ProofParameters,
    ) -> Result<Self> {
        params.validate()?;
        let real_index =
            locate_plaintext(&input.public_key, &input.candidates, &secret.plaintext)?;
        let expected = input
            .public_key
            .encrypt_with_nonce(&secret.plaintext, &secret.nonce)?;
        if expected != input.ciphertext {
            return arg_err!("ciphertext is not the encryption of the plaintext under the nonce");
        }
        Self::generate(rng, input, secret, real_index, params)
    }

    /// Builds the proof once the inputs are known to be consistent.
    ///
    /// Randomness is drawn in a fixed order (the real blinding value, then
    /// response and challenge of each simulated branch in candidate order) so
    /// the proof is reproducible from a seeded generator.
    fn generate<R: RngCore + CryptoRng>(
        rng: &mut R,
        input: &MembershipInput,
        secret: &MembershipSecret,
        real_index: usize,
        params: &ProofParameters,
    ) -> Result<Self> {
        let MembershipInput {
            public_key,
            ciphertext,
            candidates,
        } = input;
        let n = public_key.n();
        let nn = public_key.nn();
        let security_bits = params.security_bits();
        let shortcut_bits = params.coprime_shortcut_bits();

        // Blinding value for the real branch (aka `omega`)
        let blinding = sample_coprime(rng, n, security_bits, shortcut_bits)?;

        // Simulated challenges live in [2, 2^security_bits - 1)
        let challenge_lower = BigNumber::from(2u64);
        let challenge_upper = (BigNumber::one() << security_bits) - BigNumber::one();

        let mut commitments = Vec::with_capacity(candidates.len());
        let mut challenges = Vec::with_capacity(candidates.len());
        let mut responses = Vec::with_capacity(candidates.len());
        for (k, candidate) in candidates.iter().enumerate() {
            if k == real_index {
                commitments.push(modpow(&blinding, n, nn));
                // Filled in once the Fiat-Shamir digest is known
                challenges.push(BigNumber::zero());
                responses.push(BigNumber::zero());
                continue;
            }

            let response = sample_coprime(rng, n, security_bits, shortcut_bits)?;
            let challenge = random_bn_in_range(rng, &challenge_lower, &challenge_upper)?;

            // Solve `z^n = a * u^e` for `a`, where `u = c * g^{-m_k}`
            let stripped = public_key.strip_plaintext(ciphertext, candidate)?;
            let stripped_pow_inv = modpow(&stripped, &challenge, nn)
                .invert(nn)
                .ok_or(InternalError::CouldNotInvertBigNumber)?;
            commitments.push(modpow(&response, n, nn).modmul(&stripped_pow_inv, nn));
            challenges.push(challenge);
            responses.push(response);
        }

        // The real challenge is whatever makes the challenges sum to the digest
        let modulus = challenge_modulus();
        let digest = fiat_shamir_digest(&commitments)?;
        let simulated_sum = sum_challenges(&challenges, &modulus);
        let real_challenge = bn_mod(&(&(&digest + &modulus) - &simulated_sum), &modulus);
        let real_response = blinding.modmul(
            &modpow(secret.nonce.as_bn(), &real_challenge, n),
            n,
        );
        challenges[real_index] = real_challenge;
        responses[real_index] = real_response;

        debug!("Generated set-membership proof");
        Ok(Self {
            commitments,
            challenges,
            responses,
        })
    }

    /// Verifies the proof, collapsing every failure to `false`.
    ///
    /// Rejection is an expected outcome on adversarial input; this never
    /// panics.
    pub fn is_valid(&self, input: &MembershipInput) -> bool {
        self.verify(input).is_ok()
    }

    /// Reassembles a proof from its aligned sequences, e.g. after a host
    /// application decoded it from its own wire format.
    ///
    /// Shapes are not checked here; [`Proof::verify`] rejects inconsistent
    /// proofs.
    pub fn from_parts(
        commitments: Vec<BigNumber>,
        challenges: Vec<BigNumber>,
        responses: Vec<BigNumber>,
    ) -> Self {
        Self {
            commitments,
            challenges,
            responses,
        }
    }

    /// The commitments `a_k`.
    pub fn commitments(&self) -> &[BigNumber] {
        &self.commitments
    }

    /// The challenges `e_k`.
    pub fn challenges(&self) -> &[BigNumber] {
        &self.challenges
    }

    /// The responses `z_k`.
    pub fn responses(&self) -> &[BigNumber] {
        &self.responses
    }

    /// Number of branches, one per candidate.
    pub fn len(&self) -> usize {
        self.commitments.len()
    }

    /// Whether the proof has no branches.
    pub fn is_empty(&self) -> bool {
        self.commitments.is_empty()
    }

    fn find_rejection(&self, input: &MembershipInput) -> Option<Rejection> {
        let candidates = &input.candidates;
        if candidates.is_empty() {
            return Some(Rejection::NoCandidates);
        }
        if self.commitments.len() != candidates.len()
            || self.challenges.len() != candidates.len()
            || self.responses.len() != candidates.len()
        {
            return Some(Rejection::ShapeMismatch {
                candidates: candidates.len(),
                commitments: self.commitments.len(),
                challenges: self.challenges.len(),
                responses: self.responses.len(),
            });
        }

        let zero = BigNumber::zero();
        let nn = input.public_key.nn();
        let in_group = |value: &BigNumber| value > &zero && value < nn;
        if !in_group(&input.ciphertext.0) {
            return Some(Rejection::CiphertextOutOfRange);
        }
        let out_of_range = self
            .commitments
            .iter()
            .zip(&self.challenges)
            .zip(&self.responses)
            .zip(candidates)
            .position(|(((a, e), z), m)| !in_group(a) || !in_group(z) || e < &zero || m < &zero);
        if let Some(index) = out_of_range {
            return Some(Rejection::ValueOutOfRange(index));
        }

        // Check Fiat-Shamir consistency before any per-branch work
        let digest = match fiat_shamir_digest(&self.commitments) {
            Ok(digest) => digest,
            Err(_) => return Some(Rejection::MalformedTranscript),
        };
        if digest != sum_challenges(&self.challenges, &challenge_modulus()) {
            return Some(Rejection::Binding);
        }

        #[cfg(not(feature = "parallel"))]
        let indices = 0..candidates.len();
        #[cfg(feature = "parallel")]
        let indices = (0..candidates.len()).into_par_iter();

        indices
            .filter(|k| !self.branch_holds(input, *k))
            .min()
            .map(Rejection::Branch)
    }

    /// Checks `z_k^n = a_k * u_k^{e_k} mod n^2`, where `u_k = c * g^{-m_k}`.
    fn branch_holds(&self, input: &MembershipInput, k: usize) -> bool {
        let public_key = &input.public_key;
        let nn = public_key.nn();
        let stripped = match public_key.strip_plaintext(&input.ciphertext, &input.candidates[k]) {
            Ok(stripped) => stripped,
            Err(_) => return false,
        };
        let lhs = modpow(&self.responses[k], public_key.n(), nn);
        let rhs = self.commitments[k].modmul(&modpow(&stripped, &self.challenges[k], nn), nn);
        lhs == rhs
    }
}

impl fmt::Display for MembershipProof {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self
            .commitments
            .iter()
            .zip(&self.challenges)
            .zip(&self.responses);
        for (k, ((a, e), z)) in entries.enumerate() {
            writeln!(f, "[{}] a = {}", k, to_decimal(a))?;
            writeln!(f, "    e = {}", to_decimal(e))?;
            writeln!(f, "    z = {}", to_decimal(z))?;
        }
        Ok(())
    }
}

/// Encrypts `message` with `nonce` and proves that the result encrypts one of
/// `candidates`.
///
/// `message` must be exactly one of the candidates; otherwise this fails with
/// [`InternalError::PlaintextNotInCandidates`] rather than producing a proof.
pub fn encrypt_with_proof<R: RngCore + CryptoRng>(
    rng: &mut R,
    public_key: &PublicKey,
    message: &BigNumber,
    candidates: &[BigNumber],
    nonce: &Nonce,
    params: &ProofParameters,
) -> Result<(Ciphertext, MembershipProof)> {
    params.validate()?;
    let real_index = locate_plaintext(public_key, candidates, message)?;
    let ciphertext = public_key.encrypt_with_nonce(message, nonce)?;

    let input = MembershipInput::new(public_key.clone(), ciphertext.clone(), candidates.to_vec());
    let secret = MembershipSecret::new(message.clone(), nonce.clone());
    let proof = MembershipProof::generate(rng, &input, &secret, real_index, params)?;
    Ok((ciphertext, proof))
}

/// Checks that `proof` shows `ciphertext` encrypts one of `candidates`, in
/// the same order the proof was generated for.
pub fn verify_proof(
    public_key: &PublicKey,
    ciphertext: &Ciphertext,
    proof: &MembershipProof,
    candidates: &[BigNumber],
) -> bool {
    let input = MembershipInput::new(public_key.clone(), ciphertext.clone(), candidates.to_vec());
    proof.is_valid(&input)
}

/// Finds the index of `plaintext` among `candidates`, checking that the
/// candidates are distinct values in `[0, n)`.
fn locate_plaintext(
    public_key: &PublicKey,
    candidates: &[BigNumber],
    plaintext: &BigNumber,
) -> Result<usize> {
    if candidates.is_empty() {
        return arg_err!("candidate set must not be empty");
    }
    let zero = BigNumber::zero();
    if candidates.iter().any(|m| m < &zero || m >= public_key.n()) {
        return arg_err!("candidates must lie in [0, n)");
    }
    let has_duplicates = candidates
        .iter()
        .enumerate()
        .any(|(i, m)| candidates[..i].contains(m));
    if has_duplicates {
        return arg_err!("candidates must be distinct");
    }
    candidates
        .iter()
        .position(|m| m == plaintext)
        .ok_or(InternalError::PlaintextNotInCandidates)
}

/// `2^CHALLENGE_BITS`, the modulus the challenges are summed under.
fn challenge_modulus() -> BigNumber {
    BigNumber::one() << CHALLENGE_BITS
}

fn sum_challenges(challenges: &[BigNumber], modulus: &BigNumber) -> BigNumber {
    challenges
        .iter()
        .fold(BigNumber::zero(), |acc, e| acc.modadd(e, modulus))
}

/// SHA-256 over the length-prefixed commitments, read as a big-endian integer.
fn fiat_shamir_digest(commitments: &[BigNumber]) -> Result<BigNumber> {
    let mut hasher = Sha256::new();
    for commitment in commitments {
        hasher.update(serialize(&commitment.to_bytes(), LENGTH_PREFIX_BYTES)?);
    }
    Ok(BigNumber::from_slice(hasher.finalize().as_slice()))
}
