// Copyright (c) Facebook, Inc. and its affiliates.
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

//! Zero-knowledge proof that a Paillier ciphertext encrypts a member of a
//! public set
//!
//! A prover holding a Paillier ciphertext, its plaintext and the nonce used to
//! encrypt it can convince a verifier that the plaintext is one of a disclosed
//! list of candidates (an allow-list, or a small range written out as a list).
//! Under the default parameters the sizes of the per-branch values reveal
//! which candidate matches; see [`zkp::membership`] and
//! [`ProofParameters::with_security_bits`].
//!
//! The proof is a one-of-many disjunction of Schnorr-style proofs over
//! `Z*_{n^2}`, made non-interactive with a Fiat-Shamir challenge: see
//! [`zkp::membership`] for the construction.
//!
//! ```no_run
//! use paillier_in_set::{
//!     encrypt_with_proof, verify_proof, BigNumber, DecryptionKey, ProofParameters,
//! };
//!
//! # fn main() -> paillier_in_set::errors::Result<()> {
//! let mut rng = rand::rngs::OsRng;
//! let public_key = DecryptionKey::generate(1024)?.public_key();
//! let candidates: Vec<BigNumber> = [41u64, 48468, 15, 454, 184]
//!     .iter()
//!     .map(|v| BigNumber::from(*v))
//!     .collect();
//! let nonce = public_key.random_nonce(&mut rng)?;
//!
//! let (ciphertext, proof) = encrypt_with_proof(
//!     &mut rng,
//!     &public_key,
//!     &BigNumber::from(15u64),
//!     &candidates,
//!     &nonce,
//!     &ProofParameters::default(),
//! )?;
//! assert!(verify_proof(&public_key, &ciphertext, &proof, &candidates));
//! # Ok(())
//! # }
//! ```
//!
//! This library does not define a wire format for the ciphertext and proof;
//! the public types implement `serde` traits so the host application can pick
//! one.

#![warn(missing_docs)]
#![cfg_attr(feature = "flame_it", feature(proc_macro_hygiene))]
#[cfg(feature = "flame_it")]
extern crate flame;
#[cfg(feature = "flame_it")]
#[macro_use]
extern crate flamer;

#[macro_use]
pub mod errors;

mod paillier;
mod parameters;
mod serialization;
mod utils;
pub mod zkp;

pub use libpaillier::unknown_order::BigNumber;
pub use paillier::{Ciphertext, DecryptionKey, Nonce, PublicKey};
pub use parameters::{
    ProofParameters, CHALLENGE_BITS, COPRIME_SHORTCUT_BITS, MAX_SECURITY_BITS, SECURITY_BITS,
};
pub use utils::sample_coprime;
pub use zkp::{
    membership::{
        encrypt_with_proof, verify_proof, MembershipInput, MembershipProof, MembershipSecret,
    },
    Proof,
};
