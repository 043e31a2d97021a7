// Copyright (c) Facebook, Inc. and its affiliates.
// Modifications Copyright (c) 2022-2023 Bolt Labs Holdings, Inc
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

//! End-to-end checks of the public proving and verification API.

use lazy_static::lazy_static;
use paillier_in_set::{
    encrypt_with_proof,
    errors::{InternalError, Result},
    verify_proof, BigNumber, DecryptionKey, MembershipInput, MembershipProof, MembershipSecret,
    Nonce, Proof, ProofParameters,
};
use rand::{rngs::StdRng, SeedableRng};

lazy_static! {
    static ref KEY: DecryptionKey =
        DecryptionKey::generate(256).expect("test key generation failed");
}

fn bns(values: &[u64]) -> Vec<BigNumber> {
    values.iter().map(|v| BigNumber::from(*v)).collect()
}

#[test]
fn every_candidate_can_be_proven() -> Result<()> {
    let mut rng = StdRng::seed_from_u64(2024);
    let public_key = KEY.public_key();
    let candidates = bns(&[41, 48468, 15, 454, 184]);

    for message in &candidates {
        let nonce = public_key.random_nonce(&mut rng)?;
        let (ciphertext, proof) = encrypt_with_proof(
            &mut rng,
            &public_key,
            message,
            &candidates,
            &nonce,
            &ProofParameters::default(),
        )?;

        assert!(verify_proof(&public_key, &ciphertext, &proof, &candidates));
        assert_eq!(&KEY.decrypt(&ciphertext)?, message);
    }
    Ok(())
}

#[test]
fn trait_api_matches_convenience_api() -> Result<()> {
    let mut rng = StdRng::seed_from_u64(99);
    let public_key = KEY.public_key();
    let candidates = bns(&[1, 2, 3]);
    let nonce = Nonce::new(BigNumber::from(65_537u64));
    let message = BigNumber::from(2u64);

    let ciphertext = public_key.encrypt_with_nonce(&message, &nonce)?;
    let input = MembershipInput::new(public_key.clone(), ciphertext.clone(), candidates.clone());
    let secret = MembershipSecret::new(message.clone(), nonce.clone());

    let from_trait = MembershipProof::prove(&mut StdRng::seed_from_u64(5), &input, &secret)?;
    let (same_ciphertext, from_fn) = encrypt_with_proof(
        &mut StdRng::seed_from_u64(5),
        &public_key,
        &message,
        &candidates,
        &nonce,
        &ProofParameters::default(),
    )?;

    assert_eq!(ciphertext, same_ciphertext);
    assert_eq!(from_trait, from_fn);
    assert!(from_trait.verify(&input).is_ok());

    // A fresh proof for the same statement differs but still verifies
    let fresh = MembershipProof::prove(&mut rng, &input, &secret)?;
    assert_ne!(fresh, from_trait);
    assert!(fresh.is_valid(&input));
    Ok(())
}

#[test]
fn proof_does_not_transfer_to_other_keys() -> Result<()> {
    let mut rng = StdRng::seed_from_u64(11);
    let public_key = KEY.public_key();
    let candidates = bns(&[10, 20, 30]);
    let nonce = public_key.random_nonce(&mut rng)?;
    let (ciphertext, proof) = encrypt_with_proof(
        &mut rng,
        &public_key,
        &BigNumber::from(20u64),
        &candidates,
        &nonce,
        &ProofParameters::default(),
    )?;

    // Same modulus, different generator
    let other_key = paillier_in_set::PublicKey::from_parts(
        public_key.n().clone(),
        public_key.g() + public_key.n(),
    )?;
    assert!(!verify_proof(&other_key, &ciphertext, &proof, &candidates));
    Ok(())
}

#[test]
fn rebuilt_proof_parts_verify() -> Result<()> {
    let mut rng = StdRng::seed_from_u64(3);
    let public_key = KEY.public_key();
    let candidates = bns(&[7, 8]);
    let nonce = public_key.random_nonce(&mut rng)?;
    let (ciphertext, proof) = encrypt_with_proof(
        &mut rng,
        &public_key,
        &BigNumber::from(7u64),
        &candidates,
        &nonce,
        &ProofParameters::default(),
    )?;

    let rebuilt = MembershipProof::from_parts(
        proof.commitments().to_vec(),
        proof.challenges().to_vec(),
        proof.responses().to_vec(),
    );
    assert!(verify_proof(&public_key, &ciphertext, &rebuilt, &candidates));

    // Reversing the branches misaligns them with the candidates
    let swapped = MembershipProof::from_parts(
        proof.commitments().iter().rev().cloned().collect(),
        proof.challenges().iter().rev().cloned().collect(),
        proof.responses().iter().rev().cloned().collect(),
    );
    assert!(!verify_proof(&public_key, &ciphertext, &swapped, &candidates));
    Ok(())
}

#[test]
fn invalid_parameters_are_rejected() -> Result<()> {
    let mut rng = StdRng::seed_from_u64(1);
    let public_key = KEY.public_key();
    let candidates = bns(&[7, 8]);
    let nonce = public_key.random_nonce(&mut rng)?;
    let result = encrypt_with_proof(
        &mut rng,
        &public_key,
        &BigNumber::from(7u64),
        &candidates,
        &nonce,
        &ProofParameters::default().with_security_bits(1),
    );
    assert!(matches!(result, Err(InternalError::InvalidArgument(_))));

    let result = encrypt_with_proof(
        &mut rng,
        &public_key,
        &BigNumber::from(7u64),
        &candidates,
        &nonce,
        &ProofParameters::default().with_security_bits(usize::MAX),
    );
    assert!(matches!(result, Err(InternalError::InvalidArgument(_))));
    Ok(())
}
