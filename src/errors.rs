// Copyright (c) Facebook, Inc. and its affiliates.
// Modifications Copyright (c) 2022-2023 Bolt Labs Holdings, Inc
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

//! A list of error types which are produced while building or checking a
//! set-membership proof.
use thiserror::Error;

/// The default Result type used in this crate
pub type Result<T> = std::result::Result<T, InternalError>;

/// Represents an error in the manipulation of internal cryptographic data
#[derive(Clone, Eq, PartialEq, Error, Debug)]
#[allow(missing_docs)]
pub enum InternalError {
    #[error("The plaintext is not a member of the candidate set")]
    PlaintextNotInCandidates,
    #[error("Failed to verify proof: `{0}`")]
    FailedToVerifyProof(String),
    #[error("Function call contained invalid arguments: `{0}`")]
    InvalidArgument(String),
    #[error("Could not invert a BigNumber")]
    CouldNotInvertBigNumber,
    #[error("Reached the maximum allowed number of retries")]
    RetryFailed,
    #[error("Could not decrypt the Paillier ciphertext")]
    PaillierDecryptionFailed,
    #[error("Represents some code assumption that was checked at runtime but failed to be true")]
    InternalInvariantFailed,
}

macro_rules! verify_err {
    ($x:expr) => {{
        Err(crate::errors::InternalError::FailedToVerifyProof(
            ($x).to_string(),
        ))
    }};
}

macro_rules! arg_err {
    ($x:expr) => {{
        Err(crate::errors::InternalError::InvalidArgument(String::from(
            $x,
        )))
    }};
}
