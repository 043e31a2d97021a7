//! Example usage of [`paillier_in_set`] crate.
//!
//! Generates a Paillier key, encrypts a value together with a proof that it
//! belongs to a list of allowed values, ships both through `bincode` as a
//! verifier would receive them, and checks the proof.

use clap::Parser;
use paillier_in_set::{
    encrypt_with_proof, verify_proof, BigNumber, Ciphertext, DecryptionKey, MembershipProof,
    ProofParameters,
};
use rand::rngs::OsRng;
use std::time::Instant;
use tracing::{info, span, Level};
use tracing_subscriber::{self, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct CommandLineArgs {
    /// Bit size of each of the two safe primes of the Paillier modulus.
    #[arg(long, default_value_t = 256)]
    prime_bits: usize,
    /// The secret value to encrypt.
    #[arg(long, default_value_t = 184)]
    value: u64,
    /// Comma-separated list of allowed values.
    #[arg(long, value_delimiter = ',', default_value = "41,48468,15,184")]
    candidates: Vec<u64>,
    /// Bit-length of blinding values and simulated challenges.
    #[arg(long, default_value_t = paillier_in_set::SECURITY_BITS)]
    security_bits: usize,
}

fn main() -> anyhow::Result<()> {
    let cli = CommandLineArgs::parse();
    // Set up logging.
    let filter = EnvFilter::from_default_env().add_directive("membership=info".parse()?);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .without_time()
        .compact()
        .init();
    let span = span!(Level::INFO, "main");
    let _enter = span.entered();

    let mut rng = OsRng;
    let candidates: Vec<BigNumber> = cli.candidates.iter().map(|v| BigNumber::from(*v)).collect();
    let value = BigNumber::from(cli.value);

    let now = Instant::now();
    let decryption_key = DecryptionKey::generate(cli.prime_bits)?;
    let public_key = decryption_key.public_key();
    info!("Generated Paillier key in {:?}", now.elapsed());

    let nonce = public_key.random_nonce(&mut rng)?;
    let params = ProofParameters::default().with_security_bits(cli.security_bits);
    let now = Instant::now();
    let (ciphertext, proof) =
        encrypt_with_proof(&mut rng, &public_key, &value, &candidates, &nonce, &params)?;
    info!("Generated proof in {:?}", now.elapsed());

    println!("ciphertext: {}", hex::encode(ciphertext.to_bytes()));
    println!("proof:\n{}", proof);

    // Send cipher and proof to the verifier
    let ciphertext_bytes = bincode::serialize(&ciphertext)?;
    let proof_bytes = bincode::serialize(&proof)?;
    info!(
        "Encoded ciphertext ({} bytes) and proof ({} bytes)",
        ciphertext_bytes.len(),
        proof_bytes.len()
    );
    let received_ciphertext: Ciphertext = bincode::deserialize(&ciphertext_bytes)?;
    let received_proof: MembershipProof = bincode::deserialize(&proof_bytes)?;

    let now = Instant::now();
    let result = verify_proof(
        &public_key,
        &received_ciphertext,
        &received_proof,
        &candidates,
    );
    info!("Verified proof in {:?}", now.elapsed());
    println!("is cipher into {:?}? {}", cli.candidates, result);

    let without_value: Vec<u64> = cli
        .candidates
        .iter()
        .copied()
        .filter(|v| *v != cli.value)
        .collect();
    let without_value_bns: Vec<BigNumber> =
        without_value.iter().map(|v| BigNumber::from(*v)).collect();
    let result = verify_proof(
        &public_key,
        &received_ciphertext,
        &received_proof,
        &without_value_bns,
    );
    println!("is cipher into {:?}? {}", without_value, result);

    let decrypted = decryption_key.decrypt(&received_ciphertext)?;
    println!("decrypts to the secret value? {}", decrypted == value);
    Ok(())
}
