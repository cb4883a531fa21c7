//! # Signature Verification
//!
//! Raw Ed25519 verification for signed meta-approvals. The ledger is a
//! verifier, never a signer — holders construct and sign permit digests
//! off-ledger (a wallet, a relayer SDK, a test harness) and submit the
//! 64 signature bytes alongside the permit fields.
//!
//! Errors are intentionally vague. "The signature is bad" and "that isn't
//! even a public key" both end a permit the same way, and a detailed error
//! oracle helps nobody but an attacker.

use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use thiserror::Error;

/// Errors during signature verification.
#[derive(Debug, Error)]
pub enum SignatureError {
    #[error("signature verification failed")]
    VerificationFailed,

    #[error("invalid public key")]
    InvalidPublicKey,
}

/// Verify an Ed25519 signature from raw byte components.
///
/// This is the "I got these bytes off the wire and need to check them"
/// path: parse the public key, wrap the signature bytes, verify. Used by
/// the permit flow, where the holder's address doubles as the key bytes.
pub fn verify_raw(
    public_key_bytes: &[u8; 32],
    message: &[u8],
    signature_bytes: &[u8; 64],
) -> Result<(), SignatureError> {
    let verifying_key =
        VerifyingKey::from_bytes(public_key_bytes).map_err(|_| SignatureError::InvalidPublicKey)?;

    let signature = Signature::from_bytes(signature_bytes);

    verifying_key
        .verify(message, &signature)
        .map_err(|_| SignatureError::VerificationFailed)
}
