// mcpgate-sign/src/ed25519.rs
// ============================================================================
// Module: Ed25519 Signer/Verifier
// Description: Signs and verifies canonical JSON bytes with ed25519.
// Purpose: The non-keyless half of the signature envelope (spec.md §4.7).
// Dependencies: ed25519-dalek
// ============================================================================

use ed25519_dalek::Signature;
use ed25519_dalek::Signer as _;
use ed25519_dalek::SigningKey;
use ed25519_dalek::VerifyingKey;

use crate::error::SignError;

/// Signs `bytes` (the canonical JSON of a lockfile) with `signing_key`.
#[must_use]
pub fn sign(signing_key: &SigningKey, bytes: &[u8]) -> Signature {
    signing_key.sign(bytes)
}

/// Verifies `signature` over `bytes` with `verifying_key`.
///
/// # Errors
///
/// Returns [`SignError::Tamper`] when the signature does not match the
/// given bytes under this key.
pub fn verify(verifying_key: &VerifyingKey, bytes: &[u8], signature: &Signature) -> Result<(), SignError> {
    verifying_key
        .verify_strict(bytes, signature)
        .map_err(|_| SignError::Tamper)
}

/// Parses a raw signature out of the decoded envelope payload bytes.
///
/// # Errors
///
/// Returns [`SignError::Ed25519`] when `bytes` is not a 64-byte signature.
pub fn signature_from_bytes(bytes: &[u8]) -> Result<Signature, SignError> {
    Signature::try_from(bytes).map_err(|_| SignError::Ed25519)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key;

    #[test]
    fn sign_then_verify_succeeds() {
        let (signing_key, verifying_key) = key::generate();
        let signature = sign(&signing_key, b"hello");
        assert!(verify(&verifying_key, b"hello", &signature).is_ok());
    }

    #[test]
    fn tampered_bytes_fail_verification() {
        let (signing_key, verifying_key) = key::generate();
        let signature = sign(&signing_key, b"hello");
        assert!(verify(&verifying_key, b"goodbye", &signature).is_err());
    }
}
