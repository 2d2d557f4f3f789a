// mcpgate-sign/src/key.rs
// ============================================================================
// Module: Ed25519 Key Material
// Description: PEM-armored load/generate for ed25519 signing/verifying keys.
// Purpose: Keep raw key bytes out of the rest of the crate.
// Dependencies: ed25519-dalek, pem, rand
// ============================================================================

//! ## Overview
//! Keys are stored as 32 raw bytes wrapped in PEM armor under the label
//! `"ED25519 PRIVATE KEY"` (private) or `"ED25519 PUBLIC KEY"` (public), per
//! `SPEC_FULL.md` §4.7. This is a fixed-width raw-seed encoding, not PKCS#8
//! DER, so no ASN.1 parsing is involved.

use std::fs;
use std::path::Path;

use ed25519_dalek::SigningKey;
use ed25519_dalek::VerifyingKey;
use rand::rngs::OsRng;

use crate::error::SignError;

/// PEM label for a private key file.
pub const PRIVATE_KEY_LABEL: &str = "ED25519 PRIVATE KEY";
/// PEM label for a public key file.
pub const PUBLIC_KEY_LABEL: &str = "ED25519 PUBLIC KEY";

/// Generates a fresh ed25519 keypair.
#[must_use]
pub fn generate() -> (SigningKey, VerifyingKey) {
    let signing_key = SigningKey::generate(&mut OsRng);
    let verifying_key = signing_key.verifying_key();
    (signing_key, verifying_key)
}

/// Writes `signing_key` to `path` as a PEM-armored private key file.
///
/// # Errors
///
/// Returns [`SignError::Io`] on a write failure.
pub fn write_private_key(path: &Path, signing_key: &SigningKey) -> Result<(), SignError> {
    write_pem(path, PRIVATE_KEY_LABEL, &signing_key.to_bytes())
}

/// Writes `verifying_key` to `path` as a PEM-armored public key file.
///
/// # Errors
///
/// Returns [`SignError::Io`] on a write failure.
pub fn write_public_key(path: &Path, verifying_key: &VerifyingKey) -> Result<(), SignError> {
    write_pem(path, PUBLIC_KEY_LABEL, verifying_key.as_bytes())
}

/// Loads a PEM-armored ed25519 private key from `path`.
///
/// # Errors
///
/// Returns [`SignError::MalformedPem`] when the file is not PEM armor,
/// [`SignError::UnexpectedPemLabel`] when the label is not
/// `"ED25519 PRIVATE KEY"`, or [`SignError::InvalidKeyLength`] when the
/// decoded contents are not 32 bytes.
pub fn load_private_key(path: &Path) -> Result<SigningKey, SignError> {
    let bytes = read_pem(path, PRIVATE_KEY_LABEL)?;
    Ok(SigningKey::from_bytes(&bytes))
}

/// Loads a PEM-armored ed25519 public key from `path`.
///
/// # Errors
///
/// Returns [`SignError::MalformedPem`], [`SignError::UnexpectedPemLabel`],
/// [`SignError::InvalidKeyLength`], or [`SignError::Ed25519`] when the
/// decoded bytes are not a valid curve point.
pub fn load_public_key(path: &Path) -> Result<VerifyingKey, SignError> {
    let bytes = read_pem(path, PUBLIC_KEY_LABEL)?;
    VerifyingKey::from_bytes(&bytes).map_err(|_| SignError::Ed25519)
}

/// PEM-encodes `contents` under `label` and writes it to `path`.
fn write_pem(path: &Path, label: &str, contents: &[u8]) -> Result<(), SignError> {
    let armor = pem::encode(&pem::Pem::new(label, contents.to_vec()));
    fs::write(path, armor)?;
    Ok(())
}

/// Reads and decodes a PEM file, enforcing the expected label and a 32-byte body.
fn read_pem(path: &Path, expected_label: &'static str) -> Result<[u8; 32], SignError> {
    let text = fs::read_to_string(path)?;
    let parsed = pem::parse(&text).map_err(|err| SignError::MalformedPem(err.to_string()))?;
    if parsed.tag() != expected_label {
        return Err(SignError::UnexpectedPemLabel {
            found: parsed.tag().to_string(),
            expected: expected_label,
        });
    }
    let contents = parsed.contents();
    contents
        .try_into()
        .map_err(|_| SignError::InvalidKeyLength(contents.len()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keypair_round_trips_through_pem() {
        let dir = tempfile::tempdir().unwrap();
        let (signing_key, verifying_key) = generate();
        let private_path = dir.path().join("key.priv.pem");
        let public_path = dir.path().join("key.pub.pem");
        write_private_key(&private_path, &signing_key).unwrap();
        write_public_key(&public_path, &verifying_key).unwrap();

        let loaded_private = load_private_key(&private_path).unwrap();
        let loaded_public = load_public_key(&public_path).unwrap();
        assert_eq!(loaded_private.to_bytes(), signing_key.to_bytes());
        assert_eq!(loaded_public, verifying_key);
    }

    #[test]
    fn wrong_label_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("key.pem");
        let (signing_key, _) = generate();
        write_public_key(&path, &signing_key.verifying_key()).unwrap();
        assert!(matches!(
            load_private_key(&path),
            Err(SignError::UnexpectedPemLabel { .. })
        ));
    }
}
