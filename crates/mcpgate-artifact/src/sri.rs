// mcpgate-artifact/src/sri.rs
// ============================================================================
// Module: Subresource Integrity
// Description: Parses and verifies `sha512-<base64>` / `sha256-<base64>`
//              integrity strings against downloaded bytes.
// Dependencies: base64, sha2
// ============================================================================

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use sha2::Digest;
use sha2::Sha256;
use sha2::Sha512;

use crate::error::ArtifactError;

/// An SRI digest, algorithm plus raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SriDigest {
    /// `sha256-<base64>`.
    Sha256(Vec<u8>),
    /// `sha512-<base64>`.
    Sha512(Vec<u8>),
}

/// Parses an SRI-format integrity string (`sha512-<base64>` or
/// `sha256-<base64>`).
///
/// # Errors
///
/// Returns [`ArtifactError::MalformedReference`] when the string does not
/// carry a recognized algorithm prefix or the payload is not valid base64.
pub fn parse(integrity: &str) -> Result<SriDigest, ArtifactError> {
    let (algo, encoded) = integrity
        .split_once('-')
        .ok_or_else(|| ArtifactError::MalformedReference(format!("malformed integrity {integrity:?}")))?;
    let bytes = BASE64
        .decode(encoded)
        .map_err(|err| ArtifactError::MalformedReference(format!("invalid integrity base64: {err}")))?;
    match algo {
        "sha256" => Ok(SriDigest::Sha256(bytes)),
        "sha512" => Ok(SriDigest::Sha512(bytes)),
        other => Err(ArtifactError::MalformedReference(format!(
            "unsupported integrity algorithm {other:?}"
        ))),
    }
}

/// Verifies that `bytes` hashes to the digest encoded in `integrity`.
///
/// # Errors
///
/// Returns [`ArtifactError::MalformedReference`] when `integrity` cannot be
/// parsed, or [`ArtifactError::IntegrityMismatch`] when the computed digest
/// does not match.
pub fn verify(integrity: &str, bytes: &[u8]) -> Result<(), ArtifactError> {
    let expected = parse(integrity)?;
    let computed = match &expected {
        SriDigest::Sha256(_) => {
            let mut hasher = Sha256::new();
            hasher.update(bytes);
            hasher.finalize().to_vec()
        }
        SriDigest::Sha512(_) => {
            let mut hasher = Sha512::new();
            hasher.update(bytes);
            hasher.finalize().to_vec()
        }
    };
    let matches = match &expected {
        SriDigest::Sha256(want) | SriDigest::Sha512(want) => want == &computed,
    };
    if matches {
        Ok(())
    } else {
        Err(ArtifactError::IntegrityMismatch {
            expected: integrity.to_string(),
            computed: BASE64.encode(&computed),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_round_trips() {
        let bytes = b"hello world";
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        let digest = hasher.finalize();
        let integrity = format!("sha256-{}", BASE64.encode(digest));
        assert!(verify(&integrity, bytes).is_ok());
    }

    #[test]
    fn mismatched_bytes_fail() {
        let integrity = format!("sha256-{}", BASE64.encode([0u8; 32]));
        assert!(verify(&integrity, b"anything").is_err());
    }
}
