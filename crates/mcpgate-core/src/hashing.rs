// mcpgate-core/src/hashing.rs
// ============================================================================
// Module: Content Hashing
// Description: SHA-256 content hashing over canonical JSON and raw bytes.
// Purpose: Provide deterministic `sha256:<hex>` digests for tool/prompt/
//          template fields and artifact bytes.
// Dependencies: serde, sha2, crate::cjs
// ============================================================================

//! ## Overview
//! All hashes in MCP Gate are SHA-256 over canonical JSON (CJS) bytes, or
//! over raw bytes for tarballs and other binary artifacts. Digests are
//! rendered as `sha256:<lowercase-hex>` so they are self-describing on disk
//! and in receipts.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use sha2::Digest;
use sha2::Sha256;

use crate::cjs::CanonVersion;
use crate::cjs::CjsError;
use crate::cjs::canonicalize;

// ============================================================================
// SECTION: Digest Type
// ============================================================================

/// A SHA-256 digest rendered as `sha256:<hex>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sha256Digest(String);

impl Sha256Digest {
    /// Builds a digest from raw bytes.
    #[must_use]
    pub fn of_bytes(bytes: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        let digest = hasher.finalize();
        Self(format!("sha256:{}", hex::encode(digest)))
    }

    /// Returns the digest's wire form (`sha256:<hex>`).
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the raw lowercase hex portion, without the `sha256:` prefix.
    #[must_use]
    pub fn hex(&self) -> &str {
        self.0.strip_prefix("sha256:").unwrap_or(&self.0)
    }
}

impl std::fmt::Display for Sha256Digest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// SECTION: Canonical JSON Hashing
// ============================================================================

/// Hashes a serializable value as `sha256:<hex>` over its canonical JSON bytes.
///
/// # Errors
///
/// Returns [`CjsError`] when the value cannot be canonicalized.
pub fn hash_canonical_json<T: Serialize + ?Sized>(
    value: &T,
    version: CanonVersion,
) -> Result<Sha256Digest, CjsError> {
    let bytes = canonicalize(value, version)?;
    Ok(Sha256Digest::of_bytes(&bytes))
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashes_string_description() {
        // From spec.md S1: `"say hi"` canonicalizes to the bytes
        // `22 73 61 79 20 68 69 22`.
        let digest = hash_canonical_json(&"say hi", CanonVersion::V1).unwrap();
        assert!(digest.as_str().starts_with("sha256:"));
        let expected = Sha256Digest::of_bytes(b"\"say hi\"");
        assert_eq!(digest, expected);
    }

    #[test]
    fn same_value_hashes_identically_across_versions_when_no_objects() {
        let a = hash_canonical_json(&"value", CanonVersion::V1).unwrap();
        let b = hash_canonical_json(&"value", CanonVersion::V2).unwrap();
        assert_eq!(a, b);
    }
}
