// mcpgate-core/src/model/artifact.rs
// ============================================================================
// Module: Artifact Pin
// Description: Tagged union identifying the registry-resolved artifact bytes.
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::model::provenance::ProvenanceInfo;

/// An npm-resolved artifact pin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NpmPin {
    /// Package name, including scope if present (`@scope/name`).
    pub name: String,
    /// Concrete resolved version (never a range or dist-tag).
    pub version: String,
    /// Registry base URL the package was resolved against.
    pub registry: String,
    /// SRI-format integrity string, e.g. `sha512-<base64>`.
    pub integrity: String,
    /// Tarball download URL from the resolved version's `dist` block.
    pub tarball_url: String,
    /// SHA-256 of the downloaded tarball, set only after `--deep` recomputes it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tarball_sha256: Option<String>,
    /// Tarball size in bytes, set only after `--deep` downloads it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tarball_size: Option<u64>,
    /// Provenance attestation, if verified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provenance: Option<ProvenanceInfo>,
}

/// An OCI-resolved artifact pin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OciPin {
    /// Image reference without tag or digest, e.g. `host/repo`.
    pub image: String,
    /// Content digest, `sha256:<hex>`.
    pub digest: String,
    /// Provenance attestation, if verified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provenance: Option<ProvenanceInfo>,
}

/// A server launched from a command the resolver could not classify as a
/// registry artifact. Carries no pinnable identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalPin {
    /// The raw launch command, retained for operator diagnosis only.
    pub command: String,
}

/// Tagged union over the ways an MCP server's launch command resolves to a
/// pinnable artifact identity.
///
/// # Invariants
/// - `Local` pins are rejected by any operation that requires pinning
///   (sign, artifact verify); they exist only so the resolver has a total
///   classification function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ArtifactPin {
    /// Resolved against an npm registry.
    Npm(NpmPin),
    /// Resolved against an OCI registry.
    Oci(OciPin),
    /// Not resolvable to a registry artifact.
    Local(LocalPin),
}

impl ArtifactPin {
    /// Returns `true` for pins that can be verified/signed against a
    /// registry-backed identity.
    #[must_use]
    pub const fn is_pinnable(&self) -> bool {
        !matches!(self, Self::Local(_))
    }
}
