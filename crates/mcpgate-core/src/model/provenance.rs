// mcpgate-core/src/model/provenance.rs
// ============================================================================
// Module: Provenance Info
// Description: Result of verifying an artifact's build attestation.
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

/// Which verification path produced a [`ProvenanceInfo`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProvenanceMethod {
    /// Verified via the external keyless-verify tool against a SLSA predicate.
    CosignSlsa,
    /// Verified via `npm audit signatures`; SLSA fields are unavailable.
    NpmAuditSignatures,
    /// No attestation was verified.
    Unverified,
}

/// Result of verifying an artifact's provenance attestation.
///
/// # Invariants
/// - `source_repo`, `source_ref`, and `workflow_uri` are populated only when
///   `method == CosignSlsa`; `npm_audit_signatures` cannot recover them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvenanceInfo {
    /// Which verifier produced this result.
    pub method: ProvenanceMethod,
    /// Whether verification succeeded.
    pub verified: bool,
    /// The attestation predicate's declared type, if parsed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predicate_type: Option<String>,
    /// Builder identity from the attestation, if present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub builder_id: Option<String>,
    /// Source repository URI, `cosign_slsa` only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_repo: Option<String>,
    /// Source ref (branch/tag/commit), `cosign_slsa` only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_ref: Option<String>,
    /// Build workflow URI, `cosign_slsa` only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_uri: Option<String>,
    /// RFC3339Nano timestamp of verification.
    pub verified_at: String,
}

impl ProvenanceInfo {
    /// Returns `true` when SLSA-specific fields are populated consistently
    /// with spec.md §3's invariant (`source_repo` implies `cosign_slsa`).
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        self.source_repo.is_none() || matches!(self.method, ProvenanceMethod::CosignSlsa)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base(method: ProvenanceMethod) -> ProvenanceInfo {
        ProvenanceInfo {
            method,
            verified: true,
            predicate_type: None,
            builder_id: None,
            source_repo: None,
            source_ref: None,
            workflow_uri: None,
            verified_at: "2026-01-01T00:00:00.000000000Z".to_string(),
        }
    }

    #[test]
    fn source_repo_only_well_formed_under_cosign_slsa() {
        let mut info = base(ProvenanceMethod::NpmAuditSignatures);
        assert!(info.is_well_formed());
        info.source_repo = Some("https://github.com/example/repo".to_string());
        assert!(!info.is_well_formed());
        info.method = ProvenanceMethod::CosignSlsa;
        assert!(info.is_well_formed());
    }
}
