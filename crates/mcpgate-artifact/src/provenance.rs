// mcpgate-artifact/src/provenance.rs
// ============================================================================
// Module: Provenance Verifier
// Description: Bridges to the external keyless-verify binary for SLSA
//              attestations, with an `npm audit signatures` fallback.
// Purpose: spec.md §4.6.
// Dependencies: tokio (process, time), serde_json, mcpgate-core
// ============================================================================

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use mcpgate_core::ProvenanceInfo;
use mcpgate_core::ProvenanceMethod;
use regex::Regex;
use serde_json::Value;
use tokio::process::Command;
use tokio::time::timeout;

use crate::error::ArtifactError;

/// Default keyless-verify tool binary name.
pub const DEFAULT_TOOL: &str = "cosign";
/// Outer timeout for a provenance verification subprocess (spec.md §5).
pub const VERIFY_TIMEOUT: Duration = Duration::from_secs(2 * 60);

/// How the operator identified the expected signer.
#[derive(Debug, Clone)]
pub enum Identity {
    /// Exact SAN/identity string match.
    Exact(String),
    /// Regex match against the SAN/identity string.
    Regexp(String),
}

/// Verifies a SLSA provenance attestation bundle via the external
/// keyless-verify tool (`cosign verify-blob-attestation`), populating
/// `builder_id`, `source_repo`, `source_ref`, and `workflow_uri` from the
/// parsed predicate.
///
/// # Errors
///
/// Returns [`ArtifactError::ExternalToolMissing`] when `tool` cannot be
/// spawned, [`ArtifactError::Timeout`] past [`VERIFY_TIMEOUT`],
/// [`ArtifactError::ProvenanceInvalid`] on a non-zero exit,
/// [`ArtifactError::ProvenanceMalformed`] when the predicate cannot be
/// parsed, or [`ArtifactError::ProvenanceSourceMismatch`] when
/// `expected_source` does not match the predicate's source URI.
pub async fn verify_cosign_slsa(
    tool: &str,
    bundle: &Path,
    issuer: &str,
    identity: &Identity,
    artifact: &Path,
    expected_source: Option<&str>,
    verified_at: &str,
) -> Result<ProvenanceInfo, ArtifactError> {
    let mut command = Command::new(tool);
    command
        .arg("verify-blob-attestation")
        .arg("--bundle")
        .arg(bundle)
        .arg("--certificate-oidc-issuer")
        .arg(issuer)
        .arg("--type")
        .arg("slsaprovenance");
    match identity {
        Identity::Exact(id) => {
            command.arg("--certificate-identity").arg(id);
        }
        Identity::Regexp(pattern) => {
            command.arg("--certificate-identity-regexp").arg(pattern);
        }
    }
    command.arg(artifact).stdout(Stdio::piped()).stderr(Stdio::piped());

    let child = command
        .spawn()
        .map_err(|err| ArtifactError::ExternalToolMissing(err.to_string()))?;
    let output = timeout(VERIFY_TIMEOUT, child.wait_with_output())
        .await
        .map_err(|_| ArtifactError::Timeout)??;

    if !output.status.success() {
        return Err(ArtifactError::ProvenanceInvalid(
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        ));
    }

    let predicate: Value = serde_json::from_slice(&output.stdout)
        .map_err(|err| ArtifactError::ProvenanceMalformed(err.to_string()))?;
    let info = parse_slsa_predicate(&predicate, verified_at)?;

    if let Some(pattern) = expected_source {
        let source_repo = info
            .source_repo
            .as_deref()
            .ok_or_else(|| ArtifactError::ProvenanceSourceMismatch("predicate carries no source_repo".to_string()))?;
        let re = Regex::new(pattern)
            .map_err(|err| ArtifactError::ProvenanceSourceMismatch(format!("invalid --expected-source pattern: {err}")))?;
        if !re.is_match(source_repo) {
            return Err(ArtifactError::ProvenanceSourceMismatch(format!(
                "source_repo {source_repo:?} does not match --expected-source {pattern:?}"
            )));
        }
    }

    Ok(info)
}

/// Extracts `builder_id`, `source_repo`, `source_ref`, and `workflow_uri`
/// from a SLSA v0.2-shaped predicate document.
fn parse_slsa_predicate(predicate: &Value, verified_at: &str) -> Result<ProvenanceInfo, ArtifactError> {
    let builder_id = predicate
        .pointer("/builder/id")
        .and_then(Value::as_str)
        .map(str::to_string);
    let source_repo = predicate
        .pointer("/invocation/configSource/uri")
        .and_then(Value::as_str)
        .map(str::to_string);
    let source_ref = predicate
        .pointer("/invocation/configSource/entryPoint")
        .and_then(Value::as_str)
        .map(str::to_string);
    let predicate_type = predicate
        .get("predicateType")
        .and_then(Value::as_str)
        .map(str::to_string);

    Ok(ProvenanceInfo {
        method: ProvenanceMethod::CosignSlsa,
        verified: true,
        predicate_type,
        builder_id: builder_id.clone(),
        source_repo,
        source_ref,
        workflow_uri: builder_id,
        verified_at: verified_at.to_string(),
    })
}

/// Runs `npm audit signatures` from `package_dir` as the fallback
/// provenance method for npm artifacts carrying no cosign attestation.
///
/// `--expected-source` cannot be satisfied by this method and fails closed
/// immediately (spec.md §4.6).
///
/// # Errors
///
/// Returns [`ArtifactError::ProvenanceSourceMismatch`] when `expected_source`
/// is supplied, [`ArtifactError::ExternalToolMissing`] when `npm` cannot be
/// spawned, or [`ArtifactError::ProvenanceInvalid`] on a non-zero exit.
pub async fn verify_npm_audit_signatures(
    package_dir: &Path,
    expected_source: Option<&str>,
    verified_at: &str,
) -> Result<ProvenanceInfo, ArtifactError> {
    if expected_source.is_some() {
        return Err(ArtifactError::ProvenanceSourceMismatch(
            "npm_audit_signatures cannot satisfy --expected-source: SLSA source fields are unavailable".to_string(),
        ));
    }

    let mut command = Command::new("npm");
    command
        .arg("audit")
        .arg("signatures")
        .current_dir(package_dir)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let child = command
        .spawn()
        .map_err(|err| ArtifactError::ExternalToolMissing(err.to_string()))?;
    let output = timeout(VERIFY_TIMEOUT, child.wait_with_output())
        .await
        .map_err(|_| ArtifactError::Timeout)??;

    if !output.status.success() {
        return Err(ArtifactError::ProvenanceInvalid(
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        ));
    }

    Ok(ProvenanceInfo {
        method: ProvenanceMethod::NpmAuditSignatures,
        verified: true,
        predicate_type: None,
        builder_id: None,
        source_repo: None,
        source_ref: None,
        workflow_uri: None,
        verified_at: verified_at.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_builder_and_source_fields() {
        let predicate = json!({
            "predicateType": "https://slsa.dev/provenance/v0.2",
            "builder": {"id": "https://github.com/actions/runner@refs/tags/v2"},
            "invocation": {
                "configSource": {
                    "uri": "git+https://github.com/example/repo",
                    "entryPoint": "refs/heads/main",
                }
            }
        });
        let info = parse_slsa_predicate(&predicate, "2026-01-01T00:00:00.000000000Z").unwrap();
        assert_eq!(info.source_repo.as_deref(), Some("git+https://github.com/example/repo"));
        assert_eq!(info.source_ref.as_deref(), Some("refs/heads/main"));
        assert!(info.is_well_formed());
    }

    #[tokio::test]
    async fn npm_audit_signatures_fails_closed_on_expected_source() {
        let dir = tempfile::tempdir().unwrap();
        let result = verify_npm_audit_signatures(dir.path(), Some("github.com/.*"), "ts").await;
        assert!(matches!(result, Err(ArtifactError::ProvenanceSourceMismatch(_))));
    }
}
