// mcpgate-sign/src/verify.rs
// ============================================================================
// Module: Lockfile Verification
// Description: Recanonicalizes a lockfile with the envelope's canon_version
//              and dispatches to the matching verifier.
// Dependencies: mcpgate-core, crate::{ed25519, envelope, keyless}
// ============================================================================

use ed25519_dalek::VerifyingKey;
use mcpgate_core::Lockfile;
use mcpgate_core::SigType;
use mcpgate_core::SignatureEnvelope;
use mcpgate_core::canonicalize;

use crate::ed25519;
use crate::envelope;
use crate::error::SignError;
use crate::keyless;
use crate::keyless::Identity;

/// Verifies an ed25519 envelope over `lockfile`.
///
/// # Errors
///
/// Returns [`SignError::MalformedEnvelope`] when the envelope is not
/// ed25519, [`SignError::Canonicalization`] when recanonicalization fails,
/// or [`SignError::Tamper`] when the signature does not match.
pub fn verify_ed25519(
    lockfile: &Lockfile,
    envelope: &SignatureEnvelope,
    verifying_key: &VerifyingKey,
) -> Result<(), SignError> {
    if envelope.effective_sig_type() != SigType::Ed25519 {
        return Err(SignError::MalformedEnvelope(
            "envelope sig_type is not ed25519".to_string(),
        ));
    }
    let canon_version = envelope.effective_canon_version()?;
    let bytes = canonicalize(lockfile, canon_version)?;
    let signature_bytes = envelope::decode_payload(SigType::Ed25519, &envelope.payload)?;
    let signature = ed25519::signature_from_bytes(&signature_bytes)?;
    ed25519::verify(verifying_key, &bytes, &signature)
}

/// Verifies a sigstore-bundle envelope over `lockfile` via the external
/// keyless-verify tool, requiring an OIDC issuer and identity match.
///
/// # Errors
///
/// Returns [`SignError::MalformedEnvelope`] when the envelope is not a
/// sigstore bundle, or any error from [`keyless::verify_blob`].
pub async fn verify_keyless(
    tool: &str,
    lockfile: &Lockfile,
    signature_envelope: &SignatureEnvelope,
    issuer: &str,
    identity: &Identity,
) -> Result<(), SignError> {
    if signature_envelope.effective_sig_type() != SigType::SigstoreBundle {
        return Err(SignError::MalformedEnvelope(
            "envelope sig_type is not sigstore_bundle".to_string(),
        ));
    }
    let canon_version = signature_envelope.effective_canon_version()?;
    let bytes = canonicalize(lockfile, canon_version)?;
    let bundle_bytes = envelope::decode_payload(SigType::SigstoreBundle, &signature_envelope.payload)?;

    let artifact_file = tempfile::NamedTempFile::new()?;
    std::fs::write(artifact_file.path(), &bytes)?;
    let bundle_file = tempfile::NamedTempFile::new()?;
    std::fs::write(bundle_file.path(), &bundle_bytes)?;

    keyless::verify_blob(tool, bundle_file.path(), issuer, identity, artifact_file.path()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key;
    use crate::sign::sign_ed25519;
    use mcpgate_core::CanonVersion;
    use mcpgate_core::PromptSection;
    use mcpgate_core::ResourceSection;
    use mcpgate_core::ServerIdentity;
    use std::collections::BTreeMap;

    fn stub_lockfile() -> Lockfile {
        Lockfile {
            lock_file_version: "3.0".to_string(),
            server: ServerIdentity {
                name: "stub".to_string(),
                version: "0.0.1".to_string(),
            },
            tools: BTreeMap::new(),
            prompts: PromptSection::default(),
            resources: ResourceSection::default(),
            artifact: None,
            generated_at: "2026-01-01T00:00:00.000000000Z".to_string(),
        }
    }

    #[test]
    fn tampered_lockfile_fails_verification() {
        let (signing_key, verifying_key) = key::generate();
        let lockfile = stub_lockfile();
        let envelope = sign_ed25519(&lockfile, &signing_key, CanonVersion::V2).unwrap();
        let mut tampered = stub_lockfile();
        tampered.server.version = "0.0.2".to_string();
        assert!(verify_ed25519(&tampered, &envelope, &verifying_key).is_err());
    }

    #[test]
    fn wrong_sig_type_is_rejected() {
        let (_, verifying_key) = key::generate();
        let lockfile = stub_lockfile();
        let mut envelope = sign_ed25519(&lockfile, &key::generate().0, CanonVersion::V2).unwrap();
        envelope.header.as_mut().unwrap().sig_type = mcpgate_core::SigType::SigstoreBundle;
        envelope.header.as_mut().unwrap().bundle_encoding = Some(mcpgate_core::BundleEncoding::Base64Json);
        assert!(verify_ed25519(&lockfile, &envelope, &verifying_key).is_err());
    }
}
