// mcpgate-sign/src/sign.rs
// ============================================================================
// Module: Lockfile Signing
// Description: Recanonicalizes a lockfile and produces an ed25519 or
//              keyless signature envelope over it.
// Dependencies: mcpgate-core, crate::{ed25519, envelope, keyless}
// ============================================================================

use ed25519_dalek::SigningKey;
use mcpgate_core::CanonVersion;
use mcpgate_core::Lockfile;
use mcpgate_core::SignatureEnvelope;
use mcpgate_core::canonicalize;

use crate::ed25519;
use crate::envelope;
use crate::error::SignError;
use crate::keyless;

/// Signs `lockfile` with an ed25519 private key over `canon_version` bytes.
///
/// # Errors
///
/// Returns [`SignError::Canonicalization`] when the lockfile cannot be
/// canonicalized.
pub fn sign_ed25519(
    lockfile: &Lockfile,
    signing_key: &SigningKey,
    canon_version: CanonVersion,
) -> Result<SignatureEnvelope, SignError> {
    let bytes = canonicalize(lockfile, canon_version)?;
    let signature = ed25519::sign(signing_key, &bytes);
    let header = envelope::ed25519_header(canon_version);
    let payload = envelope::encode_payload(header.sig_type, &signature.to_bytes());
    Ok(SignatureEnvelope {
        header: Some(header),
        payload,
    })
}

/// Signs `lockfile` via the external keyless-sign tool, producing a
/// sigstore-bundle envelope over `canon_version` bytes.
///
/// # Errors
///
/// Returns [`SignError::Canonicalization`], [`SignError::ExternalToolMissing`],
/// [`SignError::Timeout`], or [`SignError::ExternalToolFailed`].
pub async fn sign_keyless(
    tool: &str,
    lockfile: &Lockfile,
    canon_version: CanonVersion,
) -> Result<SignatureEnvelope, SignError> {
    let bytes = canonicalize(lockfile, canon_version)?;
    let bundle = keyless::sign_blob(tool, &bytes).await?;
    let header = envelope::sigstore_header(canon_version);
    let payload = envelope::encode_payload(header.sig_type, &bundle);
    Ok(SignatureEnvelope {
        header: Some(header),
        payload,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key;
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
    fn ed25519_signature_round_trips_via_verify() {
        let (signing_key, verifying_key) = key::generate();
        let lockfile = stub_lockfile();
        let envelope = sign_ed25519(&lockfile, &signing_key, CanonVersion::V2).unwrap();
        crate::verify::verify_ed25519(&lockfile, &envelope, &verifying_key).unwrap();
    }
}
