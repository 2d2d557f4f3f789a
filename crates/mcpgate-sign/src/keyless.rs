// mcpgate-sign/src/keyless.rs
// ============================================================================
// Module: Keyless Signer/Verifier Subprocess Bridge
// Description: Drives the external keyless-sign/verify binary (`cosign`).
// Purpose: Produce and check sigstore bundles without holding a private key.
// Dependencies: tokio (process, time), tempfile
// ============================================================================

//! ## Overview
//! Both the signer and the verifier are treated as opaque OS processes
//! (spec.md §4.10's "subprocess + stdio instead of in-process plugins"
//! applies equally here): this module only knows the documented argv shape
//! and exit-code contract in spec.md §6, never the tool's internals.

use std::fs;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tokio::time::timeout;

use crate::error::SignError;

/// Default keyless tool binary name.
pub const DEFAULT_TOOL: &str = "cosign";
/// Outer timeout for a keyless sign operation (spec.md §5).
pub const SIGN_TIMEOUT: Duration = Duration::from_secs(5 * 60);
/// Outer timeout for a keyless verify operation (spec.md §5).
pub const VERIFY_TIMEOUT: Duration = Duration::from_secs(2 * 60);

/// How the operator identified the expected signer for verification.
#[derive(Debug, Clone)]
pub enum Identity {
    /// Exact SAN/identity string match.
    Exact(String),
    /// Regex match against the SAN/identity string.
    Regexp(String),
}

/// Invokes the keyless signer on `canonical_bytes`, returning the raw bundle
/// JSON bytes it produced.
///
/// # Errors
///
/// Returns [`SignError::ExternalToolMissing`] when `tool` cannot be spawned,
/// [`SignError::Timeout`] past [`SIGN_TIMEOUT`], or
/// [`SignError::ExternalToolFailed`] on a non-zero exit.
pub async fn sign_blob(tool: &str, canonical_bytes: &[u8]) -> Result<Vec<u8>, SignError> {
    let input_file = tempfile::NamedTempFile::new()?;
    fs::write(input_file.path(), canonical_bytes)?;
    let bundle_file = tempfile::NamedTempFile::new()?;

    let mut command = Command::new(tool);
    command
        .arg("sign-blob")
        .arg("--yes")
        .arg("--bundle")
        .arg(bundle_file.path())
        .arg(input_file.path())
        .env("COSIGN_YES", "true")
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let child = command
        .spawn()
        .map_err(|err| SignError::ExternalToolMissing(err.to_string()))?;
    let output = timeout(SIGN_TIMEOUT, child.wait_with_output())
        .await
        .map_err(|_| SignError::Timeout)??;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(SignError::ExternalToolFailed(classify_stderr(&stderr)));
    }

    fs::read(bundle_file.path()).map_err(|err| SignError::BundleMalformed(err.to_string()))
}

/// Invokes the keyless verifier against `bundle` for `artifact`.
///
/// # Errors
///
/// Returns [`SignError::ExternalToolMissing`] when `tool` cannot be spawned,
/// [`SignError::Timeout`] past [`VERIFY_TIMEOUT`], or
/// [`SignError::ExternalToolFailed`] on a non-zero exit.
pub async fn verify_blob(
    tool: &str,
    bundle: &Path,
    issuer: &str,
    identity: &Identity,
    artifact: &Path,
) -> Result<(), SignError> {
    let mut command = Command::new(tool);
    command
        .arg("verify-blob")
        .arg("--bundle")
        .arg(bundle)
        .arg("--certificate-oidc-issuer")
        .arg(issuer);
    match identity {
        Identity::Exact(id) => {
            command.arg("--certificate-identity").arg(id);
        }
        Identity::Regexp(pattern) => {
            command.arg("--certificate-identity-regexp").arg(pattern);
        }
    }
    command
        .arg(artifact)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let child = command
        .spawn()
        .map_err(|err| SignError::ExternalToolMissing(err.to_string()))?;
    let output = timeout(VERIFY_TIMEOUT, child.wait_with_output())
        .await
        .map_err(|_| SignError::Timeout)??;

    if output.status.success() {
        Ok(())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr);
        Err(SignError::ExternalToolFailed(classify_stderr(&stderr)))
    }
}

/// Distinguishes an OIDC-unavailable failure from a generic one, per
/// spec.md §4.7 ("stderr classified for OIDC-unavailable cases").
fn classify_stderr(stderr: &str) -> String {
    let lower = stderr.to_lowercase();
    if lower.contains("oidc") || lower.contains("identity token") || lower.contains("no provider detected") {
        format!("keyless signing requires an OIDC identity token, none available: {}", stderr.trim())
    } else {
        stderr.trim().to_string()
    }
}
