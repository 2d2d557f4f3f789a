// mcpgate-core/src/error.rs
// ============================================================================
// Module: Error Taxonomy
// Description: Flat error-kind taxonomy shared across every MCP Gate crate.
// Purpose: Give the CLI and evidence pipeline a stable kind for exit codes
//          and receipts regardless of which subsystem raised the error.
// Dependencies: none
// ============================================================================

//! ## Overview
//! Every subsystem crate defines its own `thiserror`-derived error enum for
//! its internal detail, but converts into this flat [`ErrorKind`] taxonomy
//! at the boundary the CLI and evidence pipeline observe. This mirrors
//! spec.md §7: the kind drives the exit code and the receipt's
//! `result.error` classification, independent of the originating subsystem.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Scan Subcategories
// ============================================================================

/// Failure subcategories specific to the MCP scanner (§4.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanFailure {
    /// The child process could not be spawned.
    ChildSpawn,
    /// The `initialize` handshake did not complete within the scan timeout.
    HandshakeTimeout,
    /// A frame could not be parsed as JSON-RPC.
    ProtocolParse,
    /// A single frame exceeded the configured size cap.
    ProtocolOversize,
    /// A core method returned a non-tolerated JSON-RPC error.
    MethodError,
    /// The child process exited unexpectedly before the scan completed.
    AbnormalExit,
}

/// Failure subcategories specific to artifact resolution (§4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactFailure {
    /// A registry could not be reached.
    RegistryUnreachable,
    /// A downloaded or resolved artifact's integrity did not match its pin.
    IntegrityMismatch,
    /// A download exceeded the configured size cap.
    SizeExceeded,
    /// A download target was denied by SSRF hardening.
    NetworkDenied,
}

/// Failure subcategories specific to provenance verification (§4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProvenanceFailure {
    /// The external keyless-verify tool is not installed or not on PATH.
    ExternalToolMissing,
    /// The external tool rejected the attestation.
    ProvenanceInvalid,
    /// The attestation predicate could not be parsed.
    ProvenanceMalformed,
    /// The attestation's source URI did not match `--expected-source`.
    ProvenanceSourceMismatch,
}

/// Failure subcategories specific to signature envelopes (§4.7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignatureFailure {
    /// A private or public key could not be loaded or parsed.
    BadKey,
    /// Verification failed because the bytes were modified after signing.
    Tamper,
    /// A sigstore-bundle envelope was missing its required `canon_version`.
    MissingCanonVersion,
    /// The envelope's header or body could not be parsed.
    EnvelopeMalformed,
    /// The external keyless sign/verify tool is not installed or not on PATH.
    ExternalToolMissing,
    /// The external keyless sign/verify tool exited non-zero or timed out.
    ExternalToolFailed,
}

/// Failure subcategories specific to policy evaluation (§4.8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyFailure {
    /// A rule evaluated to a failing outcome under the active mode.
    PolicyFailed,
    /// A rule's expression could not be evaluated (malformed or type error).
    PolicyEvalError,
}

/// Failure subcategories specific to the enforcement proxy (§4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProxyFailure {
    /// A call was denied because its target was not on the lockfile allowlist.
    AllowlistDeny,
    /// Preflight drift met or exceeded the `--fail-on` threshold.
    PreflightDrift,
}

// ============================================================================
// SECTION: Top-Level Error Kind
// ============================================================================

/// Flat error-kind taxonomy surfaced on receipts and CLI exit paths.
///
/// # Invariants
/// - Every subsystem error converts into exactly one variant here.
/// - `Drift` is a functional failure (drift observed at/above threshold), not
///   a bug; it is still reported through this taxonomy so receipts and exit
///   codes treat it uniformly with other failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ErrorKind {
    /// Bad flags or a missing command.
    Usage,
    /// A file read or write failed.
    Io,
    /// A lockfile, signature, or JSON-RPC frame was malformed.
    Parse,
    /// A value could not be canonicalized (non-finite number, etc).
    Canonicalization,
    /// Scanner failure, see [`ScanFailure`].
    Scan(ScanFailure),
    /// Drift was detected at or above the configured fail threshold.
    Drift,
    /// Artifact resolution/download failure, see [`ArtifactFailure`].
    Artifact(ArtifactFailure),
    /// Provenance verification failure, see [`ProvenanceFailure`].
    Provenance(ProvenanceFailure),
    /// Signature envelope failure, see [`SignatureFailure`].
    Signature(SignatureFailure),
    /// Policy evaluation failure, see [`PolicyFailure`].
    Policy(PolicyFailure),
    /// Enforcement proxy failure, see [`ProxyFailure`].
    Proxy(ProxyFailure),
    /// The operation was cancelled.
    Cancelled,
    /// The operation exceeded its deadline.
    Timeout,
}

impl ErrorKind {
    /// Returns the process exit code spec.md §6 assigns to this kind.
    ///
    /// `0` is never returned here; success paths never construct an
    /// [`ErrorKind`]. `Usage` maps to `2`; every other kind maps to `1`
    /// (functional/verification failure).
    #[must_use]
    pub const fn exit_code(self) -> u8 {
        match self {
            Self::Usage => 2,
            _ => 1,
        }
    }

    /// Returns a short machine-stable label for logs and receipts.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Usage => "usage",
            Self::Io => "io",
            Self::Parse => "parse",
            Self::Canonicalization => "canonicalization",
            Self::Scan(_) => "scan",
            Self::Drift => "drift",
            Self::Artifact(_) => "artifact",
            Self::Provenance(_) => "provenance",
            Self::Signature(_) => "signature",
            Self::Policy(_) => "policy",
            Self::Proxy(_) => "proxy",
            Self::Cancelled => "cancelled",
            Self::Timeout => "timeout",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_exits_two_everything_else_exits_one() {
        assert_eq!(ErrorKind::Usage.exit_code(), 2);
        assert_eq!(ErrorKind::Drift.exit_code(), 1);
        assert_eq!(ErrorKind::Scan(ScanFailure::ChildSpawn).exit_code(), 1);
        assert_eq!(ErrorKind::Cancelled.exit_code(), 1);
    }
}
