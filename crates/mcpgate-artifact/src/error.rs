// mcpgate-artifact/src/error.rs
// ============================================================================
// Module: Artifact Errors
// Description: Error enum for classification, resolution, download, and
//              provenance verification.
// Dependencies: thiserror, mcpgate-core
// ============================================================================

use mcpgate_core::ArtifactFailure;
use mcpgate_core::ErrorKind;
use mcpgate_core::ProvenanceFailure;
use thiserror::Error;

/// Errors raised while classifying a launch command, resolving a registry
/// artifact, downloading a tarball, or verifying provenance.
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// The launch command did not resolve to a pinnable artifact.
    #[error("launch command does not resolve to a pinnable artifact: {0}")]
    NotPinnable(String),
    /// A package or image reference could not be parsed.
    #[error("malformed artifact reference: {0}")]
    MalformedReference(String),
    /// A registry request failed at the transport layer.
    #[error("registry unreachable: {0}")]
    RegistryUnreachable(String),
    /// A registry responded but the manifest could not be parsed or the
    /// requested version/tag was not present in it.
    #[error("registry manifest could not be resolved: {0}")]
    ManifestUnresolvable(String),
    /// A download target was denied by SSRF hardening.
    #[error("download target denied: {0}")]
    NetworkDenied(String),
    /// A download exceeded the configured size cap.
    #[error("download exceeded size cap of {cap} bytes")]
    SizeExceeded {
        /// The configured cap in bytes.
        cap: u64,
    },
    /// A downloaded artifact's computed digest did not match its advertised
    /// integrity.
    #[error("integrity mismatch: expected {expected}, computed {computed}")]
    IntegrityMismatch {
        /// The integrity value the registry advertised.
        expected: String,
        /// The integrity value actually computed from the downloaded bytes.
        computed: String,
    },
    /// The external keyless-verify tool could not be located or spawned.
    #[error("external keyless-verify tool unavailable: {0}")]
    ExternalToolMissing(String),
    /// The external tool rejected the attestation.
    #[error("provenance verification failed: {0}")]
    ProvenanceInvalid(String),
    /// The attestation predicate could not be parsed.
    #[error("provenance predicate malformed: {0}")]
    ProvenanceMalformed(String),
    /// `--expected-source` was supplied but could not be satisfied by the
    /// verification method, or did not match the predicate's source URI.
    #[error("provenance source mismatch: {0}")]
    ProvenanceSourceMismatch(String),
    /// The operation exceeded its deadline.
    #[error("operation timed out")]
    Timeout,
    /// A filesystem operation failed.
    #[error("artifact I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ArtifactError {
    /// Maps this error to the shared [`ErrorKind`] taxonomy.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotPinnable(_) | Self::MalformedReference(_) => ErrorKind::Usage,
            Self::RegistryUnreachable(_) | Self::ManifestUnresolvable(_) => {
                ErrorKind::Artifact(ArtifactFailure::RegistryUnreachable)
            }
            Self::NetworkDenied(_) => ErrorKind::Artifact(ArtifactFailure::NetworkDenied),
            Self::SizeExceeded { .. } => ErrorKind::Artifact(ArtifactFailure::SizeExceeded),
            Self::IntegrityMismatch { .. } => ErrorKind::Artifact(ArtifactFailure::IntegrityMismatch),
            Self::ExternalToolMissing(_) => ErrorKind::Provenance(ProvenanceFailure::ExternalToolMissing),
            Self::ProvenanceInvalid(_) => ErrorKind::Provenance(ProvenanceFailure::ProvenanceInvalid),
            Self::ProvenanceMalformed(_) => ErrorKind::Provenance(ProvenanceFailure::ProvenanceMalformed),
            Self::ProvenanceSourceMismatch(_) => {
                ErrorKind::Provenance(ProvenanceFailure::ProvenanceSourceMismatch)
            }
            Self::Timeout => ErrorKind::Timeout,
            Self::Io(_) => ErrorKind::Io,
        }
    }
}
