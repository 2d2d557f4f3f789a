// mcpgate-sign/src/error.rs
// ============================================================================
// Module: Signing Errors
// Description: Error enum for key handling, envelope I/O, and verification.
// Dependencies: thiserror, mcpgate-core
// ============================================================================

use mcpgate_core::CjsError;
use mcpgate_core::ErrorKind;
use mcpgate_core::SignatureFailure;
use thiserror::Error;

/// Errors raised while signing, verifying, or handling key material.
#[derive(Debug, Error)]
pub enum SignError {
    /// A PEM file was not well-formed armor.
    #[error("malformed pem: {0}")]
    MalformedPem(String),
    /// A PEM file carried an unexpected label.
    #[error("unexpected pem label {found:?}, expected {expected:?}")]
    UnexpectedPemLabel {
        /// The label actually present.
        found: String,
        /// The label required at this call site.
        expected: &'static str,
    },
    /// Decoded key material was not 32 bytes.
    #[error("key material must be 32 bytes, got {0}")]
    InvalidKeyLength(usize),
    /// An ed25519 key or signature was rejected by the underlying curve library.
    #[error("ed25519 rejected the key or signature")]
    Ed25519,
    /// A signature envelope's header declared an empty `canon_version`.
    #[error("signature envelope header must carry a non-empty canon_version")]
    EmptyCanonVersion,
    /// The envelope text did not split into a header line and a payload line.
    #[error("malformed signature envelope: {0}")]
    MalformedEnvelope(String),
    /// The payload was not valid hex where hex was expected.
    #[error("invalid hex payload: {0}")]
    Hex(#[from] hex::FromHexError),
    /// The payload was not valid base64 where base64 was expected.
    #[error("invalid base64 payload: {0}")]
    Base64(String),
    /// A lockfile value could not be canonicalized for signing/verification.
    #[error("canonicalization failed: {0}")]
    Canonicalization(#[from] CjsError),
    /// A header or bundle could not be parsed as JSON.
    #[error("malformed json: {0}")]
    Json(#[from] serde_json::Error),
    /// Recanonicalized bytes did not match the signature: the lockfile was tampered with.
    #[error("signature verification failed: tamper detected")]
    Tamper,
    /// The keyless subprocess binary could not be located or spawned.
    #[error("external keyless-sign/verify tool unavailable: {0}")]
    ExternalToolMissing(String),
    /// The keyless subprocess exited non-zero.
    #[error("external tool failed: {0}")]
    ExternalToolFailed(String),
    /// The keyless subprocess's stdout bundle JSON could not be parsed.
    #[error("keyless bundle malformed: {0}")]
    BundleMalformed(String),
    /// The subprocess exceeded its outer timeout.
    #[error("external tool timed out")]
    Timeout,
    /// A filesystem operation failed.
    #[error("sign/verify I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SignError {
    /// Maps this error to the shared [`ErrorKind`] taxonomy.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::MalformedPem(_) | Self::UnexpectedPemLabel { .. } | Self::InvalidKeyLength(_) | Self::Ed25519 => {
                ErrorKind::Signature(SignatureFailure::BadKey)
            }
            Self::EmptyCanonVersion => ErrorKind::Signature(SignatureFailure::MissingCanonVersion),
            Self::MalformedEnvelope(_) | Self::Hex(_) | Self::Base64(_) | Self::Json(_) | Self::BundleMalformed(_) => {
                ErrorKind::Signature(SignatureFailure::EnvelopeMalformed)
            }
            Self::Canonicalization(_) => ErrorKind::Canonicalization,
            Self::Tamper => ErrorKind::Signature(SignatureFailure::Tamper),
            Self::ExternalToolMissing(_) => ErrorKind::Signature(SignatureFailure::ExternalToolMissing),
            Self::ExternalToolFailed(_) | Self::Timeout => {
                ErrorKind::Signature(SignatureFailure::ExternalToolFailed)
            }
            Self::Io(_) => ErrorKind::Io,
        }
    }
}
