// mcpgate-lockfile/src/error.rs
// ============================================================================
// Module: Lockfile Errors
// Description: Error enum for lockfile building, loading, and drift.
// Dependencies: thiserror, mcpgate-core
// ============================================================================

use mcpgate_core::CjsError;
use mcpgate_core::ErrorKind;
use thiserror::Error;

/// Errors raised while building, loading, or diffing a lockfile.
#[derive(Debug, Error)]
pub enum LockfileError {
    /// A resource template used an RFC 6570 operator outside level 1.
    #[error("uri template {0:?} uses an operator beyond level 1 ({{var}} only)")]
    UnsupportedTemplateOperator(String),
    /// A value could not be canonicalized while hashing.
    #[error("canonicalization failed: {0}")]
    Canonicalization(#[from] CjsError),
    /// The lockfile file could not be parsed as JSON.
    #[error("malformed lockfile: {0}")]
    Parse(#[from] serde_json::Error),
    /// A file read or write failed.
    #[error("lockfile I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The lockfile's `lock_file_version` was not a recognized major version.
    #[error("unsupported lockfile version: {0}")]
    UnsupportedVersion(String),
}

impl LockfileError {
    /// Maps this error to the shared [`ErrorKind`] taxonomy.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::UnsupportedTemplateOperator(_) | Self::UnsupportedVersion(_) | Self::Parse(_) => {
                ErrorKind::Parse
            }
            Self::Canonicalization(_) => ErrorKind::Canonicalization,
            Self::Io(_) => ErrorKind::Io,
        }
    }
}
