// mcpgate-cli/src/error.rs
// ============================================================================
// Module: CLI Error
// Description: Wraps the shared error taxonomy with a human-readable
//              message and the exit code spec.md §6/§7 assigns to it.
// ============================================================================

use mcpgate_core::ErrorKind;

/// An error surfaced to the CLI's dispatcher, carrying the [`ErrorKind`]
/// that drives its exit code and receipt classification.
#[derive(Debug)]
pub struct CliError {
    /// Shared error-kind taxonomy.
    pub kind: ErrorKind,
    /// Human-readable message written to stderr (non-JSON commands) or
    /// recorded on the receipt.
    pub message: String,
}

impl CliError {
    /// Builds a `usage` error, the only kind the CLI constructs itself
    /// rather than receiving from a subsystem crate.
    #[must_use]
    pub fn usage(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Usage,
            message: message.into(),
        }
    }

    /// Builds an error from any kind/message pair; used when a subsystem
    /// error has already been mapped to an [`ErrorKind`] via its own
    /// `.kind()` method.
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind.label(), self.message)
    }
}

impl std::error::Error for CliError {}

/// Implements `From<$err>` for [`CliError`] given an error type exposing a
/// `kind(&self) -> ErrorKind` method and a `Display` impl.
macro_rules! impl_from_subsystem_error {
    ($err:ty) => {
        impl From<$err> for CliError {
            fn from(err: $err) -> Self {
                Self::new(err.kind(), err.to_string())
            }
        }
    };
}

impl_from_subsystem_error!(mcpgate_client::McpClientError);
impl_from_subsystem_error!(mcpgate_lockfile::LockfileError);
impl_from_subsystem_error!(mcpgate_sign::SignError);
impl_from_subsystem_error!(mcpgate_artifact::ArtifactError);
impl_from_subsystem_error!(mcpgate_policy::PolicyError);
impl_from_subsystem_error!(mcpgate_proxy::ProxyError);

impl From<mcpgate_evidence::EvidenceError> for CliError {
    fn from(err: mcpgate_evidence::EvidenceError) -> Self {
        Self::new(err.kind(), err.to_string())
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::new(ErrorKind::Io, err.to_string())
    }
}

pub type CliResult<T> = Result<T, CliError>;
