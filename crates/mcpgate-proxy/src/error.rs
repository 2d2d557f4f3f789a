// mcpgate-proxy/src/error.rs
// ============================================================================
// Module: Proxy Error
// Description: Error taxonomy for lockfile loading, preflight, and the
//              steady-state bridging loop.
// ============================================================================

use mcpgate_client::McpClientError;
use mcpgate_core::ErrorKind;
use mcpgate_core::ProxyFailure;
use mcpgate_core::ScanFailure;
use mcpgate_lockfile::LockfileError;

/// Errors raised while starting or running the enforcement proxy.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    /// The lockfile could not be loaded or a template could not be compiled.
    #[error("lockfile error: {0}")]
    Lockfile(#[from] LockfileError),
    /// The child server process could not be spawned.
    #[error("failed to spawn server process: {0}")]
    Spawn(String),
    /// The preflight scan against the child failed.
    #[error("preflight scan failed: {0}")]
    Preflight(#[from] McpClientError),
    /// Preflight detected drift meeting `--fail-on` and `--audit-only` was
    /// not set.
    #[error("preflight detected drift at or above the configured threshold")]
    PreflightDrift,
    /// A bridging task hit an I/O error reading or writing a frame.
    #[error("stdio I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProxyError {
    /// Maps this error onto the shared, crate-independent error taxonomy.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Lockfile(err) => err.kind(),
            Self::Spawn(_) => ErrorKind::Scan(ScanFailure::ChildSpawn),
            Self::Preflight(err) => err.kind(),
            Self::PreflightDrift => ErrorKind::Proxy(ProxyFailure::PreflightDrift),
            Self::Io(_) => ErrorKind::Io,
        }
    }
}
