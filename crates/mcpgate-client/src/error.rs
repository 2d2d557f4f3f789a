// mcpgate-client/src/error.rs
// ============================================================================
// Module: Client Errors
// Description: Error enum for the stdio MCP client and scanner.
// Dependencies: thiserror, mcpgate-core
// ============================================================================

use mcpgate_core::ErrorKind;
use mcpgate_core::ScanFailure;
use thiserror::Error;

use crate::argv::ArgvError;

/// Errors raised by the stdio MCP client and the scanner built on it.
///
/// # Invariants
/// - Every variant maps to exactly one [`ErrorKind`] via [`McpClientError::kind`].
#[derive(Debug, Error)]
pub enum McpClientError {
    /// The launch command could not be tokenized into argv.
    #[error("invalid launch command: {0}")]
    Argv(#[from] ArgvError),
    /// The child process could not be spawned.
    #[error("failed to spawn server process: {0}")]
    Spawn(String),
    /// The `initialize` handshake did not complete within the scan timeout.
    #[error("handshake with server timed out")]
    HandshakeTimeout,
    /// A frame exceeded the configured per-frame size cap.
    #[error("frame exceeded the size cap of {cap} bytes")]
    FrameOversize {
        /// The configured cap in bytes.
        cap: usize,
    },
    /// A frame could not be parsed as JSON-RPC.
    #[error("malformed json-rpc frame: {0}")]
    FrameParse(String),
    /// A core method returned a JSON-RPC error that is not tolerated.
    #[error("method {method} failed: {message}")]
    MethodError {
        /// The method that failed.
        method: String,
        /// The server-supplied error message.
        message: String,
    },
    /// The child process exited before the scan completed.
    #[error("server exited unexpectedly: {0}")]
    AbnormalExit(String),
    /// The reader task's frame channel overflowed its capacity.
    #[error("pending frame channel exceeded capacity ({0})")]
    ChannelOverflow(usize),
    /// I/O error writing to or reading from the child process.
    #[error("stdio I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl McpClientError {
    /// Maps this error to the shared [`ErrorKind`] taxonomy.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Argv(_) => ErrorKind::Usage,
            Self::Spawn(_) => ErrorKind::Scan(ScanFailure::ChildSpawn),
            Self::HandshakeTimeout => ErrorKind::Scan(ScanFailure::HandshakeTimeout),
            Self::FrameOversize { .. } => ErrorKind::Scan(ScanFailure::ProtocolOversize),
            Self::FrameParse(_) => ErrorKind::Scan(ScanFailure::ProtocolParse),
            Self::MethodError { .. } => ErrorKind::Scan(ScanFailure::MethodError),
            Self::AbnormalExit(_) | Self::ChannelOverflow(_) => {
                ErrorKind::Scan(ScanFailure::AbnormalExit)
            }
            Self::Io(_) => ErrorKind::Io,
        }
    }
}
