// mcpgate-evidence/src/error.rs
// ============================================================================
// Module: Evidence Error
// Description: Error taxonomy for event logging, receipt writing, and
//              tracing initialization.
// ============================================================================

use mcpgate_core::ErrorKind;

/// Errors raised by the evidence pipeline.
#[derive(Debug, thiserror::Error)]
pub enum EvidenceError {
    /// A receipt or log file could not be read or written.
    #[error("evidence I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// A receipt or event could not be serialized to JSON.
    #[error("evidence serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
    /// The tracing subscriber or exporter could not be initialized.
    #[error("tracing initialization failed: {0}")]
    TracingInit(String),
}

impl EvidenceError {
    /// Maps this error onto the shared, crate-independent error taxonomy.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Io(_) | Self::TracingInit(_) => ErrorKind::Io,
            Self::Serialize(_) => ErrorKind::Parse,
        }
    }
}
