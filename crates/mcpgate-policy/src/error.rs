// mcpgate-policy/src/error.rs
// ============================================================================
// Module: Policy Error
// Description: Error taxonomy for expression parsing, evaluation, and
//              policy-file loading.
// ============================================================================

use mcpgate_core::error::ErrorKind;
use mcpgate_core::error::PolicyFailure;

/// Errors raised while parsing, evaluating, or loading a policy.
#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    /// A rule's `expression` could not be tokenized or parsed.
    #[error("failed to parse expression: {0}")]
    ExpressionParse(String),
    /// A rule's expression parsed but could not be evaluated against the
    /// input tree (a type mismatch, or did not reduce to a boolean).
    #[error("failed to evaluate expression: {0}")]
    ExpressionEval(String),
    /// A custom policy file's YAML could not be parsed.
    #[error("failed to parse policy file: {0}")]
    ConfigParse(String),
    /// A custom policy file could not be read from disk.
    #[error("failed to read policy file: {0}")]
    Io(#[from] std::io::Error),
    /// The named preset does not exist.
    #[error("unknown policy preset: {0}")]
    UnknownPreset(String),
}

impl PolicyError {
    /// Maps this error onto the shared, crate-independent error taxonomy.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ExpressionParse(_) | Self::ExpressionEval(_) => ErrorKind::Policy(PolicyFailure::PolicyEvalError),
            Self::ConfigParse(_) | Self::UnknownPreset(_) => ErrorKind::Usage,
            Self::Io(_) => ErrorKind::Io,
        }
    }
}
