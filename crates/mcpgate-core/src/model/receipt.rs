// mcpgate-core/src/model/receipt.rs
// ============================================================================
// Module: Receipt
// Description: Per-invocation audit record persisted to disk.
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::model::drift::DriftItem;
use crate::model::policy::PolicyReport;

/// Maximum length an error string is truncated to before being persisted.
pub const MAX_ERROR_LEN: usize = 2_048;

/// Status recorded on a receipt's `result`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultStatus {
    /// The command completed successfully.
    Ok,
    /// The command failed; `error` carries the error kind label.
    Fail,
}

/// The `result` section of a [`Receipt`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptResult {
    /// Whether the command succeeded.
    pub status: ResultStatus,
    /// Error kind label, present only when `status == Fail`. Truncated to
    /// [`MAX_ERROR_LEN`] characters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ReceiptResult {
    /// Builds an `ok` result.
    #[must_use]
    pub const fn ok() -> Self {
        Self {
            status: ResultStatus::Ok,
            error: None,
        }
    }

    /// Builds a `fail` result, truncating `error` to [`MAX_ERROR_LEN`] chars.
    #[must_use]
    pub fn fail(error: &str) -> Self {
        let truncated: String = error.chars().take(MAX_ERROR_LEN).collect();
        Self {
            status: ResultStatus::Fail,
            error: Some(truncated),
        }
    }
}

/// Lockfile summary embedded on a receipt, when the command touched one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptLockfileSummary {
    /// Path to the lockfile on disk.
    pub path: String,
    /// The lockfile's `lock_file_version`.
    pub lock_file_version: String,
}

/// Artifact summary embedded on a receipt, when the command resolved one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptArtifactSummary {
    /// Artifact type label (`npm`, `oci`, `local`).
    #[serde(rename = "type")]
    pub artifact_type: String,
    /// Human-readable identifier (package name, image ref).
    pub identifier: String,
}

/// Per-invocation audit record, persisted to disk in overwrite or append
/// mode (spec.md §4.9).
///
/// # Invariants
/// - `args` holds the post-redaction argument vector; `args_redacted` is
///   `true` iff redaction replaced at least one value.
/// - `error` inside [`ReceiptResult`] is truncated to [`MAX_ERROR_LEN`]
///   characters before this struct is constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receipt {
    /// Receipt schema version, currently always `"1.0"`.
    pub schema_version: String,
    /// UUIDv4 identifying this invocation across logs, spans, and receipts.
    pub op_id: String,
    /// RFC3339Nano timestamp when the command started.
    pub ts_start: String,
    /// RFC3339Nano timestamp when the command finished.
    pub ts_end: String,
    /// Subcommand name (`scan`, `lock`, `check`, ...).
    pub command: String,
    /// Post-redaction argument vector.
    pub args: Vec<String>,
    /// Whether redaction replaced at least one argument value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args_redacted: Option<bool>,
    /// Outcome of the command.
    pub result: ReceiptResult,
    /// Lockfile summary, when applicable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lockfile: Option<ReceiptLockfileSummary>,
    /// Artifact summary, when applicable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact: Option<ReceiptArtifactSummary>,
    /// Drift items observed during this command, when applicable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drift: Option<Vec<DriftItem>>,
    /// Policy evaluation report, when applicable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy: Option<PolicyReport>,
}

impl Receipt {
    /// The schema version this crate writes.
    pub const CURRENT_SCHEMA_VERSION: &'static str = "1.0";
}

/// An argument value after redaction scanning, used by `mcpgate-evidence`
/// before a [`Receipt`] is constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedactionResult {
    /// The argument vector after redaction.
    pub args: Vec<String>,
    /// Whether any value was replaced with `[REDACTED]`.
    pub redacted: bool,
}

/// Policy input tree assembled for the evaluator (spec.md §4.8), reused
/// here so `Receipt`-adjacent code can reference the same shape without a
/// cyclic dependency on `mcpgate-policy`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyInput {
    /// Tool facts: name, description, risk_level, schema.
    pub tools: Value,
    /// Prompt facts.
    pub prompts: Value,
    /// Resource facts.
    pub resources: Value,
    /// Artifact facts, when an artifact was resolved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact: Option<Value>,
    /// Provenance facts, when provenance was verified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provenance: Option<Value>,
    /// Drift summary, when a drift comparison ran.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drift: Option<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_strings_are_truncated() {
        let long = "x".repeat(MAX_ERROR_LEN + 100);
        let result = ReceiptResult::fail(&long);
        assert_eq!(result.error.unwrap().chars().count(), MAX_ERROR_LEN);
    }
}
