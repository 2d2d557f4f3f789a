// mcpgate-core/src/model/drift.rs
// ============================================================================
// Module: Drift Item
// Description: A single classified change between a lockfile and a scan.
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

/// The kind of change a drift item records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DriftType {
    /// A tool present in the scan but not the lockfile.
    ToolAdded,
    /// A tool present in the lockfile but not the scan.
    ToolRemoved,
    /// A tool's input schema hash changed.
    ToolSchemaChanged,
    /// A tool's description hash changed.
    ToolDescChanged,
    /// A prompt present in the scan but not the lockfile.
    PromptAdded,
    /// A prompt present in the lockfile but not the scan.
    PromptRemoved,
    /// A prompt's description hash changed.
    PromptDescChanged,
    /// A resource template present in the scan but not the lockfile.
    TemplateAdded,
    /// A resource template present in the lockfile but not the scan.
    TemplateRemoved,
    /// A resource template's `uri_template` changed under the same name.
    TemplateChanged,
}

/// Severity bucket a [`DriftType`] maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriftSeverity {
    /// Does not affect the enforced capability surface's meaning.
    Safe,
    /// Non-structural change; informational under default settings.
    Moderate,
    /// Structural change to the enforced capability surface.
    Critical,
}

/// The single static table mapping each [`DriftType`] to its [`DriftSeverity`].
///
/// Kept as one exhaustive match rather than scattered conditionals so policy
/// and `--fail-on` evaluation can audit severity assignment in one place.
#[must_use]
pub const fn severity_of(drift_type: DriftType) -> DriftSeverity {
    match drift_type {
        DriftType::ToolAdded
        | DriftType::ToolRemoved
        | DriftType::ToolSchemaChanged
        | DriftType::PromptAdded
        | DriftType::PromptRemoved
        | DriftType::TemplateAdded
        | DriftType::TemplateRemoved
        | DriftType::TemplateChanged => DriftSeverity::Critical,
        DriftType::ToolDescChanged | DriftType::PromptDescChanged => DriftSeverity::Moderate,
    }
}

/// One classified change between a lockfile and a fresh scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriftItem {
    /// What kind of change this is.
    #[serde(rename = "type")]
    pub drift_type: DriftType,
    /// Severity bucket, always [`severity_of`]`(drift_type)`.
    pub severity: DriftSeverity,
    /// Tool/prompt/template name, or resource URI.
    pub identifier: String,
    /// Hash before the change, when applicable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_hash: Option<String>,
    /// Hash after the change, when applicable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_hash: Option<String>,
    /// Human-readable summary for `text` output mode.
    pub message: String,
}

impl DriftItem {
    /// Builds a drift item, deriving `severity` from `drift_type` so callers
    /// cannot construct an inconsistent pairing.
    #[must_use]
    pub fn new(
        drift_type: DriftType,
        identifier: impl Into<String>,
        old_hash: Option<String>,
        new_hash: Option<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            drift_type,
            severity: severity_of(drift_type),
            identifier: identifier.into(),
            old_hash,
            new_hash,
            message: message.into(),
        }
    }
}

/// Fail threshold for `--fail-on`, ordered loosest to strictest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailOn {
    /// Fail on any drift, including `safe`.
    Info,
    /// Fail on `moderate` or `critical` drift.
    Moderate,
    /// Fail only on `critical` drift.
    Critical,
}

impl FailOn {
    /// Returns `true` when `severity` should cause a failure under this
    /// threshold: `critical` fails only on critical; `moderate` fails on
    /// critical+moderate; `info` fails on any drift.
    #[must_use]
    pub fn triggers(self, severity: DriftSeverity) -> bool {
        match self {
            Self::Critical => severity == DriftSeverity::Critical,
            Self::Moderate => severity >= DriftSeverity::Moderate,
            Self::Info => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_table_is_exhaustive_and_stable() {
        assert_eq!(severity_of(DriftType::ToolAdded), DriftSeverity::Critical);
        assert_eq!(
            severity_of(DriftType::ToolDescChanged),
            DriftSeverity::Moderate
        );
        assert_eq!(
            severity_of(DriftType::PromptDescChanged),
            DriftSeverity::Moderate
        );
        assert_eq!(
            severity_of(DriftType::TemplateChanged),
            DriftSeverity::Critical
        );
    }

    #[test]
    fn fail_on_threshold_semantics() {
        assert!(!FailOn::Critical.triggers(DriftSeverity::Moderate));
        assert!(FailOn::Critical.triggers(DriftSeverity::Critical));
        assert!(FailOn::Moderate.triggers(DriftSeverity::Moderate));
        assert!(FailOn::Moderate.triggers(DriftSeverity::Critical));
        assert!(!FailOn::Moderate.triggers(DriftSeverity::Safe));
        assert!(FailOn::Info.triggers(DriftSeverity::Safe));
    }
}
