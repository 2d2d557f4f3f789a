// mcpgate-policy/src/presets.rs
// ============================================================================
// Module: Built-in Policy Presets
// Description: Hard-coded `baseline` and `strict` rule collections.
// Purpose: spec.md §4.8, "built-in presets are hard-coded rule collections".
// ============================================================================

use mcpgate_core::PolicyConfig;
use mcpgate_core::PolicyMode;
use mcpgate_core::PolicyRule;
use mcpgate_core::RuleSeverity;

/// Name of the permissive built-in preset.
pub const BASELINE: &str = "baseline";
/// Name of the restrictive built-in preset.
pub const STRICT: &str = "strict";

/// Looks up a built-in preset by name.
#[must_use]
pub fn lookup(name: &str) -> Option<PolicyConfig> {
    match name {
        BASELINE => Some(baseline()),
        STRICT => Some(strict()),
        _ => None,
    }
}

/// `baseline`: warns on risk and drift but only fails closed on artifact
/// integrity and verified provenance being absent when an artifact was
/// resolved at all.
#[must_use]
pub fn baseline() -> PolicyConfig {
    PolicyConfig {
        name: BASELINE.to_string(),
        mode: PolicyMode::Warn,
        rules: vec![
            PolicyRule {
                name: "no-critical-drift".to_string(),
                expression: "drift.counts.critical == 0".to_string(),
                failure_msg: "one or more critical drift items were detected".to_string(),
                severity: RuleSeverity::Error,
                control_refs: vec![],
                evidence: None,
                evidence_commands: vec![],
            },
            PolicyRule {
                name: "high-risk-tools-flagged".to_string(),
                expression: "!any(tools, risk_level == 'HIGH')".to_string(),
                failure_msg: "one or more tools carry HIGH risk (write/delete/exec/shell)".to_string(),
                severity: RuleSeverity::Warn,
                control_refs: vec![],
                evidence: None,
                evidence_commands: vec![],
            },
            PolicyRule {
                name: "artifact-provenance-if-resolved".to_string(),
                expression: "!exists(artifact) || provenance.verified == true".to_string(),
                failure_msg: "an artifact was resolved but its provenance was not verified".to_string(),
                severity: RuleSeverity::Warn,
                control_refs: vec![],
                evidence: None,
                evidence_commands: vec![],
            },
        ],
    }
}

/// `strict`: fails closed on any drift, any unverified or unresolved
/// provenance, any HIGH-risk tool, and any moderate drift.
#[must_use]
pub fn strict() -> PolicyConfig {
    PolicyConfig {
        name: STRICT.to_string(),
        mode: PolicyMode::Strict,
        rules: vec![
            PolicyRule {
                name: "no-drift".to_string(),
                expression: "drift.counts.critical == 0 && drift.counts.moderate == 0".to_string(),
                failure_msg: "drift was detected at moderate severity or above".to_string(),
                severity: RuleSeverity::Error,
                control_refs: vec![],
                evidence: None,
                evidence_commands: vec![],
            },
            PolicyRule {
                name: "no-high-risk-tools".to_string(),
                expression: "!any(tools, risk_level == 'HIGH')".to_string(),
                failure_msg: "one or more tools carry HIGH risk (write/delete/exec/shell)".to_string(),
                severity: RuleSeverity::Error,
                control_refs: vec![],
                evidence: None,
                evidence_commands: vec![],
            },
            PolicyRule {
                name: "artifact-must-be-verified".to_string(),
                expression: "exists(artifact) && provenance.verified == true".to_string(),
                failure_msg: "no artifact was resolved, or its provenance was not verified".to_string(),
                severity: RuleSeverity::Error,
                control_refs: vec![],
                evidence: None,
                evidence_commands: vec![],
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_returns_both_built_ins() {
        assert!(lookup(BASELINE).is_some());
        assert!(lookup(STRICT).is_some());
        assert!(lookup("nonexistent").is_none());
    }

    #[test]
    fn strict_mode_is_strict_and_baseline_is_warn() {
        assert_eq!(strict().mode, PolicyMode::Strict);
        assert_eq!(baseline().mode, PolicyMode::Warn);
    }

    #[test]
    fn every_rule_expression_parses() {
        for config in [baseline(), strict()] {
            for rule in &config.rules {
                assert!(crate::expr::parse(&rule.expression).is_ok(), "{}", rule.expression);
            }
        }
    }
}
