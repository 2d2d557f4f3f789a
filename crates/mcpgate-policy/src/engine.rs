// mcpgate-policy/src/engine.rs
// ============================================================================
// Module: Policy Evaluation Engine
// Description: Evaluates every rule in a `PolicyConfig` against an assembled
//              input tree and aggregates the pass/fail outcome.
// Purpose: spec.md §4.8's per-rule evaluation and mode semantics.
// Dependencies: mcpgate-core
// ============================================================================

use mcpgate_core::PolicyConfig;
use mcpgate_core::PolicyInput;
use mcpgate_core::PolicyMode;
use mcpgate_core::PolicyReport;
use mcpgate_core::RuleOutcome;
use mcpgate_core::RuleResult;
use mcpgate_core::RuleSeverity;

use crate::error::PolicyError;
use crate::expr;
use crate::input;

/// Evaluates every rule in `config`, in declaration order, against `input`.
///
/// The engine never mutates `input`. A rule whose expression evaluates to
/// `true` records "ok"; `false` records a warning or error per the rule's
/// declared severity. The overall `passed` flag follows `config.mode`:
/// `strict` fails on any warning or error, `warn` fails only on an error.
///
/// # Errors
///
/// Returns whatever [`expr::evaluate`] returns when a rule's expression is
/// malformed or does not reduce to a boolean — a rule that fails to
/// evaluate fails the whole policy run rather than being silently skipped.
pub fn evaluate(config: &PolicyConfig, input: &PolicyInput) -> Result<PolicyReport, PolicyError> {
    let root = input::root_value(input);
    let mut results = Vec::with_capacity(config.rules.len());
    let mut any_warning = false;
    let mut any_error = false;

    for rule in &config.rules {
        let passed = expr::evaluate(&rule.expression, &root)?;
        let result = if passed {
            RuleResult {
                rule_name: rule.name.clone(),
                outcome: RuleOutcome::Ok,
                message: None,
            }
        } else {
            match rule.severity {
                RuleSeverity::Warn => {
                    any_warning = true;
                    RuleResult {
                        rule_name: rule.name.clone(),
                        outcome: RuleOutcome::Warning,
                        message: Some(rule.failure_msg.clone()),
                    }
                }
                RuleSeverity::Error => {
                    any_error = true;
                    RuleResult {
                        rule_name: rule.name.clone(),
                        outcome: RuleOutcome::Error,
                        message: Some(rule.failure_msg.clone()),
                    }
                }
            }
        };
        results.push(result);
    }

    let passed = match config.mode {
        PolicyMode::Strict => !any_warning && !any_error,
        PolicyMode::Warn => !any_error,
    };

    Ok(PolicyReport {
        policy_name: config.name.clone(),
        mode: config.mode,
        results,
        passed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcpgate_core::PolicyRule;
    use mcpgate_core::ScanReport;

    fn empty_scan() -> ScanReport {
        ScanReport {
            server_name: "demo".to_string(),
            server_version: "1.0.0".to_string(),
            tools: vec![],
            prompts: vec![],
            resource_templates: vec![],
            static_resources: vec![],
            error: None,
        }
    }

    fn config_with(mode: PolicyMode, severity: RuleSeverity, expression: &str) -> PolicyConfig {
        PolicyConfig {
            name: "test".to_string(),
            mode,
            rules: vec![PolicyRule {
                name: "r".to_string(),
                expression: expression.to_string(),
                failure_msg: "failed".to_string(),
                severity,
                control_refs: vec![],
                evidence: None,
                evidence_commands: vec![],
            }],
        }
    }

    #[test]
    fn warn_severity_does_not_fail_warn_mode() {
        let config = config_with(PolicyMode::Warn, RuleSeverity::Warn, "false");
        let input = input::build(&empty_scan(), None, None, None);
        let report = evaluate(&config, &input).unwrap();
        assert!(report.passed);
        assert_eq!(report.results[0].outcome, RuleOutcome::Warning);
    }

    #[test]
    fn warn_severity_fails_strict_mode() {
        let config = config_with(PolicyMode::Strict, RuleSeverity::Warn, "false");
        let input = input::build(&empty_scan(), None, None, None);
        let report = evaluate(&config, &input).unwrap();
        assert!(!report.passed);
    }

    #[test]
    fn error_severity_fails_both_modes() {
        for mode in [PolicyMode::Warn, PolicyMode::Strict] {
            let config = config_with(mode, RuleSeverity::Error, "false");
            let input = input::build(&empty_scan(), None, None, None);
            let report = evaluate(&config, &input).unwrap();
            assert!(!report.passed);
        }
    }

    #[test]
    fn passing_rule_records_ok() {
        let config = config_with(PolicyMode::Strict, RuleSeverity::Error, "true");
        let input = input::build(&empty_scan(), None, None, None);
        let report = evaluate(&config, &input).unwrap();
        assert!(report.passed);
        assert_eq!(report.results[0].outcome, RuleOutcome::Ok);
    }
}
