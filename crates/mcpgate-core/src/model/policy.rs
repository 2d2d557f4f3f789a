// mcpgate-core/src/model/policy.rs
// ============================================================================
// Module: Policy Rule
// Description: Declarative rule and config shapes for the policy engine.
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

/// Severity a failing rule carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleSeverity {
    /// Failure is recorded as a warning; never fails `warn` mode alone.
    Warn,
    /// Failure is recorded as an error; fails both modes.
    Error,
}

/// One declarative policy rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyRule {
    /// Rule name, unique within a [`PolicyConfig`].
    pub name: String,
    /// Boolean expression over the policy input tree, see `mcpgate-policy`.
    pub expression: String,
    /// Message shown when the rule fails.
    pub failure_msg: String,
    /// Severity assigned on failure.
    pub severity: RuleSeverity,
    /// Optional references to external control identifiers (e.g. compliance
    /// framework clause numbers), carried through to receipts unevaluated.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub control_refs: Vec<String>,
    /// Optional free-form evidence note shown alongside the rule's result.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence: Option<String>,
    /// Optional shell commands an operator can run to gather more evidence;
    /// never executed by this engine.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub evidence_commands: Vec<String>,
}

/// Evaluation mode controlling which rule outcomes fail the overall result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyMode {
    /// Any warning or error fails the overall outcome.
    Strict,
    /// Only errors fail the overall outcome; warnings are informational.
    Warn,
}

/// A named, ordered collection of policy rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Policy name (a built-in preset name, or the custom file's declared
    /// name).
    pub name: String,
    /// Evaluation mode.
    pub mode: PolicyMode,
    /// Rules, evaluated in declaration order.
    pub rules: Vec<PolicyRule>,
}

/// Outcome of evaluating one [`PolicyRule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleOutcome {
    /// The rule's expression evaluated to `true`.
    Ok,
    /// The rule's expression evaluated to `false`, recorded as a warning.
    Warning,
    /// The rule's expression evaluated to `false`, recorded as an error.
    Error,
}

/// Result of evaluating one rule against the policy input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleResult {
    /// The rule that was evaluated.
    pub rule_name: String,
    /// The outcome.
    pub outcome: RuleOutcome,
    /// The rule's `failure_msg`, present only when `outcome != Ok`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Aggregate result of evaluating a [`PolicyConfig`] against one input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyReport {
    /// The policy name that was evaluated.
    pub policy_name: String,
    /// Mode the policy was evaluated under.
    pub mode: PolicyMode,
    /// Per-rule results, in declaration order.
    pub results: Vec<RuleResult>,
    /// Whether the overall outcome passed given `mode`.
    pub passed: bool,
}
