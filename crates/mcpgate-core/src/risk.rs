// mcpgate-core/src/risk.rs
// ============================================================================
// Module: Risk Classification
// Description: Keyword-based risk classification for tool descriptions.
// Dependencies: none
// ============================================================================

//! ## Overview
//! Tool risk is assigned from a description's text by a fixed keyword rule
//! (spec.md §3): `HIGH` if the description mentions writing, deleting, or
//! executing; `MEDIUM` if it mentions networking; otherwise `LOW`.

use serde::Deserialize;
use serde::Serialize;

/// Risk level assigned to a tool from its description text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    /// No write/delete/exec/network keyword matched.
    Low,
    /// Description mentions network or fetch activity.
    Medium,
    /// Description mentions write, delete, exec, or shell activity.
    High,
}

/// Keywords that classify a tool as `HIGH` risk.
const HIGH_KEYWORDS: &[&str] = &["write", "delete", "exec", "shell"];

/// Keywords that classify a tool as `MEDIUM` risk.
const MEDIUM_KEYWORDS: &[&str] = &["network", "fetch"];

/// Classifies a tool's risk level from its description.
///
/// Matching is case-insensitive substring matching against the keyword
/// lists, `HIGH` checked before `MEDIUM` so a description mentioning both
/// classifies as `HIGH`.
#[must_use]
pub fn classify(description: &str) -> RiskLevel {
    let lower = description.to_lowercase();
    if HIGH_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
        return RiskLevel::High;
    }
    if MEDIUM_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
        return RiskLevel::Medium;
    }
    RiskLevel::Low
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_delete_exec_shell_are_high() {
        assert_eq!(classify("deletes files"), RiskLevel::High);
        assert_eq!(classify("writes to disk"), RiskLevel::High);
        assert_eq!(classify("executes a script"), RiskLevel::High);
        assert_eq!(classify("opens a shell"), RiskLevel::High);
    }

    #[test]
    fn network_fetch_are_medium() {
        assert_eq!(classify("fetches a URL"), RiskLevel::Medium);
        assert_eq!(classify("makes a network call"), RiskLevel::Medium);
    }

    #[test]
    fn everything_else_is_low() {
        assert_eq!(classify("say hi"), RiskLevel::Low);
        assert_eq!(classify("computes a checksum"), RiskLevel::Low);
    }

    #[test]
    fn high_wins_over_medium_when_both_present() {
        assert_eq!(classify("fetches and deletes files"), RiskLevel::High);
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert_eq!(classify("DELETES FILES"), RiskLevel::High);
    }
}
