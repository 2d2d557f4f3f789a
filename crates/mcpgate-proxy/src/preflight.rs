// mcpgate-proxy/src/preflight.rs
// ============================================================================
// Module: Preflight
// Description: Scans the target server once before the enforced session
//              starts and compares the result against the lockfile.
// Purpose: spec.md §4.4 startup step 2: detect drift before any traffic is
//          bridged, so a tampered server is caught before it can respond.
// Dependencies: mcpgate-client::Scanner, mcpgate-lockfile::drift
// ============================================================================

use mcpgate_core::DriftItem;
use mcpgate_core::FailOn;
use mcpgate_core::Lockfile;
use mcpgate_client::scanner::Scanner;

use crate::error::ProxyError;

/// Outcome of a preflight pass.
pub struct PreflightReport {
    /// Every classified change between the lockfile and the fresh scan.
    pub drift: Vec<DriftItem>,
    /// Whether any item met or exceeded `fail_on` and enforcement is live.
    pub should_abort: bool,
}

/// Spawns `argv` in a short-lived side channel, scans it, and diffs the
/// result against `lockfile`.
///
/// In `audit_only` mode a scan failure is logged by the caller and treated
/// as empty drift rather than propagated, matching spec.md §4.4's "preflight
/// errors are fatal except in `--audit-only`".
///
/// # Errors
///
/// Returns [`ProxyError::Preflight`] when the scan itself fails and
/// `audit_only` is `false`, or [`ProxyError::Lockfile`] when the scan's
/// result cannot be diffed against `lockfile`.
pub async fn run(
    lockfile: &Lockfile,
    argv: &[String],
    fail_on: FailOn,
    audit_only: bool,
) -> Result<PreflightReport, ProxyError> {
    let scan = match Scanner::new().scan_argv(argv).await {
        Ok(scan) => scan,
        Err(err) if audit_only => {
            tracing::warn!(error = %err, "preflight scan failed; continuing because --audit-only is set");
            return Ok(PreflightReport {
                drift: Vec::new(),
                should_abort: false,
            });
        }
        Err(err) => return Err(ProxyError::Preflight(err)),
    };

    let drift = mcpgate_lockfile::drift::compare_v3(lockfile, &scan)?;
    let triggered = drift.iter().any(|item| fail_on.triggers(item.severity));

    if triggered {
        for item in &drift {
            if fail_on.triggers(item.severity) {
                tracing::warn!(
                    drift_type = ?item.drift_type,
                    severity = ?item.severity,
                    identifier = %item.identifier,
                    "preflight drift"
                );
            }
        }
    }

    Ok(PreflightReport {
        drift,
        should_abort: triggered && !audit_only,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcpgate_core::DriftSeverity;
    use mcpgate_core::DriftType;

    #[test]
    fn fail_on_threshold_governs_abort_decision() {
        let drift = vec![DriftItem::new(
            DriftType::ToolDescChanged,
            "echo",
            Some("sha256:a".to_string()),
            Some("sha256:b".to_string()),
            "description changed",
        )];
        assert_eq!(drift[0].severity, DriftSeverity::Moderate);
        assert!(FailOn::Moderate.triggers(drift[0].severity));
        assert!(!FailOn::Critical.triggers(drift[0].severity));
    }
}
