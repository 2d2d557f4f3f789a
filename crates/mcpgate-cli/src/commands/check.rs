// mcpgate-cli/src/commands/check.rs
// ============================================================================
// Module: `check` Command
// Description: Rescans a server, diffs against a lockfile, optionally
//              evaluates a policy, and reports pass/fail.
// Purpose: spec.md §6: JSON mode never prefixes an error string to stdout;
//          the exit code alone signals outcome.
// ============================================================================

use std::process::ExitCode;

use mcpgate_client::Scanner;
use mcpgate_core::DriftSeverity;
use serde::Serialize;

use crate::cli::CheckArgs;
use crate::cli::GlobalArgs;
use crate::cli::OutputFormat;
use crate::error::CliResult;
use crate::evidence::Invocation;
use crate::evidence::ReceiptExtras;
use crate::output::emit_json;
use crate::output::write_stdout_line;

/// Runs `check`.
///
/// # Errors
///
/// Returns [`crate::error::CliError`] when the lockfile cannot be read, the
/// scan fails, or the optional policy selector cannot be resolved.
pub async fn run(args: CheckArgs, global: &GlobalArgs) -> CliResult<ExitCode> {
    let invocation = Invocation::start("check", &args.argv, global)?;
    match run_inner(&args).await {
        Ok((report, passed)) => {
            let extra = ReceiptExtras {
                drift: Some(report.drift.clone()),
                policy: report.policy.clone(),
                ..ReceiptExtras::default()
            };
            match args.format {
                OutputFormat::Json => emit_json(&report)?,
                OutputFormat::Text => print_text(&report),
            }
            invocation.finish_ok(extra)?;
            Ok(if passed { ExitCode::SUCCESS } else { ExitCode::FAILURE })
        }
        Err(err) => {
            invocation.finish_err(&err, ReceiptExtras::default());
            Err(err)
        }
    }
}

/// JSON document emitted by `check --format json`.
#[derive(Serialize)]
struct CheckReport {
    /// Classified differences between the lockfile and the fresh scan.
    drift: Vec<mcpgate_core::DriftItem>,
    /// Whether drift stayed below `--fail-on`.
    drift_passed: bool,
    /// Policy evaluation result, when `--policy` was given.
    #[serde(skip_serializing_if = "Option::is_none")]
    policy: Option<mcpgate_core::PolicyReport>,
}

async fn run_inner(args: &CheckArgs) -> CliResult<(CheckReport, bool)> {
    let lockfile = mcpgate_lockfile::io::read(&args.lockfile)?;
    let scan = Scanner::new().scan_argv(&args.argv).await?;
    let drift = mcpgate_lockfile::compare_v3(&lockfile, &scan)?;

    let fail_on: mcpgate_core::FailOn = args.fail_on.into();
    let drift_passed = !drift.iter().any(|item| fail_on.triggers(item.severity));

    let policy = match &args.policy {
        Some(selector) => {
            let config = mcpgate_policy::load_policy(selector)?;
            let input = mcpgate_policy::build_input(&scan, lockfile.artifact.as_ref(), None, Some(&drift));
            Some(mcpgate_policy::evaluate(&config, &input)?)
        }
        None => None,
    };

    let policy_passed = policy.as_ref().is_none_or(|report| report.passed);
    let passed = drift_passed && policy_passed;

    Ok((
        CheckReport {
            drift,
            drift_passed,
            policy,
        },
        passed,
    ))
}

fn print_text(report: &CheckReport) {
    let counts = summarize(&report.drift);
    let _ = write_stdout_line(&format!(
        "drift: {} safe, {} moderate, {} critical ({})",
        counts.safe,
        counts.moderate,
        counts.critical,
        if report.drift_passed { "pass" } else { "fail" }
    ));
    for item in &report.drift {
        let _ = write_stdout_line(&format!("  {:?} {} ({:?})", item.drift_type, item.identifier, item.severity));
    }
    if let Some(policy) = &report.policy {
        let _ = write_stdout_line(&format!(
            "policy {}: {}",
            policy.policy_name,
            if policy.passed { "pass" } else { "fail" }
        ));
        for result in &policy.results {
            if let Some(message) = &result.message {
                let _ = write_stdout_line(&format!("  {} {:?}: {message}", result.rule_name, result.outcome));
            }
        }
    }
}

/// Per-severity drift item counts, for the text summary line.
struct Counts {
    /// Number of safe-severity drift items.
    safe: usize,
    /// Number of moderate-severity drift items.
    moderate: usize,
    /// Number of critical-severity drift items.
    critical: usize,
}

fn summarize(drift: &[mcpgate_core::DriftItem]) -> Counts {
    let mut counts = Counts { safe: 0, moderate: 0, critical: 0 };
    for item in drift {
        match item.severity {
            DriftSeverity::Safe => counts.safe += 1,
            DriftSeverity::Moderate => counts.moderate += 1,
            DriftSeverity::Critical => counts.critical += 1,
        }
    }
    counts
}
