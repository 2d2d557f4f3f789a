// mcpgate-cli/src/commands/diff.rs
// ============================================================================
// Module: `diff` Command
// Description: Rescans a server and prints the drift against a lockfile,
//              unconditionally exiting 0 (informational; use `check` to
//              gate on it).
// ============================================================================

use std::process::ExitCode;

use mcpgate_client::Scanner;

use crate::cli::DiffArgs;
use crate::cli::GlobalArgs;
use crate::error::CliResult;
use crate::evidence::Invocation;
use crate::evidence::ReceiptExtras;
use crate::output::emit_json;

/// Runs `diff`.
///
/// # Errors
///
/// Returns [`crate::error::CliError`] when the lockfile cannot be read or
/// the scan fails.
pub async fn run(args: DiffArgs, global: &GlobalArgs) -> CliResult<ExitCode> {
    let invocation = Invocation::start("diff", &args.argv, global)?;
    match run_inner(&args).await {
        Ok(drift) => {
            emit_json(&drift)?;
            invocation.finish_ok(ReceiptExtras { drift: Some(drift), ..ReceiptExtras::default() })?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            invocation.finish_err(&err, ReceiptExtras::default());
            Err(err)
        }
    }
}

async fn run_inner(args: &DiffArgs) -> CliResult<Vec<mcpgate_core::DriftItem>> {
    let lockfile = mcpgate_lockfile::io::read(&args.lockfile)?;
    let scan = Scanner::new().scan_argv(&args.argv).await?;
    let drift = mcpgate_lockfile::compare_v3(&lockfile, &scan)?;
    Ok(drift)
}
