// mcpgate-cli/src/commands/scan.rs
// ============================================================================
// Module: `scan` Command
// Description: Spawns a server, enumerates its capability surface, and
//              prints the scan report as JSON.
// ============================================================================

use std::process::ExitCode;

use mcpgate_client::Scanner;

use crate::cli::GlobalArgs;
use crate::cli::ServerCommand;
use crate::error::CliResult;
use crate::evidence::Invocation;
use crate::evidence::ReceiptExtras;
use crate::output::emit_json;

/// Runs `scan`.
///
/// # Errors
///
/// Returns [`crate::error::CliError`] when the server cannot be spawned,
/// the handshake times out, or an enumeration call fails.
pub async fn run(args: ServerCommand, global: &GlobalArgs) -> CliResult<ExitCode> {
    let invocation = Invocation::start("scan", &args.argv, global)?;

    match Scanner::new().scan_argv(&args.argv).await {
        Ok(report) => {
            emit_json(&report)?;
            invocation.finish_ok(ReceiptExtras::default())?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            let err: crate::error::CliError = err.into();
            invocation.finish_err(&err, ReceiptExtras::default());
            Err(err)
        }
    }
}
