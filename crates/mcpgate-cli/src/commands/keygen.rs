// mcpgate-cli/src/commands/keygen.rs
// ============================================================================
// Module: `keygen` Command
// Description: Generates an ed25519 keypair and writes the PEM-armored
//              private and public keys.
// ============================================================================

use std::process::ExitCode;

use crate::cli::GlobalArgs;
use crate::cli::KeygenArgs;
use crate::error::CliResult;
use crate::evidence::Invocation;
use crate::evidence::ReceiptExtras;
use crate::output::write_stdout_line;

/// Runs `keygen`.
///
/// # Errors
///
/// Returns [`crate::error::CliError`] when either key file cannot be
/// written.
pub async fn run(args: KeygenArgs, global: &GlobalArgs) -> CliResult<ExitCode> {
    let raw_args = vec![args.private.display().to_string(), args.public.display().to_string()];
    let invocation = Invocation::start("keygen", &raw_args, global)?;
    match run_inner(&args) {
        Ok(()) => {
            write_stdout_line(&format!(
                "wrote keypair: {} {}",
                args.private.display(),
                args.public.display()
            ))?;
            invocation.finish_ok(ReceiptExtras::default())?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            invocation.finish_err(&err, ReceiptExtras::default());
            Err(err)
        }
    }
}

fn run_inner(args: &KeygenArgs) -> CliResult<()> {
    let (signing_key, verifying_key) = mcpgate_sign::key::generate();
    mcpgate_sign::write_private_key(&args.private, &signing_key)?;
    mcpgate_sign::write_public_key(&args.public, &verifying_key)?;
    Ok(())
}
