// mcpgate-cli/src/commands/verify.rs
// ============================================================================
// Module: `verify` Command
// Description: Verifies a lockfile's signature envelope, ed25519 or
//              sigstore-bundle, and reports pass/fail via exit code.
// ============================================================================

use std::path::PathBuf;
use std::process::ExitCode;

use mcpgate_sign::KeylessIdentity;

use crate::cli::GlobalArgs;
use crate::cli::VerifyArgs;
use crate::error::CliError;
use crate::error::CliResult;
use crate::evidence::Invocation;
use crate::evidence::ReceiptExtras;
use crate::output::write_stderr_line;
use crate::output::write_stdout_line;

/// Runs `verify`.
///
/// # Errors
///
/// Returns [`CliError`] when the lockfile, signature, or key files cannot
/// be read, or required flags for the envelope's signature type are
/// missing.
pub async fn run(args: VerifyArgs, global: &GlobalArgs) -> CliResult<ExitCode> {
    let raw_args = vec![args.lockfile.display().to_string()];
    let invocation = Invocation::start("verify", &raw_args, global)?;
    match run_inner(&args).await {
        Ok(()) => {
            write_stdout_line("signature valid")?;
            invocation.finish_ok(ReceiptExtras::default())?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            let _ = write_stderr_line(&format!("signature invalid: {err}"));
            invocation.finish_err(&err, ReceiptExtras::default());
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn run_inner(args: &VerifyArgs) -> CliResult<()> {
    let lockfile = mcpgate_lockfile::io::read(&args.lockfile)?;
    let signature_path = args
        .signature
        .clone()
        .unwrap_or_else(|| sibling_with_suffix(&args.lockfile, "sig"));
    let envelope = mcpgate_sign::envelope::read(&signature_path)?;

    match envelope.effective_sig_type() {
        mcpgate_core::SigType::Ed25519 => {
            let key_path = args
                .key
                .as_ref()
                .ok_or_else(|| CliError::usage("--key is required to verify an ed25519 envelope"))?;
            let verifying_key = mcpgate_sign::load_public_key(key_path)?;
            mcpgate_sign::verify_ed25519(&lockfile, &envelope, &verifying_key)?;
        }
        mcpgate_core::SigType::SigstoreBundle => {
            let issuer = args
                .issuer
                .as_ref()
                .ok_or_else(|| CliError::usage("--issuer is required to verify a sigstore-bundle envelope"))?;
            let identity = match (&args.identity, &args.identity_regexp) {
                (Some(exact), _) => KeylessIdentity::Exact(exact.clone()),
                (None, Some(pattern)) => KeylessIdentity::Regexp(pattern.clone()),
                (None, None) => {
                    return Err(CliError::usage(
                        "--identity or --identity-regexp is required to verify a sigstore-bundle envelope",
                    ));
                }
            };
            mcpgate_sign::verify_keyless(
                mcpgate_sign::DEFAULT_KEYLESS_TOOL,
                &lockfile,
                &envelope,
                issuer,
                &identity,
            )
            .await?;
        }
    }
    Ok(())
}

fn sibling_with_suffix(path: &std::path::Path, extension: &str) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".");
    name.push(extension);
    path.with_file_name(name)
}
