// mcpgate-cli/src/commands/sign.rs
// ============================================================================
// Module: `sign` Command
// Description: Signs a lockfile with either an ed25519 key or the external
//              keyless tool, writing a signature envelope file.
// ============================================================================

use std::path::PathBuf;
use std::process::ExitCode;

use mcpgate_core::CanonVersion;

use crate::cli::CanonVersionArg;
use crate::cli::GlobalArgs;
use crate::cli::SignArgs;
use crate::error::CliError;
use crate::error::CliResult;
use crate::evidence::Invocation;
use crate::evidence::ReceiptExtras;
use crate::output::write_stdout_line;

impl From<CanonVersionArg> for CanonVersion {
    fn from(value: CanonVersionArg) -> Self {
        match value {
            CanonVersionArg::V1 => Self::V1,
            CanonVersionArg::V2 => Self::V2,
        }
    }
}

/// Runs `sign`.
///
/// # Errors
///
/// Returns [`CliError`] when the lockfile cannot be read, neither `--key`
/// nor `--sigstore` was given, or signing fails.
pub async fn run(args: SignArgs, global: &GlobalArgs) -> CliResult<ExitCode> {
    let raw_args = vec![args.lockfile.display().to_string()];
    let invocation = Invocation::start("sign", &raw_args, global)?;
    match run_inner(&args).await {
        Ok((path, lockfile)) => {
            let extra = ReceiptExtras {
                lockfile: Some(crate::evidence::lockfile_summary(&args.lockfile, &lockfile)),
                ..ReceiptExtras::default()
            };
            write_stdout_line(&format!("wrote signature: {}", path.display()))?;
            invocation.finish_ok(extra)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            invocation.finish_err(&err, ReceiptExtras::default());
            Err(err)
        }
    }
}

async fn run_inner(args: &SignArgs) -> CliResult<(PathBuf, mcpgate_core::Lockfile)> {
    let lockfile = mcpgate_lockfile::io::read(&args.lockfile)?;
    let canon_version: CanonVersion = args.canonicalization.into();

    let envelope = if args.sigstore {
        mcpgate_sign::sign_keyless(mcpgate_sign::DEFAULT_KEYLESS_TOOL, &lockfile, canon_version).await?
    } else {
        let key_path = args
            .key
            .as_ref()
            .ok_or_else(|| CliError::usage("--key is required unless --sigstore is given"))?;
        let signing_key = mcpgate_sign::load_private_key(key_path)?;
        mcpgate_sign::sign_ed25519(&lockfile, &signing_key, canon_version)?
    };

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| sibling_with_suffix(&args.lockfile, "sig"));
    mcpgate_sign::envelope::write(&output, &envelope)?;
    Ok((output, lockfile))
}

fn sibling_with_suffix(path: &std::path::Path, extension: &str) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".");
    name.push(extension);
    path.with_file_name(name)
}
