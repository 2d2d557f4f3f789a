// mcpgate-cli/src/commands/lock.rs
// ============================================================================
// Module: `lock` Command
// Description: Scans a server, optionally resolves its artifact pin and
//              provenance, and writes a v3 lockfile.
// ============================================================================

use std::process::ExitCode;
use std::time::Duration;

use mcpgate_artifact::ArtifactError;
use mcpgate_client::Scanner;
use mcpgate_core::ArtifactPin;

use crate::cli::GlobalArgs;
use crate::cli::LockArgs;
use crate::error::CliError;
use crate::error::CliResult;
use crate::evidence::Invocation;
use crate::evidence::ReceiptExtras;
use crate::output::write_stdout_line;

/// Runs `lock`.
///
/// # Errors
///
/// Returns [`CliError`] when the lockfile already exists and `--force` was
/// not given, the scan or artifact resolution fails, or the lockfile
/// cannot be written.
pub async fn run(args: LockArgs, global: &GlobalArgs) -> CliResult<ExitCode> {
    let invocation = Invocation::start("lock", &args.argv, global)?;
    match run_inner(&args).await {
        Ok((lockfile, path)) => {
            let extra = ReceiptExtras {
                lockfile: Some(crate::evidence::lockfile_summary(&path, &lockfile)),
                artifact: lockfile.artifact.as_ref().map(crate::evidence::artifact_summary),
                ..ReceiptExtras::default()
            };
            write_stdout_line(&format!("wrote lockfile: {}", path.display()))?;
            invocation.finish_ok(extra)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            invocation.finish_err(&err, ReceiptExtras::default());
            Err(err)
        }
    }
}

async fn run_inner(args: &LockArgs) -> CliResult<(mcpgate_core::Lockfile, std::path::PathBuf)> {
    if args.output.exists() && !args.force {
        return Err(CliError::usage(format!(
            "lockfile already exists at {}; pass --force to overwrite",
            args.output.display()
        )));
    }

    let scan = Scanner::new().scan_argv(&args.argv).await?;

    let artifact = if args.pin {
        Some(resolve_and_verify(args).await?)
    } else {
        None
    };

    let generated_at = mcpgate_evidence::timestamp::now();
    let lockfile = mcpgate_lockfile::build(&scan, &generated_at, artifact)?;
    mcpgate_lockfile::write_atomic(&args.output, &lockfile)?;
    Ok((lockfile, args.output.clone()))
}

async fn resolve_and_verify(args: &LockArgs) -> CliResult<ArtifactPin> {
    let client = mcpgate_artifact::build_client(Duration::from_secs(60))
        .map_err(|err| CliError::new(mcpgate_core::ErrorKind::Io, err.to_string()))?;
    let mut pin = mcpgate_artifact::resolve_pin(&client, &args.argv, mcpgate_artifact::npm::DEFAULT_REGISTRY).await?;

    if args.verify_provenance {
        let verified_at = mcpgate_evidence::timestamp::now();
        let provenance = match &pin {
            ArtifactPin::Npm(_) => {
                let cwd = std::env::current_dir()?;
                mcpgate_artifact::provenance::verify_npm_audit_signatures(
                    &cwd,
                    args.expected_source.as_deref(),
                    &verified_at,
                )
                .await?
            }
            ArtifactPin::Oci(_) | ArtifactPin::Local(_) => {
                return Err(CliError::from(ArtifactError::ExternalToolMissing(
                    "--verify-provenance only resolves npm_audit_signatures automatically; use `artifact provenance --bundle` for cosign_slsa".to_string(),
                )));
            }
        };
        match &mut pin {
            ArtifactPin::Npm(npm) => npm.provenance = Some(provenance),
            ArtifactPin::Oci(_) | ArtifactPin::Local(_) => unreachable!("checked above"),
        }
    }

    Ok(pin)
}
