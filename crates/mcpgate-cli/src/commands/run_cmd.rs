// mcpgate-cli/src/commands/run_cmd.rs
// ============================================================================
// Module: `run` Command
// Description: Launches a server under the identity pinned in a lockfile,
//              reconstructing the launch command from the artifact pin
//              unless `--` overrides it.
// Purpose: spec.md §4 "runtime proxy enforcement" companion: a plain
//          (unproxied) launch that still checks the pin before executing.
// ============================================================================

use std::process::ExitCode;
use std::process::Stdio;

use mcpgate_core::ArtifactPin;

use crate::cli::GlobalArgs;
use crate::cli::RunArgs;
use crate::error::CliError;
use crate::error::CliResult;
use crate::evidence::Invocation;
use crate::evidence::ReceiptExtras;
use crate::output::write_stdout_line;

/// Runs `run`.
///
/// # Errors
///
/// Returns [`CliError`] when the lockfile cannot be read, `--require-provenance`
/// is set but the pin carries no verified provenance, or the child process
/// cannot be spawned.
pub async fn run(args: RunArgs, global: &GlobalArgs) -> CliResult<ExitCode> {
    let raw_args = vec![args.lockfile.display().to_string()];
    let invocation = Invocation::start("run", &raw_args, global)?;

    match run_inner(&args).await {
        Ok(status) => {
            invocation.finish_ok(ReceiptExtras::default())?;
            Ok(exit_code_of(status))
        }
        Err(err) => {
            invocation.finish_err(&err, ReceiptExtras::default());
            Err(err)
        }
    }
}

async fn run_inner(args: &RunArgs) -> CliResult<Option<std::process::ExitStatus>> {
    let lockfile = mcpgate_lockfile::io::read(&args.lockfile)?;

    if args.require_provenance {
        let verified = lockfile
            .artifact
            .as_ref()
            .is_some_and(|pin| matches!(pin, ArtifactPin::Npm(npm) if npm.provenance.as_ref().is_some_and(|p| p.verified)))
            || lockfile
                .artifact
                .as_ref()
                .is_some_and(|pin| matches!(pin, ArtifactPin::Oci(oci) if oci.provenance.as_ref().is_some_and(|p| p.verified)));
        if !verified {
            return Err(CliError::new(
                mcpgate_core::ErrorKind::Provenance(mcpgate_core::ProvenanceFailure::ProvenanceInvalid),
                "lockfile carries no verified provenance and --require-provenance was given".to_string(),
            ));
        }
    }

    let argv = if args.command_override.is_empty() {
        launch_command(&lockfile, args.bin.as_deref())?
    } else {
        args.command_override.clone()
    };

    if args.dry_run {
        write_stdout_line(&format!("would run: {}", argv.join(" ")))?;
        return Ok(None);
    }

    let Some((program, rest)) = argv.split_first() else {
        return Err(CliError::usage("resolved launch command is empty"));
    };
    let status = tokio::process::Command::new(program)
        .args(rest)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .await?;
    Ok(Some(status))
}

/// Reconstructs a launch command from the lockfile's pinned artifact
/// identity: an npm pin runs under `npx`, an OCI pin under `docker run`, and
/// a local pin replays its recorded command verbatim.
fn launch_command(lockfile: &mcpgate_core::Lockfile, bin: Option<&str>) -> CliResult<Vec<String>> {
    let pin = lockfile
        .artifact
        .as_ref()
        .ok_or_else(|| CliError::usage("lockfile carries no artifact pin; pass a command after --"))?;
    Ok(match pin {
        ArtifactPin::Npm(npm) => {
            let mut argv = vec!["npx".to_string(), "-y".to_string(), format!("{}@{}", npm.name, npm.version)];
            if let Some(bin) = bin {
                argv.push(bin.to_string());
            }
            argv
        }
        ArtifactPin::Oci(oci) => {
            vec![
                "docker".to_string(),
                "run".to_string(),
                "--rm".to_string(),
                "-i".to_string(),
                format!("{}@{}", oci.image, oci.digest),
            ]
        }
        ArtifactPin::Local(local) => mcpgate_client::tokenize(&local.command).map_err(|err| {
            CliError::new(mcpgate_core::ErrorKind::Parse, err.to_string())
        })?,
    })
}

fn exit_code_of(status: Option<std::process::ExitStatus>) -> ExitCode {
    match status {
        None => ExitCode::SUCCESS,
        Some(status) => {
            let code = status.code().unwrap_or(1);
            u8::try_from(code).map_or(ExitCode::FAILURE, ExitCode::from)
        }
    }
}
