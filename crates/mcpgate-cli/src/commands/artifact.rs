// mcpgate-cli/src/commands/artifact.rs
// ============================================================================
// Module: `artifact` Command Group
// Description: Resolves a server's artifact pin and verifies either its
//              downloaded integrity (`verify`) or its provenance
//              attestation (`provenance`).
// ============================================================================

use std::process::ExitCode;
use std::time::Duration;

use mcpgate_artifact::ArtifactError;
use mcpgate_artifact::DownloadOptions;
use mcpgate_core::ArtifactPin;

use crate::cli::ArtifactCommand;
use crate::cli::ArtifactProvenanceArgs;
use crate::cli::ArtifactVerifyArgs;
use crate::cli::GlobalArgs;
use crate::error::CliError;
use crate::error::CliResult;
use crate::evidence::Invocation;
use crate::evidence::ReceiptExtras;
use crate::output::emit_json;
use crate::output::write_stdout_line;

/// Dispatches to `artifact verify` or `artifact provenance`.
///
/// # Errors
///
/// See [`run_verify`] and [`run_provenance`].
pub async fn run(command: ArtifactCommand, global: &GlobalArgs) -> CliResult<ExitCode> {
    match command {
        ArtifactCommand::Verify(args) => run_verify(args, global).await,
        ArtifactCommand::Provenance(args) => run_provenance(args, global).await,
    }
}

async fn run_verify(args: ArtifactVerifyArgs, global: &GlobalArgs) -> CliResult<ExitCode> {
    let invocation = Invocation::start("artifact-verify", &args.argv, global)?;
    match run_verify_inner(&args).await {
        Ok(pin) => {
            write_stdout_line(&format!("artifact verified: {}", describe(&pin)))?;
            invocation.finish_ok(ReceiptExtras {
                artifact: Some(crate::evidence::artifact_summary(&pin)),
                ..ReceiptExtras::default()
            })?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            invocation.finish_err(&err, ReceiptExtras::default());
            Err(err)
        }
    }
}

async fn run_verify_inner(args: &ArtifactVerifyArgs) -> CliResult<ArtifactPin> {
    let client = mcpgate_artifact::build_client(Duration::from_secs(60))
        .map_err(|err| CliError::new(mcpgate_core::ErrorKind::Io, err.to_string()))?;
    let mut pin = mcpgate_artifact::resolve_pin(&client, &args.argv, mcpgate_artifact::npm::DEFAULT_REGISTRY).await?;

    if args.deep {
        let ArtifactPin::Npm(npm) = &mut pin else {
            return Err(CliError::from(ArtifactError::NotPinnable(
                "--deep only applies to npm artifact pins".to_string(),
            )));
        };
        let opts = DownloadOptions {
            allow_private: args.unsafe_allow_private_tarball_hosts,
            ..DownloadOptions::default()
        };
        if opts.allow_private {
            let _ = crate::output::write_stderr_line(
                "warning: --unsafe-allow-private-tarball-hosts lifts SSRF hardening for this download",
            );
        }
        let outcome = mcpgate_artifact::download_with_retries(&client, &npm.tarball_url, &opts).await?;
        let bytes = std::fs::read(outcome.file.path())?;
        mcpgate_artifact::sri::verify(&npm.integrity, &bytes)?;
        npm.tarball_sha256 = Some(outcome.sha256);
        npm.tarball_size = Some(outcome.size);
    }

    Ok(pin)
}

async fn run_provenance(args: ArtifactProvenanceArgs, global: &GlobalArgs) -> CliResult<ExitCode> {
    let invocation = Invocation::start("artifact-provenance", &args.argv, global)?;
    match run_provenance_inner(&args).await {
        Ok((pin, info)) => {
            if args.json {
                emit_json(&info)?;
            } else {
                write_stdout_line(&format!(
                    "provenance {}: method={:?} verified={}",
                    describe(&pin),
                    info.method,
                    info.verified
                ))?;
            }
            invocation.finish_ok(ReceiptExtras {
                artifact: Some(crate::evidence::artifact_summary(&pin)),
                ..ReceiptExtras::default()
            })?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            invocation.finish_err(&err, ReceiptExtras::default());
            Err(err)
        }
    }
}

async fn run_provenance_inner(args: &ArtifactProvenanceArgs) -> CliResult<(ArtifactPin, mcpgate_core::ProvenanceInfo)> {
    let client = mcpgate_artifact::build_client(Duration::from_secs(60))
        .map_err(|err| CliError::new(mcpgate_core::ErrorKind::Io, err.to_string()))?;
    let pin = mcpgate_artifact::resolve_pin(&client, &args.argv, mcpgate_artifact::npm::DEFAULT_REGISTRY).await?;
    let verified_at = mcpgate_evidence::timestamp::now();

    let info = if let Some(bundle) = &args.bundle {
        let issuer = args
            .issuer
            .as_ref()
            .ok_or_else(|| CliError::usage("--issuer is required alongside --bundle"))?;
        let identity = match (&args.identity, &args.identity_regexp) {
            (Some(exact), _) => mcpgate_artifact::provenance::Identity::Exact(exact.clone()),
            (None, Some(pattern)) => mcpgate_artifact::provenance::Identity::Regexp(pattern.clone()),
            (None, None) => {
                return Err(CliError::usage("--identity or --identity-regexp is required alongside --bundle"));
            }
        };
        let artifact_file = artifact_file_for(&pin)?;
        mcpgate_artifact::provenance::verify_cosign_slsa(
            &args.tool,
            bundle,
            issuer,
            &identity,
            artifact_file.path(),
            args.expected_source.as_deref(),
            &verified_at,
        )
        .await?
    } else {
        let ArtifactPin::Npm(_) = &pin else {
            return Err(CliError::usage(
                "no --bundle was given and only npm artifacts fall back to npm_audit_signatures",
            ));
        };
        let cwd = std::env::current_dir()?;
        mcpgate_artifact::provenance::verify_npm_audit_signatures(&cwd, args.expected_source.as_deref(), &verified_at)
            .await?
    };

    Ok((pin, info))
}

/// Writes a placeholder artifact file for `cosign verify-blob-attestation`,
/// which requires a path even though this command verifies provenance
/// rather than a specific downloaded byte stream.
fn artifact_file_for(pin: &ArtifactPin) -> CliResult<tempfile::NamedTempFile> {
    let file = tempfile::NamedTempFile::new()?;
    std::fs::write(file.path(), describe(pin))?;
    Ok(file)
}

fn describe(pin: &ArtifactPin) -> String {
    match pin {
        ArtifactPin::Npm(npm) => format!("{}@{}", npm.name, npm.version),
        ArtifactPin::Oci(oci) => format!("{}@{}", oci.image, oci.digest),
        ArtifactPin::Local(local) => local.command.clone(),
    }
}
