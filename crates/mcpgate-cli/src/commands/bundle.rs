// mcpgate-cli/src/commands/bundle.rs
// ============================================================================
// Module: `bundle` Command Group
// Description: Packages a lockfile with its signature and receipt into a
//              single zip archive for distribution.
// ============================================================================

use std::io::Write;
use std::process::ExitCode;

use zip::write::FileOptions;

use crate::cli::BundleCommand;
use crate::cli::BundleExportArgs;
use crate::cli::GlobalArgs;
use crate::error::CliError;
use crate::error::CliResult;
use crate::evidence::Invocation;
use crate::evidence::ReceiptExtras;
use crate::output::write_stdout_line;

/// Dispatches to `bundle export`.
///
/// # Errors
///
/// See [`run_export`].
pub async fn run(command: BundleCommand, global: &GlobalArgs) -> CliResult<ExitCode> {
    match command {
        BundleCommand::Export(args) => run_export(args, global).await,
    }
}

async fn run_export(args: BundleExportArgs, global: &GlobalArgs) -> CliResult<ExitCode> {
    let raw_args = vec![args.lockfile.display().to_string()];
    let invocation = Invocation::start("bundle-export", &raw_args, global)?;
    match export(&args) {
        Ok(()) => {
            write_stdout_line(&format!("wrote bundle: {}", args.output.display()))?;
            invocation.finish_ok(ReceiptExtras::default())?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            invocation.finish_err(&err, ReceiptExtras::default());
            Err(err)
        }
    }
}

fn export(args: &BundleExportArgs) -> CliResult<()> {
    let file = std::fs::File::create(&args.output)?;
    let mut zip = zip::ZipWriter::new(file);
    let options = FileOptions::<()>::default();

    add_file(&mut zip, &options, &args.lockfile, "lockfile.json")?;
    if let Some(path) = &args.signature {
        add_file(&mut zip, &options, path, "signature.sig")?;
    }
    if let Some(path) = &args.receipt {
        add_file(&mut zip, &options, path, "receipt.json")?;
    }

    zip.finish().map_err(|err| CliError::new(mcpgate_core::ErrorKind::Io, err.to_string()))?;
    Ok(())
}

fn add_file(
    zip: &mut zip::ZipWriter<std::fs::File>,
    options: &FileOptions<()>,
    path: &std::path::Path,
    archive_name: &str,
) -> CliResult<()> {
    let bytes = std::fs::read(path)?;
    zip.start_file(archive_name, *options)
        .map_err(|err| CliError::new(mcpgate_core::ErrorKind::Io, err.to_string()))?;
    zip.write_all(&bytes)?;
    Ok(())
}
