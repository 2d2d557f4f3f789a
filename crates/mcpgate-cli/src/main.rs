// mcpgate-cli/src/main.rs
// ============================================================================
// Module: CLI Entry Point
// Description: Parses arguments, installs tracing, and dispatches to the
//              12 subcommands, mapping the result to an exit code.
// Purpose: spec.md §6 "External Interfaces".
// ============================================================================

mod cli;
mod commands;
mod error;
mod evidence;
mod output;

use std::process::ExitCode;

use clap::Parser;
use mcpgate_evidence::tracing_init;

use crate::cli::Cli;
use crate::cli::Commands;
use crate::error::CliError;
use crate::error::CliResult;
use crate::output::write_stderr_line;

/// CLI entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => emit_error(&err),
    }
}

/// Parses arguments, installs tracing, and dispatches to the selected
/// subcommand.
async fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    let filter = if cli.global.debug { "mcpgate=debug".to_string() } else { "mcpgate=info".to_string() };
    let otlp_endpoint = cli
        .global
        .otlp_endpoint
        .clone()
        .or_else(|| std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT").ok());
    let tracing_guard = tracing_init::init(&tracing_init::TracingConfig { filter, otlp_endpoint })?;

    let result = match cli.command {
        Commands::Scan(args) => commands::scan::run(args, &cli.global).await,
        Commands::Lock(args) => commands::lock::run(args, &cli.global).await,
        Commands::Check(args) => commands::check::run(args, &cli.global).await,
        Commands::Diff(args) => commands::diff::run(args, &cli.global).await,
        Commands::Sign(args) => commands::sign::run(args, &cli.global).await,
        Commands::Verify(args) => commands::verify::run(args, &cli.global).await,
        Commands::Keygen(args) => commands::keygen::run(args, &cli.global).await,
        Commands::Artifact { command } => commands::artifact::run(command, &cli.global).await,
        Commands::Run(args) => commands::run_cmd::run(args, &cli.global).await,
        Commands::Proxy(args) => commands::proxy::run(args, &cli.global).await,
        Commands::Bundle { command } => commands::bundle::run(command, &cli.global).await,
    };

    tracing_guard.shutdown();
    result
}

/// Prints the failure banner a non-JSON command owes the user and maps the
/// error's kind to an exit code.
fn emit_error(err: &CliError) -> ExitCode {
    let _ = write_stderr_line(&format!("error: {err}"));
    match err.kind.exit_code() {
        2 => ExitCode::from(2),
        _ => ExitCode::FAILURE,
    }
}
