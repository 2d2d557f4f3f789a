// mcpgate-cli/src/commands/proxy.rs
// ============================================================================
// Module: `proxy` Command
// Description: Compiles a v3 lockfile into an allowlist and bridges host
//              stdio to the server through the enforcement proxy, or just
//              prints the compiled allowlist and exits.
// ============================================================================

use std::process::ExitCode;

use mcpgate_proxy::Allowlist;
use mcpgate_proxy::ProxyOptions;
use serde_json::json;

use crate::cli::GlobalArgs;
use crate::cli::ProxyArgs;
use crate::error::CliResult;
use crate::evidence::Invocation;
use crate::evidence::ReceiptExtras;
use crate::output::emit_json;

/// Runs `proxy`.
///
/// # Errors
///
/// Returns [`crate::error::CliError`] when the lockfile cannot be read or
/// compiled, preflight aborts, or bridging the child process fails.
pub async fn run(args: ProxyArgs, global: &GlobalArgs) -> CliResult<ExitCode> {
    let invocation = Invocation::start("proxy", &args.argv, global)?;

    if args.print_effective_allowlist {
        return match print_allowlist(&args) {
            Ok(()) => {
                invocation.finish_ok(ReceiptExtras::default())?;
                Ok(ExitCode::SUCCESS)
            }
            Err(err) => {
                invocation.finish_err(&err, ReceiptExtras::default());
                Err(err)
            }
        };
    }

    let opts = ProxyOptions {
        audit_only: args.audit_only,
        filter_only: args.filter_only,
        fail_on: args.fail_on.into(),
        allow_static_resources: args.allow_static_resources,
    };

    match mcpgate_proxy::run(&args.lockfile, &args.argv, &opts).await {
        Ok(()) => {
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

fn print_allowlist(args: &ProxyArgs) -> CliResult<()> {
    let lockfile = mcpgate_lockfile::io::read(&args.lockfile)?;
    let allowlist = Allowlist::compile(&lockfile, args.allow_static_resources)?;
    emit_json(&json!({
        "tools": allowlist.tool_names(),
        "prompts": allowlist.prompt_names(),
        "static_resources": allowlist.static_resource_uris(),
    }))
}
