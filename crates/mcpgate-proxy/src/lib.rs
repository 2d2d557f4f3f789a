// mcpgate-proxy/src/lib.rs
// ============================================================================
// Module: mcpgate-proxy
// Description: Stdio enforcement proxy: sits between a host and an MCP
//              server child, enforcing a v3 lockfile allowlist.
// Purpose: spec.md §4.4.
// ============================================================================

//! ## Overview
//! [`run`] loads a lockfile, compiles it into an [`allowlist::Allowlist`],
//! runs a [`preflight::run`] scan through a short-lived side channel, then
//! spawns the real child and bridges host stdin/stdout to it through
//! [`bridge::host_to_server`] and [`bridge::server_to_host`] until either
//! side closes.

pub mod allowlist;
pub mod bridge;
pub mod correlation;
pub mod error;
pub mod preflight;

use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use mcpgate_core::FailOn;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

pub use allowlist::Allowlist;
pub use bridge::Mode;
pub use correlation::CorrelationTable;
pub use error::ProxyError;
pub use preflight::PreflightReport;

/// Grace period given to the child between SIGTERM and SIGKILL.
const TERMINATE_GRACE: Duration = Duration::from_secs(2);

/// Options controlling one proxy session, mirroring the `proxy` CLI flags.
pub struct ProxyOptions {
    /// Never block calls or filter lists; only log what would happen.
    pub audit_only: bool,
    /// Filter lists but forward calls that would otherwise be blocked.
    pub filter_only: bool,
    /// Drift severity threshold that aborts preflight.
    pub fail_on: FailOn,
    /// Whether static resources are permitted through the allowlist.
    pub allow_static_resources: bool,
}

impl ProxyOptions {
    /// Resolves the effective bridging mode from `audit_only`/`filter_only`,
    /// with `audit_only` taking precedence when both are set.
    #[must_use]
    const fn mode(&self) -> Mode {
        if self.audit_only {
            Mode::AuditOnly
        } else if self.filter_only {
            Mode::FilterOnly
        } else {
            Mode::Enforce
        }
    }
}

/// Loads `lockfile_path`, preflights `argv`, and bridges host stdio to the
/// spawned server until either side closes or a shutdown signal arrives.
///
/// # Errors
///
/// Returns [`ProxyError`] when the lockfile cannot be loaded or compiled,
/// preflight fails or detects disqualifying drift, the child cannot be
/// spawned, or a bridging task hits an I/O error.
pub async fn run(lockfile_path: &Path, argv: &[String], opts: &ProxyOptions) -> Result<(), ProxyError> {
    let lockfile = mcpgate_lockfile::io::read(lockfile_path)?;
    let allowlist = Arc::new(Allowlist::compile(&lockfile, opts.allow_static_resources)?);

    let preflight = preflight::run(&lockfile, argv, opts.fail_on, opts.audit_only).await?;
    if preflight.should_abort {
        return Err(ProxyError::PreflightDrift);
    }

    let Some((program, args)) = argv.split_first() else {
        return Err(ProxyError::Spawn("empty argv".to_string()));
    };
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .kill_on_drop(true)
        .spawn()
        .map_err(|err| ProxyError::Spawn(err.to_string()))?;

    let child_stdin = child
        .stdin
        .take()
        .ok_or_else(|| ProxyError::Spawn("missing child stdin".to_string()))?;
    let child_stdout = child
        .stdout
        .take()
        .ok_or_else(|| ProxyError::Spawn("missing child stdout".to_string()))?;

    let correlation = Arc::new(CorrelationTable::new());
    let mode = opts.mode();

    let host_to_server = {
        let allowlist = Arc::clone(&allowlist);
        let correlation = Arc::clone(&correlation);
        tokio::spawn(async move {
            bridge::host_to_server(
                tokio::io::stdin(),
                child_stdin,
                tokio::io::stdout(),
                &allowlist,
                &correlation,
                mode,
            )
            .await
        })
    };

    let server_to_host = {
        let allowlist = Arc::clone(&allowlist);
        let correlation = Arc::clone(&correlation);
        tokio::spawn(async move {
            bridge::server_to_host(
                child_stdout,
                tokio::io::stdout(),
                &allowlist,
                &correlation,
                mode,
            )
            .await
        })
    };

    tokio::select! {
        result = host_to_server => {
            log_bridge_result("host->server", result);
        }
        result = server_to_host => {
            log_bridge_result("server->host", result);
        }
        _ = wait_for_shutdown_signal() => {
            tracing::info!("shutdown signal received");
        }
    }

    terminate(&mut child).await;
    Ok(())
}

/// Logs a bridging task's outcome; either side closing is the normal end of
/// a session, not an error to propagate.
fn log_bridge_result(
    direction: &str,
    result: Result<std::io::Result<()>, tokio::task::JoinError>,
) {
    match result {
        Ok(Ok(())) => tracing::info!(direction, "bridge closed"),
        Ok(Err(err)) => tracing::warn!(direction, error = %err, "bridge ended with an I/O error"),
        Err(err) => tracing::warn!(direction, error = %err, "bridge task panicked"),
    }
}

/// Resolves once a termination signal is received; falls back to `ctrl_c`
/// alone on platforms without `SIGTERM`.
async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        let mut sigterm = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(sigterm) => sigterm,
            Err(_) => {
                let _ = tokio::signal::ctrl_c().await;
                return;
            }
        };
        tokio::select! {
            _ = sigterm.recv() => {}
            _ = tokio::signal::ctrl_c() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

/// Closes the child's stdin, sends SIGTERM, then escalates to SIGKILL after
/// [`TERMINATE_GRACE`] if it has not exited.
async fn terminate(child: &mut tokio::process::Child) {
    if let Some(stdin) = child.stdin.as_mut() {
        let _ = stdin.shutdown().await;
    }
    send_sigterm(child);
    if tokio::time::timeout(TERMINATE_GRACE, child.wait()).await.is_ok() {
        return;
    }
    tracing::warn!("child did not exit within the termination grace period; killing");
    let _ = child.kill().await;
    let _ = child.wait().await;
}

/// Sends `SIGTERM` to the child on unix; no-op elsewhere, relying on the
/// `SIGKILL` escalation in [`terminate`].
#[cfg(unix)]
fn send_sigterm(child: &tokio::process::Child) {
    let Some(pid) = child.id() else {
        return;
    };
    let Ok(pid) = i32::try_from(pid) else {
        return;
    };
    let _ = nix::sys::signal::kill(nix::unistd::Pid::from_raw(pid), nix::sys::signal::Signal::SIGTERM);
}

/// Sends `SIGTERM` to the child on unix; no-op elsewhere, relying on the
/// `SIGKILL` escalation in [`terminate`].
#[cfg(not(unix))]
fn send_sigterm(_child: &tokio::process::Child) {}
