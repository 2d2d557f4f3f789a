// mcpgate-cli/src/evidence.rs
// ============================================================================
// Module: Evidence Wiring
// Description: Ties the global CLI flags to mcpgate-evidence: one op-id per
//              invocation, a `<command>.start`/`<command>.complete` event
//              pair, and an optional receipt, all built from the redacted
//              argv.
// Purpose: spec.md §4.9, §7 ("argument redaction").
// ============================================================================

use std::time::Instant;

use mcpgate_core::Receipt;
use mcpgate_core::ReceiptResult;
use mcpgate_evidence::Event;
use mcpgate_evidence::EventFormat;
use mcpgate_evidence::EventSink;
use mcpgate_evidence::FileEventLogger;
use mcpgate_evidence::ReceiptMode;
use mcpgate_evidence::ReceiptWriter;
use mcpgate_evidence::StderrEventLogger;
use serde_json::json;

use crate::cli::GlobalArgs;
use crate::error::CliError;

/// Tracks one command invocation from its first tool call through to its
/// event/receipt emission.
pub struct Invocation {
    /// UUIDv4 shared across this invocation's event pair, span, and receipt.
    op_id: String,
    /// Subcommand name, e.g. `"scan"`.
    command: String,
    /// Redacted argument vector persisted on events and the receipt.
    args: Vec<String>,
    /// Whether redaction replaced at least one argument value.
    args_redacted: bool,
    /// Wall-clock start, for `duration_ms`.
    started: Instant,
    /// RFC3339Nano start timestamp, for the receipt.
    ts_start: String,
    /// Where to send `<command>.start`/`.complete` events.
    sink: Box<dyn EventSink>,
    /// Where to persist the receipt, if `--receipt` was given.
    receipt_writer: Option<ReceiptWriter>,
}

impl Invocation {
    /// Starts tracking a new invocation: generates the op-id, redacts
    /// `raw_args`, emits `<command>.start`, and resolves the event sink and
    /// optional receipt writer from `global`.
    ///
    /// # Errors
    ///
    /// Returns [`CliError`] when `--event-log` names a file that cannot be
    /// opened.
    pub fn start(command: &str, raw_args: &[String], global: &GlobalArgs) -> Result<Self, CliError> {
        let op_id = mcpgate_evidence::opid::new();
        let ts_start = mcpgate_evidence::timestamp::now();
        let redaction = mcpgate_evidence::redact_argv(raw_args);

        let format = if global.pretty_events {
            EventFormat::Pretty
        } else {
            EventFormat::Jsonl
        };
        let sink: Box<dyn EventSink> = match &global.event_log {
            Some(path) => Box::new(FileEventLogger::new(path, format)?),
            None => Box::new(StderrEventLogger::new(format)),
        };

        let receipt_writer = global.receipt.as_ref().map(|path| {
            let mode = if global.receipt_append {
                ReceiptMode::Append
            } else {
                ReceiptMode::Overwrite
            };
            ReceiptWriter::new(path, mode)
        });

        let invocation = Self {
            op_id: op_id.clone(),
            command: command.to_string(),
            args: redaction.args,
            args_redacted: redaction.redacted,
            started: Instant::now(),
            ts_start,
            sink,
            receipt_writer,
        };

        invocation.sink.record(
            &Event::new(event_name(command, true), op_id).with_fields(json!({"command": command})),
        );

        Ok(invocation)
    }

    /// The op-id this invocation generated, for embedding in downstream
    /// tracing spans.
    #[must_use]
    pub fn op_id(&self) -> &str {
        &self.op_id
    }

    /// Records `<command>.complete` and, if configured, writes the receipt,
    /// for a successful command. `extra` is merged into the receipt's
    /// optional sections (`lockfile`, `artifact`, `drift`, `policy`).
    ///
    /// # Errors
    ///
    /// Returns [`CliError`] when the receipt cannot be written.
    pub fn finish_ok(self, extra: ReceiptExtras) -> Result<(), CliError> {
        self.finish(ReceiptResult::ok(), extra)
    }

    /// Records `<command>.complete` with `result="fail"` and, if
    /// configured, writes the receipt. Never fails the caller's own error
    /// path: a receipt-write failure here is swallowed as a warning.
    pub fn finish_err(self, error: &CliError, extra: ReceiptExtras) {
        let result = ReceiptResult::fail(&error.to_string());
        if let Err(write_err) = self.finish(result, extra) {
            eprintln_evidence_failure(&write_err);
        }
    }

    /// Shared completion path for both outcomes.
    fn finish(self, result: ReceiptResult, extra: ReceiptExtras) -> Result<(), CliError> {
        let duration_ms = self.started.elapsed().as_millis();
        let status_label = match result.status {
            mcpgate_core::ResultStatus::Ok => "ok",
            mcpgate_core::ResultStatus::Fail => "fail",
        };
        self.sink.record(
            &Event::new(event_name(&self.command, false), self.op_id.clone()).with_fields(json!({
                "command": self.command,
                "duration_ms": duration_ms,
                "result": status_label,
            })),
        );

        if let Some(writer) = &self.receipt_writer {
            let ts_end = mcpgate_evidence::timestamp::now();
            let receipt = Receipt {
                schema_version: Receipt::CURRENT_SCHEMA_VERSION.to_string(),
                op_id: self.op_id.clone(),
                ts_start: self.ts_start.clone(),
                ts_end,
                command: self.command.clone(),
                args: self.args.clone(),
                args_redacted: Some(self.args_redacted),
                result,
                lockfile: extra.lockfile,
                artifact: extra.artifact,
                drift: extra.drift,
                policy: extra.policy,
            };
            writer.write(&receipt)?;
        }
        Ok(())
    }
}

/// Optional receipt sections a command fills in once it has the relevant
/// facts available; fields left `None` are omitted from the receipt.
#[derive(Default)]
pub struct ReceiptExtras {
    /// Lockfile summary, when the command touched one.
    pub lockfile: Option<mcpgate_core::ReceiptLockfileSummary>,
    /// Artifact summary, when the command resolved one.
    pub artifact: Option<mcpgate_core::ReceiptArtifactSummary>,
    /// Drift items, when a drift comparison ran.
    pub drift: Option<Vec<mcpgate_core::DriftItem>>,
    /// Policy report, when a policy evaluation ran.
    pub policy: Option<mcpgate_core::PolicyReport>,
}

/// Builds the `<command>.start`/`.complete` event name. `Event::event` is
/// `&'static str`; since the command name only varies once per process
/// invocation, leaking it is cheaper than widening `Event` to own a
/// `String` for every event it ever logs.
fn event_name(command: &str, start: bool) -> &'static str {
    let suffix = if start { "start" } else { "complete" };
    Box::leak(format!("{command}.{suffix}").into_boxed_str())
}

/// Never-panicking fallback when the receipt itself cannot be written: a
/// logging failure must not change the command's own exit code.
fn eprintln_evidence_failure(err: &CliError) {
    let _ = crate::output::write_stderr_line(&format!("warning: failed to write receipt: {err}"));
}

/// Convenience constructor for a lockfile receipt summary.
#[must_use]
pub fn lockfile_summary(path: &std::path::Path, lockfile: &mcpgate_core::Lockfile) -> mcpgate_core::ReceiptLockfileSummary {
    mcpgate_core::ReceiptLockfileSummary {
        path: path.display().to_string(),
        lock_file_version: lockfile.lock_file_version.clone(),
    }
}

/// Convenience constructor for an artifact receipt summary.
#[must_use]
pub fn artifact_summary(pin: &mcpgate_core::ArtifactPin) -> mcpgate_core::ReceiptArtifactSummary {
    let (artifact_type, identifier) = match pin {
        mcpgate_core::ArtifactPin::Npm(npm) => ("npm", npm.name.clone()),
        mcpgate_core::ArtifactPin::Oci(oci) => ("oci", oci.image.clone()),
        mcpgate_core::ArtifactPin::Local(local) => ("local", local.command.clone()),
    };
    mcpgate_core::ReceiptArtifactSummary {
        artifact_type: artifact_type.to_string(),
        identifier,
    }
}
