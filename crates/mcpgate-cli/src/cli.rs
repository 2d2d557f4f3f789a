// mcpgate-cli/src/cli.rs
// ============================================================================
// Module: CLI Argument Definitions
// Description: clap derive types for every mcpgate subcommand.
// Purpose: spec.md §6 "External Interfaces: CLI surface".
// ============================================================================

use std::path::PathBuf;

use clap::ArgAction;
use clap::Args;
use clap::Parser;
use clap::Subcommand;

use crate::output::OutputFormat;

/// The `mcpgate` command-line entry point.
#[derive(Parser, Debug)]
#[command(name = "mcpgate", disable_help_subcommand = true)]
pub struct Cli {
    /// Flags shared by every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,
    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Commands,
}

/// Flags accepted by every subcommand, controlling the evidence pipeline.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Path to persist this invocation's receipt.
    #[arg(long, global = true, value_name = "PATH")]
    pub receipt: Option<PathBuf>,
    /// Append to `--receipt` as JSONL instead of overwriting it with a
    /// single JSON object.
    #[arg(long, global = true, action = ArgAction::SetTrue)]
    pub receipt_append: bool,
    /// Path to append structured events to, instead of stderr.
    #[arg(long, global = true, value_name = "PATH")]
    pub event_log: Option<PathBuf>,
    /// Render events as pretty (non-line-oriented) text instead of JSONL.
    #[arg(long, global = true, action = ArgAction::SetTrue)]
    pub pretty_events: bool,
    /// Raise the tracing filter to `debug` for every mcpgate target.
    #[arg(long, global = true, action = ArgAction::SetTrue)]
    pub debug: bool,
    /// OTLP collector endpoint; defaults to `OTEL_EXPORTER_OTLP_ENDPOINT`.
    #[arg(long = "otlp-endpoint", global = true, value_name = "URL")]
    pub otlp_endpoint: Option<String>,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scans a server and emits a JSON scan report.
    Scan(ServerCommand),
    /// Scans a server and writes a lockfile.
    Lock(LockArgs),
    /// Compares a lockfile against a fresh scan and reports pass/fail.
    Check(CheckArgs),
    /// Compares a lockfile against a fresh scan and prints the drift.
    Diff(DiffArgs),
    /// Signs a lockfile, producing a signature envelope.
    Sign(SignArgs),
    /// Verifies a lockfile's signature envelope.
    Verify(VerifyArgs),
    /// Generates an ed25519 keypair.
    Keygen(KeygenArgs),
    /// Artifact resolution and provenance subcommands.
    Artifact {
        /// Which artifact subcommand to run.
        #[command(subcommand)]
        command: ArtifactCommand,
    },
    /// Runs a server under the lockfile's pinned artifact identity.
    Run(RunArgs),
    /// Runs the enforcement proxy in front of a server.
    Proxy(ProxyArgs),
    /// Bundle export/import subcommands.
    Bundle {
        /// Which bundle subcommand to run.
        #[command(subcommand)]
        command: BundleCommand,
    },
}

/// The server launch command, captured after a literal `--`.
#[derive(Args, Debug, Clone)]
pub struct ServerCommand {
    /// Server launch command and arguments, after `--`.
    #[arg(required = true, last = true, allow_hyphen_values = true)]
    pub argv: Vec<String>,
}

/// Arguments for `lock`.
#[derive(Args, Debug)]
pub struct LockArgs {
    /// Write a v3 lockfile (the only version this crate writes; kept for
    /// symmetry with the documented flag).
    #[arg(long, action = ArgAction::SetTrue)]
    pub v3: bool,
    /// Resolve and pin the server's registry artifact identity.
    #[arg(long, action = ArgAction::SetTrue)]
    pub pin: bool,
    /// Verify the pinned artifact's provenance attestation before writing.
    #[arg(long, action = ArgAction::SetTrue)]
    pub verify_provenance: bool,
    /// Require the provenance attestation's source to match this regex.
    #[arg(long, value_name = "REGEX")]
    pub expected_source: Option<String>,
    /// Overwrite an existing lockfile at `--output` without prompting.
    #[arg(long, action = ArgAction::SetTrue)]
    pub force: bool,
    /// Lockfile output path.
    #[arg(long = "output", short = 'o', value_name = "PATH", default_value = "mcpgate.lock.json")]
    pub output: PathBuf,
    /// Server launch command and arguments, after `--`.
    #[arg(required = true, last = true, allow_hyphen_values = true)]
    pub argv: Vec<String>,
}

/// Drift fail threshold, shared by `check` and `proxy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum FailOnArg {
    /// Fail on any drift, including safe.
    Info,
    /// Fail on moderate or critical drift.
    Moderate,
    /// Fail only on critical drift.
    Critical,
}

impl From<FailOnArg> for mcpgate_core::FailOn {
    fn from(value: FailOnArg) -> Self {
        match value {
            FailOnArg::Info => Self::Info,
            FailOnArg::Moderate => Self::Moderate,
            FailOnArg::Critical => Self::Critical,
        }
    }
}

/// Arguments for `check`.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Lockfile to compare against.
    #[arg(long = "lock", value_name = "PATH")]
    pub lockfile: PathBuf,
    /// Drift severity threshold that fails the check.
    #[arg(long, value_enum, default_value_t = FailOnArg::Critical)]
    pub fail_on: FailOnArg,
    /// Output rendering.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
    /// Policy preset name or custom policy file to evaluate alongside drift.
    #[arg(long, value_name = "PRESET_OR_PATH")]
    pub policy: Option<String>,
    /// Server launch command and arguments, after `--`.
    #[arg(required = true, last = true, allow_hyphen_values = true)]
    pub argv: Vec<String>,
}

/// Arguments for `diff`.
#[derive(Args, Debug)]
pub struct DiffArgs {
    /// Lockfile to compare against.
    #[arg(long, value_name = "PATH", default_value = "mcpgate.lock.json")]
    pub lockfile: PathBuf,
    /// Server launch command and arguments, after `--`.
    #[arg(required = true, last = true, allow_hyphen_values = true)]
    pub argv: Vec<String>,
}

/// Canonical JSON version used for signing/verification, shared by `sign`
/// and the envelope's own header tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum CanonVersionArg {
    /// Byte-order key sorting.
    V1,
    /// UTF-16-order key sorting.
    V2,
}

/// Arguments for `sign`.
#[derive(Args, Debug)]
pub struct SignArgs {
    /// Lockfile to sign.
    #[arg(long, value_name = "PATH")]
    pub lockfile: PathBuf,
    /// Ed25519 private key, PEM-armored.
    #[arg(long, value_name = "PATH", conflicts_with = "sigstore")]
    pub key: Option<PathBuf>,
    /// Sign via the external keyless (sigstore) tool instead of `--key`.
    #[arg(long, action = ArgAction::SetTrue)]
    pub sigstore: bool,
    /// Canonicalization version to sign over.
    #[arg(long, value_enum, default_value_t = CanonVersionArg::V2)]
    pub canonicalization: CanonVersionArg,
    /// Signature output path; defaults to `<lockfile>.sig`.
    #[arg(long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

/// Arguments for `verify`.
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Lockfile the signature was produced over.
    #[arg(long, value_name = "PATH")]
    pub lockfile: PathBuf,
    /// Signature file; defaults to `<lockfile>.sig`.
    #[arg(long, value_name = "PATH")]
    pub signature: Option<PathBuf>,
    /// Ed25519 public key, PEM-armored; required for an ed25519 envelope.
    #[arg(long, value_name = "PATH")]
    pub key: Option<PathBuf>,
    /// Expected OIDC issuer for a sigstore-bundle envelope.
    #[arg(long, value_name = "URL", requires = "identity_group")]
    pub issuer: Option<String>,
    /// Exact expected signer identity (SAN) for a sigstore-bundle envelope.
    #[arg(long, value_name = "SAN", group = "identity_group")]
    pub identity: Option<String>,
    /// Regex over the expected signer identity for a sigstore-bundle envelope.
    #[arg(long, value_name = "REGEX", group = "identity_group")]
    pub identity_regexp: Option<String>,
    /// Treat `GITHUB_ACTIONS`/`CI` as present for interactive-detection
    /// purposes when shelling out to the keyless verifier.
    #[arg(long, action = ArgAction::SetTrue)]
    pub github_actions: bool,
}

/// Arguments for `keygen`.
#[derive(Args, Debug)]
pub struct KeygenArgs {
    /// Private key output path.
    #[arg(long, value_name = "PATH")]
    pub private: PathBuf,
    /// Public key output path.
    #[arg(long, value_name = "PATH")]
    pub public: PathBuf,
}

/// `artifact` subcommands.
#[derive(Subcommand, Debug)]
pub enum ArtifactCommand {
    /// Resolves the server's artifact pin and verifies its integrity.
    Verify(ArtifactVerifyArgs),
    /// Resolves the server's artifact pin and verifies its provenance.
    Provenance(ArtifactProvenanceArgs),
}

/// Arguments for `artifact verify`.
#[derive(Args, Debug)]
pub struct ArtifactVerifyArgs {
    /// Download the tarball and recompute its digest, rather than trusting
    /// the registry-advertised integrity alone.
    #[arg(long, action = ArgAction::SetTrue)]
    pub deep: bool,
    /// Lift the private/loopback/link-local address restriction on
    /// `--deep` downloads (still emits a warning banner).
    #[arg(long, action = ArgAction::SetTrue)]
    pub unsafe_allow_private_tarball_hosts: bool,
    /// Server launch command and arguments, after `--`.
    #[arg(required = true, last = true, allow_hyphen_values = true)]
    pub argv: Vec<String>,
}

/// Arguments for `artifact provenance`.
#[derive(Args, Debug)]
pub struct ArtifactProvenanceArgs {
    /// Require the attestation's source to match this regex.
    #[arg(long, value_name = "REGEX")]
    pub expected_source: Option<String>,
    /// Emit the provenance report as JSON instead of a text banner.
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,
    /// SLSA attestation bundle to verify with the keyless tool. When
    /// omitted, falls back to `npm audit signatures` for npm artifacts.
    #[arg(long, value_name = "PATH", requires = "issuer")]
    pub bundle: Option<PathBuf>,
    /// Expected OIDC issuer, required alongside `--bundle`.
    #[arg(long, value_name = "URL")]
    pub issuer: Option<String>,
    /// Exact expected signer identity (SAN) for `--bundle` verification.
    #[arg(long, value_name = "SAN", group = "provenance_identity")]
    pub identity: Option<String>,
    /// Regex over the expected signer identity for `--bundle` verification.
    #[arg(long, value_name = "REGEX", group = "provenance_identity")]
    pub identity_regexp: Option<String>,
    /// Keyless-verify tool binary name.
    #[arg(long, value_name = "NAME", default_value = "cosign")]
    pub tool: String,
    /// Server launch command and arguments, after `--`.
    #[arg(required = true, last = true, allow_hyphen_values = true)]
    pub argv: Vec<String>,
}

/// Arguments for `run`.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Lockfile pinning the expected artifact identity.
    #[arg(long = "lock", value_name = "PATH")]
    pub lockfile: PathBuf,
    /// Resolve and print the launch plan without executing it.
    #[arg(long, action = ArgAction::SetTrue)]
    pub dry_run: bool,
    /// Fail unless the resolved artifact carries verified provenance.
    #[arg(long, action = ArgAction::SetTrue)]
    pub require_provenance: bool,
    /// Select a specific binary within the resolved package, when it
    /// exposes more than one.
    #[arg(long, value_name = "NAME")]
    pub bin: Option<String>,
    /// Override the lockfile-derived launch command, after `--`.
    #[arg(last = true, allow_hyphen_values = true)]
    pub command_override: Vec<String>,
}

/// Arguments for `proxy`.
#[derive(Args, Debug)]
pub struct ProxyArgs {
    /// v3 lockfile the allowlist is compiled from.
    #[arg(long = "lock", value_name = "PATH")]
    pub lockfile: PathBuf,
    /// Never block calls or filter lists; log what would happen instead.
    #[arg(long, action = ArgAction::SetTrue)]
    pub audit_only: bool,
    /// Filter lists but forward calls that would otherwise be blocked.
    #[arg(long, action = ArgAction::SetTrue)]
    pub filter_only: bool,
    /// Drift severity threshold that aborts preflight.
    #[arg(long, value_enum, default_value_t = FailOnArg::Critical)]
    pub fail_on: FailOnArg,
    /// Permit static resources from `resources/list` through the allowlist.
    #[arg(long, action = ArgAction::SetTrue)]
    pub allow_static_resources: bool,
    /// Print the compiled allowlist and exit without spawning the server.
    #[arg(long, action = ArgAction::SetTrue)]
    pub print_effective_allowlist: bool,
    /// Server launch command and arguments, after `--`.
    #[arg(required = true, last = true, allow_hyphen_values = true)]
    pub argv: Vec<String>,
}

/// `bundle` subcommands.
#[derive(Subcommand, Debug)]
pub enum BundleCommand {
    /// Packages a lockfile, its signature, and its receipt into a zip.
    Export(BundleExportArgs),
}

/// Arguments for `bundle export`.
#[derive(Args, Debug)]
pub struct BundleExportArgs {
    /// Lockfile to include.
    #[arg(long, value_name = "PATH")]
    pub lockfile: PathBuf,
    /// Signature file to include, if present.
    #[arg(long, value_name = "PATH")]
    pub signature: Option<PathBuf>,
    /// Receipt file to include, if present.
    #[arg(long, value_name = "PATH")]
    pub receipt: Option<PathBuf>,
    /// Zip archive output path.
    #[arg(long = "output", short = 'o', value_name = "PATH")]
    pub output: PathBuf,
}
