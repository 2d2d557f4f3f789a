// mcpgate-artifact/src/lib.rs
// ============================================================================
// Module: MCP Gate Artifact Library
// Description: Classifies server launch commands, resolves npm/OCI
//              registry coordinates, downloads tarballs under SSRF
//              hardening, and verifies provenance attestations.
// Dependencies: crate::{classify, download, error, npm, oci, provenance, sri, ssrf}
// ============================================================================

//! ## Overview
//! [`classify::classify`] turns a tokenized launch command into an
//! [`classify::LaunchClassification`]; [`npm::resolve`] and [`oci::resolve`]
//! turn that into a pinned [`mcpgate_core::ArtifactPin`]. [`download`]
//! fetches tarball bytes under the SSRF hardening spec.md §4.5 requires,
//! and [`provenance`] bridges to the external keyless-verify tool.

pub mod classify;
pub mod download;
pub mod error;
pub mod npm;
pub mod oci;
pub mod provenance;
pub mod sri;
pub mod ssrf;

pub use classify::LaunchClassification;
pub use classify::classify;
pub use download::DownloadOptions;
pub use download::DownloadOutcome;
pub use download::download_once;
pub use download::download_with_retries;
pub use error::ArtifactError;
pub use npm::PackageSpec;
pub use npm::parse_package_spec;
pub use oci::OciReference;
pub use oci::parse_reference;
pub use provenance::Identity as ProvenanceIdentity;
pub use provenance::verify_cosign_slsa;
pub use provenance::verify_npm_audit_signatures;

use std::time::Duration;

use mcpgate_core::ArtifactPin;
use mcpgate_core::LocalPin;

/// Builds a `reqwest::Client` with redirects disabled (the downloader
/// re-validates and follows redirects itself) and a default timeout.
///
/// # Errors
///
/// Returns a `reqwest::Error` when the underlying TLS backend cannot be
/// initialized.
pub fn build_client(timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .timeout(timeout)
        .build()
}

/// Classifies `argv` and resolves it against the appropriate registry,
/// producing an [`ArtifactPin`]. A [`LaunchClassification::Local`] command
/// resolves to [`ArtifactPin::Local`] without any network access.
///
/// # Errors
///
/// Returns whatever [`npm::resolve`] or [`oci::resolve`] return for the
/// classified type.
pub async fn resolve_pin(
    client: &reqwest::Client,
    argv: &[String],
    npm_registry: &str,
) -> Result<ArtifactPin, ArtifactError> {
    match classify::classify(argv) {
        LaunchClassification::Npm(spec) => {
            let parsed = npm::parse_package_spec(&spec)?;
            let pin = npm::resolve(client, npm_registry, &parsed).await?;
            Ok(ArtifactPin::Npm(pin))
        }
        LaunchClassification::Oci(reference) => {
            let pin = oci::resolve(client, &reference).await?;
            Ok(ArtifactPin::Oci(pin))
        }
        LaunchClassification::Local => Ok(ArtifactPin::Local(LocalPin {
            command: argv.join(" "),
        })),
    }
}
