// mcpgate-artifact/src/download.rs
// ============================================================================
// Module: Tarball Downloader
// Description: SSRF-hardened, size-capped, streaming-hashed tarball fetch.
// Purpose: spec.md §4.5's downloader and §7's retry policy.
// Dependencies: reqwest, tokio (time, io-util), tempfile, sha2
// ============================================================================

//! ## Overview
//! Every redirect hop is re-validated against the same scheme and DNS
//! checks as the original URL (spec.md §8 invariant 6: "redirects are
//! re-checked"). The response body is streamed straight into a tempfile
//! while a SHA-256 hasher runs over the same bytes, so the cap is enforced
//! before the whole body is ever materialized in memory.

use std::io::Write;
use std::time::Duration;

use sha2::Digest;
use sha2::Sha256;
use url::Url;

use crate::error::ArtifactError;
use crate::ssrf;

/// Maximum redirect hops followed (spec.md §4.5).
pub const MAX_REDIRECTS: u32 = 5;
/// Maximum tarball size accepted (spec.md §4.5).
pub const MAX_BYTES: u64 = 512 * 1024 * 1024;
/// Default per-attempt timeout (spec.md §5).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
/// Retry attempts for transient network errors (spec.md §7).
const RETRY_ATTEMPTS: u32 = 3;
/// Backoff schedule for retries: 0.5s, 1s, 2s (spec.md §7).
const RETRY_BACKOFF: [Duration; 3] = [Duration::from_millis(500), Duration::from_secs(1), Duration::from_secs(2)];

/// Download options controlling SSRF hardening and resource caps.
#[derive(Debug, Clone)]
pub struct DownloadOptions {
    /// When `true`, lifts the private/loopback/link-local/CGNAT address
    /// restriction (operator opt-in; a warning is still emitted).
    pub allow_private: bool,
    /// Maximum redirect hops followed before failing.
    pub max_redirects: u32,
    /// Maximum total bytes accepted across the response body.
    pub max_bytes: u64,
    /// Per-attempt timeout.
    pub timeout: Duration,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            allow_private: false,
            max_redirects: MAX_REDIRECTS,
            max_bytes: MAX_BYTES,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Result of a completed download: the tempfile (removed on drop), its
/// SHA-256 digest, and its size in bytes.
pub struct DownloadOutcome {
    /// Tempfile holding the downloaded bytes; deleted when dropped.
    pub file: tempfile::NamedTempFile,
    /// SHA-256 digest of the downloaded bytes, as `sha256:<hex>`.
    pub sha256: String,
    /// Size of the downloaded bytes.
    pub size: u64,
}

/// Downloads `url` with up to [`RETRY_ATTEMPTS`] retries on transient
/// network errors, per spec.md §7 ("never retries on an integrity
/// mismatch").
///
/// # Errors
///
/// Returns whatever [`download_once`] returns, after exhausting retries
/// for transient failures.
pub async fn download_with_retries(
    client: &reqwest::Client,
    url: &str,
    opts: &DownloadOptions,
) -> Result<DownloadOutcome, ArtifactError> {
    let mut last_err = None;
    for attempt in 0..=RETRY_ATTEMPTS {
        match download_once(client, url, opts).await {
            Ok(outcome) => return Ok(outcome),
            Err(err) if is_transient(&err) && attempt < RETRY_ATTEMPTS => {
                tokio::time::sleep(RETRY_BACKOFF[attempt as usize]).await;
                last_err = Some(err);
            }
            Err(err) => return Err(err),
        }
    }
    // Unreachable in practice: the loop above always returns inside itself
    // on the final attempt, but a value is required to satisfy the type.
    Err(last_err.unwrap_or(ArtifactError::Timeout))
}

/// Returns `true` for errors worth retrying: transport-level failures, not
/// integrity mismatches or SSRF denials.
fn is_transient(err: &ArtifactError) -> bool {
    matches!(err, ArtifactError::RegistryUnreachable(_) | ArtifactError::Timeout)
}

/// Performs one download attempt, following and re-validating redirects.
///
/// # Errors
///
/// Returns [`ArtifactError::NetworkDenied`] when a scheme/DNS check fails
/// for the original URL or any redirect target, [`ArtifactError::SizeExceeded`]
/// when the cap is exceeded, or [`ArtifactError::RegistryUnreachable`] on a
/// transport failure.
pub async fn download_once(
    client: &reqwest::Client,
    url: &str,
    opts: &DownloadOptions,
) -> Result<DownloadOutcome, ArtifactError> {
    let mut current = Url::parse(url).map_err(|err| ArtifactError::MalformedReference(err.to_string()))?;
    validate_target(&current, opts.allow_private).await?;

    for _ in 0..=opts.max_redirects {
        let response = tokio::time::timeout(opts.timeout, client.get(current.clone()).send())
            .await
            .map_err(|_| ArtifactError::Timeout)?
            .map_err(|err| ArtifactError::RegistryUnreachable(err.to_string()))?;

        if response.status().is_redirection() {
            let location = response
                .headers()
                .get("location")
                .and_then(|v| v.to_str().ok())
                .ok_or_else(|| ArtifactError::RegistryUnreachable("redirect with no location header".to_string()))?;
            let next = current
                .join(location)
                .map_err(|err| ArtifactError::RegistryUnreachable(err.to_string()))?;
            validate_target(&next, opts.allow_private).await?;
            current = next;
            continue;
        }

        if !response.status().is_success() {
            return Err(ArtifactError::RegistryUnreachable(format!(
                "tarball request returned {}",
                response.status()
            )));
        }

        return stream_to_tempfile(response, opts.max_bytes).await;
    }

    Err(ArtifactError::RegistryUnreachable(format!(
        "exceeded redirect limit of {}",
        opts.max_redirects
    )))
}

/// Validates scheme and DNS resolution for one URL (original or a
/// redirect target).
async fn validate_target(url: &Url, allow_private: bool) -> Result<(), ArtifactError> {
    ssrf::validate_scheme(url)?;
    let host = url
        .host_str()
        .ok_or_else(|| ArtifactError::MalformedReference("url has no host".to_string()))?;
    let port = url.port_or_known_default().unwrap_or(443);
    ssrf::check_resolved_addresses(host, port, allow_private).await
}

/// Streams the response body into a tempfile while hashing it, enforcing
/// `max_bytes` before the full body is ever buffered in memory.
async fn stream_to_tempfile(mut response: reqwest::Response, max_bytes: u64) -> Result<DownloadOutcome, ArtifactError> {
    let mut file = tempfile::NamedTempFile::new()?;
    let mut hasher = Sha256::new();
    let mut total: u64 = 0;

    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|err| ArtifactError::RegistryUnreachable(err.to_string()))?
    {
        total += chunk.len() as u64;
        if total > max_bytes {
            return Err(ArtifactError::SizeExceeded { cap: max_bytes });
        }
        hasher.update(&chunk);
        file.write_all(&chunk)?;
    }
    file.flush()?;

    let digest = hasher.finalize();
    Ok(DownloadOutcome {
        file,
        sha256: format!("sha256:{}", hex::encode(digest)),
        size: total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_match_spec_caps() {
        let opts = DownloadOptions::default();
        assert_eq!(opts.max_redirects, 5);
        assert_eq!(opts.max_bytes, 512 * 1024 * 1024);
        assert!(!opts.allow_private);
    }

    #[test]
    fn integrity_mismatch_is_not_transient() {
        let err = ArtifactError::IntegrityMismatch {
            expected: "sha256-aaa".to_string(),
            computed: "sha256-bbb".to_string(),
        };
        assert!(!is_transient(&err));
    }

    #[test]
    fn registry_unreachable_is_transient() {
        assert!(is_transient(&ArtifactError::RegistryUnreachable("boom".to_string())));
    }
}
