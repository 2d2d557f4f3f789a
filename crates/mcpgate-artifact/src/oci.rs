// mcpgate-artifact/src/oci.rs
// ============================================================================
// Module: OCI Resolver
// Description: Parses `host/repo:tag@sha256:<hex>` references and resolves
//              a missing digest against the registry's manifest endpoint.
// Purpose: spec.md §4.5 "For oci".
// Dependencies: reqwest, mcpgate-core
// ============================================================================

use mcpgate_core::OciPin;

use crate::error::ArtifactError;

/// A parsed OCI image reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OciReference {
    /// `host/repo`, without tag or digest.
    pub image: String,
    /// Tag, if present (defaults to `latest` when neither tag nor digest is
    /// supplied).
    pub tag: String,
    /// Content digest, if the reference was fully qualified.
    pub digest: Option<String>,
}

/// Parses a reference of the form `host/repo:tag@sha256:<hex>` or
/// `host/repo:tag` (tag defaults to `latest` when omitted).
///
/// # Errors
///
/// Returns [`ArtifactError::MalformedReference`] when the reference is
/// empty or the digest segment is present but malformed.
pub fn parse_reference(reference: &str) -> Result<OciReference, ArtifactError> {
    if reference.is_empty() {
        return Err(ArtifactError::MalformedReference("empty oci reference".to_string()));
    }

    let (without_digest, digest) = match reference.split_once('@') {
        Some((head, digest)) => {
            if !digest.starts_with("sha256:") || digest.len() != "sha256:".len() + 64 {
                return Err(ArtifactError::MalformedReference(format!(
                    "malformed digest in oci reference {reference:?}"
                )));
            }
            (head, Some(digest.to_string()))
        }
        None => (reference, None),
    };

    let last_slash = without_digest.rfind('/').unwrap_or(0);
    let (image, tag) = match without_digest[last_slash..].find(':') {
        Some(rel_colon) => {
            let colon = last_slash + rel_colon;
            (without_digest[..colon].to_string(), without_digest[colon + 1..].to_string())
        }
        None => (without_digest.to_string(), "latest".to_string()),
    };

    if image.is_empty() {
        return Err(ArtifactError::MalformedReference(format!(
            "malformed oci reference {reference:?}"
        )));
    }

    Ok(OciReference { image, tag, digest })
}

/// Resolves `reference` to a fully-pinned [`OciPin`].
///
/// When the reference already carries a digest, no network call is made.
/// Otherwise the registry's `v2` manifest endpoint is queried and the
/// `Docker-Content-Digest` response header is used to pin the digest.
///
/// # Errors
///
/// Returns [`ArtifactError::RegistryUnreachable`] on a transport failure or
/// [`ArtifactError::ManifestUnresolvable`] when the registry responds but
/// no digest can be recovered.
pub async fn resolve(client: &reqwest::Client, reference: &str) -> Result<OciPin, ArtifactError> {
    let parsed = parse_reference(reference)?;
    if let Some(digest) = parsed.digest {
        return Ok(OciPin {
            image: parsed.image,
            digest,
            provenance: None,
        });
    }

    let (host, repo) = split_host_repo(&parsed.image);
    let manifest_url = format!("https://{host}/v2/{repo}/manifests/{}", parsed.tag);
    let response = client
        .get(&manifest_url)
        .header(
            "Accept",
            "application/vnd.oci.image.manifest.v1+json, application/vnd.docker.distribution.manifest.v2+json",
        )
        .send()
        .await
        .map_err(|err| ArtifactError::RegistryUnreachable(err.to_string()))?;
    if !response.status().is_success() {
        return Err(ArtifactError::RegistryUnreachable(format!(
            "registry returned {} for {manifest_url}",
            response.status()
        )));
    }
    let digest_header = response
        .headers()
        .get("Docker-Content-Digest")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = response
        .bytes()
        .await
        .map_err(|err| ArtifactError::RegistryUnreachable(err.to_string()))?;
    let digest = match digest_header {
        Some(digest) => digest,
        None => mcpgate_core::Sha256Digest::of_bytes(&body).as_str().to_string(),
    };

    Ok(OciPin {
        image: parsed.image,
        digest,
        provenance: None,
    })
}

/// Splits `host/repo` into registry host and repository path, applying the
/// Docker Hub official-image convention (`docker.io/name` resolves against
/// `registry-1.docker.io/library/name`).
fn split_host_repo(image: &str) -> (String, String) {
    let (host, repo) = image.split_once('/').unwrap_or(("docker.io", image));
    if host == "docker.io" {
        let repo = if repo.contains('/') {
            repo.to_string()
        } else {
            format!("library/{repo}")
        };
        ("registry-1.docker.io".to_string(), repo)
    } else {
        (host.to_string(), repo.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fully_qualified_reference() {
        let digest = format!("sha256:{}", "a".repeat(64));
        let reference = format!("ghcr.io/example/server:1.0@{digest}");
        let parsed = parse_reference(&reference).unwrap();
        assert_eq!(parsed.image, "ghcr.io/example/server");
        assert_eq!(parsed.tag, "1.0");
        assert_eq!(parsed.digest, Some(digest));
    }

    #[test]
    fn parses_tag_only_reference() {
        let parsed = parse_reference("ghcr.io/example/server:latest").unwrap();
        assert_eq!(parsed.image, "ghcr.io/example/server");
        assert_eq!(parsed.tag, "latest");
        assert!(parsed.digest.is_none());
    }

    #[test]
    fn handles_port_in_host_without_confusing_tag_separator() {
        let parsed = parse_reference("localhost:5000/example/server:1.0").unwrap();
        assert_eq!(parsed.image, "localhost:5000/example/server");
        assert_eq!(parsed.tag, "1.0");
    }

    #[test]
    fn rejects_malformed_digest() {
        let reference = "ghcr.io/example/server:latest@sha256:deadbeef";
        assert!(parse_reference(reference).is_err());
    }

    #[test]
    fn docker_hub_official_image_gets_library_prefix() {
        assert_eq!(
            split_host_repo("nginx"),
            ("registry-1.docker.io".to_string(), "library/nginx".to_string())
        );
    }
}
