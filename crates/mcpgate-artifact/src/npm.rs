// mcpgate-artifact/src/npm.rs
// ============================================================================
// Module: npm Resolver
// Description: Parses npm package specs, queries the registry manifest, and
//              resolves a concrete version's integrity and tarball URL.
// Purpose: spec.md §4.5 "For npm" steps 1-3.
// Dependencies: reqwest, serde_json, mcpgate-core
// ============================================================================

use std::collections::HashMap;

use mcpgate_core::NpmPin;
use serde::Deserialize;

use crate::error::ArtifactError;

/// Default npm registry used when none is configured.
pub const DEFAULT_REGISTRY: &str = "https://registry.npmjs.org";

/// Default dist-tag resolved when a spec carries no explicit version.
const DEFAULT_TAG: &str = "latest";

/// A parsed `@scope/name@version` or `name@version` package spec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageSpec {
    /// Package name, including scope if present.
    pub name: String,
    /// The version, version range, or dist-tag the caller requested.
    /// Defaults to `"latest"` when the spec omits it.
    pub version_spec: String,
}

/// Parses a package spec of the form `@scope/name@version` or
/// `name@version`, defaulting to the `latest` tag when no version is
/// given.
///
/// # Errors
///
/// Returns [`ArtifactError::MalformedReference`] when the spec is empty or
/// a scoped package is missing its `/name` segment.
pub fn parse_package_spec(spec: &str) -> Result<PackageSpec, ArtifactError> {
    if spec.is_empty() {
        return Err(ArtifactError::MalformedReference("empty npm package spec".to_string()));
    }
    if let Some(rest) = spec.strip_prefix('@') {
        let slash = rest
            .find('/')
            .ok_or_else(|| ArtifactError::MalformedReference(format!("malformed scoped package {spec:?}")))?;
        let (scope_name, after_name) = rest.split_at(slash);
        let after_name = &after_name[1..];
        return Ok(match after_name.split_once('@') {
            Some((name_tail, version)) => PackageSpec {
                name: format!("@{scope_name}/{name_tail}"),
                version_spec: version.to_string(),
            },
            None => PackageSpec {
                name: format!("@{scope_name}/{after_name}"),
                version_spec: DEFAULT_TAG.to_string(),
            },
        });
    }
    Ok(match spec.split_once('@') {
        Some((name, version)) => PackageSpec {
            name: name.to_string(),
            version_spec: version.to_string(),
        },
        None => PackageSpec {
            name: spec.to_string(),
            version_spec: DEFAULT_TAG.to_string(),
        },
    })
}

/// Registry manifest response shape, trimmed to the fields this resolver
/// needs.
#[derive(Debug, Deserialize)]
struct Manifest {
    #[serde(rename = "dist-tags", default)]
    dist_tags: HashMap<String, String>,
    #[serde(default)]
    versions: HashMap<String, VersionEntry>,
}

#[derive(Debug, Deserialize)]
struct VersionEntry {
    dist: DistBlock,
}

#[derive(Debug, Deserialize)]
struct DistBlock {
    integrity: String,
    tarball: String,
}

/// Resolves `spec` against `registry`, selecting a concrete version and
/// recording its integrity and tarball URL (spec.md §4.5 steps 1-3).
///
/// # Errors
///
/// Returns [`ArtifactError::RegistryUnreachable`] on a transport failure or
/// [`ArtifactError::ManifestUnresolvable`] when the manifest cannot be
/// parsed or the requested version/tag is absent.
pub async fn resolve(client: &reqwest::Client, registry: &str, spec: &PackageSpec) -> Result<NpmPin, ArtifactError> {
    let url = format!("{}/{}", registry.trim_end_matches('/'), spec.name);
    let response = client
        .get(&url)
        .send()
        .await
        .map_err(|err| ArtifactError::RegistryUnreachable(err.to_string()))?;
    if !response.status().is_success() {
        return Err(ArtifactError::RegistryUnreachable(format!(
            "registry returned {} for {}",
            response.status(),
            spec.name
        )));
    }
    let manifest: Manifest = response
        .json()
        .await
        .map_err(|err| ArtifactError::ManifestUnresolvable(err.to_string()))?;

    let resolved_version = if manifest.versions.contains_key(&spec.version_spec) {
        spec.version_spec.clone()
    } else if let Some(tagged) = manifest.dist_tags.get(&spec.version_spec) {
        tagged.clone()
    } else {
        return Err(ArtifactError::ManifestUnresolvable(format!(
            "no version or dist-tag {:?} for package {}",
            spec.version_spec, spec.name
        )));
    };

    let entry = manifest.versions.get(&resolved_version).ok_or_else(|| {
        ArtifactError::ManifestUnresolvable(format!(
            "dist-tag resolved to version {resolved_version:?} absent from manifest"
        ))
    })?;

    Ok(NpmPin {
        name: spec.name.clone(),
        version: resolved_version,
        registry: registry.to_string(),
        integrity: entry.dist.integrity.clone(),
        tarball_url: entry.dist.tarball.clone(),
        tarball_sha256: None,
        tarball_size: None,
        provenance: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_unscoped_spec_with_version() {
        let spec = parse_package_spec("some-server@1.2.3").unwrap();
        assert_eq!(spec.name, "some-server");
        assert_eq!(spec.version_spec, "1.2.3");
    }

    #[test]
    fn parses_unscoped_spec_defaults_to_latest() {
        let spec = parse_package_spec("some-server").unwrap();
        assert_eq!(spec.version_spec, "latest");
    }

    #[test]
    fn parses_scoped_spec_with_version() {
        let spec = parse_package_spec("@scope/name@2.0.0").unwrap();
        assert_eq!(spec.name, "@scope/name");
        assert_eq!(spec.version_spec, "2.0.0");
    }

    #[test]
    fn parses_scoped_spec_without_version() {
        let spec = parse_package_spec("@scope/name").unwrap();
        assert_eq!(spec.name, "@scope/name");
        assert_eq!(spec.version_spec, "latest");
    }

    #[test]
    fn rejects_malformed_scoped_spec() {
        assert!(parse_package_spec("@scope-no-slash").is_err());
    }
}
