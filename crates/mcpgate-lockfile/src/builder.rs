// mcpgate-lockfile/src/builder.rs
// ============================================================================
// Module: Lockfile Builder
// Description: Transforms a Scan Report into a v3 Lockfile.
// Purpose: Deterministically sort and hash a server's capability surface.
// Dependencies: mcpgate-core, crate::{error, template}
// ============================================================================

use std::collections::BTreeMap;

use mcpgate_core::ArtifactPin;
use mcpgate_core::CanonVersion;
use mcpgate_core::Lockfile;
use mcpgate_core::PromptEntry;
use mcpgate_core::PromptSection;
use mcpgate_core::ResourceSection;
use mcpgate_core::ScanReport;
use mcpgate_core::ServerIdentity;
use mcpgate_core::StaticResourceEntry;
use mcpgate_core::TemplateEntry;
use mcpgate_core::ToolEntry;
use mcpgate_core::classify_risk;
use mcpgate_core::hash_canonical_json;

use crate::error::LockfileError;
use crate::template::validate_level1;

/// Builds a v3 [`Lockfile`] from a [`ScanReport`].
///
/// Tools, prompts, and templates are sorted by name (the map types used for
/// tools/prompts make this automatic on serialization; templates and static
/// resources are plain vectors and are sorted explicitly here). Field
/// hashes are computed over canonical JSON v1 of each hashed field — the
/// v1/v2 distinction only matters for signing the lockfile as a whole, not
/// for its internal per-field hashes, so v1 is used uniformly for hash
/// stability regardless of the lockfile's own signing canon version.
///
/// # Errors
///
/// Returns [`LockfileError`] when a resource template is not RFC 6570
/// level-1, or when a field cannot be canonicalized.
pub fn build(scan: &ScanReport, generated_at: &str, artifact: Option<ArtifactPin>) -> Result<Lockfile, LockfileError> {
    let mut tools = BTreeMap::new();
    for tool in &scan.tools {
        let description_hash = hash_canonical_json(&tool.description, CanonVersion::V1)?;
        let input_schema_hash = hash_canonical_json(&tool.input_schema, CanonVersion::V1)?;
        let risk_level = classify_risk(&tool.description);
        tools.insert(
            tool.name.clone(),
            ToolEntry {
                description_hash,
                input_schema_hash,
                risk_level,
            },
        );
    }

    let mut definitions = BTreeMap::new();
    for prompt in &scan.prompts {
        let description_hash = hash_canonical_json(&prompt.description, CanonVersion::V1)?;
        let arguments_hash = hash_canonical_json(&prompt.arguments, CanonVersion::V1)?;
        definitions.insert(
            prompt.name.clone(),
            PromptEntry {
                description_hash,
                arguments_hash,
            },
        );
    }

    let mut templates = Vec::with_capacity(scan.resource_templates.len());
    for template in &scan.resource_templates {
        validate_level1(&template.uri_template)?;
        templates.push(TemplateEntry {
            uri_template: template.uri_template.clone(),
            name: template.name.clone(),
            mime_type: template.mime_type.clone(),
        });
    }
    templates.sort_by(|a, b| a.name.cmp(&b.name));

    let mut static_resources: Vec<StaticResourceEntry> = scan
        .static_resources
        .iter()
        .map(|r| StaticResourceEntry {
            uri: r.uri.clone(),
            name: r.name.clone(),
        })
        .collect();
    static_resources.sort_by(|a, b| a.name.cmp(&b.name));

    Ok(Lockfile {
        lock_file_version: Lockfile::CURRENT_VERSION.to_string(),
        server: ServerIdentity {
            name: scan.server_name.clone(),
            version: scan.server_version.clone(),
        },
        tools,
        prompts: PromptSection { definitions },
        resources: ResourceSection {
            templates,
            static_resources,
        },
        artifact,
        generated_at: generated_at.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcpgate_core::ToolInfo;
    use serde_json::json;

    fn stub_scan() -> ScanReport {
        ScanReport {
            server_name: "stub".to_string(),
            server_version: "0.0.1".to_string(),
            tools: vec![ToolInfo {
                name: "echo".to_string(),
                description: "say hi".to_string(),
                input_schema: json!({"type": "object"}),
            }],
            prompts: vec![],
            resource_templates: vec![],
            static_resources: vec![],
            error: None,
        }
    }

    #[test]
    fn builds_lockfile_with_expected_description_hash() {
        let lockfile = build(&stub_scan(), "2026-01-01T00:00:00.000000000Z", None).unwrap();
        assert_eq!(lockfile.lock_file_version, "3.0");
        let entry = lockfile.tools.get("echo").unwrap();
        // spec.md S1: "say hi" canonicalizes to bytes `22 73 61 79 20 68 69 22`.
        let expected = mcpgate_core::Sha256Digest::of_bytes(b"\"say hi\"");
        assert_eq!(entry.description_hash, expected);
    }

    #[test]
    fn non_level1_template_is_rejected() {
        let mut scan = stub_scan();
        scan.resource_templates.push(mcpgate_core::ResourceTemplateInfo {
            uri_template: "file:///{+path}".to_string(),
            name: "file".to_string(),
            mime_type: None,
        });
        assert!(build(&scan, "2026-01-01T00:00:00.000000000Z", None).is_err());
    }
}
