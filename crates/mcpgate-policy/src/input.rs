// mcpgate-policy/src/input.rs
// ============================================================================
// Module: Policy Input Assembly
// Description: Builds the nested `{tools, prompts, resources, artifact,
//              provenance, drift}` tree the expression evaluator runs over.
// Purpose: spec.md §4.8's input assembly step.
// Dependencies: mcpgate-core
// ============================================================================

use mcpgate_core::ArtifactPin;
use mcpgate_core::DriftItem;
use mcpgate_core::PolicyInput;
use mcpgate_core::ProvenanceInfo;
use mcpgate_core::ScanReport;
use mcpgate_core::risk;
use serde_json::Value;
use serde_json::json;

/// Assembles a [`PolicyInput`] from the facts a single command run has
/// available: the tool/prompt/resource listing, an optional resolved
/// artifact, optional verified provenance, and an optional drift
/// comparison.
#[must_use]
pub fn build(
    scan: &ScanReport,
    artifact: Option<&ArtifactPin>,
    provenance: Option<&ProvenanceInfo>,
    drift: Option<&[DriftItem]>,
) -> PolicyInput {
    PolicyInput {
        tools: tools_value(scan),
        prompts: prompts_value(scan),
        resources: resources_value(scan),
        artifact: artifact.map(artifact_value),
        provenance: provenance.map(provenance_value),
        drift: drift.map(drift_value),
    }
}

/// Merges a [`PolicyInput`]'s fields into a single JSON object the
/// expression evaluator resolves dotted paths against.
#[must_use]
pub fn root_value(input: &PolicyInput) -> Value {
    json!({
        "tools": input.tools,
        "prompts": input.prompts,
        "resources": input.resources,
        "artifact": input.artifact,
        "provenance": input.provenance,
        "drift": input.drift,
    })
}

/// Builds the `tools` array, attaching a computed `risk_level` per tool.
fn tools_value(scan: &ScanReport) -> Value {
    Value::Array(
        scan.tools
            .iter()
            .map(|tool| {
                json!({
                    "name": tool.name,
                    "description": tool.description,
                    "risk_level": risk::classify(&tool.description),
                    "schema": tool.input_schema,
                })
            })
            .collect(),
    )
}

/// Builds the `prompts` array.
fn prompts_value(scan: &ScanReport) -> Value {
    Value::Array(
        scan.prompts
            .iter()
            .map(|prompt| {
                json!({
                    "name": prompt.name,
                    "description": prompt.description,
                    "arguments": prompt.arguments,
                })
            })
            .collect(),
    )
}

/// Builds the `resources` object (templates plus static resources).
fn resources_value(scan: &ScanReport) -> Value {
    json!({
        "templates": scan.resource_templates,
        "static_resources": scan.static_resources,
    })
}

/// Builds the `artifact` object from a resolved pin, per its variant.
fn artifact_value(pin: &ArtifactPin) -> Value {
    match pin {
        ArtifactPin::Npm(npm) => json!({
            "type": "npm",
            "name": npm.name,
            "version": npm.version,
            "integrity": npm.integrity,
            "tarball_sha256": npm.tarball_sha256,
        }),
        ArtifactPin::Oci(oci) => json!({
            "type": "oci",
            "name": oci.image,
            "version": Value::Null,
            "integrity": oci.digest,
            "tarball_sha256": Value::Null,
        }),
        ArtifactPin::Local(local) => json!({
            "type": "local",
            "name": local.command,
            "version": Value::Null,
            "integrity": Value::Null,
            "tarball_sha256": Value::Null,
        }),
    }
}

/// Builds the `provenance` object.
fn provenance_value(info: &ProvenanceInfo) -> Value {
    json!({
        "method": info.method,
        "verified": info.verified,
        "source_repo": info.source_repo,
        "builder_id": info.builder_id,
    })
}

/// Builds the `drift` object: summary counts plus per-item facts.
fn drift_value(items: &[DriftItem]) -> Value {
    let mut safe = 0_u64;
    let mut moderate = 0_u64;
    let mut critical = 0_u64;
    for item in items {
        match item.severity {
            mcpgate_core::DriftSeverity::Safe => safe += 1,
            mcpgate_core::DriftSeverity::Moderate => moderate += 1,
            mcpgate_core::DriftSeverity::Critical => critical += 1,
        }
    }
    json!({
        "counts": {"safe": safe, "moderate": moderate, "critical": critical},
        "items": items.iter().map(|item| json!({
            "type": item.drift_type,
            "severity": item.severity,
            "identifier": item.identifier,
        })).collect::<Vec<_>>(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcpgate_core::PromptArgument;
    use mcpgate_core::PromptInfo;
    use mcpgate_core::ResourceTemplateInfo;
    use mcpgate_core::StaticResourceInfo;
    use mcpgate_core::ToolInfo;

    fn sample_scan() -> ScanReport {
        ScanReport {
            server_name: "demo".to_string(),
            server_version: "1.0.0".to_string(),
            tools: vec![ToolInfo {
                name: "delete_file".to_string(),
                description: "deletes a file from disk".to_string(),
                input_schema: serde_json::json!({"type": "object"}),
            }],
            prompts: vec![PromptInfo {
                name: "greet".to_string(),
                description: "says hello".to_string(),
                arguments: vec![PromptArgument {
                    name: "name".to_string(),
                    description: None,
                    required: true,
                }],
            }],
            resource_templates: vec![ResourceTemplateInfo {
                uri_template: "file:///{path}".to_string(),
                name: "file".to_string(),
                mime_type: None,
            }],
            static_resources: vec![StaticResourceInfo {
                uri: "file:///readme.md".to_string(),
                name: "readme".to_string(),
            }],
            error: None,
        }
    }

    #[test]
    fn classifies_tool_risk_from_description() {
        let input = build(&sample_scan(), None, None, None);
        let root = root_value(&input);
        assert!(crate::expr::evaluate("any(tools, risk_level == 'HIGH')", &root).unwrap());
    }

    #[test]
    fn optional_sections_are_null_when_absent() {
        let input = build(&sample_scan(), None, None, None);
        let root = root_value(&input);
        assert!(!crate::expr::evaluate("exists(artifact)", &root).unwrap());
    }
}
