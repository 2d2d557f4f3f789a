// mcpgate-lockfile/src/drift.rs
// ============================================================================
// Module: Drift Engine (v3)
// Description: Classified diff between a v3 lockfile and a fresh scan.
// Purpose: Detect capability-surface changes and assign severity.
// Dependencies: mcpgate-core, crate::builder
// ============================================================================

//! ## Overview
//! `compare_v3` builds identifier-keyed maps for tools, prompts, and
//! templates from both sides, then emits drift items in the fixed order
//! spec.md §4.3 requires: added, then removed, then changed; each bucket
//! sorted by identifier. Severity is never computed ad hoc — every item's
//! severity comes from the single static table in `mcpgate_core::drift`.

use mcpgate_core::DriftItem;
use mcpgate_core::DriftType;
use mcpgate_core::Lockfile;
use mcpgate_core::ScanReport;

use crate::builder;
use crate::error::LockfileError;

/// Compares a lockfile against a fresh scan, producing drift items in
/// deterministic order (added, removed, changed; each sorted by
/// identifier).
///
/// # Errors
///
/// Returns [`LockfileError`] when the scan cannot be hashed into the
/// lockfile's field shape (canonicalization failure, or a non-level-1
/// resource template).
pub fn compare_v3(lockfile: &Lockfile, scan: &ScanReport) -> Result<Vec<DriftItem>, LockfileError> {
    let scanned = builder::build(scan, &lockfile.generated_at, lockfile.artifact.clone())?;

    let mut items = Vec::new();
    items.extend(tool_drift(lockfile, &scanned));
    items.extend(prompt_drift(lockfile, &scanned));
    items.extend(template_drift(lockfile, &scanned));
    Ok(items)
}

/// Emits ADDED/REMOVED/CHANGED items for one named, hash-bearing collection.
/// `changed` receives `(old, new)` hash pairs for a matched identifier and
/// returns `Some(drift_type, message)` when they differ.
fn diff_named<'a, T, F>(
    old: impl Iterator<Item = (&'a str, &'a T)>,
    new: impl Iterator<Item = (&'a str, &'a T)>,
    added_type: DriftType,
    removed_type: DriftType,
    changed: F,
) -> Vec<DriftItem>
where
    T: 'a,
    F: Fn(&T, &T) -> Option<(DriftType, Option<String>, Option<String>, String)>,
{
    let old_map: std::collections::BTreeMap<&str, &T> = old.collect();
    let new_map: std::collections::BTreeMap<&str, &T> = new.collect();

    let mut added = Vec::new();
    let mut removed = Vec::new();
    let mut changed_items = Vec::new();

    for &name in new_map.keys() {
        if !old_map.contains_key(name) {
            added.push(DriftItem::new(
                added_type,
                name,
                None,
                None,
                format!("{name} added"),
            ));
        }
    }
    for &name in old_map.keys() {
        if !new_map.contains_key(name) {
            removed.push(DriftItem::new(
                removed_type,
                name,
                None,
                None,
                format!("{name} removed"),
            ));
        }
    }
    for (&name, old_value) in &old_map {
        let Some(new_value) = new_map.get(name) else {
            continue;
        };
        if let Some((drift_type, old_hash, new_hash, message)) = changed(old_value, new_value) {
            changed_items.push(DriftItem::new(drift_type, name, old_hash, new_hash, message));
        }
    }

    added.sort_by(|a, b| a.identifier.cmp(&b.identifier));
    removed.sort_by(|a, b| a.identifier.cmp(&b.identifier));
    changed_items.sort_by(|a, b| a.identifier.cmp(&b.identifier));

    added.into_iter().chain(removed).chain(changed_items).collect()
}

/// Diffs the `tools` collection, schema changes taking precedence over
/// description changes when both hashes differ (spec.md §4.3).
fn tool_drift(lockfile: &Lockfile, scanned: &Lockfile) -> Vec<DriftItem> {
    diff_named(
        lockfile.tools.iter().map(|(k, v)| (k.as_str(), v)),
        scanned.tools.iter().map(|(k, v)| (k.as_str(), v)),
        DriftType::ToolAdded,
        DriftType::ToolRemoved,
        |old, new| {
            if old.input_schema_hash != new.input_schema_hash {
                return Some((
                    DriftType::ToolSchemaChanged,
                    Some(old.input_schema_hash.as_str().to_string()),
                    Some(new.input_schema_hash.as_str().to_string()),
                    "tool input schema changed".to_string(),
                ));
            }
            if old.description_hash != new.description_hash {
                return Some((
                    DriftType::ToolDescChanged,
                    Some(old.description_hash.as_str().to_string()),
                    Some(new.description_hash.as_str().to_string()),
                    "tool description changed".to_string(),
                ));
            }
            None
        },
    )
}

/// Diffs the `prompts.definitions` collection.
fn prompt_drift(lockfile: &Lockfile, scanned: &Lockfile) -> Vec<DriftItem> {
    diff_named(
        lockfile.prompts.definitions.iter().map(|(k, v)| (k.as_str(), v)),
        scanned.prompts.definitions.iter().map(|(k, v)| (k.as_str(), v)),
        DriftType::PromptAdded,
        DriftType::PromptRemoved,
        |old, new| {
            if old.description_hash != new.description_hash {
                return Some((
                    DriftType::PromptDescChanged,
                    Some(old.description_hash.as_str().to_string()),
                    Some(new.description_hash.as_str().to_string()),
                    "prompt description changed".to_string(),
                ));
            }
            None
        },
    )
}

/// Diffs the `resources.templates` collection by name, flagging a changed
/// `uri_template` under the same name (spec.md §4.3: rare, but critical).
fn template_drift(lockfile: &Lockfile, scanned: &Lockfile) -> Vec<DriftItem> {
    let old: Vec<(&str, &str)> = lockfile
        .resources
        .templates
        .iter()
        .map(|t| (t.name.as_str(), t.uri_template.as_str()))
        .collect();
    let new: Vec<(&str, &str)> = scanned
        .resources
        .templates
        .iter()
        .map(|t| (t.name.as_str(), t.uri_template.as_str()))
        .collect();
    diff_named(
        old.into_iter(),
        new.into_iter(),
        DriftType::TemplateAdded,
        DriftType::TemplateRemoved,
        |old_uri, new_uri| {
            if old_uri != new_uri {
                return Some((
                    DriftType::TemplateChanged,
                    Some((*old_uri).to_string()),
                    Some((*new_uri).to_string()),
                    "resource template uri changed".to_string(),
                ));
            }
            None
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcpgate_core::DriftSeverity;
    use mcpgate_core::ToolInfo;
    use serde_json::json;

    fn scan_with_tools(tools: Vec<ToolInfo>) -> ScanReport {
        ScanReport {
            server_name: "stub".to_string(),
            server_version: "0.0.1".to_string(),
            tools,
            prompts: vec![],
            resource_templates: vec![],
            static_resources: vec![],
            error: None,
        }
    }

    #[test]
    fn identical_scan_yields_no_drift() {
        let scan = scan_with_tools(vec![ToolInfo {
            name: "echo".to_string(),
            description: "say hi".to_string(),
            input_schema: json!({"type": "object"}),
        }]);
        let lockfile = builder::build(&scan, "2026-01-01T00:00:00.000000000Z", None).unwrap();
        let drift = compare_v3(&lockfile, &scan).unwrap();
        assert!(drift.is_empty());
    }

    #[test]
    fn tool_added_is_critical() {
        let scan = scan_with_tools(vec![ToolInfo {
            name: "echo".to_string(),
            description: "say hi".to_string(),
            input_schema: json!({"type": "object"}),
        }]);
        let lockfile = builder::build(&scan, "2026-01-01T00:00:00.000000000Z", None).unwrap();
        let scan2 = scan_with_tools(vec![
            ToolInfo {
                name: "echo".to_string(),
                description: "say hi".to_string(),
                input_schema: json!({"type": "object"}),
            },
            ToolInfo {
                name: "danger".to_string(),
                description: "deletes files".to_string(),
                input_schema: json!({"type": "object"}),
            },
        ]);
        let drift = compare_v3(&lockfile, &scan2).unwrap();
        assert_eq!(drift.len(), 1);
        assert_eq!(drift[0].drift_type, DriftType::ToolAdded);
        assert_eq!(drift[0].severity, DriftSeverity::Critical);
        assert_eq!(drift[0].identifier, "danger");
    }

    #[test]
    fn description_change_is_moderate() {
        let scan = scan_with_tools(vec![ToolInfo {
            name: "echo".to_string(),
            description: "say hi".to_string(),
            input_schema: json!({"type": "object"}),
        }]);
        let lockfile = builder::build(&scan, "2026-01-01T00:00:00.000000000Z", None).unwrap();
        let scan2 = scan_with_tools(vec![ToolInfo {
            name: "echo".to_string(),
            description: "say hello".to_string(),
            input_schema: json!({"type": "object"}),
        }]);
        let drift = compare_v3(&lockfile, &scan2).unwrap();
        assert_eq!(drift.len(), 1);
        assert_eq!(drift[0].drift_type, DriftType::ToolDescChanged);
        assert_eq!(drift[0].severity, DriftSeverity::Moderate);
    }

    #[test]
    fn added_then_removed_then_changed_ordering() {
        let old = scan_with_tools(vec![
            ToolInfo {
                name: "a".to_string(),
                description: "say hi".to_string(),
                input_schema: json!({}),
            },
            ToolInfo {
                name: "b".to_string(),
                description: "say hi".to_string(),
                input_schema: json!({}),
            },
        ]);
        let lockfile = builder::build(&old, "2026-01-01T00:00:00.000000000Z", None).unwrap();
        let new = scan_with_tools(vec![
            ToolInfo {
                name: "a".to_string(),
                description: "say hello".to_string(),
                input_schema: json!({}),
            },
            ToolInfo {
                name: "c".to_string(),
                description: "say hi".to_string(),
                input_schema: json!({}),
            },
        ]);
        let drift = compare_v3(&lockfile, &new).unwrap();
        assert_eq!(drift[0].drift_type, DriftType::ToolAdded);
        assert_eq!(drift[0].identifier, "c");
        assert_eq!(drift[1].drift_type, DriftType::ToolRemoved);
        assert_eq!(drift[1].identifier, "b");
        assert_eq!(drift[2].drift_type, DriftType::ToolDescChanged);
        assert_eq!(drift[2].identifier, "a");
    }
}
