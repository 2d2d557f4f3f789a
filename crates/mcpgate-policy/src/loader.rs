// mcpgate-policy/src/loader.rs
// ============================================================================
// Module: Policy Loader
// Description: Resolves a `--policy` argument to a `PolicyConfig`, either a
//              built-in preset name or a path to a custom YAML file.
// Purpose: spec.md §4.8, "custom means loaded from a YAML file".
// Dependencies: serde_yaml, std::fs
// ============================================================================

use std::path::Path;

use mcpgate_core::PolicyConfig;

use crate::error::PolicyError;
use crate::presets;

/// Resolves `selector` to a [`PolicyConfig`]: a built-in preset name
/// (`baseline`, `strict`) takes precedence, otherwise `selector` is read as
/// a path to a custom YAML policy file.
///
/// # Errors
///
/// Returns [`PolicyError::Io`] when the file cannot be read, or
/// [`PolicyError::ConfigParse`] when it cannot be deserialized.
pub fn load(selector: &str) -> Result<PolicyConfig, PolicyError> {
    if let Some(preset) = presets::lookup(selector) {
        return Ok(preset);
    }
    load_file(Path::new(selector))
}

/// Loads and parses a custom policy YAML file.
///
/// # Errors
///
/// Returns [`PolicyError::Io`] when the file cannot be read, or
/// [`PolicyError::ConfigParse`] when it cannot be deserialized.
pub fn load_file(path: &Path) -> Result<PolicyConfig, PolicyError> {
    let text = std::fs::read_to_string(path)?;
    serde_yaml::from_str(&text).map_err(|err| PolicyError::ConfigParse(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_built_in_presets_without_touching_disk() {
        let config = load("strict").unwrap();
        assert_eq!(config.name, "strict");
    }

    #[test]
    fn loads_custom_yaml_policy() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("policy.yaml");
        std::fs::write(
            &path,
            "name: custom\nmode: strict\nrules:\n  - name: r1\n    expression: \"true\"\n    failure_msg: never fails\n    severity: error\n",
        )
        .unwrap();
        let config = load(path.to_str().unwrap()).unwrap();
        assert_eq!(config.name, "custom");
        assert_eq!(config.rules.len(), 1);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let result = load_file(Path::new("/nonexistent/policy.yaml"));
        assert!(matches!(result, Err(PolicyError::Io(_))));
    }
}
