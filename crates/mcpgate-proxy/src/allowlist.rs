// mcpgate-proxy/src/allowlist.rs
// ============================================================================
// Module: Compiled Allowlist
// Description: Compiles a v3 lockfile into the matchers the bridge checks
//              every host request and filters every server list against.
// Purpose: spec.md §4.4 startup step 1.
// Dependencies: mcpgate-core, mcpgate-lockfile, regex
// ============================================================================

use std::collections::BTreeSet;

use mcpgate_core::Lockfile;
use mcpgate_lockfile::compile_template;
use regex::Regex;

use crate::error::ProxyError;

/// A lockfile's allowlist, compiled once at proxy startup.
pub struct Allowlist {
    /// Tool names allowed through `tools/call`, and kept in `tools/list`.
    tools: BTreeSet<String>,
    /// Prompt names allowed through `prompts/get`, kept in `prompts/list`.
    prompts: BTreeSet<String>,
    /// Compiled RFC 6570 level-1 templates, one per lockfile template entry.
    templates: Vec<Regex>,
    /// The same templates' original `uriTemplate` strings, for filtering
    /// `resources/templates/list` responses by exact match.
    template_uris: BTreeSet<String>,
    /// Static resource URIs, honoured only when `allow_static_resources`.
    static_resources: BTreeSet<String>,
    /// Whether static resources are permitted at all.
    allow_static_resources: bool,
}

impl Allowlist {
    /// Compiles every resource template in `lockfile` and indexes its tool,
    /// prompt, and static-resource names.
    ///
    /// # Errors
    ///
    /// Returns [`ProxyError::Lockfile`] when a template uses an RFC 6570
    /// operator beyond level 1.
    pub fn compile(lockfile: &Lockfile, allow_static_resources: bool) -> Result<Self, ProxyError> {
        let templates = lockfile
            .resources
            .templates
            .iter()
            .map(|entry| compile_template(&entry.uri_template).map_err(ProxyError::from))
            .collect::<Result<Vec<_>, _>>()?;

        let template_uris = lockfile
            .resources
            .templates
            .iter()
            .map(|entry| entry.uri_template.clone())
            .collect();

        Ok(Self {
            tools: lockfile.tools.keys().cloned().collect(),
            prompts: lockfile.prompts.definitions.keys().cloned().collect(),
            templates,
            template_uris,
            static_resources: lockfile
                .resources
                .static_resources
                .iter()
                .map(|entry| entry.uri.clone())
                .collect(),
            allow_static_resources,
        })
    }

    /// Returns `true` when `name` is a key of `lockfile.tools`.
    #[must_use]
    pub fn allows_tool(&self, name: &str) -> bool {
        self.tools.contains(name)
    }

    /// Returns `true` when `name` is a key of `lockfile.prompts.definitions`.
    #[must_use]
    pub fn allows_prompt(&self, name: &str) -> bool {
        self.prompts.contains(name)
    }

    /// Returns `true` when `uri` matches a compiled template, or equals a
    /// static resource URI when static resources are enabled.
    #[must_use]
    pub fn allows_resource(&self, uri: &str) -> bool {
        if self.templates.iter().any(|re| re.is_match(uri)) {
            return true;
        }
        self.allow_static_resources && self.static_resources.contains(uri)
    }

    /// Returns `true` when `uri_template` is one of the lockfile's own
    /// template strings, for `resources/templates/list` filtering.
    #[must_use]
    pub fn allows_template_uri(&self, uri_template: &str) -> bool {
        self.template_uris.contains(uri_template)
    }

    /// Whether static resources are permitted at all.
    #[must_use]
    pub const fn allow_static_resources(&self) -> bool {
        self.allow_static_resources
    }

    /// For `resources/list` filtering.
    #[must_use]
    pub fn static_resource_uris(&self) -> &BTreeSet<String> {
        &self.static_resources
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcpgate_core::PromptEntry;
    use mcpgate_core::PromptSection;
    use mcpgate_core::ResourceSection;
    use mcpgate_core::RiskLevel;
    use mcpgate_core::ServerIdentity;
    use mcpgate_core::StaticResourceEntry;
    use mcpgate_core::TemplateEntry;
    use mcpgate_core::ToolEntry;
    use std::collections::BTreeMap;

    fn sample_lockfile() -> Lockfile {
        let mut tools = BTreeMap::new();
        tools.insert(
            "echo".to_string(),
            ToolEntry {
                description_hash: "sha256:aaa".to_string(),
                input_schema_hash: "sha256:bbb".to_string(),
                risk_level: RiskLevel::Low,
            },
        );
        let mut prompts = BTreeMap::new();
        prompts.insert(
            "greet".to_string(),
            PromptEntry {
                description_hash: "sha256:ccc".to_string(),
                arguments_hash: "sha256:ddd".to_string(),
            },
        );
        Lockfile {
            lock_file_version: "3.0".to_string(),
            server: ServerIdentity {
                name: "demo".to_string(),
                version: "1.0.0".to_string(),
            },
            tools,
            prompts: PromptSection { definitions: prompts },
            resources: ResourceSection {
                templates: vec![TemplateEntry {
                    uri_template: "file:///{path}".to_string(),
                    name: "file".to_string(),
                    mime_type: None,
                }],
                static_resources: vec![StaticResourceEntry {
                    uri: "config://readme".to_string(),
                    name: "readme".to_string(),
                }],
            },
            artifact: None,
            generated_at: "2026-01-01T00:00:00.000000000Z".to_string(),
        }
    }

    #[test]
    fn tool_and_prompt_membership() {
        let allowlist = Allowlist::compile(&sample_lockfile(), false).unwrap();
        assert!(allowlist.allows_tool("echo"));
        assert!(!allowlist.allows_tool("danger"));
        assert!(allowlist.allows_prompt("greet"));
        assert!(!allowlist.allows_prompt("bogus"));
    }

    #[test]
    fn template_resource_matches_regardless_of_static_flag() {
        let allowlist = Allowlist::compile(&sample_lockfile(), false).unwrap();
        assert!(allowlist.allows_resource("file:///etcpasswd"));
    }

    #[test]
    fn static_resource_requires_the_flag() {
        let without = Allowlist::compile(&sample_lockfile(), false).unwrap();
        assert!(!without.allows_resource("config://readme"));
        let with = Allowlist::compile(&sample_lockfile(), true).unwrap();
        assert!(with.allows_resource("config://readme"));
    }
}
