// mcpgate-core/src/model/lockfile.rs
// ============================================================================
// Module: Lockfile v3
// Description: Versioned data model pinning a server's capability surface.
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use crate::hashing::Sha256Digest;
use crate::model::artifact::ArtifactPin;
use crate::risk::RiskLevel;

/// Lockfile entry for one tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolEntry {
    /// `sha256:` digest of the canonical JSON of the tool's description.
    pub description_hash: Sha256Digest,
    /// `sha256:` digest of the canonical JSON of the tool's input schema.
    pub input_schema_hash: Sha256Digest,
    /// Keyword-assigned risk level.
    pub risk_level: RiskLevel,
}

/// Lockfile entry for one prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptEntry {
    /// `sha256:` digest of the canonical JSON of the prompt's description.
    pub description_hash: Sha256Digest,
    /// `sha256:` digest of the canonical JSON of the prompt's argument list.
    pub arguments_hash: Sha256Digest,
}

/// Lockfile entry for one resource template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateEntry {
    /// RFC 6570 level-1 URI template (`{var}` placeholders only).
    pub uri_template: String,
    /// Resource name.
    pub name: String,
    /// Declared MIME type, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

/// Lockfile entry for one static resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticResourceEntry {
    /// Concrete resource URI.
    pub uri: String,
    /// Resource name.
    pub name: String,
}

/// The server identity recorded on a lockfile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerIdentity {
    /// Server name reported during the `initialize` handshake.
    pub name: String,
    /// Server version reported during the `initialize` handshake.
    pub version: String,
}

/// Prompt section of a v3 lockfile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PromptSection {
    /// Prompts keyed by name.
    pub definitions: BTreeMap<String, PromptEntry>,
}

/// Resource section of a v3 lockfile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ResourceSection {
    /// Resource templates, sorted by name at build time.
    #[serde(default)]
    pub templates: Vec<TemplateEntry>,
    /// Static resources, sorted by name at build time.
    #[serde(default)]
    pub static_resources: Vec<StaticResourceEntry>,
}

/// A v3 lockfile: a server's capability surface and artifact identity.
///
/// # Invariants
/// - `tools` and `prompts.definitions` use [`BTreeMap`] so map iteration
///   during canonicalization is always key-sorted, matching spec.md §3's
///   "map iteration must not affect canonical output" invariant.
/// - `lock_file_version` always has the shape `"<major>.<minor>"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lockfile {
    /// Semantic version of the lockfile schema, e.g. `"3.0"`.
    pub lock_file_version: String,
    /// Identity of the scanned server.
    pub server: ServerIdentity,
    /// Tools keyed by name.
    pub tools: BTreeMap<String, ToolEntry>,
    /// Prompt definitions.
    #[serde(default)]
    pub prompts: PromptSection,
    /// Resource templates and static resources.
    #[serde(default)]
    pub resources: ResourceSection,
    /// Pinned artifact identity, if the lockfile was built with `--pin`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact: Option<ArtifactPin>,
    /// RFC3339Nano timestamp of lockfile generation.
    pub generated_at: String,
}

impl Lockfile {
    /// Current lockfile schema version this crate writes.
    pub const CURRENT_VERSION: &'static str = "3.0";

    /// Returns the `(major, minor)` parsed from `lock_file_version`, if
    /// the field has the expected `"<major>.<minor>"` shape.
    #[must_use]
    pub fn version_parts(&self) -> Option<(u32, u32)> {
        let (major, minor) = self.lock_file_version.split_once('.')?;
        Some((major.parse().ok()?, minor.parse().ok()?))
    }
}
