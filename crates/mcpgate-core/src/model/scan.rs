// mcpgate-core/src/model/scan.rs
// ============================================================================
// Module: Scan Report
// Description: Immutable output of interrogating an MCP server.
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

/// A single tool advertised by `tools/list`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInfo {
    /// Tool name, used as the lockfile key.
    pub name: String,
    /// Human-readable description, hashed for drift detection.
    pub description: String,
    /// JSON Schema for the tool's input, hashed for drift detection.
    pub input_schema: Value,
}

/// A single prompt advertised by `prompts/list`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptInfo {
    /// Prompt name, used as the lockfile key.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Declared prompt arguments, in server order.
    pub arguments: Vec<PromptArgument>,
}

/// A single declared argument of a prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptArgument {
    /// Argument name.
    pub name: String,
    /// Argument description, if the server supplied one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether the server marked this argument required.
    #[serde(default)]
    pub required: bool,
}

/// A resource template advertised by `resources/templates/list`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceTemplateInfo {
    /// RFC 6570 level-1 URI template, e.g. `file:///{path}`.
    pub uri_template: String,
    /// Resource name.
    pub name: String,
    /// Declared MIME type, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

/// A static resource advertised by `resources/list`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticResourceInfo {
    /// Concrete resource URI.
    pub uri: String,
    /// Resource name.
    pub name: String,
}

/// The immutable result of interrogating one MCP server.
///
/// # Invariants
/// - Once constructed, a `ScanReport` is never mutated; a rescan produces a
///   fresh value.
/// - `error` is set only for a partial scan (e.g. a non-core method failed
///   after the core handshake succeeded); the other fields hold whatever was
///   collected before the failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanReport {
    /// Server name reported during the `initialize` handshake.
    pub server_name: String,
    /// Server version reported during the `initialize` handshake.
    pub server_version: String,
    /// Tools in the server's natural enumeration order.
    pub tools: Vec<ToolInfo>,
    /// Prompts in the server's natural enumeration order.
    pub prompts: Vec<PromptInfo>,
    /// Resource templates in the server's natural enumeration order.
    pub resource_templates: Vec<ResourceTemplateInfo>,
    /// Static resources in the server's natural enumeration order.
    pub static_resources: Vec<StaticResourceInfo>,
    /// Set when the scan was only partially completed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ScanReport {
    /// Returns true when the scan collected nothing past the handshake.
    #[must_use]
    pub fn is_partial(&self) -> bool {
        self.error.is_some()
    }
}
