// mcpgate-client/src/scanner.rs
// ============================================================================
// Module: Scanner
// Description: Orchestrates the stdio MCP client to produce a Scan Report.
// Purpose: Drive the initialize handshake and the four enumeration calls
//          against an untrusted server.
// Dependencies: mcpgate-core, crate::{argv, stdio, jsonrpc, error}
// ============================================================================

use std::time::Duration;

use mcpgate_core::PromptArgument;
use mcpgate_core::PromptInfo;
use mcpgate_core::ResourceTemplateInfo;
use mcpgate_core::ScanReport;
use mcpgate_core::StaticResourceInfo;
use mcpgate_core::ToolInfo;
use serde::Deserialize;
use serde_json::Value;
use serde_json::json;

use crate::argv::tokenize;
use crate::error::McpClientError;
use crate::jsonrpc::JsonRpcFrame;
use crate::stdio::StdioMcpClient;

/// Default timeout applied to the handshake and each enumeration call.
pub const DEFAULT_SCAN_TIMEOUT: Duration = Duration::from_secs(30);

/// Grace period given to the child on shutdown before escalating signals.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// Client identity declared during the `initialize` handshake.
#[derive(Debug, Clone)]
pub struct ClientInfo {
    /// Client name.
    pub name: String,
    /// Client version.
    pub version: String,
}

impl Default for ClientInfo {
    fn default() -> Self {
        Self {
            name: "mcpgate".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// `initialize` response payload.
#[derive(Debug, Deserialize)]
struct InitializeResult {
    /// The server's declared identity.
    #[serde(rename = "serverInfo")]
    server_info: ServerInfo,
}

/// Server identity reported in an `initialize` response.
#[derive(Debug, Deserialize)]
struct ServerInfo {
    /// Server name.
    name: String,
    /// Server version.
    version: String,
}

/// `tools/list` response payload.
#[derive(Debug, Deserialize)]
struct ToolsListResult {
    /// Tools in the server's natural order.
    tools: Vec<ToolFrame>,
}

/// One tool as reported on the wire.
#[derive(Debug, Deserialize)]
struct ToolFrame {
    /// Tool name.
    name: String,
    /// Tool description.
    #[serde(default)]
    description: String,
    /// Tool input JSON Schema.
    #[serde(rename = "inputSchema", default)]
    input_schema: Value,
}

/// `prompts/list` response payload.
#[derive(Debug, Deserialize)]
struct PromptsListResult {
    /// Prompts in the server's natural order.
    prompts: Vec<PromptFrame>,
}

/// One prompt as reported on the wire.
#[derive(Debug, Deserialize)]
struct PromptFrame {
    /// Prompt name.
    name: String,
    /// Prompt description.
    #[serde(default)]
    description: String,
    /// Declared prompt arguments.
    #[serde(default)]
    arguments: Vec<PromptArgumentFrame>,
}

/// One prompt argument as reported on the wire.
#[derive(Debug, Deserialize)]
struct PromptArgumentFrame {
    /// Argument name.
    name: String,
    /// Argument description, if supplied.
    #[serde(default)]
    description: Option<String>,
    /// Whether the server marked this argument required.
    #[serde(default)]
    required: bool,
}

/// `resources/templates/list` response payload.
#[derive(Debug, Deserialize)]
struct TemplatesListResult {
    /// Resource templates in the server's natural order.
    #[serde(rename = "resourceTemplates")]
    resource_templates: Vec<TemplateFrame>,
}

/// One resource template as reported on the wire.
#[derive(Debug, Deserialize)]
struct TemplateFrame {
    /// RFC 6570 URI template.
    #[serde(rename = "uriTemplate")]
    uri_template: String,
    /// Resource name.
    name: String,
    /// Declared MIME type, if any.
    #[serde(rename = "mimeType", default)]
    mime_type: Option<String>,
}

/// `resources/list` response payload.
#[derive(Debug, Deserialize)]
struct ResourcesListResult {
    /// Static resources in the server's natural order.
    resources: Vec<StaticResourceFrame>,
}

/// One static resource as reported on the wire.
#[derive(Debug, Deserialize)]
struct StaticResourceFrame {
    /// Concrete resource URI.
    uri: String,
    /// Resource name.
    name: String,
}

/// Scans one MCP server by spawning it, performing the handshake, and
/// enumerating its tools, prompts, resource templates, and static resources.
pub struct Scanner {
    /// Client identity declared during the handshake.
    client_info: ClientInfo,
    /// Per-call timeout applied to the handshake and each enumeration call.
    timeout: Duration,
}

impl Scanner {
    /// Builds a scanner with the default client identity and timeout.
    #[must_use]
    pub fn new() -> Self {
        Self {
            client_info: ClientInfo::default(),
            timeout: DEFAULT_SCAN_TIMEOUT,
        }
    }

    /// Overrides the per-call timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Tokenizes `command` into argv, spawns the server, and produces a
    /// [`ScanReport`].
    ///
    /// # Errors
    ///
    /// Returns [`McpClientError`] when the command is unsafe, the process
    /// cannot be spawned, the handshake times out, or a core enumeration
    /// call fails. Non-core methods that return `-32601 method not found`
    /// are tolerated and recorded as empty.
    pub async fn scan_command(&self, command: &str) -> Result<ScanReport, McpClientError> {
        let argv = tokenize(command)?;
        self.scan_argv(&argv).await
    }

    /// Spawns `argv` directly (already tokenized) and produces a
    /// [`ScanReport`].
    ///
    /// # Errors
    ///
    /// See [`Scanner::scan_command`].
    pub async fn scan_argv(&self, argv: &[String]) -> Result<ScanReport, McpClientError> {
        let mut client = StdioMcpClient::spawn(argv)?;

        let init_params = json!({
            "protocolVersion": crate::stdio::PROTOCOL_VERSION,
            "clientInfo": {
                "name": self.client_info.name,
                "version": self.client_info.version,
            },
            "capabilities": {},
        });
        let init_frame = client
            .request("initialize", Some(init_params), self.timeout)
            .await?;
        let init_result = result_of("initialize", init_frame)?;
        let initialize: InitializeResult = serde_json::from_value(init_result)
            .map_err(|err| McpClientError::FrameParse(err.to_string()))?;

        client.notify("notifications/initialized", None).await?;

        let tools = self.list_tools(&mut client).await?;
        let prompts = self.list_prompts(&mut client).await?;
        let resource_templates = self.list_resource_templates(&mut client).await?;
        let static_resources = self.list_static_resources(&mut client).await?;

        client.shutdown(SHUTDOWN_GRACE).await?;

        Ok(ScanReport {
            server_name: initialize.server_info.name,
            server_version: initialize.server_info.version,
            tools,
            prompts,
            resource_templates,
            static_resources,
            error: None,
        })
    }

    async fn list_tools(&self, client: &mut StdioMcpClient) -> Result<Vec<ToolInfo>, McpClientError> {
        let frame = client.request("tools/list", None, self.timeout).await?;
        if frame.is_method_not_found() {
            return Ok(Vec::new());
        }
        let result = result_of("tools/list", frame)?;
        let parsed: ToolsListResult =
            serde_json::from_value(result).map_err(|err| McpClientError::FrameParse(err.to_string()))?;
        let mut tools: Vec<ToolInfo> = parsed
            .tools
            .into_iter()
            .map(|t| ToolInfo {
                name: t.name,
                description: t.description,
                input_schema: t.input_schema,
            })
            .collect();
        tools.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tools)
    }

    async fn list_prompts(
        &self,
        client: &mut StdioMcpClient,
    ) -> Result<Vec<PromptInfo>, McpClientError> {
        let frame = client.request("prompts/list", None, self.timeout).await?;
        if frame.is_method_not_found() {
            return Ok(Vec::new());
        }
        let result = result_of("prompts/list", frame)?;
        let parsed: PromptsListResult =
            serde_json::from_value(result).map_err(|err| McpClientError::FrameParse(err.to_string()))?;
        let mut prompts: Vec<PromptInfo> = parsed
            .prompts
            .into_iter()
            .map(|p| PromptInfo {
                name: p.name,
                description: p.description,
                arguments: p
                    .arguments
                    .into_iter()
                    .map(|a| PromptArgument {
                        name: a.name,
                        description: a.description,
                        required: a.required,
                    })
                    .collect(),
            })
            .collect();
        prompts.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(prompts)
    }

    async fn list_resource_templates(
        &self,
        client: &mut StdioMcpClient,
    ) -> Result<Vec<ResourceTemplateInfo>, McpClientError> {
        let frame = client
            .request("resources/templates/list", None, self.timeout)
            .await?;
        if frame.is_method_not_found() {
            return Ok(Vec::new());
        }
        let result = result_of("resources/templates/list", frame)?;
        let parsed: TemplatesListResult =
            serde_json::from_value(result).map_err(|err| McpClientError::FrameParse(err.to_string()))?;
        let mut templates: Vec<ResourceTemplateInfo> = parsed
            .resource_templates
            .into_iter()
            .map(|t| ResourceTemplateInfo {
                uri_template: t.uri_template,
                name: t.name,
                mime_type: t.mime_type,
            })
            .collect();
        templates.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(templates)
    }

    async fn list_static_resources(
        &self,
        client: &mut StdioMcpClient,
    ) -> Result<Vec<StaticResourceInfo>, McpClientError> {
        let frame = client.request("resources/list", None, self.timeout).await?;
        if frame.is_method_not_found() {
            return Ok(Vec::new());
        }
        let result = result_of("resources/list", frame)?;
        let parsed: ResourcesListResult =
            serde_json::from_value(result).map_err(|err| McpClientError::FrameParse(err.to_string()))?;
        let mut resources: Vec<StaticResourceInfo> = parsed
            .resources
            .into_iter()
            .map(|r| StaticResourceInfo {
                uri: r.uri,
                name: r.name,
            })
            .collect();
        resources.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(resources)
    }
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new()
    }
}

/// Extracts a response's result, translating a JSON-RPC error into
/// [`McpClientError::MethodError`].
fn result_of(method: &str, frame: JsonRpcFrame) -> Result<Value, McpClientError> {
    if let Some(error) = frame.error {
        return Err(McpClientError::MethodError {
            method: method.to_string(),
            message: error.message,
        });
    }
    frame
        .result
        .ok_or_else(|| McpClientError::FrameParse(format!("missing result for {method}")))
}
