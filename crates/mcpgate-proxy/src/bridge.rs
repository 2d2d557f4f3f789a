// mcpgate-proxy/src/bridge.rs
// ============================================================================
// Module: Bidirectional Bridge
// Description: The two cooperative tasks that relay line-delimited JSON
//              frames between host and server, enforcing the allowlist on
//              the way in and filtering capability lists on the way out.
// Purpose: spec.md §4.4 steady-state bridging.
// Dependencies: tokio::io, serde_json, crate::{allowlist, correlation}
// ============================================================================

use std::sync::Arc;

use serde_json::Value;
use serde_json::json;
use tokio::io::AsyncBufReadExt;
use tokio::io::AsyncRead;
use tokio::io::AsyncWrite;
use tokio::io::AsyncWriteExt;
use tokio::io::BufReader;

use crate::allowlist::Allowlist;
use crate::correlation::CorrelationTable;

/// JSON-RPC error code synthesized for a blocked call, per spec.md §4.4.
const CAPABILITY_NOT_ALLOWLISTED: i64 = -32001;

/// Methods whose call is gated by the allowlist.
const GATED_METHODS: [&str; 3] = ["tools/call", "prompts/get", "resources/read"];

/// Methods whose list response is filtered by the allowlist.
const FILTERED_METHODS: [&str; 4] = [
    "tools/list",
    "prompts/list",
    "resources/templates/list",
    "resources/list",
];

/// How the bridge reacts to a capability miss.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Block calls and filter lists.
    Enforce,
    /// Never block or filter; log what would have been denied.
    AuditOnly,
    /// Filter lists but forward calls that would otherwise be blocked.
    FilterOnly,
}

impl Mode {
    /// Whether a capability miss on a call should actually be blocked.
    const fn blocks_calls(self) -> bool {
        matches!(self, Self::Enforce)
    }

    /// Whether list responses should be filtered.
    const fn filters_lists(self) -> bool {
        matches!(self, Self::Enforce | Self::FilterOnly)
    }
}

/// Reads host-issued frames from `host_in`, enforces the allowlist on gated
/// calls, and writes the (possibly rewritten) frame to `server_out`.
///
/// # Errors
///
/// Returns an I/O error from the underlying reader or writer.
pub async fn host_to_server<R, W, H>(
    host_in: R,
    mut server_out: W,
    mut host_out: H,
    allowlist: &Allowlist,
    correlation: &Arc<CorrelationTable>,
    mode: Mode,
) -> std::io::Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
    H: AsyncWrite + Unpin,
{
    let mut lines = BufReader::new(host_in).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let Ok(frame) = serde_json::from_str::<Value>(&line) else {
            write_line(&mut server_out, &line).await?;
            continue;
        };

        let method = frame.get("method").and_then(Value::as_str).map(str::to_string);
        let id = frame.get("id").cloned();

        if let Some(method) = &method {
            if GATED_METHODS.contains(&method.as_str()) {
                let identifier = target_identifier(method, &frame);
                let allowed = identifier
                    .as_deref()
                    .is_some_and(|target| is_allowed(method, target, allowlist));

                if !allowed {
                    if mode.blocks_calls() {
                        tracing::info!(method = %method, identifier = identifier.as_deref().unwrap_or(""), "blocked capability call");
                        if let Some(id) = id {
                            let response = json!({
                                "jsonrpc": "2.0",
                                "id": id,
                                "error": {
                                    "code": CAPABILITY_NOT_ALLOWLISTED,
                                    "message": "capability not allowlisted",
                                }
                            });
                            write_value(&mut host_out, &response).await?;
                        }
                        continue;
                    }
                    tracing::info!(method = %method, identifier = identifier.as_deref().unwrap_or(""), "would block capability call (audit-only/filter-only)");
                }
            }
            if let Some(id) = &id {
                correlation.insert(id, method).await;
            }
        }

        write_line(&mut server_out, &line).await?;
    }
    Ok(())
}

/// Reads server-issued frames from `server_in`, filters capability lists
/// whose request correlates to a tracked method, and writes the result to
/// `host_out`.
///
/// # Errors
///
/// Returns an I/O error from the underlying reader or writer.
pub async fn server_to_host<R, W>(
    server_in: R,
    mut host_out: W,
    allowlist: &Allowlist,
    correlation: &Arc<CorrelationTable>,
    mode: Mode,
) -> std::io::Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = BufReader::new(server_in).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let Ok(mut frame) = serde_json::from_str::<Value>(&line) else {
            write_line(&mut host_out, &line).await?;
            continue;
        };

        if let Some(id) = frame.get("id").cloned() {
            if let Some(method) = correlation.take(&id).await {
                if FILTERED_METHODS.contains(&method.as_str()) && mode.filters_lists() {
                    filter_list_result(&method, &mut frame, allowlist);
                }
            }
        }

        write_value(&mut host_out, &frame).await?;
    }
    Ok(())
}

/// Extracts the tool name, prompt name, or resource URI a gated call names.
fn target_identifier(method: &str, frame: &Value) -> Option<String> {
    let params = frame.get("params")?;
    match method {
        "tools/call" | "prompts/get" => params.get("name").and_then(Value::as_str).map(str::to_string),
        "resources/read" => params.get("uri").and_then(Value::as_str).map(str::to_string),
        _ => None,
    }
}

/// Checks `target` against the allowlist rule matching `method`.
fn is_allowed(method: &str, target: &str, allowlist: &Allowlist) -> bool {
    match method {
        "tools/call" => allowlist.allows_tool(target),
        "prompts/get" => allowlist.allows_prompt(target),
        "resources/read" => allowlist.allows_resource(target),
        _ => false,
    }
}

/// Drops unlisted entries from a list response's result array in place.
fn filter_list_result(method: &str, frame: &mut Value, allowlist: &Allowlist) {
    let Some(result) = frame.get_mut("result") else {
        return;
    };
    match method {
        "tools/list" => retain_named(result, "tools", |name| allowlist.allows_tool(name)),
        "prompts/list" => retain_named(result, "prompts", |name| allowlist.allows_prompt(name)),
        "resources/templates/list" => retain_field(result, "resourceTemplates", "uriTemplate", |uri| {
            allowlist.allows_template_uri(uri)
        }),
        "resources/list" => {
            if allowlist.allow_static_resources() {
                retain_field(result, "resources", "uri", |uri| {
                    allowlist.static_resource_uris().contains(uri)
                });
            } else if let Some(array) = result.get_mut("resources").and_then(Value::as_array_mut) {
                array.clear();
            }
        }
        _ => {}
    }
}

/// Retains entries of `result[field]` whose `"name"` satisfies `keep`.
fn retain_named(result: &mut Value, field: &str, keep: impl Fn(&str) -> bool) {
    retain_field(result, field, "name", keep);
}

/// Retains entries of `result[field]` whose `key` property satisfies `keep`.
fn retain_field(result: &mut Value, field: &str, key: &str, keep: impl Fn(&str) -> bool) {
    if let Some(array) = result.get_mut(field).and_then(Value::as_array_mut) {
        array.retain(|entry| entry.get(key).and_then(Value::as_str).is_some_and(&keep));
    }
}

/// Writes `value` as one line-delimited JSON frame.
async fn write_value<W: AsyncWrite + Unpin>(writer: &mut W, value: &Value) -> std::io::Result<()> {
    let line = serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string());
    write_line(writer, &line).await
}

/// Writes `line` followed by a newline, then flushes.
async fn write_line<W: AsyncWrite + Unpin>(writer: &mut W, line: &str) -> std::io::Result<()> {
    writer.write_all(line.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn target_identifier_reads_name_or_uri() {
        let call = json!({"method": "tools/call", "params": {"name": "echo"}});
        assert_eq!(target_identifier("tools/call", &call).as_deref(), Some("echo"));

        let read = json!({"method": "resources/read", "params": {"uri": "file:///a"}});
        assert_eq!(
            target_identifier("resources/read", &read).as_deref(),
            Some("file:///a")
        );
    }

    #[test]
    fn filter_list_result_drops_unlisted_tools() {
        let mut frame = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": {"tools": [{"name": "echo"}, {"name": "danger"}]}
        });
        let lockfile_tools: std::collections::BTreeSet<String> =
            ["echo".to_string()].into_iter().collect();
        if let Some(result) = frame.get_mut("result") {
            retain_named(result, "tools", |name| lockfile_tools.contains(name));
        }
        let names: Vec<&str> = frame["result"]["tools"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["echo"]);
    }

    #[test]
    fn resources_list_is_emptied_without_the_static_flag() {
        let mut result = json!({"resources": [{"uri": "config://readme", "name": "readme"}]});
        if let Some(array) = result.get_mut("resources").and_then(Value::as_array_mut) {
            array.clear();
        }
        assert!(result["resources"].as_array().unwrap().is_empty());
    }
}
