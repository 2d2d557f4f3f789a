// mcpgate-client/src/lib.rs
// ============================================================================
// Module: MCP Gate Client Library
// Description: Public API surface for the stdio MCP client and scanner.
// Purpose: Expose argv tokenization, the JSON-RPC frame client, and the
//          Scanner that produces a ScanReport.
// Dependencies: crate::{argv, error, jsonrpc, scanner, stdio}
// ============================================================================

//! ## Overview
//! Everything here talks to a single untrusted child process over stdio.
//! There is no network, no filesystem state beyond transient process
//! handles, and no shared mutable state outside a per-scan response map.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod argv;
pub mod error;
pub mod jsonrpc;
pub mod scanner;
pub mod stdio;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use argv::ArgvError;
pub use argv::tokenize;

pub use error::McpClientError;

pub use jsonrpc::JsonRpcErrorPayload;
pub use jsonrpc::JsonRpcFrame;
pub use jsonrpc::JsonRpcNotification;
pub use jsonrpc::JsonRpcRequest;

pub use scanner::ClientInfo;
pub use scanner::DEFAULT_SCAN_TIMEOUT;
pub use scanner::Scanner;
pub use scanner::SHUTDOWN_GRACE;

pub use stdio::MAX_FRAME_BYTES;
pub use stdio::MAX_PENDING_FRAMES;
pub use stdio::PROTOCOL_VERSION;
pub use stdio::StdioMcpClient;
