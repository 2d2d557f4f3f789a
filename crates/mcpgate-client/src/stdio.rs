// mcpgate-client/src/stdio.rs
// ============================================================================
// Module: Stdio MCP Client
// Description: Framed JSON-RPC client over a child process's stdin/stdout.
// Purpose: Speak the MCP handshake and enumeration calls to an untrusted
//          server without ever involving a shell.
// Dependencies: tokio (process, io-util, sync), serde_json
// ============================================================================

//! ## Overview
//! Each frame is a single UTF-8 JSON object terminated by `\n` (spec.md
//! §4.1). A dedicated reader task owns the child's stdout and forwards
//! decoded frames to the driver over a capacity-bounded channel; the driver
//! owns stdin and the request-id counter, and is the only writer.

use std::process::Stdio;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tokio::io::AsyncBufReadExt;
use tokio::io::AsyncWriteExt;
use tokio::io::BufReader;
use tokio::process::Child;
use tokio::process::ChildStdin;
use tokio::process::Command;
use tokio::sync::mpsc;
use tokio::time::timeout;

use crate::error::McpClientError;
use crate::jsonrpc::JsonRpcFrame;
use crate::jsonrpc::JsonRpcNotification;
use crate::jsonrpc::JsonRpcRequest;

/// Maximum bytes accepted for a single frame before the scan fails.
pub const MAX_FRAME_BYTES: usize = 16 * 1024 * 1024;

/// Pending-frame channel capacity; exceeding it aborts the scan (spec.md §5).
pub const MAX_PENDING_FRAMES: usize = 1024;

/// MCP protocol version this client declares during `initialize`.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// A stdio-framed JSON-RPC client speaking to a child MCP server.
///
/// # Invariants
/// - `next_id` is strictly increasing across the client's lifetime.
/// - Only the driver (this struct) writes to the child's stdin; only the
///   reader task reads its stdout.
pub struct StdioMcpClient {
    /// Handle to the spawned child process.
    child: Child,
    /// The child's stdin; the driver is the sole writer.
    stdin: ChildStdin,
    /// Decoded frames forwarded by the reader task.
    frames: mpsc::Receiver<Result<JsonRpcFrame, McpClientError>>,
    /// Frames received out of order relative to the request currently
    /// awaited, buffered until their matching request claims them.
    pending: Vec<JsonRpcFrame>,
    /// Next JSON-RPC request id to assign; strictly increasing.
    next_id: u64,
}

impl StdioMcpClient {
    /// Spawns `argv[0]` with the remaining elements as arguments, attaching
    /// to its stdin/stdout and starting the reader task.
    ///
    /// # Errors
    ///
    /// Returns [`McpClientError::Spawn`] when the process cannot be started.
    pub fn spawn(argv: &[String]) -> Result<Self, McpClientError> {
        let Some((program, args)) = argv.split_first() else {
            return Err(McpClientError::Spawn("empty argv".to_string()));
        };
        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        let mut child = command
            .spawn()
            .map_err(|err| McpClientError::Spawn(err.to_string()))?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| McpClientError::Spawn("missing child stdin".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| McpClientError::Spawn("missing child stdout".to_string()))?;

        let (tx, rx) = mpsc::channel(MAX_PENDING_FRAMES);
        tokio::spawn(read_frames(BufReader::new(stdout), tx));

        Ok(Self {
            child,
            stdin,
            frames: rx,
            pending: Vec::new(),
            next_id: 1,
        })
    }

    /// Sends a request and awaits its matching response, ignoring
    /// server-initiated notifications along the way.
    ///
    /// # Errors
    ///
    /// Returns [`McpClientError`] on I/O failure, a parse failure, a closed
    /// channel (abnormal exit or channel overflow), or a timeout.
    pub async fn request(
        &mut self,
        method: &str,
        params: Option<Value>,
        deadline: Duration,
    ) -> Result<JsonRpcFrame, McpClientError> {
        let id = self.next_id;
        self.next_id += 1;
        let request = JsonRpcRequest::new(id, method, params);
        self.write_frame(&request).await?;
        timeout(deadline, self.await_response(id))
            .await
            .map_err(|_| McpClientError::HandshakeTimeout)?
    }

    /// Sends a fire-and-forget notification (no response expected).
    ///
    /// # Errors
    ///
    /// Returns [`McpClientError`] on write failure.
    pub async fn notify(&mut self, method: &str, params: Option<Value>) -> Result<(), McpClientError> {
        let notification = JsonRpcNotification::new(method, params);
        self.write_frame(&notification).await
    }

    /// Awaits the response frame matching `id`, buffering any mismatched
    /// frames (notifications, or responses to concurrent requests) that
    /// arrive first.
    async fn await_response(&mut self, id: u64) -> Result<JsonRpcFrame, McpClientError> {
        if let Some(pos) = self
            .pending
            .iter()
            .position(|frame| frame.id == Some(id))
        {
            return Ok(self.pending.remove(pos));
        }
        loop {
            let frame = self
                .frames
                .recv()
                .await
                .ok_or(McpClientError::ChannelOverflow(MAX_PENDING_FRAMES))??;
            if frame.id == Some(id) {
                return Ok(frame);
            }
            self.pending.push(frame);
        }
    }

    /// Serializes and writes one frame, newline-terminated.
    async fn write_frame<T: Serialize>(&mut self, value: &T) -> Result<(), McpClientError> {
        let mut bytes = serde_json::to_vec(value)
            .map_err(|err| McpClientError::FrameParse(err.to_string()))?;
        bytes.push(b'\n');
        self.stdin.write_all(&bytes).await?;
        self.stdin.flush().await?;
        Ok(())
    }

    /// Sends `notifications/initialized` and begins graceful shutdown of the
    /// child: close stdin, wait with a grace period, then escalate signals.
    ///
    /// # Errors
    ///
    /// Returns [`McpClientError`] only for I/O failures on the shutdown write;
    /// process-termination failures are best-effort and never returned.
    pub async fn shutdown(mut self, grace: Duration) -> Result<(), McpClientError> {
        drop(self.stdin.shutdown().await);
        if timeout(grace, self.child.wait()).await.is_err() {
            let _ = self.child.start_kill();
        }
        Ok(())
    }
}

/// Reader task: reads newline-delimited frames from the child's stdout and
/// forwards decoded [`JsonRpcFrame`]s to the driver. Non-JSON lines are
/// dropped silently (spec.md §4.1: "any non-JSON bytes on stdout are logged
/// and ignored"). The task exits when stdout closes or the channel fills.
async fn read_frames(
    mut reader: BufReader<tokio::process::ChildStdout>,
    tx: mpsc::Sender<Result<JsonRpcFrame, McpClientError>>,
) {
    let mut line = String::new();
    loop {
        line.clear();
        let read = reader.read_line(&mut line).await;
        match read {
            Ok(0) => return,
            Ok(_) if line.len() > MAX_FRAME_BYTES => {
                let _ = tx
                    .try_send(Err(McpClientError::FrameOversize {
                        cap: MAX_FRAME_BYTES,
                    }));
                return;
            }
            Ok(_) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                match serde_json::from_str::<JsonRpcFrame>(trimmed) {
                    Ok(frame) => {
                        if tx.try_send(Ok(frame)).is_err() {
                            return;
                        }
                    }
                    Err(_) => continue,
                }
            }
            Err(err) => {
                let _ = tx.try_send(Err(McpClientError::Io(err)));
                return;
            }
        }
    }
}
