//! Tool-execution session over child-process stdio

use crate::error::McpError;
use crate::protocol::{
    CallToolResult, JsonRpcRequest, JsonRpcResponse, ToolListResult, PROTOCOL_VERSION,
};
use async_trait::async_trait;
use invox_domain::traits::ToolSession;
use invox_domain::{ContentFragment, ToolCapability};
use serde_json::{json, Value};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tracing::{debug, warn};

/// MCP session backed by a spawned server process
///
/// Owns the child for its whole lifetime; dropping the session kills the
/// child, so the batch cannot leak the process on early exit.
pub struct McpSession {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    next_id: u64,
}

impl McpSession {
    /// Spawn the server process and run the initialize handshake.
    pub async fn spawn(command: &str, args: &[String]) -> Result<Self, McpError> {
        let mut child = Command::new(command)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()?;

        let stdin = child.stdin.take().ok_or_else(|| {
            McpError::Protocol("Child process stdin unavailable".to_string())
        })?;
        let stdout = child.stdout.take().ok_or_else(|| {
            McpError::Protocol("Child process stdout unavailable".to_string())
        })?;

        let mut session = Self {
            child,
            stdin,
            stdout: BufReader::new(stdout),
            next_id: 1,
        };
        session.initialize().await?;
        Ok(session)
    }

    async fn initialize(&mut self) -> Result<(), McpError> {
        self.request(
            "initialize",
            json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": {},
                "clientInfo": {
                    "name": "invox",
                    "version": env!("CARGO_PKG_VERSION"),
                },
            }),
        )
        .await?;

        self.send(&JsonRpcRequest::notification("notifications/initialized"))
            .await
    }

    /// Terminate the server process.
    pub async fn shutdown(mut self) -> Result<(), McpError> {
        // The server may already have exited once its stdin closed.
        if let Err(e) = self.child.start_kill() {
            if e.kind() != std::io::ErrorKind::InvalidInput {
                return Err(e.into());
            }
        }
        self.child.wait().await?;
        Ok(())
    }

    async fn send(&mut self, request: &JsonRpcRequest) -> Result<(), McpError> {
        let line = serde_json::to_string(request)?;
        debug!("mcp -> {}", line);
        self.stdin.write_all(line.as_bytes()).await?;
        self.stdin.write_all(b"\n").await?;
        self.stdin.flush().await?;
        Ok(())
    }

    /// Issue one request and wait for its response.
    async fn request(&mut self, method: &str, params: Value) -> Result<Value, McpError> {
        let id = self.next_id;
        self.next_id += 1;
        self.send(&JsonRpcRequest::new(id, method, params)).await?;

        let mut line = String::new();
        loop {
            line.clear();
            let read = self.stdout.read_line(&mut line).await?;
            if read == 0 {
                return Err(McpError::SessionClosed);
            }
            if line.trim().is_empty() {
                continue;
            }
            debug!("mcp <- {}", line.trim());

            let response: JsonRpcResponse = match serde_json::from_str(line.trim()) {
                Ok(response) => response,
                Err(e) => {
                    // Server-initiated traffic we do not consume.
                    warn!("Ignoring unparseable MCP line: {}", e);
                    continue;
                }
            };

            match &response.id {
                Some(value) if value == &json!(id) => {}
                _ => continue,
            }

            if let Some(error) = response.error {
                return Err(McpError::Rpc {
                    code: error.code,
                    message: error.message,
                });
            }
            return response
                .result
                .ok_or_else(|| McpError::Protocol("Response carries no result".to_string()));
        }
    }
}

#[async_trait]
impl ToolSession for McpSession {
    type Error = McpError;

    async fn list_tools(&mut self) -> Result<Vec<ToolCapability>, Self::Error> {
        let result = self.request("tools/list", json!({})).await?;
        let list: ToolListResult = serde_json::from_value(result)?;
        Ok(list.tools.into_iter().map(Into::into).collect())
    }

    async fn call_tool(
        &mut self,
        name: &str,
        arguments: Value,
    ) -> Result<Vec<ContentFragment>, Self::Error> {
        let result = self
            .request(
                "tools/call",
                json!({ "name": name, "arguments": arguments }),
            )
            .await?;
        let call: CallToolResult = serde_json::from_value(result)?;
        Ok(call.into_fragments())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    // Canned server: answers the initialize request, swallows the
    // initialized notification, then answers one tools/list request.
    const CANNED_SERVER: &str = r#"
read line
printf '%s\n' '{"jsonrpc":"2.0","id":1,"result":{"protocolVersion":"2024-11-05","serverInfo":{"name":"canned","version":"0"},"capabilities":{}}}'
read line
read line
printf '%s\n' '{"jsonrpc":"2.0","id":2,"result":{"tools":[{"name":"box_ai_extract_tool","description":"Extract fields","inputSchema":{"type":"object"}}]}}'
"#;

    #[tokio::test]
    async fn test_handshake_and_tool_listing() {
        let mut session = McpSession::spawn("sh", &["-c".to_string(), CANNED_SERVER.to_string()])
            .await
            .unwrap();

        let tools = session.list_tools().await.unwrap();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].name, "box_ai_extract_tool");

        session.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_server_exit_surfaces_as_session_closed() {
        // Server answers initialize, then exits; the next request fails.
        let script = r#"
read line
printf '%s\n' '{"jsonrpc":"2.0","id":1,"result":{"protocolVersion":"2024-11-05","serverInfo":{"name":"canned","version":"0"},"capabilities":{}}}'
read line
"#;
        let mut session = McpSession::spawn("sh", &["-c".to_string(), script.to_string()])
            .await
            .unwrap();

        let result = session.list_tools().await;
        assert!(matches!(result, Err(McpError::SessionClosed)));
    }
}
