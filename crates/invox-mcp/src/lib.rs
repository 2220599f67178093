//! Invox MCP Client
//!
//! Model Context Protocol client for the external tool-execution session.
//! Spawns the configured MCP server as a child process and speaks JSON-RPC
//! 2.0 over its stdio, newline-delimited.
//!
//! The session is acquired once per batch and released when dropped; the
//! child process is killed either way, so a failed batch cannot leak it.
//!
//! # Example
//!
//! ```no_run
//! use invox_mcp::McpSession;
//! use invox_domain::traits::ToolSession;
//!
//! # async fn example() -> Result<(), invox_mcp::McpError> {
//! let mut session = McpSession::spawn("uv", &["run".into(), "server.py".into()]).await?;
//! let tools = session.list_tools().await?;
//! println!("{} tools advertised", tools.len());
//! session.shutdown().await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod error;
mod protocol;
mod session;

use async_trait::async_trait;
use invox_domain::traits::ToolSession;
use invox_domain::{ContentFragment, ToolCapability};
use serde_json::Value;
use std::sync::{Arc, Mutex};

pub use error::McpError;
pub use session::McpSession;

/// Mock tool session for deterministic testing
///
/// Advertises a fixed tool list and returns scripted fragments per tool
/// name, recording every call so tests can assert the relay forwarded the
/// name and arguments verbatim.
#[derive(Clone, Default)]
pub struct MockSession {
    tools: Vec<ToolCapability>,
    fragments: Arc<Mutex<std::collections::HashMap<String, Vec<ContentFragment>>>>,
    calls: Arc<Mutex<Vec<(String, Value)>>>,
}

impl MockSession {
    /// Create a session advertising the given tools.
    pub fn new(tools: Vec<ToolCapability>) -> Self {
        Self {
            tools,
            ..Self::default()
        }
    }

    /// Script the fragments returned for one tool name.
    pub fn add_result(&mut self, tool: impl Into<String>, fragments: Vec<ContentFragment>) {
        self.fragments
            .lock()
            .unwrap()
            .insert(tool.into(), fragments);
    }

    /// Every `call_tool` invocation, in order.
    pub fn recorded_calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ToolSession for MockSession {
    type Error = McpError;

    async fn list_tools(&mut self) -> Result<Vec<ToolCapability>, Self::Error> {
        Ok(self.tools.clone())
    }

    async fn call_tool(
        &mut self,
        name: &str,
        arguments: Value,
    ) -> Result<Vec<ContentFragment>, Self::Error> {
        self.calls
            .lock()
            .unwrap()
            .push((name.to_string(), arguments));

        Ok(self
            .fragments
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .unwrap_or_default())
    }
}
