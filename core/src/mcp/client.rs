//! Tool client.
//!
//! Connects to a tool server, performs the handshake, caches the tool listing
//! and forwards calls. Implements [`ToolBackend`] so the agent can use remote
//! tools exactly like local ones.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;
use tokio::sync::Mutex;

use crate::error::{McpError, Result, ToolError};
use crate::mcp::transport::{McpTransport, ProcessTransport};
use crate::mcp::types::*;
use crate::tools::{ToolBackend, ToolCall, ToolSchema, NO_RESULT};

/// Client name reported during `initialize`
pub const CLIENT_NAME: &str = "paperchat-client";

struct Connection<T> {
    transport: T,
    next_id: i64,
}

/// A connected tool server.
pub struct McpToolBackend<T: McpTransport = ProcessTransport> {
    connection: Mutex<Connection<T>>,
    timeout: Duration,
    tools: Vec<ToolSchema>,
}

impl McpToolBackend<ProcessTransport> {
    /// Spawn a server process and connect to it.
    pub async fn spawn(program: &str, args: &[String], timeout: Duration) -> Result<Self> {
        let transport = ProcessTransport::spawn(program, args)?;
        Self::connect(transport, timeout).await
    }
}

impl<T: McpTransport> McpToolBackend<T> {
    /// Run the handshake over `transport` and discover the server's tools.
    pub async fn connect(transport: T, timeout: Duration) -> Result<Self> {
        let mut backend = Self {
            connection: Mutex::new(Connection {
                transport,
                next_id: 1,
            }),
            timeout,
            tools: Vec::new(),
        };

        backend.initialize().await?;
        backend.discover_tools().await?;
        Ok(backend)
    }

    /// Tools advertised by the server at connect time
    pub fn tools(&self) -> &[ToolSchema] {
        &self.tools
    }

    async fn initialize(&mut self) -> Result<()> {
        let params = InitializeParams {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: json!({}),
            client_info: PeerInfo {
                name: CLIENT_NAME.to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            },
        };

        let result: InitializeResult = self
            .request(METHOD_INITIALIZE, Some(serde_json::to_value(params)?))
            .await
            .and_then(|value| Ok(serde_json::from_value(value)?))
            .map_err(|e| McpError::ServerUnavailable(e.to_string()))?;

        if result.protocol_version != PROTOCOL_VERSION {
            tracing::warn!(
                server = %result.protocol_version,
                client = PROTOCOL_VERSION,
                "protocol version mismatch"
            );
        }

        self.notify(METHOD_INITIALIZED).await?;
        tracing::info!(server = %result.server_info.name, "tool server initialized");
        Ok(())
    }

    async fn discover_tools(&mut self) -> Result<()> {
        let value = self.request(METHOD_LIST_TOOLS, None).await?;
        let result: ListToolsResult = serde_json::from_value(value)?;

        for tool in &result.tools {
            tracing::debug!(name = %tool.name, "discovered tool");
        }
        tracing::info!(count = result.tools.len(), "tool discovery complete");

        self.tools = result.tools;
        Ok(())
    }

    /// Call a tool on the server.
    pub async fn call_tool(&self, name: &str, arguments: Value) -> Result<CallToolResult> {
        let params = serde_json::to_value(CallToolParams {
            name: name.to_string(),
            arguments,
        })?;
        let value = self.request(METHOD_CALL_TOOL, Some(params)).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Send a request and wait for the response with the same id.
    async fn request(&self, method: &str, params: Option<Value>) -> Result<Value> {
        let mut connection = self.connection.lock().await;
        let id = connection.next_id;
        connection.next_id += 1;

        let request = JsonRpcRequest::new(RpcId::Number(id), method, params);
        let json = serde_json::to_string(&request)?;
        tracing::debug!(method = %method, id = id, "sending request");

        let exchange = exchange(&mut connection.transport, &json, id);
        let response = tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| McpError::Timeout {
                method: method.to_string(),
            })??;

        if let Some(err) = response.error {
            return Err(McpError::Remote {
                code: err.code,
                message: err.message,
            }
            .into());
        }
        response
            .result
            .ok_or_else(|| McpError::InvalidRequest("response has no result".to_string()).into())
    }

    async fn notify(&self, method: &str) -> Result<()> {
        let notification = JsonRpcNotification::new(method, None);
        let json = serde_json::to_string(&notification)?;
        let mut connection = self.connection.lock().await;
        connection.transport.send(&json).await
    }
}

/// Write `json` and read lines until the response for `id` arrives.
async fn exchange<T: McpTransport>(
    transport: &mut T,
    json: &str,
    id: i64,
) -> Result<JsonRpcResponse> {
    transport.send(json).await?;
    loop {
        let line = transport
            .receive()
            .await?
            .ok_or_else(|| McpError::Transport("server closed the connection".to_string()))?;

        let response: JsonRpcResponse = match serde_json::from_str(&line) {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!(error = %e, "skipping non-response line");
                continue;
            }
        };
        if response.id == RpcId::Number(id) {
            return Ok(response);
        }
        tracing::debug!(id = ?response.id, "skipping response for another request");
    }
}

#[async_trait]
impl<T: McpTransport> ToolBackend for McpToolBackend<T> {
    async fn list_tools(&self) -> Result<Vec<ToolSchema>> {
        Ok(self.tools.clone())
    }

    async fn invoke(&self, call: &ToolCall) -> Result<String> {
        let result = self.call_tool(&call.name, call.arguments.clone()).await?;
        let text = result.joined_text();

        if result.is_error {
            return Err(ToolError::ExecutionFailed {
                name: call.name.clone(),
                message: text.unwrap_or_default(),
            }
            .into());
        }

        // Already normalized by the server
        Ok(match text {
            Some(text) if !text.is_empty() => text,
            _ => NO_RESULT.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::mcp::server::McpServer;
    use crate::mcp::transport::ChannelTransport;
    use crate::papers::PaperStore;
    use crate::tools::builtin::tests::StaticSource;
    use crate::tools::{paper_tools, ToolExecutor};
    use std::sync::Arc;
    use tempfile::TempDir;

    async fn connected(dir: &TempDir) -> McpToolBackend<ChannelTransport> {
        let registry = paper_tools(
            Arc::new(StaticSource::new()),
            PaperStore::new(dir.path()),
        )
        .unwrap();
        let mut server = McpServer::new(ToolExecutor::new(Arc::new(registry)));
        let (client_side, mut server_side) = ChannelTransport::pair();
        tokio::spawn(async move { server.run(&mut server_side).await });

        McpToolBackend::connect(client_side, Duration::from_secs(5))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_connect_discovers_tools() {
        let dir = TempDir::new().unwrap();
        let backend = connected(&dir).await;
        let names: Vec<_> = backend
            .list_tools()
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, vec!["search_papers", "extract_info"]);
    }

    #[tokio::test]
    async fn test_remote_matches_local_results() {
        let dir = TempDir::new().unwrap();
        let backend = connected(&dir).await;

        let search = ToolCall::new("search_papers", json!({"topic": "graph theory", "max_results": 3}));
        assert_eq!(
            backend.invoke(&search).await.unwrap(),
            "2401.00001v1, 2401.00002v1, 2401.00003v1"
        );

        let extract = ToolCall::new("extract_info", json!({"paper_id": "2401.00002v1"}));
        let record: Value = serde_json::from_str(&backend.invoke(&extract).await.unwrap()).unwrap();
        assert_eq!(record["title"], "Paper 2");

        let missing = ToolCall::new("extract_info", json!({"paper_id": "0000.00000"}));
        assert_eq!(backend.invoke(&missing).await.unwrap(), NO_RESULT);
    }

    #[tokio::test]
    async fn test_remote_error_maps_to_execution_failure() {
        let dir = TempDir::new().unwrap();
        let backend = connected(&dir).await;

        let call = ToolCall::new("no_such_tool", json!({}));
        let err = backend.invoke(&call).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Tool(ToolError::ExecutionFailed { ref name, .. }) if name == "no_such_tool"
        ));
    }

    #[tokio::test]
    async fn test_request_times_out() {
        let (client_side, _server_side) = ChannelTransport::pair();
        let result = McpToolBackend::connect(client_side, Duration::from_millis(50)).await;
        assert!(matches!(
            result,
            Err(Error::Mcp(McpError::ServerUnavailable(_)))
        ));
    }

    #[tokio::test]
    async fn test_skips_unrelated_lines() {
        let (client_side, mut server_side) = ChannelTransport::pair();
        tokio::spawn(async move {
            // initialize
            let line = server_side.receive().await.unwrap().unwrap();
            let req: JsonRpcRequest = serde_json::from_str(&line).unwrap();
            server_side.send("garbage").await.unwrap();
            let stale = JsonRpcResponse::success(RpcId::Number(99), json!({}));
            server_side
                .send(&serde_json::to_string(&stale).unwrap())
                .await
                .unwrap();
            let init = json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": {},
                "serverInfo": {"name": "fake"}
            });
            let resp = JsonRpcResponse::success(req.id, init);
            server_side
                .send(&serde_json::to_string(&resp).unwrap())
                .await
                .unwrap();

            // notifications/initialized, then tools/list
            let _ = server_side.receive().await.unwrap().unwrap();
            let line = server_side.receive().await.unwrap().unwrap();
            let req: JsonRpcRequest = serde_json::from_str(&line).unwrap();
            let resp = JsonRpcResponse::success(req.id, json!({"tools": []}));
            server_side
                .send(&serde_json::to_string(&resp).unwrap())
                .await
                .unwrap();

            // keep the channel open until the client is done
            let _ = server_side.receive().await;
        });

        let backend = McpToolBackend::connect(client_side, Duration::from_secs(5))
            .await
            .unwrap();
        assert!(backend.tools().is_empty());
    }
}
