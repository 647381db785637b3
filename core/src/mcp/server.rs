//! Tool server.
//!
//! Wraps a [`ToolExecutor`] and serves its tools over JSON-RPC. Tool results
//! are normalized here, before they go on the wire.

use serde_json::Value;

use crate::error::{Error, McpError, Result};
use crate::mcp::transport::McpTransport;
use crate::mcp::types::*;
use crate::tools::{ToolCall, ToolExecutor};

/// Server name reported during `initialize`
pub const SERVER_NAME: &str = "paperchat";

/// Serves a tool executor to a single client.
pub struct McpServer {
    executor: ToolExecutor,
    server_name: String,
    server_version: String,
    initialized: bool,
}

impl McpServer {
    pub fn new(executor: ToolExecutor) -> Self {
        Self {
            executor,
            server_name: SERVER_NAME.to_string(),
            server_version: env!("CARGO_PKG_VERSION").to_string(),
            initialized: false,
        }
    }

    /// Whether a client has completed `initialize`
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Run the server loop until the transport is closed.
    pub async fn run<T: McpTransport>(&mut self, transport: &mut T) -> Result<()> {
        tracing::info!(server = %self.server_name, "tool server starting");

        while let Some(line) = transport.receive().await? {
            tracing::debug!(message = %line, "received message");

            // Requests carry an id, notifications do not.
            let raw: Value = match serde_json::from_str(&line) {
                Ok(v) => v,
                Err(e) => {
                    tracing::warn!(error = %e, "failed to parse JSON");
                    let err = McpError::Parse(e.to_string());
                    let resp = JsonRpcResponse::error(RpcId::Number(0), err.code(), err.to_string());
                    transport.send(&serde_json::to_string(&resp)?).await?;
                    continue;
                }
            };

            if raw.get("id").is_none() {
                if let Ok(notification) = serde_json::from_value::<JsonRpcNotification>(raw) {
                    self.handle_notification(&notification);
                }
                continue;
            }

            let response = match serde_json::from_value::<JsonRpcRequest>(raw) {
                Ok(request) => self.handle_request(&request).await,
                Err(e) => {
                    tracing::warn!(error = %e, "invalid JSON-RPC request");
                    let err = McpError::InvalidRequest(e.to_string());
                    JsonRpcResponse::error(RpcId::Number(0), err.code(), err.to_string())
                }
            };

            let json = serde_json::to_string(&response)?;
            tracing::debug!(response = %json, "sending response");
            transport.send(&json).await?;
        }

        tracing::info!("transport closed, shutting down");
        Ok(())
    }

    /// Handle a single request and produce its response.
    pub async fn handle_request(&mut self, request: &JsonRpcRequest) -> JsonRpcResponse {
        let id = request.id.clone();

        let result = match request.method.as_str() {
            METHOD_INITIALIZE => self.handle_initialize(&request.params),
            METHOD_LIST_TOOLS => self.handle_list_tools(),
            METHOD_CALL_TOOL => self.handle_call_tool(&request.params).await,
            method => {
                tracing::warn!(method = %method, "unknown method");
                Err(McpError::MethodNotFound(method.to_string()))
            }
        };

        match result {
            Ok(value) => JsonRpcResponse::success(id, value),
            Err(err) => JsonRpcResponse::error(id, err.code(), err.to_string()),
        }
    }

    fn handle_notification(&mut self, notification: &JsonRpcNotification) {
        match notification.method.as_str() {
            METHOD_INITIALIZED => tracing::info!("client confirmed initialization"),
            method => tracing::debug!(method = %method, "ignoring notification"),
        }
    }

    fn handle_initialize(&mut self, params: &Option<Value>) -> std::result::Result<Value, McpError> {
        if let Some(params) = params {
            match serde_json::from_value::<InitializeParams>(params.clone()) {
                Ok(p) => tracing::info!(
                    client = %p.client_info.name,
                    protocol = %p.protocol_version,
                    "initialize"
                ),
                Err(e) => return Err(McpError::InvalidParams(e.to_string())),
            }
        }
        self.initialized = true;

        let result = InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: false,
                }),
            },
            server_info: PeerInfo {
                name: self.server_name.clone(),
                version: Some(self.server_version.clone()),
            },
        };
        to_value(result)
    }

    fn handle_list_tools(&self) -> std::result::Result<Value, McpError> {
        let tools = self.executor.registry().schemas();
        tracing::debug!(count = tools.len(), "tools/list");
        to_value(ListToolsResult { tools })
    }

    async fn handle_call_tool(&self, params: &Option<Value>) -> std::result::Result<Value, McpError> {
        let params = params
            .as_ref()
            .ok_or_else(|| McpError::InvalidParams("missing params".to_string()))?;
        let params: CallToolParams = serde_json::from_value(params.clone())
            .map_err(|e| McpError::InvalidParams(e.to_string()))?;

        let arguments = if params.arguments.is_null() {
            Value::Object(Default::default())
        } else {
            params.arguments
        };
        let call = ToolCall::new(params.name, arguments);
        tracing::info!(tool = %call.name, "tools/call");

        let result = match self.executor.execute(&call).await {
            Ok(content) => CallToolResult::text(content, false),
            Err(Error::Tool(e)) => CallToolResult::text(e.to_string(), true),
            Err(e) => CallToolResult::text(e.to_string(), true),
        };
        to_value(result)
    }
}

fn to_value<T: serde::Serialize>(value: T) -> std::result::Result<Value, McpError> {
    serde_json::to_value(value).map_err(|e| McpError::Parse(e.to_string()))
}
