// MCP server: JSON-RPC dispatch over a line transport

use crate::error::{McpError, ToolError};
use crate::protocol::*;
use crate::tools::{Tool, ToolRegistry};
use crate::transport::{Inbound, McpTransport};
use plaid_sdk::{HostConfig, SessionConfigHolder};
use serde_json::Value;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

/// Notification carrying a replacement session configuration.
pub const CONFIGURATION_NOTIFICATION: &str = "notifications/configuration";

pub struct McpServer {
    registry: Arc<ToolRegistry>,
    session: Arc<SessionConfigHolder>,
    server_name: String,
    server_version: String,
}

/// A validated `tools/call`, ready to run.
struct PendingCall {
    id: Value,
    name: String,
    tool: Arc<dyn Tool>,
    arguments: Value,
}

impl McpServer {
    pub fn new(registry: ToolRegistry, session: Arc<SessionConfigHolder>) -> Self {
        Self {
            registry: Arc::new(registry),
            session,
            server_name: "plaid".to_string(),
            server_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Serve until the transport closes.
    ///
    /// Tool calls run as separate tasks so a slow Plaid call does not hold up
    /// other requests; their responses are written as they complete. Calls
    /// still running when input ends are drained before returning.
    pub async fn run<T: McpTransport>(&mut self, transport: &mut T) -> Result<(), McpError> {
        info!(server = %self.server_name, tools = self.registry.len(), "MCP server starting");
        let mut calls: JoinSet<JsonRpcResponse> = JoinSet::new();

        loop {
            tokio::select! {
                incoming = transport.receive() => {
                    let response = match incoming? {
                        Some(Inbound::Message(line)) => self.handle_message(&line, &mut calls).await,
                        Some(Inbound::Malformed(reason)) => {
                            warn!(reason = %reason, "Unreadable input line");
                            Some(JsonRpcResponse::error(Value::Null, JsonRpcError::parse_error()))
                        }
                        None => {
                            info!("Transport closed, shutting down");
                            break;
                        }
                    };
                    if let Some(response) = response {
                        Self::send_response(transport, &response).await?;
                    }
                }
                Some(finished) = calls.join_next(), if !calls.is_empty() => {
                    Self::finish_call(transport, finished).await?;
                }
            }
        }

        while let Some(finished) = calls.join_next().await {
            Self::finish_call(transport, finished).await?;
        }

        Ok(())
    }

    async fn send_response<T: McpTransport>(
        transport: &mut T,
        response: &JsonRpcResponse,
    ) -> Result<(), McpError> {
        let json = serde_json::to_string(response)?;
        debug!(response = %json, "Sending response");
        transport.send(&json).await
    }

    async fn finish_call<T: McpTransport>(
        transport: &mut T,
        finished: Result<JsonRpcResponse, tokio::task::JoinError>,
    ) -> Result<(), McpError> {
        match finished {
            Ok(response) => Self::send_response(transport, &response).await,
            Err(e) => {
                error!(error = %e, "Tool call task failed");
                Ok(())
            }
        }
    }

    /// Handle one raw line. Tool calls are spawned onto `calls`; everything
    /// else is answered inline.
    async fn handle_message(
        &mut self,
        line: &str,
        calls: &mut JoinSet<JsonRpcResponse>,
    ) -> Option<JsonRpcResponse> {
        let raw: Value = match serde_json::from_str(line) {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "Failed to parse JSON");
                return Some(JsonRpcResponse::error(Value::Null, JsonRpcError::parse_error()));
            }
        };

        let request: JsonRpcRequest = match serde_json::from_value(raw.clone()) {
            Ok(req) => req,
            Err(e) => {
                warn!(error = %e, "Failed to parse JSON-RPC request");
                let id = raw.get("id").cloned().unwrap_or(Value::Null);
                return Some(JsonRpcResponse::error(id, JsonRpcError::invalid_request()));
            }
        };

        // Raw lines are not logged: configuration messages carry the secret.
        debug!(method = %request.method, "Received message");

        if request.is_notification() {
            self.handle_notification(&request).await;
            return None;
        }

        if request.method == "tools/call" {
            let id = request.id.clone().unwrap_or(Value::Null);
            return match self.prepare_call(id, request.params) {
                Ok(call) => {
                    calls.spawn(Self::execute_call(call));
                    None
                }
                Err(response) => Some(response),
            };
        }

        Some(self.handle_request(&request).await)
    }

    /// Handle a single JSON-RPC request and produce its response.
    pub async fn handle_request(&mut self, request: &JsonRpcRequest) -> JsonRpcResponse {
        let id = request.id.clone().unwrap_or(Value::Null);

        match request.method.as_str() {
            "initialize" => self.handle_initialize(id, &request.params).await,
            "ping" => JsonRpcResponse::success(id, serde_json::json!({})),
            "tools/list" => self.handle_list_tools(id),
            "tools/call" => match self.prepare_call(id, request.params.clone()) {
                Ok(call) => Self::execute_call(call).await,
                Err(response) => response,
            },
            method => {
                warn!(method = %method, "Unknown method");
                JsonRpcResponse::error(id, JsonRpcError::method_not_found(method))
            }
        }
    }

    async fn handle_notification(&mut self, notification: &JsonRpcRequest) {
        match notification.method.as_str() {
            "notifications/initialized" => {
                info!("Client confirmed initialization");
            }
            "notifications/cancelled" => {
                debug!("Client cancelled a request");
            }
            CONFIGURATION_NOTIFICATION => {
                let params = notification.params.clone().unwrap_or(Value::Null);
                match serde_json::from_value::<HostConfig>(params) {
                    Ok(config) => {
                        self.session.apply(&config).await;
                    }
                    Err(e) => warn!(error = %e, "Ignoring malformed configuration notification"),
                }
            }
            method => {
                debug!(method = %method, "Unknown notification, ignoring");
            }
        }
    }

    async fn handle_initialize(&mut self, id: Value, params: &Option<Value>) -> JsonRpcResponse {
        info!("Handling initialize");

        if let Some(params) = params {
            match serde_json::from_value::<InitializeParams>(params.clone()) {
                Ok(params) => {
                    info!(
                        client = %params.client_info.name,
                        protocol = %params.protocol_version,
                        "Client connected"
                    );
                    if let Some(config) = params.configuration {
                        self.session.apply(&config).await;
                    }
                }
                Err(e) => {
                    return JsonRpcResponse::error(id, JsonRpcError::invalid_params(e.to_string()));
                }
            }
        }

        let result = InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: false,
                }),
            },
            server_info: ServerInfo {
                name: self.server_name.clone(),
                version: self.server_version.clone(),
            },
        };

        JsonRpcResponse::from_result(id, &result)
    }

    fn handle_list_tools(&self, id: Value) -> JsonRpcResponse {
        debug!("Handling tools/list");
        let result = ListToolsResult {
            tools: self.registry.list_schemas(),
        };
        JsonRpcResponse::from_result(id, &result)
    }

    /// Resolve the tool named by a `tools/call`, or answer with an error.
    fn prepare_call(&self, id: Value, params: Option<Value>) -> Result<PendingCall, JsonRpcResponse> {
        let Some(params) = params else {
            return Err(JsonRpcResponse::error(
                id,
                JsonRpcError::invalid_params("missing params"),
            ));
        };

        let params: CallToolParams = match serde_json::from_value(params) {
            Ok(p) => p,
            Err(e) => {
                return Err(JsonRpcResponse::error(
                    id,
                    JsonRpcError::invalid_params(e.to_string()),
                ))
            }
        };

        let Some(tool) = self.registry.get(&params.name) else {
            return Err(JsonRpcResponse::error(
                id,
                JsonRpcError::invalid_params(format!("Unknown tool: {}", params.name)),
            ));
        };

        Ok(PendingCall {
            id,
            name: params.name,
            tool,
            arguments: params.arguments,
        })
    }

    async fn execute_call(call: PendingCall) -> JsonRpcResponse {
        debug!(tool = %call.name, "Handling tools/call");

        match call.tool.execute(call.arguments).await {
            Ok(result) => JsonRpcResponse::from_result(call.id, &result),
            Err(err) => Self::tool_failure(call.id, &call.name, err),
        }
    }

    /// Argument errors become protocol errors; everything else becomes a tool
    /// result flagged with `isError`.
    fn tool_failure(id: Value, name: &str, err: ToolError) -> JsonRpcResponse {
        match err.to_rpc_error() {
            Some(rpc_error) => {
                warn!(tool = %name, error = %err, "Rejected tool arguments");
                JsonRpcResponse::error(id, rpc_error)
            }
            None => {
                warn!(tool = %name, error = %err, "Tool call failed");
                JsonRpcResponse::from_result(id, &CallToolResult::error(err.to_string()))
            }
        }
    }
}
