//! Transport-independent JSON-RPC dispatch for the MCP server.

use {
    serde_json::{Value, json},
    tracing::{debug, info, warn},
};

use crate::{
    handler::{ToolRegistry, ToolResponse},
    types::{
        INVALID_PARAMS, INVALID_REQUEST, InitializeResult, JsonRpcRequest, JsonRpcResponse,
        METHOD_NOT_FOUND, PARSE_ERROR, PROTOCOL_VERSION, ServerCapabilities, ServerInfo,
        ToolContent, ToolsCallParams, ToolsCallResult, ToolsCapability, ToolsListResult,
    },
};

pub struct McpServer {
    name: String,
    version: String,
    registry: ToolRegistry,
}

impl McpServer {
    pub fn new(name: impl Into<String>, registry: ToolRegistry) -> Self {
        Self {
            name: name.into(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            registry,
        }
    }

    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Handle one newline-delimited frame. `None` means nothing is written back.
    pub async fn handle_line(&self, line: &str) -> Option<String> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        let response = match serde_json::from_str::<Value>(line) {
            Ok(value) => self.handle_value(value).await?,
            Err(e) => {
                warn!(error = %e, "unparseable MCP frame");
                JsonRpcResponse::failure(Value::Null, PARSE_ERROR, format!("Parse error: {e}"))
            },
        };
        match serde_json::to_string(&response) {
            Ok(text) => Some(text),
            Err(e) => {
                warn!(error = %e, "failed to encode MCP response");
                None
            },
        }
    }

    /// Handle an already-decoded JSON-RPC message.
    pub async fn handle_value(&self, value: Value) -> Option<JsonRpcResponse> {
        let id = value.get("id").cloned();
        match serde_json::from_value::<JsonRpcRequest>(value) {
            Ok(request) => self.handle(request).await,
            Err(e) => Some(JsonRpcResponse::failure(
                id.unwrap_or(Value::Null),
                INVALID_REQUEST,
                format!("Invalid request: {e}"),
            )),
        }
    }

    pub async fn handle(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let Some(id) = request.id.clone() else {
            debug!(method = %request.method, "MCP notification");
            return None;
        };
        debug!(method = %request.method, %id, "MCP request");

        let response = match request.method.as_str() {
            "initialize" => self.initialize(id),
            "ping" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => self.tools_list(id),
            "tools/call" => self.tools_call(id, request.params).await,
            other => JsonRpcResponse::failure(id, METHOD_NOT_FOUND, format!("Method not found: {other}")),
        };
        Some(response)
    }

    fn initialize(&self, id: Value) -> JsonRpcResponse {
        info!(server = %self.name, "MCP client initialized");
        let result = InitializeResult {
            protocol_version: PROTOCOL_VERSION.into(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: false,
                }),
            },
            server_info: ServerInfo {
                name: self.name.clone(),
                version: Some(self.version.clone()),
            },
        };
        encode(id, &result)
    }

    fn tools_list(&self, id: Value) -> JsonRpcResponse {
        encode(id, &ToolsListResult {
            tools: self.registry.definitions(),
        })
    }

    async fn tools_call(&self, id: Value, params: Option<Value>) -> JsonRpcResponse {
        let params: ToolsCallParams = match serde_json::from_value(params.unwrap_or(Value::Null)) {
            Ok(params) => params,
            Err(e) => {
                return JsonRpcResponse::failure(id, INVALID_PARAMS, format!("Invalid params: {e}"));
            },
        };

        let response = match self.registry.call(&params.name, params.arguments).await {
            Some(response) => response,
            None => {
                warn!(tool = %params.name, "call to unknown tool");
                ToolResponse::error(format!("Unknown tool: {}", params.name))
            },
        };
        let result = ToolsCallResult {
            content: vec![ToolContent::Text {
                text: response.to_value().to_string(),
            }],
            is_error: response.is_error(),
        };
        encode(id, &result)
    }
}

fn encode(id: Value, result: &impl serde::Serialize) -> JsonRpcResponse {
    match serde_json::to_value(result) {
        Ok(value) => JsonRpcResponse::success(id, value),
        Err(e) => JsonRpcResponse::failure(id, INVALID_REQUEST, format!("encode error: {e}")),
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::handler::ToolHandler,
        async_trait::async_trait,
        std::sync::Arc,
    };

    struct Fails;

    #[async_trait]
    impl ToolHandler for Fails {
        fn name(&self) -> &str {
            "fails"
        }

        fn description(&self) -> &str {
            "always fails"
        }

        fn parameters_schema(&self) -> Value {
            json!({"type": "object"})
        }

        async fn call(&self, _args: Value) -> ToolResponse {
            ToolResponse::error("nope")
        }
    }

    struct Greets;

    #[async_trait]
    impl ToolHandler for Greets {
        fn name(&self) -> &str {
            "greet"
        }

        fn description(&self) -> &str {
            "says hi"
        }

        fn parameters_schema(&self) -> Value {
            json!({"type": "object"})
        }

        async fn call(&self, args: Value) -> ToolResponse {
            ToolResponse::success().with("hello", args["who"].clone())
        }
    }

    fn server() -> McpServer {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(Greets));
        registry.register(Arc::new(Fails));
        McpServer::new("Test Tools", registry).with_version("9.9.9")
    }

    async fn roundtrip(server: &McpServer, line: &str) -> Value {
        serde_json::from_str(&server.handle_line(line).await.unwrap()).unwrap()
    }

    #[tokio::test]
    async fn initialize_reports_server_info() {
        let resp = roundtrip(
            &server(),
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#,
        )
        .await;
        assert_eq!(resp["result"]["protocolVersion"], PROTOCOL_VERSION);
        assert_eq!(resp["result"]["serverInfo"]["name"], "Test Tools");
        assert_eq!(resp["result"]["serverInfo"]["version"], "9.9.9");
        assert!(resp["result"]["capabilities"]["tools"].is_object());
    }

    #[tokio::test]
    async fn notifications_get_no_reply() {
        let server = server();
        assert!(
            server
                .handle_line(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
                .await
                .is_none()
        );
        assert!(server.handle_line("   ").await.is_none());
    }

    #[tokio::test]
    async fn tools_list_is_sorted() {
        let resp = roundtrip(&server(), r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#).await;
        let names: Vec<_> = resp["result"]["tools"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["name"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["fails", "greet"]);
        assert!(resp["result"]["tools"][0]["inputSchema"].is_object());
    }

    #[tokio::test]
    async fn tools_call_wraps_response_as_text() {
        let resp = roundtrip(
            &server(),
            r#"{"jsonrpc":"2.0","id":"a","method":"tools/call","params":{"name":"greet","arguments":{"who":"ana"}}}"#,
        )
        .await;
        assert_eq!(resp["id"], "a");
        assert_eq!(resp["result"]["isError"], false);
        let text = resp["result"]["content"][0]["text"].as_str().unwrap();
        let payload: Value = serde_json::from_str(text).unwrap();
        assert_eq!(payload, json!({"status": "success", "hello": "ana"}));
    }

    #[tokio::test]
    async fn error_status_sets_is_error() {
        let resp = roundtrip(
            &server(),
            r#"{"jsonrpc":"2.0","id":3,"method":"tools/call","params":{"name":"fails"}}"#,
        )
        .await;
        assert_eq!(resp["result"]["isError"], true);
    }

    #[tokio::test]
    async fn unknown_tool_is_error_result() {
        let resp = roundtrip(
            &server(),
            r#"{"jsonrpc":"2.0","id":4,"method":"tools/call","params":{"name":"nope"}}"#,
        )
        .await;
        assert_eq!(resp["result"]["isError"], true);
        assert!(
            resp["result"]["content"][0]["text"]
                .as_str()
                .unwrap()
                .contains("Unknown tool: nope")
        );
    }

    #[tokio::test]
    async fn missing_call_params_is_invalid_params() {
        let resp = roundtrip(&server(), r#"{"jsonrpc":"2.0","id":5,"method":"tools/call"}"#).await;
        assert_eq!(resp["error"]["code"], INVALID_PARAMS);
    }

    #[tokio::test]
    async fn ping_and_unknown_method() {
        let server = server();
        let resp = roundtrip(&server, r#"{"jsonrpc":"2.0","id":6,"method":"ping"}"#).await;
        assert_eq!(resp["result"], json!({}));

        let resp = roundtrip(&server, r#"{"jsonrpc":"2.0","id":7,"method":"resources/list"}"#).await;
        assert_eq!(resp["error"]["code"], METHOD_NOT_FOUND);
    }

    #[tokio::test]
    async fn garbage_is_parse_error() {
        let resp = roundtrip(&server(), "{not json").await;
        assert_eq!(resp["error"]["code"], PARSE_ERROR);
        assert!(resp["id"].is_null());
    }

    #[tokio::test]
    async fn non_request_object_is_invalid_request() {
        let resp = roundtrip(&server(), r#"{"id":8,"params":{}}"#).await;
        assert_eq!(resp["error"]["code"], INVALID_REQUEST);
        assert_eq!(resp["id"], 8);
    }
}
