//! Remote-callable tool entrypoints and their registry.

use std::{collections::HashMap, sync::Arc};

use {
    async_trait::async_trait,
    serde::{Serialize, Serializer, de::DeserializeOwned, ser::SerializeMap},
    serde_json::{Map, Value},
    tracing::{debug, warn},
};

#[cfg(feature = "metrics")]
use yatools_metrics::{counter, histogram, labels, tools as tool_metrics};

use crate::types::McpToolDef;

/// Outcome of an entrypoint call.
///
/// Serializes as `{"status": "success", ...fields}` or
/// `{"status": "error", "message": "..."}`.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolResponse {
    Success(Map<String, Value>),
    Error { message: String },
}

impl ToolResponse {
    #[must_use]
    pub fn success() -> Self {
        Self::Success(Map::new())
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    /// Add a payload field. No-op on error responses.
    #[must_use]
    pub fn with(mut self, key: &str, value: impl Serialize) -> Self {
        if let Self::Success(fields) = &mut self {
            let value = serde_json::to_value(value).unwrap_or(Value::Null);
            fields.insert(key.to_string(), value);
        }
        self
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Self::Success(fields) => fields.get(key),
            Self::Error { .. } => None,
        }
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

impl Serialize for ToolResponse {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Success(fields) => {
                let mut map = serializer.serialize_map(Some(fields.len() + 1))?;
                map.serialize_entry("status", "success")?;
                for (key, value) in fields {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            },
            Self::Error { message } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("status", "error")?;
                map.serialize_entry("message", message)?;
                map.end()
            },
        }
    }
}

/// Decode tool arguments, turning a decoding failure into an error response.
pub fn parse_args<T: DeserializeOwned>(tool: &str, args: Value) -> Result<T, ToolResponse> {
    let args = if args.is_null() {
        Value::Object(Map::new())
    } else {
        args
    };
    serde_json::from_value(args)
        .map_err(|e| ToolResponse::error(format!("Invalid arguments for {tool}: {e}")))
}

/// A remote-callable tool.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn parameters_schema(&self) -> Value;
    async fn call(&self, args: Value) -> ToolResponse;
}

/// Registered entrypoints, keyed by name.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn ToolHandler>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tool: Arc<dyn ToolHandler>) {
        let name = tool.name().to_string();
        if self.tools.insert(name.clone(), tool).is_some() {
            warn!(tool = %name, "tool registered twice, keeping the latest");
        }
    }

    pub fn get(&self, name: &str) -> Option<&dyn ToolHandler> {
        self.tools.get(name).map(|t| t.as_ref())
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Tool definitions sorted by name.
    pub fn definitions(&self) -> Vec<McpToolDef> {
        let mut defs: Vec<McpToolDef> = self
            .tools
            .values()
            .map(|t| McpToolDef {
                name: t.name().to_string(),
                description: Some(t.description().to_string()),
                input_schema: t.parameters_schema(),
            })
            .collect();
        defs.sort_by(|a, b| a.name.cmp(&b.name));
        defs
    }

    /// Call a tool by name. `None` when no such tool is registered.
    pub async fn call(&self, name: &str, args: Value) -> Option<ToolResponse> {
        let tool = self.tools.get(name)?;

        #[cfg(feature = "metrics")]
        let started = std::time::Instant::now();
        #[cfg(feature = "metrics")]
        counter!(tool_metrics::CALLS_TOTAL, labels::TOOL => name.to_string()).increment(1);

        let response = tool.call(args).await;

        #[cfg(feature = "metrics")]
        {
            histogram!(tool_metrics::CALL_DURATION_SECONDS, labels::TOOL => name.to_string())
                .record(started.elapsed().as_secs_f64());
            if response.is_error() {
                counter!(tool_metrics::ERRORS_TOTAL, labels::TOOL => name.to_string())
                    .increment(1);
            }
        }

        match &response {
            ToolResponse::Error { message } => warn!(tool = name, %message, "tool call failed"),
            ToolResponse::Success(_) => debug!(tool = name, "tool call succeeded"),
        }
        Some(response)
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, serde::Deserialize, serde_json::json};

    struct Echo(&'static str);

    #[async_trait]
    impl ToolHandler for Echo {
        fn name(&self) -> &str {
            self.0
        }

        fn description(&self) -> &str {
            "echo"
        }

        fn parameters_schema(&self) -> Value {
            json!({"type": "object"})
        }

        async fn call(&self, args: Value) -> ToolResponse {
            ToolResponse::success().with("args", args)
        }
    }

    #[test]
    fn success_serializes_status_first_with_fields() {
        let resp = ToolResponse::success().with("message_id", "abc");
        assert_eq!(
            resp.to_value(),
            json!({"status": "success", "message_id": "abc"})
        );
    }

    #[test]
    fn error_serializes_message() {
        let resp = ToolResponse::error("boom").with("ignored", 1);
        assert_eq!(resp.to_value(), json!({"status": "error", "message": "boom"}));
        assert!(resp.is_error());
    }

    #[test]
    fn definitions_are_sorted() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(Echo("zeta")));
        registry.register(Arc::new(Echo("alpha")));
        let names: Vec<_> = registry
            .definitions()
            .into_iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
    }

    #[tokio::test]
    async fn unknown_tool_is_none() {
        let registry = ToolRegistry::new();
        assert!(registry.call("missing", Value::Null).await.is_none());
    }

    #[tokio::test]
    async fn call_dispatches_by_name() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(Echo("echo")));
        let resp = registry.call("echo", json!({"a": 1})).await.unwrap();
        assert_eq!(resp.get("args"), Some(&json!({"a": 1})));
    }

    #[derive(Debug, Deserialize)]
    struct Args {
        #[allow(dead_code)]
        count: u32,
    }

    #[test]
    fn parse_args_reports_bad_argument() {
        let err = parse_args::<Args>("demo", json!({"count": "x"})).unwrap_err();
        match err {
            ToolResponse::Error { message } => {
                assert!(message.starts_with("Invalid arguments for demo"));
            },
            ToolResponse::Success(_) => panic!("expected error"),
        }
    }

    #[test]
    fn parse_args_treats_null_as_empty_object() {
        #[derive(Deserialize)]
        struct Empty {}
        assert!(parse_args::<Empty>("demo", Value::Null).is_ok());
    }
}
