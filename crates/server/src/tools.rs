//! Tool registry and the `greet` tool.
//!
//! Tools are registered explicitly at startup and looked up by name at dispatch time.

use crate::error::{Error, Result};
use async_trait::async_trait;
use rmcp::ErrorData as McpError;
use rmcp::model::{CallToolResult, Content, JsonObject, Tool};
use serde::Deserialize;
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::sync::Arc;

/// A remote-callable operation: takes a named-argument map, returns a result or fails.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// Tool metadata advertised in `tools/list`.
    fn definition(&self) -> Tool;

    async fn call(&self, arguments: JsonObject) -> std::result::Result<CallToolResult, McpError>;
}

/// Name -> handler map, built once and shared read-only.
#[derive(Default, Clone)]
pub struct ToolRegistry {
    handlers: BTreeMap<String, Arc<dyn ToolHandler>>,
}

impl ToolRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in tool.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateTool`] if two built-ins share a name.
    pub fn with_builtin_tools() -> Result<Self> {
        let mut registry = Self::new();
        registry.register(Arc::new(GreetTool))?;
        Ok(registry)
    }

    /// # Errors
    ///
    /// Returns [`Error::DuplicateTool`] if a tool with the same name is already registered.
    pub fn register(&mut self, handler: Arc<dyn ToolHandler>) -> Result<()> {
        let name = handler.definition().name.to_string();
        if self.handlers.contains_key(&name) {
            return Err(Error::DuplicateTool(name));
        }
        tracing::debug!(tool = %name, "registered tool");
        self.handlers.insert(name, handler);
        Ok(())
    }

    #[must_use]
    pub fn tools(&self) -> Vec<Tool> {
        self.handlers.values().map(|h| h.definition()).collect()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn ToolHandler>> {
        self.handlers.get(name).cloned()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Dispatch a call by tool name.
    ///
    /// # Errors
    ///
    /// Returns an `invalid_params` MCP error for unknown tools, or whatever the handler fails with.
    pub async fn call(
        &self,
        name: &str,
        arguments: Option<JsonObject>,
    ) -> std::result::Result<CallToolResult, McpError> {
        let handler = self
            .get(name)
            .ok_or_else(|| McpError::invalid_params(format!("Tool not found: {name}"), None))?;
        handler.call(arguments.unwrap_or_default()).await
    }
}

/// Build the greeting returned by the `greet` tool.
#[must_use]
pub fn greet(name: &str) -> String {
    format!("Hello, {name}!")
}

#[derive(Debug, Deserialize)]
struct GreetArgs {
    name: String,
}

pub struct GreetTool;

impl GreetTool {
    pub const NAME: &'static str = "greet";
}

#[async_trait]
impl ToolHandler for GreetTool {
    fn definition(&self) -> Tool {
        let schema = json!({
            "type": "object",
            "properties": {
                "name": {
                    "type": "string",
                    "description": "Name of the person to greet"
                }
            },
            "required": ["name"]
        });
        let schema = match schema {
            Value::Object(map) => map,
            _ => JsonObject::new(),
        };
        Tool::new(
            Self::NAME,
            "A tool that greets a user by name",
            Arc::new(schema),
        )
    }

    async fn call(&self, arguments: JsonObject) -> std::result::Result<CallToolResult, McpError> {
        let args: GreetArgs = serde_json::from_value(Value::Object(arguments)).map_err(|e| {
            McpError::invalid_params(format!("invalid arguments for greet: {e}"), None)
        })?;
        Ok(CallToolResult::success(vec![Content::text(greet(
            &args.name,
        ))]))
    }
}
