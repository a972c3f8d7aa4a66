//! MCP server handler backed by the tool registry.

use crate::tools::ToolRegistry;
use rmcp::model::{
    CallToolRequestParams, CallToolResult, Implementation, ListToolsResult,
    PaginatedRequestParams, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::service::RequestContext;
use rmcp::{ErrorData as McpError, RoleServer, ServerHandler};
use std::sync::Arc;

/// Serves the registry's tools. Cheap to clone: one instance is created per MCP session.
#[derive(Clone)]
pub struct GreetServer {
    name: Arc<str>,
    registry: Arc<ToolRegistry>,
}

impl GreetServer {
    #[must_use]
    pub fn new(name: impl Into<Arc<str>>, registry: Arc<ToolRegistry>) -> Self {
        Self {
            name: name.into(),
            registry,
        }
    }
}

impl ServerHandler for GreetServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: self.name.to_string(),
                version: env!("CARGO_PKG_VERSION").into(),
                title: None,
                description: None,
                icons: None,
                website_url: None,
            },
            instructions: Some("Call `greet` with a `name` to receive a greeting.".to_string()),
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult {
            tools: self.registry.tools(),
            next_cursor: None,
            meta: None,
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(tool = %request.name, "tools/call");
        self.registry
            .call(request.name.as_ref(), request.arguments)
            .await
            .inspect_err(|e| tracing::warn!(tool = %request.name, error = %e, "tool call failed"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn info_advertises_tools_capability() -> anyhow::Result<()> {
        let registry = Arc::new(ToolRegistry::with_builtin_tools()?);
        let server = GreetServer::new("MyMCP", registry);

        let info = server.get_info();
        assert_eq!(info.server_info.name, "MyMCP");
        assert!(info.capabilities.tools.is_some());
        Ok(())
    }
}
