//! Client for API-key gated MCP servers speaking streamable HTTP.

use anyhow::{Context as _, bail};
use reqwest::header::{HeaderMap, HeaderValue};
use rmcp::model::{CallToolRequestParams, CallToolResult, JsonObject, Tool};
use rmcp::service::{RunningService, ServiceExt as _};
use rmcp::transport::StreamableHttpClientTransport;
use rmcp::transport::streamable_http_client::StreamableHttpClientTransportConfig;
use rmcp::RoleClient;
use serde_json::json;
use std::borrow::Cow;

/// Header carrying the API key on every request.
pub const API_KEY_HEADER: &str = "X-API-Key";

/// HTTP client that attaches the API key to every request it sends.
///
/// # Errors
///
/// Fails if the key is not a valid header value or the TLS backend cannot be initialized.
pub fn http_client(api_key: &str) -> anyhow::Result<reqwest::Client> {
    let mut value = HeaderValue::from_str(api_key).context("API key is not a valid header value")?;
    value.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(API_KEY_HEADER, value);
    reqwest::Client::builder()
        .default_headers(headers)
        .build()
        .context("build http client")
}

/// Concatenate the text parts of a tool result, one per line.
#[must_use]
pub fn text_content(result: &CallToolResult) -> String {
    result
        .content
        .iter()
        .filter_map(|c| c.as_text())
        .map(|t| t.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

/// An initialized MCP session.
pub struct McpClient {
    service: RunningService<RoleClient, ()>,
}

impl McpClient {
    /// Connect to `url` and complete the MCP handshake.
    ///
    /// # Errors
    ///
    /// Fails if the server is unreachable or rejects the API key.
    pub async fn connect(url: &str, api_key: &str) -> anyhow::Result<Self> {
        let transport = StreamableHttpClientTransport::with_client(
            http_client(api_key)?,
            StreamableHttpClientTransportConfig::with_uri(url),
        );
        let service = ()
            .serve(transport)
            .await
            .with_context(|| format!("connect to MCP server at {url}"))?;
        tracing::debug!(url, "mcp session initialized");
        Ok(Self { service })
    }

    pub async fn list_tools(&self) -> anyhow::Result<Vec<Tool>> {
        let tools = self.service.list_all_tools().await.context("tools/list")?;
        Ok(tools)
    }

    /// Invoke a tool and return its raw result.
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: JsonObject,
    ) -> anyhow::Result<CallToolResult> {
        let request = CallToolRequestParams {
            name: Cow::Owned(name.to_string()),
            arguments: Some(arguments),
            task: None,
            meta: None,
        };
        self.service
            .call_tool(request)
            .await
            .with_context(|| format!("tools/call {name}"))
    }

    /// Call the `greet` tool and return the greeting text.
    ///
    /// # Errors
    ///
    /// Fails on transport errors or when the tool reports an error result.
    pub async fn greet(&self, name: &str) -> anyhow::Result<String> {
        let mut arguments = JsonObject::new();
        arguments.insert("name".to_string(), json!(name));

        let result = self.call_tool("greet", arguments).await?;
        let text = text_content(&result);
        if result.is_error == Some(true) {
            bail!("greet failed: {text}");
        }
        Ok(text)
    }

    pub async fn close(self) -> anyhow::Result<()> {
        self.service.cancel().await.context("close mcp session")?;
        Ok(())
    }
}
