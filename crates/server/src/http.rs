//! HTTP surface: the gated MCP endpoint and an open health check.

use crate::gate::ApiKeyGate;
use crate::server::GreetServer;
use axum::extract::{Request, State};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse as _, Response};
use axum::routing::get;
use axum::{Json, Router};
use rmcp::transport::streamable_http_server::session::local::LocalSessionManager;
use rmcp::transport::streamable_http_server::{StreamableHttpServerConfig, StreamableHttpService};
use serde::Serialize;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Middleware running every `/mcp` request through the API key gate.
pub async fn require_api_key(
    State(gate): State<Arc<ApiKeyGate>>,
    req: Request,
    next: Next,
) -> Response {
    let headers = req.headers().clone();
    gate.intercept(&headers, || next.run(req))
        .await
        .unwrap_or_else(|e| e.into_response())
}

/// Build the application router.
///
/// `shutdown` cancels open MCP sessions when the server stops.
pub fn router(gate: Arc<ApiKeyGate>, server: GreetServer, shutdown: &CancellationToken) -> Router {
    let config = StreamableHttpServerConfig {
        cancellation_token: shutdown.child_token(),
        ..Default::default()
    };
    let mcp = StreamableHttpService::new(
        move || Ok(server.clone()),
        Arc::new(LocalSessionManager::default()),
        config,
    );

    let gated = Router::new()
        .nest_service("/mcp", mcp)
        .layer(middleware::from_fn_with_state(gate, require_api_key));

    Router::new().route("/health", get(health)).merge(gated)
}
