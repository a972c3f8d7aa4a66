use anyhow::Context as _;
use clap::Parser;
use greet_mcp_server::config::Config;
use greet_mcp_server::gate::ApiKeyGate;
use greet_mcp_server::key_store::KeyStore;
use greet_mcp_server::server::GreetServer;
use greet_mcp_server::tools::ToolRegistry;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn init_tracing(config: &Config) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if config.log_json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    init_tracing(&config);

    let db_path = config.resolve_db_path()?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        bind = %config.bind,
        db_path = %db_path.display(),
        name = %config.name,
        "starting greet-mcp-server"
    );

    // The key store must be ready before the listener accepts anything.
    let store = KeyStore::open(&db_path)
        .await
        .with_context(|| format!("open key store {}", db_path.display()))?;
    if let Some(key) = store
        .initialize()
        .await
        .context("initialize key store")?
    {
        info!(
            api_key = %key,
            db_path = %store.path().display(),
            "Generated default API key"
        );
    }
    let store = Arc::new(store);

    let registry = Arc::new(ToolRegistry::with_builtin_tools()?);
    let server = GreetServer::new(config.name.as_str(), registry);
    let gate = Arc::new(ApiKeyGate::new(store.clone()));

    let shutdown = CancellationToken::new();
    let app = greet_mcp_server::http::router(gate, server, &shutdown);

    let listener = TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("bind {}", config.bind))?;
    info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await
        .context("serve http")?;

    store.close().await;
    info!("server shutdown complete");
    Ok(())
}

async fn shutdown_signal(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
        info!("received Ctrl+C, initiating shutdown");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                info!("received SIGTERM, initiating shutdown");
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    token.cancel();
}
