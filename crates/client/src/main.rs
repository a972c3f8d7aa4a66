use clap::Parser;
use greet_mcp_client::McpClient;
use tracing_subscriber::EnvFilter;

/// Call the `greet` tool on an API-key gated MCP server.
#[derive(Parser, Debug)]
#[command(name = "greet-mcp-client", version)]
struct Args {
    /// API key sent in the X-API-Key header
    #[arg(long, env = "GREET_MCP_API_KEY")]
    api_key: String,

    /// Name to greet
    #[arg(long, default_value = "Ford")]
    name: String,

    /// MCP endpoint URL
    #[arg(long, default_value = "https://my-service.ngrok.app/mcp", env = "GREET_MCP_URL")]
    url: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let client = McpClient::connect(&args.url, &args.api_key).await?;
    let greeting = client.greet(&args.name).await?;
    println!("{greeting}");

    client.close().await?;
    Ok(())
}
