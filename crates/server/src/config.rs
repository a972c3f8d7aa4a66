use anyhow::Context as _;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

/// File name used when no database path is configured.
pub const DEFAULT_DB_FILE: &str = "api_keys.db";

/// Configuration for the greet MCP server.
#[derive(Parser, Debug, Clone)]
#[command(name = "greet-mcp-server", version)]
#[command(about = "MCP server exposing a greet tool behind API key authentication")]
pub struct Config {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:8000", env = "GREET_MCP_BIND")]
    pub bind: SocketAddr,

    /// SQLite database holding API keys [default: api_keys.db next to the executable]
    #[arg(long, env = "MCP_DB_PATH")]
    pub db_path: Option<PathBuf>,

    /// Server name advertised to MCP clients
    #[arg(long, default_value = "MyMCP", env = "GREET_MCP_NAME")]
    pub name: String,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,
}

impl Config {
    /// The configured database path, or [`DEFAULT_DB_FILE`] in the executable's directory.
    pub fn resolve_db_path(&self) -> anyhow::Result<PathBuf> {
        if let Some(path) = &self.db_path {
            return Ok(path.clone());
        }
        let exe = std::env::current_exe().context("locate current executable")?;
        let dir = exe
            .parent()
            .with_context(|| format!("executable {} has no parent directory", exe.display()))?;
        Ok(dir.join(DEFAULT_DB_FILE))
    }
}
