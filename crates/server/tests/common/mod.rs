use anyhow::Context as _;
use greet_mcp_server::key_store::KeyStore;
use std::net::TcpListener;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};
use tempfile::TempDir;

/// A running `greet-mcp-server` child process, killed on drop.
pub struct ServerProcess {
    child: Child,
    pub port: u16,
}

impl ServerProcess {
    pub fn mcp_url(&self) -> String {
        format!("http://127.0.0.1:{}/mcp", self.port)
    }

    pub fn health_url(&self) -> String {
        format!("http://127.0.0.1:{}/health", self.port)
    }
}

impl Drop for ServerProcess {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// Pick an unused TCP port on localhost. The port is not reserved.
pub fn pick_unused_port() -> anyhow::Result<u16> {
    let listener = TcpListener::bind("127.0.0.1:0").context("bind ephemeral port")?;
    Ok(listener.local_addr()?.port())
}

/// Poll `url` until it answers with a success status.
pub async fn wait_http_ok(url: &str, timeout_dur: Duration) -> anyhow::Result<()> {
    let client = reqwest::Client::new();
    let start = Instant::now();
    loop {
        if start.elapsed() > timeout_dur {
            anyhow::bail!("timed out waiting for {url}");
        }

        match client.get(url).send().await {
            Ok(resp) if resp.status().is_success() => return Ok(()),
            _ => tokio::time::sleep(Duration::from_millis(200)).await,
        }
    }
}

/// Create a key database under `dir` and return its path with the seeded key.
pub async fn seeded_db(dir: &TempDir) -> anyhow::Result<(std::path::PathBuf, String)> {
    let path = dir.path().join("api_keys.db");
    let store = KeyStore::open(&path).await?;
    let key = store
        .initialize()
        .await?
        .context("fresh database must generate a key")?;
    store.close().await;
    Ok((path, key))
}

pub async fn spawn_server(db_path: &Path) -> anyhow::Result<ServerProcess> {
    let port = pick_unused_port()?;
    let bin = env!("CARGO_BIN_EXE_greet-mcp-server");
    let child = Command::new(bin)
        .arg("--db-path")
        .arg(db_path)
        .arg("--bind")
        .arg(format!("127.0.0.1:{port}"))
        .arg("--log-level")
        .arg("info")
        .stdout(Stdio::null())
        .spawn()
        .context("spawn greet-mcp-server")?;
    let server = ServerProcess { child, port };

    wait_http_ok(&server.health_url(), Duration::from_secs(20)).await?;
    Ok(server)
}
