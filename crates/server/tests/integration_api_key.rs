mod common;

use greet_mcp_client::McpClient;
use greet_mcp_server::key_store::KeyStore;
use serde_json::json;

#[tokio::test]
async fn greet_with_valid_key() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let (db_path, key) = common::seeded_db(&dir).await?;
    let server = common::spawn_server(&db_path).await?;

    let client = McpClient::connect(&server.mcp_url(), &key).await?;
    let tools = client.list_tools().await?;
    assert_eq!(tools.len(), 1);
    assert_eq!(tools[0].name, "greet");

    assert_eq!(client.greet("Ford").await?, "Hello, Ford!");
    assert_eq!(client.greet("").await?, "Hello, !");
    client.close().await?;
    Ok(())
}

#[tokio::test]
async fn unknown_key_cannot_connect() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let (db_path, _key) = common::seeded_db(&dir).await?;
    let server = common::spawn_server(&db_path).await?;

    let res = McpClient::connect(&server.mcp_url(), "bogus").await;
    assert!(res.is_err());
    Ok(())
}

#[tokio::test]
async fn missing_key_gets_401_json() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let (db_path, _key) = common::seeded_db(&dir).await?;
    let server = common::spawn_server(&db_path).await?;

    let resp = reqwest::Client::new()
        .post(server.mcp_url())
        .header("Accept", "application/json, text/event-stream")
        .json(&json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "tools/call",
            "params": { "name": "greet", "arguments": { "name": "Ford" } }
        }))
        .send()
        .await?;

    assert_eq!(resp.status(), reqwest::StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = resp.json().await?;
    assert_eq!(body["error"], "Unauthorized: Invalid or missing API Key");
    assert_eq!(body["code"], "UNAUTHORIZED");
    Ok(())
}

#[tokio::test]
async fn first_start_seeds_a_single_key() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let db_path = dir.path().join("api_keys.db");
    let _server = common::spawn_server(&db_path).await?;

    let store = KeyStore::open(&db_path).await?;
    assert_eq!(store.key_count().await?, 1);
    assert!(store.initialize().await?.is_none());
    store.close().await;
    Ok(())
}

#[tokio::test]
async fn restart_keeps_existing_key() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let (db_path, key) = common::seeded_db(&dir).await?;

    drop(common::spawn_server(&db_path).await?);
    let server = common::spawn_server(&db_path).await?;

    let client = McpClient::connect(&server.mcp_url(), &key).await?;
    assert_eq!(client.greet("Arthur").await?, "Hello, Arthur!");
    client.close().await?;
    Ok(())
}
