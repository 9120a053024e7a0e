//! End-to-end checks over the assembled gateway with the real client.
//!
//! Every scenario here resolves before any network I/O would happen, so
//! the suite needs no upstream and no credentials beyond a fake key.

use intelgate_core::engine::{Engine, ServerInfo};
use intelgate_core::ratelimit::RateLimiter;
use intelgate_core::upstream::Adapter;
use intelgate_virustotal::catalog;
use intelgate_virustotal::client::{DEFAULT_BASE_URL, VirusTotalClient};
use serde_json::{Value, json};
use std::time::Duration;

fn engine() -> Engine<VirusTotalClient> {
    let client =
        VirusTotalClient::new(DEFAULT_BASE_URL, &"a".repeat(64)).expect("client builds");
    Engine::new(
        ServerInfo {
            name: "virustotal-mcp-server".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        catalog::registry().expect("catalog"),
        RateLimiter::new(60, Duration::from_secs(60)),
        Adapter::new(client, Duration::from_secs(30)),
    )
}

async fn roundtrip(engine: &Engine<VirusTotalClient>, request: Value) -> Value {
    let line = engine.handle_line(&request.to_string()).await;
    serde_json::from_str(&line).expect("response is JSON")
}

#[tokio::test]
async fn initialize_reports_identity_and_tool_capability() {
    let engine = engine();
    let response = roundtrip(
        &engine,
        json!({"jsonrpc": "2.0", "id": 1, "method": "initialize"}),
    )
    .await;
    assert_eq!(response["result"]["serverInfo"]["name"], "virustotal-mcp-server");
    assert_eq!(response["result"]["capabilities"]["tools"], json!({}));
}

#[tokio::test]
async fn tools_list_publishes_the_full_catalog() {
    let engine = engine();
    let response = roundtrip(
        &engine,
        json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"}),
    )
    .await;
    let tools = response["result"]["tools"].as_array().expect("tools array");
    let names: Vec<&str> = tools
        .iter()
        .map(|t| t["name"].as_str().expect("name"))
        .collect();
    assert_eq!(
        names,
        vec![
            "create_hunting_ruleset",
            "create_collection",
            "list_hunting_rulesets"
        ]
    );
}

#[tokio::test]
async fn collection_without_iocs_fails_with_invalid_params() {
    let engine = engine();
    let response = roundtrip(
        &engine,
        json!({
            "jsonrpc": "2.0",
            "id": 3,
            "method": "tools/call",
            "params": {"name": "create_collection", "arguments": {"name": "Test"}},
        }),
    )
    .await;
    assert_eq!(response["id"], json!(3));
    assert_eq!(response["error"]["code"], json!(-32602));
}

#[tokio::test]
async fn oversized_yara_source_is_rejected_before_upstream() {
    let engine = engine();
    let rules = "a".repeat(catalog::MAX_YARA_BYTES + 1);
    let response = roundtrip(
        &engine,
        json!({
            "jsonrpc": "2.0",
            "id": 4,
            "method": "tools/call",
            "params": {
                "name": "create_hunting_ruleset",
                "arguments": {"name": "Big", "rules": rules},
            },
        }),
    )
    .await;
    assert_eq!(response["error"]["code"], json!(-32602));
}
